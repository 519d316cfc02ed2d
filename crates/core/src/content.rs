use crate::{Effect, EquipSlot, PlayerState, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub slot: EquipSlot,
    pub price: i64,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumableDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    /// Hands the effect persists for once the battle starts.
    pub duration_hands: u32,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurseDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_hp: i64,
    /// Which stage this enemy is drawn for (bosses: which stage they close).
    pub stage: u32,
    pub abilities: Vec<Effect>,
    /// Bosses attach this to the player for the whole battle.
    #[serde(default)]
    pub curse: Option<CurseDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferKind {
    Equipment,
    Consumable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopOffer {
    pub kind: OfferKind,
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
}

pub const SHOP_SLOTS: usize = 3;

/// All loaded catalogs. Enemy and boss selection is a pure function of the
/// run position; only shop stock consumes RNG draws.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    pub equipment: Vec<EquipmentDef>,
    pub consumables: Vec<ConsumableDef>,
    pub enemies: Vec<EnemyDef>,
    pub bosses: Vec<EnemyDef>,
}

impl Content {
    pub fn equipment_by_id(&self, id: &str) -> Option<&EquipmentDef> {
        self.equipment.iter().find(|def| def.id == id)
    }

    pub fn consumable_by_id(&self, id: &str) -> Option<&ConsumableDef> {
        self.consumables.iter().find(|def| def.id == id)
    }

    /// Deterministic pick for a regular battle. Falls back to the whole
    /// catalog when no enemy is tiered for the stage.
    pub fn enemy_for(&self, stage: u32, battle_in_stage: u32) -> Option<EnemyDef> {
        let tiered: Vec<&EnemyDef> =
            self.enemies.iter().filter(|def| def.stage == stage).collect();
        let pool: Vec<&EnemyDef> = if tiered.is_empty() {
            self.enemies.iter().collect()
        } else {
            tiered
        };
        if pool.is_empty() {
            return None;
        }
        let index = (battle_in_stage.saturating_sub(1)) as usize % pool.len();
        Some(pool[index].clone())
    }

    pub fn boss_for(&self, stage: u32) -> Option<EnemyDef> {
        self.bosses
            .iter()
            .find(|def| def.stage == stage)
            .or_else(|| self.bosses.last())
            .cloned()
    }

    /// Rolls the shop stock: distinct items, equipment the player already
    /// wears excluded. Draw count depends on pool size, so stock rolls are
    /// part of the deterministic sequence.
    pub fn shop_offers(&self, rng: &mut RngState, player: &PlayerState) -> Vec<ShopOffer> {
        let mut pool: Vec<ShopOffer> = Vec::new();
        for def in &self.equipment {
            if player.owns_equipment(&def.id) {
                continue;
            }
            pool.push(ShopOffer {
                kind: OfferKind::Equipment,
                id: def.id.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                price: def.price,
            });
        }
        for def in &self.consumables {
            pool.push(ShopOffer {
                kind: OfferKind::Consumable,
                id: def.id.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                price: def.price,
            });
        }
        let mut offers = Vec::new();
        while offers.len() < SHOP_SLOTS && !pool.is_empty() {
            let index = (rng.next_u64() % pool.len() as u64) as usize;
            offers.push(pool.swap_remove(index));
        }
        offers
    }
}
