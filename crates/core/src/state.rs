use crate::{BlessingDefinition, CurseDef, Effect, EnemyDef, EquipmentDef, SourceTag};
use serde::{Deserialize, Serialize};

pub const STARTING_HP: i64 = 30;
pub const STARTING_GOLD: i64 = 10;
pub const MAX_WISHES: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    PreHand,
    PlayerTurn,
    HandResult,
    BattleResult,
    Shop,
    Wish,
    Victory,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Charm,
}

/// One item per slot; buying a duplicate slot replaces the old piece.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub weapon: Option<EquipmentDef>,
    pub armor: Option<EquipmentDef>,
    pub charm: Option<EquipmentDef>,
}

impl Equipment {
    pub fn slot(&self, slot: EquipSlot) -> &Option<EquipmentDef> {
        match slot {
            EquipSlot::Weapon => &self.weapon,
            EquipSlot::Armor => &self.armor,
            EquipSlot::Charm => &self.charm,
        }
    }

    pub fn equip(&mut self, def: EquipmentDef) -> Option<EquipmentDef> {
        let target = match def.slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Charm => &mut self.charm,
        };
        target.replace(def)
    }
}

/// A granted wish: the player's free text, the validated blessing it
/// compiled to, and the defeated boss's curse. Blessing and curse are both
/// permanent for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wish {
    pub text: String,
    pub blessing: BlessingDefinition,
    pub curse: Option<CurseDef>,
    pub boss_name: String,
}

/// A timed effect bundle attached to a combatant, ticked down at hand end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveEffect {
    pub name: String,
    pub source: SourceTag,
    pub hands_left: u32,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub hp: i64,
    pub max_hp: i64,
    pub gold: i64,
    pub equipment: Equipment,
    pub consumables: Vec<ConsumableStack>,
    pub wishes: Vec<Wish>,
    pub active_effects: Vec<ActiveEffect>,
}

/// Owned consumables waiting to be drunk at the next battle start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumableStack {
    pub id: String,
    pub count: u32,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            hp: STARTING_HP,
            max_hp: STARTING_HP,
            gold: STARTING_GOLD,
            equipment: Equipment::default(),
            consumables: Vec::new(),
            wishes: Vec::new(),
            active_effects: Vec::new(),
        }
    }

    pub fn owns_equipment(&self, id: &str) -> bool {
        [
            &self.equipment.weapon,
            &self.equipment.armor,
            &self.equipment.charm,
        ]
        .iter()
        .any(|slot| slot.as_ref().map(|def| def.id == id).unwrap_or(false))
    }

    pub fn add_consumable(&mut self, id: &str) {
        if let Some(stack) = self.consumables.iter_mut().find(|s| s.id == id) {
            stack.count += 1;
        } else {
            self.consumables.push(ConsumableStack {
                id: id.to_string(),
                count: 1,
            });
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyState {
    pub data: EnemyDef,
    pub hp: i64,
    pub is_boss: bool,
}

impl EnemyState {
    pub fn new(data: EnemyDef, is_boss: bool) -> Self {
        let hp = data.max_hp;
        Self { data, hp, is_boss }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KillCause {
    EnemyAttack,
    Surrender,
    Attrition,
}
