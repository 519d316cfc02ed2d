use crate::{fold_rules, Card, HandScore, Phase, PlayerAction, RunState, ShopOffer, Side};
use serde::{Deserialize, Serialize};

/// Everything a frontend may show. The hole card and the enemy score stay
/// out of the view until the hole is revealed; a peek surfaces the card
/// without unlocking the score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameView {
    pub phase: Phase,
    pub stage: u32,
    pub battle_in_stage: u32,
    pub player: PlayerView,
    pub enemy: Option<EnemyView>,
    pub hand: Option<HandView>,
    pub shop: Vec<ShopOffer>,
    pub actions: Vec<PlayerAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub hp: i64,
    pub max_hp: i64,
    pub gold: i64,
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub charm: Option<String>,
    pub wishes: Vec<String>,
    pub active_effects: Vec<ActiveEffectView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveEffectView {
    pub name: String,
    pub hands_left: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyView {
    pub name: String,
    pub description: String,
    pub hp: i64,
    pub max_hp: i64,
    pub boss: bool,
    pub curse: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandView {
    pub number: u32,
    pub player_cards: Vec<Card>,
    pub player_score: HandScore,
    pub enemy_cards: Vec<Card>,
    pub hole_hidden: bool,
    pub enemy_score: Option<HandScore>,
    pub peeked: Option<Card>,
    pub doubled_down: bool,
}

impl RunState {
    pub fn view(&self) -> GameView {
        let mods = self.collect_modifiers();
        let rules = fold_rules(&mods);
        let player = PlayerView {
            hp: self.player.hp,
            max_hp: rules.effective_max_hp(self.player.max_hp),
            gold: self.player.gold,
            weapon: self.player.equipment.weapon.as_ref().map(|d| d.name.clone()),
            armor: self.player.equipment.armor.as_ref().map(|d| d.name.clone()),
            charm: self.player.equipment.charm.as_ref().map(|d| d.name.clone()),
            wishes: self
                .player
                .wishes
                .iter()
                .map(|w| w.blessing.name.clone())
                .collect(),
            active_effects: self
                .player
                .active_effects
                .iter()
                .map(|a| ActiveEffectView {
                    name: a.name.clone(),
                    hands_left: a.hands_left,
                })
                .collect(),
        };
        let enemy = self.battle.as_ref().map(|battle| EnemyView {
            name: battle.enemy.data.name.clone(),
            description: battle.enemy.data.description.clone(),
            hp: battle.enemy.hp,
            max_hp: battle.enemy.data.max_hp,
            boss: battle.enemy.is_boss,
            curse: battle.curse.as_ref().map(|c| c.name.clone()),
        });
        let hand = self.battle.as_ref().and_then(|battle| {
            if battle.hand_number == 0 {
                return None;
            }
            let enemy_cards = if battle.hole_revealed {
                battle.enemy_hand.clone()
            } else {
                battle.enemy_hand.iter().take(1).copied().collect()
            };
            Some(HandView {
                number: battle.hand_number,
                player_cards: battle.player_hand.clone(),
                player_score: self.effective_score(Side::Player, &rules, &mods),
                enemy_cards,
                hole_hidden: !battle.hole_revealed,
                enemy_score: battle
                    .hole_revealed
                    .then(|| self.effective_score(Side::Enemy, &rules, &mods)),
                peeked: battle.peeked_card,
                doubled_down: battle.doubled_down,
            })
        });
        GameView {
            phase: self.phase,
            stage: self.stage,
            battle_in_stage: self.battle_in_stage,
            player,
            enemy,
            hand,
            shop: self.shop_stock.clone(),
            actions: self.available_actions(),
        }
    }
}
