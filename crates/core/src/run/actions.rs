use crate::{
    BlessingDefinition, EngineError, Event, OfferKind, Outcome, Phase, RunState, MAX_WISHES,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PlayerAction {
    Continue,
    Hit,
    Stand,
    DoubleDown,
    Surrender,
    Peek,
    RemoveCard { index: usize },
    BuyItem { index: usize },
    LeaveShop,
    Wish {
        text: String,
        /// The boon the collaborator produced for the text; `None` falls back
        /// to the stock blessing. Carried in the action so replays never
        /// re-consult the collaborator.
        blessing: Option<BlessingDefinition>,
    },
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Continue => "continue",
            PlayerAction::Hit => "hit",
            PlayerAction::Stand => "stand",
            PlayerAction::DoubleDown => "double down",
            PlayerAction::Surrender => "surrender",
            PlayerAction::Peek => "peek",
            PlayerAction::RemoveCard { .. } => "remove card",
            PlayerAction::BuyItem { .. } => "buy item",
            PlayerAction::LeaveShop => "leave shop",
            PlayerAction::Wish { .. } => "wish",
        }
    }
}

/// What a submitted action did. A refused action is a value, not an error:
/// `EngineError` is reserved for broken invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub phase: Phase,
}

impl RunState {
    /// The single gate both the offer list and `perform_action` consult: an
    /// offered action never fails.
    pub fn action_allowed(&self, action: &PlayerAction) -> bool {
        match self.phase {
            Phase::PreHand | Phase::HandResult | Phase::BattleResult => {
                matches!(action, PlayerAction::Continue)
            }
            Phase::PlayerTurn => self.turn_action_allowed(action),
            Phase::Shop => match action {
                PlayerAction::LeaveShop => true,
                PlayerAction::BuyItem { index } => self
                    .shop_stock
                    .get(*index)
                    .map(|offer| offer.price <= self.player.gold)
                    .unwrap_or(false),
                _ => false,
            },
            Phase::Wish => matches!(action, PlayerAction::Wish { .. }),
            Phase::Victory | Phase::GameOver => false,
        }
    }

    fn turn_action_allowed(&self, action: &PlayerAction) -> bool {
        let Some(battle) = &self.battle else {
            return false;
        };
        let rules = self.current_rules();
        let opening = battle.player_hand.len() == rules.initial_cards() && !battle.doubled_down;
        match action {
            PlayerAction::Hit | PlayerAction::Stand => true,
            PlayerAction::DoubleDown => rules.actions.can_double_down && opening,
            PlayerAction::Surrender => rules.actions.can_surrender && opening,
            PlayerAction::Peek => {
                rules.actions.can_peek
                    && !battle.peeked_this_hand
                    && !battle.hole_revealed
                    && battle.enemy_hand.len() > 1
            }
            PlayerAction::RemoveCard { index } => {
                rules.actions.can_remove_card
                    && !battle.removed_this_hand
                    && battle.player_hand.len() > 1
                    && *index < battle.player_hand.len()
            }
            _ => false,
        }
    }

    /// Enumerates every action that would currently be accepted. Parametric
    /// actions appear once per valid index.
    pub fn available_actions(&self) -> Vec<PlayerAction> {
        let mut candidates = vec![
            PlayerAction::Continue,
            PlayerAction::Hit,
            PlayerAction::Stand,
            PlayerAction::DoubleDown,
            PlayerAction::Surrender,
            PlayerAction::Peek,
        ];
        if let Some(battle) = &self.battle {
            for index in 0..battle.player_hand.len() {
                candidates.push(PlayerAction::RemoveCard { index });
            }
        }
        for index in 0..self.shop_stock.len() {
            candidates.push(PlayerAction::BuyItem { index });
        }
        candidates.push(PlayerAction::LeaveShop);
        candidates.push(PlayerAction::Wish {
            text: String::new(),
            blessing: None,
        });
        candidates
            .into_iter()
            .filter(|action| self.action_allowed(action))
            .collect()
    }

    pub fn perform_action(&mut self, action: PlayerAction) -> Result<ActionOutcome, EngineError> {
        if !self.action_allowed(&action) {
            return Ok(ActionOutcome {
                success: false,
                message: format!("{} is not available right now", action.name()),
                phase: self.phase,
            });
        }
        self.actions.push(action.clone());
        let message = match action {
            PlayerAction::Continue => match self.phase {
                Phase::PreHand | Phase::HandResult => {
                    self.begin_hand()?;
                    "next hand dealt".to_string()
                }
                Phase::BattleResult => {
                    if self.is_boss_battle() && self.player.wishes.len() < MAX_WISHES {
                        self.phase = Phase::Wish;
                        "the genie stirs".to_string()
                    } else {
                        self.advance_after_battle()?;
                        "onward".to_string()
                    }
                }
                _ => String::new(),
            },
            PlayerAction::Hit => {
                self.player_hit()?;
                "hit".to_string()
            }
            PlayerAction::Stand => {
                self.player_stand()?;
                "stand".to_string()
            }
            PlayerAction::DoubleDown => {
                self.player_double_down()?;
                "doubled down".to_string()
            }
            PlayerAction::Surrender => {
                self.resolve_hand(Some(Outcome::Surrender))?;
                "surrendered".to_string()
            }
            PlayerAction::Peek => {
                self.player_peek()?;
                "peeked at the hole card".to_string()
            }
            PlayerAction::RemoveCard { index } => {
                self.player_remove_card(index)?;
                "card removed".to_string()
            }
            PlayerAction::BuyItem { index } => self.buy_item(index),
            PlayerAction::LeaveShop => {
                self.shop_stock.clear();
                self.start_battle()?;
                "left the shop".to_string()
            }
            PlayerAction::Wish { text, blessing } => {
                self.grant_wish(text, blessing);
                self.advance_after_battle()?;
                "wish granted".to_string()
            }
        };
        Ok(ActionOutcome {
            success: true,
            message,
            phase: self.phase,
        })
    }

    /// Buying is offer-gated, so stock index and gold are already checked.
    fn buy_item(&mut self, index: usize) -> String {
        let offer = self.shop_stock.remove(index);
        self.player.gold -= offer.price;
        self.events.push(Event::ItemBought {
            name: offer.name.clone(),
            price: offer.price,
        });
        self.events.push(Event::GoldChanged {
            delta: -offer.price,
            gold: self.player.gold,
        });
        match offer.kind {
            OfferKind::Equipment => {
                if let Some(def) = self.content.equipment_by_id(&offer.id).cloned() {
                    self.player.equipment.equip(def);
                }
            }
            OfferKind::Consumable => self.player.add_consumable(&offer.id),
        }
        format!("bought {}", offer.name)
    }
}
