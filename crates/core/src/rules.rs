use crate::Rank;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TieRule {
    Push,
    PlayerWins,
    DealerWins,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringRules {
    pub bust_threshold: i64,
    /// Ranks that count `flex_high` and soften down to `flex_low`.
    pub flexible_ranks: Vec<Rank>,
    pub flex_high: i64,
    pub flex_low: i64,
    /// Additional totals that count as blackjack for a two-card hand.
    pub extra_blackjack_values: Vec<i64>,
    /// Blackjack requires a flexible rank plus a ten-value card when set.
    pub ten_value_ranks_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealerRules {
    pub stand_value: i64,
    pub hits_soft_17: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRules {
    pub initial_cards: i64,
    pub can_double_down: bool,
    pub can_surrender: bool,
    pub can_peek: bool,
    pub can_remove_card: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyRules {
    pub gold_per_win: i64,
    pub gold_blackjack_bonus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRules {
    pub base_damage: i64,
    pub blackjack_bonus_damage: i64,
    pub surrender_damage: i64,
    /// 0 means uncapped.
    pub damage_cap: i64,
    pub max_hp_bonus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionRules {
    pub battles_per_stage: u32,
    pub total_stages: u32,
}

/// The full knob set for one decision point. Never stored as authoritative:
/// rebuilt by folding active modifiers over `GameRules::standard()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRules {
    pub scoring: ScoringRules,
    pub dealer: DealerRules,
    pub actions: ActionRules,
    pub economy: EconomyRules,
    pub health: HealthRules,
    pub progression: ProgressionRules,
    pub tie_rule: TieRule,
}

impl GameRules {
    pub fn standard() -> Self {
        Self {
            scoring: ScoringRules {
                bust_threshold: 21,
                flexible_ranks: vec![Rank::Ace],
                flex_high: 11,
                flex_low: 1,
                extra_blackjack_values: Vec::new(),
                ten_value_ranks_only: true,
            },
            dealer: DealerRules {
                stand_value: 17,
                hits_soft_17: false,
            },
            actions: ActionRules {
                initial_cards: 2,
                can_double_down: true,
                can_surrender: true,
                can_peek: false,
                can_remove_card: false,
            },
            economy: EconomyRules {
                gold_per_win: 5,
                gold_blackjack_bonus: 3,
            },
            health: HealthRules {
                base_damage: 5,
                blackjack_bonus_damage: 3,
                surrender_damage: 2,
                damage_cap: 0,
                max_hp_bonus: 0,
            },
            progression: ProgressionRules {
                battles_per_stage: 3,
                total_stages: 3,
            },
            tie_rule: TieRule::Push,
        }
    }

    pub fn initial_cards(&self) -> usize {
        self.actions.initial_cards.clamp(1, 4) as usize
    }

    pub fn effective_max_hp(&self, base_max_hp: i64) -> i64 {
        (base_max_hp + self.health.max_hp_bonus).max(1)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::standard()
    }
}
