use crate::{GameRules, HandScore, TieRule};
use serde::{Deserialize, Serialize};

/// Hand outcome from the player's perspective. Priority when both sides do
/// something notable: player bust loses first, then naturals, then enemy
/// bust, then the score comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Blackjack,
    EnemyBust,
    Win,
    Push,
    Lose,
    Bust,
    Surrender,
}

impl Outcome {
    pub fn player_won(self) -> bool {
        matches!(self, Outcome::Blackjack | Outcome::EnemyBust | Outcome::Win)
    }

    pub fn player_lost(self) -> bool {
        matches!(self, Outcome::Lose | Outcome::Bust | Outcome::Surrender)
    }
}

pub fn determine_outcome(player: HandScore, enemy: HandScore, rules: &GameRules) -> Outcome {
    if player.busted {
        return Outcome::Bust;
    }
    if player.blackjack && enemy.blackjack {
        return Outcome::Push;
    }
    if player.blackjack {
        return Outcome::Blackjack;
    }
    if enemy.busted {
        return Outcome::EnemyBust;
    }
    if enemy.blackjack {
        return Outcome::Lose;
    }
    if player.value > enemy.value {
        Outcome::Win
    } else if player.value < enemy.value {
        Outcome::Lose
    } else {
        match rules.tie_rule {
            TieRule::Push => Outcome::Push,
            TieRule::PlayerWins => Outcome::Win,
            TieRule::DealerWins => Outcome::Lose,
        }
    }
}

/// Dealer policy: hit below the stand value, optionally also on a soft stand
/// total.
pub fn dealer_should_hit(score: HandScore, rules: &GameRules) -> bool {
    if score.busted {
        return false;
    }
    score.value < rules.dealer.stand_value
        || (rules.dealer.hits_soft_17 && score.soft && score.value == rules.dealer.stand_value)
}
