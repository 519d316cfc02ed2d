use crate::{card_value_adjust, Card, GameRules, Modifier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandScore {
    pub value: i64,
    /// At least one flexible card still counted at its high value.
    pub soft: bool,
    pub busted: bool,
    pub blackjack: bool,
}

/// Scores a hand under the folded rules and card-value transforms. Flexible
/// ranks start high and demote one at a time until the total fits under the
/// bust threshold or none are left to demote.
pub fn score_hand(cards: &[Card], rules: &GameRules, mods: &[Modifier]) -> HandScore {
    let scoring = &rules.scoring;
    let flex_span = (scoring.flex_high - scoring.flex_low).max(0);
    let mut total = 0;
    let mut flex_high_count = 0;
    for card in cards {
        if scoring.flexible_ranks.contains(&card.rank) {
            // Card-value transforms shift the low value; the high option
            // keeps the same span above it.
            let low = card_value_adjust(mods, *card, scoring.flex_low);
            total += low + flex_span;
            flex_high_count += 1;
        } else {
            total += card_value_adjust(mods, *card, card.rank.base_value());
        }
    }
    while total > scoring.bust_threshold && flex_high_count > 0 {
        total -= flex_span;
        flex_high_count -= 1;
    }
    let busted = total > scoring.bust_threshold;
    let soft = flex_high_count > 0 && !busted && flex_span > 0;
    HandScore {
        value: total,
        soft,
        busted,
        blackjack: is_blackjack(cards, total, rules),
    }
}

fn is_blackjack(cards: &[Card], total: i64, rules: &GameRules) -> bool {
    if cards.len() != 2 {
        return false;
    }
    let scoring = &rules.scoring;
    if scoring.extra_blackjack_values.contains(&total) {
        return true;
    }
    if total != scoring.bust_threshold {
        return false;
    }
    if scoring.ten_value_ranks_only {
        let has_flex = cards
            .iter()
            .any(|card| scoring.flexible_ranks.contains(&card.rank));
        let has_ten = cards.iter().any(|card| card.rank.is_ten_value());
        has_flex && has_ten
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, GameRules, Rank, Suit};

    fn hand(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(Suit::Spades, r)).collect()
    }

    #[test]
    fn ace_demotes_to_avoid_bust() {
        let rules = GameRules::standard();
        let score = score_hand(&hand(&[Rank::Ace, Rank::Nine, Rank::Five]), &rules, &[]);
        assert_eq!(score.value, 15);
        assert!(!score.soft);
        assert!(!score.busted);
    }

    #[test]
    fn soft_hand_keeps_high_ace() {
        let rules = GameRules::standard();
        let score = score_hand(&hand(&[Rank::Ace, Rank::Six]), &rules, &[]);
        assert_eq!(score.value, 17);
        assert!(score.soft);
    }

    #[test]
    fn natural_requires_ten_value_partner() {
        let rules = GameRules::standard();
        let natural = score_hand(&hand(&[Rank::Ace, Rank::King]), &rules, &[]);
        assert!(natural.blackjack);
        // 21 across three cards is not a natural.
        let slow = score_hand(&hand(&[Rank::Seven, Rank::Seven, Rank::Seven]), &rules, &[]);
        assert_eq!(slow.value, 21);
        assert!(!slow.blackjack);
    }

    #[test]
    fn loose_blackjack_accepts_any_two_card_threshold() {
        let mut rules = GameRules::standard();
        rules.scoring.ten_value_ranks_only = false;
        rules.scoring.bust_threshold = 15;
        let score = score_hand(&hand(&[Rank::Seven, Rank::Eight]), &rules, &[]);
        assert!(score.blackjack);
    }

    #[test]
    fn two_aces_count_twelve() {
        let rules = GameRules::standard();
        let score = score_hand(&hand(&[Rank::Ace, Rank::Ace]), &rules, &[]);
        assert_eq!(score.value, 12);
        assert!(score.soft);
    }
}
