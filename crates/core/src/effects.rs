use crate::{Rank, Suit};
use serde::{Deserialize, Serialize};

pub const MAX_EFFECTS_PER_DEFINITION: usize = 3;
pub const NAME_MAX_LEN: usize = 40;
pub const DESCRIPTION_MAX_LEN: usize = 160;

/// Closed tag set for authored effects. Every variant has a bounds entry and
/// one compilation arm in `modifier::build_modifier`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EffectKind {
    // Scoring and table rules
    BustThresholdUp,
    BustThresholdDown,
    BustThresholdSet,
    DealerStandUp,
    DealerStandDown,
    DealerHitsSoft17,
    DealerStandsSoft17,
    FlexibleRank,
    ExtraBlackjackValue,
    ExtraInitialCard,
    FewerInitialCards,
    StrictBlackjack,
    LooseBlackjack,
    AllowDoubleDown,
    ForbidDoubleDown,
    AllowSurrender,
    ForbidSurrender,
    AllowPeek,
    ForbidPeek,
    AllowCardRemoval,
    TiesWinForPlayer,
    TiesWinForDealer,
    MaxHpUp,
    AceHighValue,
    AceLowValue,
    // Damage knobs in the rules
    BaseDamageUp,
    BaseDamageDown,
    BlackjackDamageUp,
    SurrenderPenaltyUp,
    SurrenderPenaltyDown,
    DamageCap,
    // Damage dealt transforms
    FlatDamage,
    PercentDamage,
    DamagePerWinStreak,
    DamagePerHandWon,
    DamagePerWish,
    DamagePerFaceCard,
    DamagePerSuitCard,
    DamagePerRankCard,
    DamageFromGold,
    BlackjackFlatDamage,
    SoftHandDamage,
    WeakenedAttack,
    // Damage received transforms
    Armor,
    ArmorPercent,
    Thorns,
    ShieldOncePerBattle,
    Vulnerable,
    VulnerablePercent,
    DesperateArmor,
    FirstHandShield,
    // Dodge
    DodgeChance,
    DodgeFirstHand,
    DodgeWhenDesperate,
    DodgeOnSoftHand,
    // Bust saves
    BustSaveChance,
    BustSaveOncePerBattle,
    BustSaveAtExactly,
    BustSaveWhenDesperate,
    // Gold
    GoldPerWin,
    GoldPercent,
    GoldOnBlackjack,
    GoldPerHand,
    GoldOnBattleStart,
    GoldLossPerHand,
    GoldLossOnLoss,
    // Card value transforms
    RankValueDelta,
    SuitValueDelta,
    RankValueSet,
    FaceCardValueSet,
    // Deck transforms
    PurgeSuit,
    PurgeRank,
    PurgeFaceCards,
    ExtraRankCopies,
    ExtraAces,
    PurgeLowCards,
    ThickDeck,
    // Lifecycle
    HealOnWin,
    HealOnBlackjack,
    HealOnPush,
    HealOnEnemyBust,
    RegenPerHand,
    BattleStartHeal,
    HpLossPerHand,
    HpLossOnBust,
    StrikeOnDodge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectBounds {
    pub min: i64,
    pub max: i64,
    pub needs_suit: bool,
    pub needs_rank: bool,
}

const fn bounds(min: i64, max: i64) -> EffectBounds {
    EffectBounds {
        min,
        max,
        needs_suit: false,
        needs_rank: false,
    }
}

const fn suit_bounds(min: i64, max: i64) -> EffectBounds {
    EffectBounds {
        min,
        max,
        needs_suit: true,
        needs_rank: false,
    }
}

const fn rank_bounds(min: i64, max: i64) -> EffectBounds {
    EffectBounds {
        min,
        max,
        needs_suit: false,
        needs_rank: true,
    }
}

const FLAG: EffectBounds = bounds(1, 1);

impl EffectKind {
    pub const ALL: [EffectKind; 86] = [
        Self::BustThresholdUp,
        Self::BustThresholdDown,
        Self::BustThresholdSet,
        Self::DealerStandUp,
        Self::DealerStandDown,
        Self::DealerHitsSoft17,
        Self::DealerStandsSoft17,
        Self::FlexibleRank,
        Self::ExtraBlackjackValue,
        Self::ExtraInitialCard,
        Self::FewerInitialCards,
        Self::StrictBlackjack,
        Self::LooseBlackjack,
        Self::AllowDoubleDown,
        Self::ForbidDoubleDown,
        Self::AllowSurrender,
        Self::ForbidSurrender,
        Self::AllowPeek,
        Self::ForbidPeek,
        Self::AllowCardRemoval,
        Self::TiesWinForPlayer,
        Self::TiesWinForDealer,
        Self::MaxHpUp,
        Self::AceHighValue,
        Self::AceLowValue,
        Self::BaseDamageUp,
        Self::BaseDamageDown,
        Self::BlackjackDamageUp,
        Self::SurrenderPenaltyUp,
        Self::SurrenderPenaltyDown,
        Self::DamageCap,
        Self::FlatDamage,
        Self::PercentDamage,
        Self::DamagePerWinStreak,
        Self::DamagePerHandWon,
        Self::DamagePerWish,
        Self::DamagePerFaceCard,
        Self::DamagePerSuitCard,
        Self::DamagePerRankCard,
        Self::DamageFromGold,
        Self::BlackjackFlatDamage,
        Self::SoftHandDamage,
        Self::WeakenedAttack,
        Self::Armor,
        Self::ArmorPercent,
        Self::Thorns,
        Self::ShieldOncePerBattle,
        Self::Vulnerable,
        Self::VulnerablePercent,
        Self::DesperateArmor,
        Self::FirstHandShield,
        Self::DodgeChance,
        Self::DodgeFirstHand,
        Self::DodgeWhenDesperate,
        Self::DodgeOnSoftHand,
        Self::BustSaveChance,
        Self::BustSaveOncePerBattle,
        Self::BustSaveAtExactly,
        Self::BustSaveWhenDesperate,
        Self::GoldPerWin,
        Self::GoldPercent,
        Self::GoldOnBlackjack,
        Self::GoldPerHand,
        Self::GoldOnBattleStart,
        Self::GoldLossPerHand,
        Self::GoldLossOnLoss,
        Self::RankValueDelta,
        Self::SuitValueDelta,
        Self::RankValueSet,
        Self::FaceCardValueSet,
        Self::PurgeSuit,
        Self::PurgeRank,
        Self::PurgeFaceCards,
        Self::ExtraRankCopies,
        Self::ExtraAces,
        Self::PurgeLowCards,
        Self::ThickDeck,
        Self::HealOnWin,
        Self::HealOnBlackjack,
        Self::HealOnPush,
        Self::HealOnEnemyBust,
        Self::RegenPerHand,
        Self::BattleStartHeal,
        Self::HpLossPerHand,
        Self::HpLossOnBust,
        Self::StrikeOnDodge,
    ];

    pub fn bounds(self) -> EffectBounds {
        match self {
            Self::BustThresholdUp => bounds(1, 5),
            Self::BustThresholdDown => bounds(1, 5),
            Self::BustThresholdSet => bounds(16, 27),
            Self::DealerStandUp => bounds(1, 4),
            Self::DealerStandDown => bounds(1, 4),
            Self::DealerHitsSoft17 => FLAG,
            Self::DealerStandsSoft17 => FLAG,
            Self::FlexibleRank => rank_bounds(1, 1),
            Self::ExtraBlackjackValue => bounds(16, 27),
            Self::ExtraInitialCard => bounds(1, 2),
            Self::FewerInitialCards => FLAG,
            Self::StrictBlackjack => FLAG,
            Self::LooseBlackjack => FLAG,
            Self::AllowDoubleDown => FLAG,
            Self::ForbidDoubleDown => FLAG,
            Self::AllowSurrender => FLAG,
            Self::ForbidSurrender => FLAG,
            Self::AllowPeek => FLAG,
            Self::ForbidPeek => FLAG,
            Self::AllowCardRemoval => FLAG,
            Self::TiesWinForPlayer => FLAG,
            Self::TiesWinForDealer => FLAG,
            Self::MaxHpUp => bounds(5, 25),
            Self::AceHighValue => bounds(2, 11),
            Self::AceLowValue => bounds(1, 2),
            Self::BaseDamageUp => bounds(1, 5),
            Self::BaseDamageDown => bounds(1, 5),
            Self::BlackjackDamageUp => bounds(1, 10),
            Self::SurrenderPenaltyUp => bounds(1, 5),
            Self::SurrenderPenaltyDown => bounds(1, 5),
            Self::DamageCap => bounds(1, 30),
            Self::FlatDamage => bounds(1, 10),
            Self::PercentDamage => bounds(5, 100),
            Self::DamagePerWinStreak => bounds(1, 3),
            Self::DamagePerHandWon => bounds(1, 3),
            Self::DamagePerWish => bounds(1, 3),
            Self::DamagePerFaceCard => bounds(1, 3),
            Self::DamagePerSuitCard => suit_bounds(1, 3),
            Self::DamagePerRankCard => rank_bounds(1, 3),
            Self::DamageFromGold => bounds(5, 25),
            Self::BlackjackFlatDamage => bounds(1, 10),
            Self::SoftHandDamage => bounds(1, 8),
            Self::WeakenedAttack => bounds(5, 75),
            Self::Armor => bounds(1, 8),
            Self::ArmorPercent => bounds(5, 75),
            Self::Thorns => bounds(1, 5),
            Self::ShieldOncePerBattle => FLAG,
            Self::Vulnerable => bounds(1, 8),
            Self::VulnerablePercent => bounds(5, 100),
            Self::DesperateArmor => bounds(1, 8),
            Self::FirstHandShield => FLAG,
            Self::DodgeChance => bounds(5, 50),
            Self::DodgeFirstHand => FLAG,
            Self::DodgeWhenDesperate => bounds(5, 50),
            Self::DodgeOnSoftHand => bounds(5, 50),
            Self::BustSaveChance => bounds(5, 50),
            Self::BustSaveOncePerBattle => FLAG,
            Self::BustSaveAtExactly => bounds(22, 26),
            Self::BustSaveWhenDesperate => bounds(10, 60),
            Self::GoldPerWin => bounds(1, 10),
            Self::GoldPercent => bounds(10, 100),
            Self::GoldOnBlackjack => bounds(1, 15),
            Self::GoldPerHand => bounds(1, 3),
            Self::GoldOnBattleStart => bounds(1, 10),
            Self::GoldLossPerHand => bounds(1, 5),
            Self::GoldLossOnLoss => bounds(1, 10),
            Self::RankValueDelta => rank_bounds(-5, 5),
            Self::SuitValueDelta => suit_bounds(-3, 3),
            Self::RankValueSet => rank_bounds(1, 11),
            Self::FaceCardValueSet => bounds(1, 10),
            Self::PurgeSuit => suit_bounds(1, 1),
            Self::PurgeRank => rank_bounds(1, 1),
            Self::PurgeFaceCards => FLAG,
            Self::ExtraRankCopies => rank_bounds(1, 3),
            Self::ExtraAces => bounds(1, 4),
            Self::PurgeLowCards => bounds(2, 6),
            Self::ThickDeck => FLAG,
            Self::HealOnWin => bounds(1, 5),
            Self::HealOnBlackjack => bounds(1, 8),
            Self::HealOnPush => bounds(1, 5),
            Self::HealOnEnemyBust => bounds(1, 5),
            Self::RegenPerHand => bounds(1, 3),
            Self::BattleStartHeal => bounds(1, 10),
            Self::HpLossPerHand => bounds(1, 3),
            Self::HpLossOnBust => bounds(1, 6),
            Self::StrikeOnDodge => bounds(1, 5),
        }
    }

    /// Maps a free-text tag from the boon collaborator onto a kind. Unknown
    /// tags yield `None` and the validator substitutes the fallback effect.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bust_threshold_up" | "raise_bust_threshold" => Some(Self::BustThresholdUp),
            "bust_threshold_down" | "lower_bust_threshold" => Some(Self::BustThresholdDown),
            "bust_threshold_set" | "set_bust_threshold" => Some(Self::BustThresholdSet),
            "dealer_stand_up" => Some(Self::DealerStandUp),
            "dealer_stand_down" => Some(Self::DealerStandDown),
            "dealer_hits_soft_17" => Some(Self::DealerHitsSoft17),
            "dealer_stands_soft_17" => Some(Self::DealerStandsSoft17),
            "flexible_rank" | "rank_counts_as_ace" => Some(Self::FlexibleRank),
            "extra_blackjack_value" => Some(Self::ExtraBlackjackValue),
            "extra_initial_card" => Some(Self::ExtraInitialCard),
            "fewer_initial_cards" => Some(Self::FewerInitialCards),
            "strict_blackjack" => Some(Self::StrictBlackjack),
            "loose_blackjack" => Some(Self::LooseBlackjack),
            "allow_double_down" => Some(Self::AllowDoubleDown),
            "forbid_double_down" => Some(Self::ForbidDoubleDown),
            "allow_surrender" => Some(Self::AllowSurrender),
            "forbid_surrender" => Some(Self::ForbidSurrender),
            "allow_peek" | "peek" => Some(Self::AllowPeek),
            "forbid_peek" => Some(Self::ForbidPeek),
            "allow_card_removal" | "card_removal" => Some(Self::AllowCardRemoval),
            "ties_win_for_player" | "win_ties" => Some(Self::TiesWinForPlayer),
            "ties_win_for_dealer" | "lose_ties" => Some(Self::TiesWinForDealer),
            "max_hp_up" | "max_hp" => Some(Self::MaxHpUp),
            "ace_high_value" => Some(Self::AceHighValue),
            "ace_low_value" => Some(Self::AceLowValue),
            "base_damage_up" => Some(Self::BaseDamageUp),
            "base_damage_down" => Some(Self::BaseDamageDown),
            "blackjack_damage_up" => Some(Self::BlackjackDamageUp),
            "surrender_penalty_up" => Some(Self::SurrenderPenaltyUp),
            "surrender_penalty_down" => Some(Self::SurrenderPenaltyDown),
            "damage_cap" => Some(Self::DamageCap),
            "flat_damage" | "damage" | "bonus_damage" => Some(Self::FlatDamage),
            "percent_damage" | "damage_percent" => Some(Self::PercentDamage),
            "damage_per_win_streak" => Some(Self::DamagePerWinStreak),
            "damage_per_hand_won" => Some(Self::DamagePerHandWon),
            "damage_per_wish" => Some(Self::DamagePerWish),
            "damage_per_face_card" => Some(Self::DamagePerFaceCard),
            "damage_per_suit_card" => Some(Self::DamagePerSuitCard),
            "damage_per_rank_card" => Some(Self::DamagePerRankCard),
            "damage_from_gold" => Some(Self::DamageFromGold),
            "blackjack_flat_damage" | "blackjack_damage" => Some(Self::BlackjackFlatDamage),
            "soft_hand_damage" => Some(Self::SoftHandDamage),
            "weakened_attack" => Some(Self::WeakenedAttack),
            "armor" | "flat_armor" => Some(Self::Armor),
            "armor_percent" | "percent_armor" => Some(Self::ArmorPercent),
            "thorns" => Some(Self::Thorns),
            "shield_once_per_battle" | "shield" => Some(Self::ShieldOncePerBattle),
            "vulnerable" => Some(Self::Vulnerable),
            "vulnerable_percent" => Some(Self::VulnerablePercent),
            "desperate_armor" => Some(Self::DesperateArmor),
            "first_hand_shield" => Some(Self::FirstHandShield),
            "dodge_chance" | "dodge" => Some(Self::DodgeChance),
            "dodge_first_hand" => Some(Self::DodgeFirstHand),
            "dodge_when_desperate" => Some(Self::DodgeWhenDesperate),
            "dodge_on_soft_hand" => Some(Self::DodgeOnSoftHand),
            "bust_save_chance" | "bust_save" => Some(Self::BustSaveChance),
            "bust_save_once_per_battle" => Some(Self::BustSaveOncePerBattle),
            "bust_save_at_exactly" => Some(Self::BustSaveAtExactly),
            "bust_save_when_desperate" => Some(Self::BustSaveWhenDesperate),
            "gold_per_win" | "gold" => Some(Self::GoldPerWin),
            "gold_percent" => Some(Self::GoldPercent),
            "gold_on_blackjack" => Some(Self::GoldOnBlackjack),
            "gold_per_hand" => Some(Self::GoldPerHand),
            "gold_on_battle_start" => Some(Self::GoldOnBattleStart),
            "gold_loss_per_hand" => Some(Self::GoldLossPerHand),
            "gold_loss_on_loss" => Some(Self::GoldLossOnLoss),
            "rank_value_delta" => Some(Self::RankValueDelta),
            "suit_value_delta" => Some(Self::SuitValueDelta),
            "rank_value_set" => Some(Self::RankValueSet),
            "face_card_value_set" | "face_value" => Some(Self::FaceCardValueSet),
            "purge_suit" => Some(Self::PurgeSuit),
            "purge_rank" => Some(Self::PurgeRank),
            "purge_face_cards" => Some(Self::PurgeFaceCards),
            "extra_rank_copies" => Some(Self::ExtraRankCopies),
            "extra_aces" => Some(Self::ExtraAces),
            "purge_low_cards" => Some(Self::PurgeLowCards),
            "thick_deck" => Some(Self::ThickDeck),
            "heal_on_win" => Some(Self::HealOnWin),
            "heal_on_blackjack" => Some(Self::HealOnBlackjack),
            "heal_on_push" => Some(Self::HealOnPush),
            "heal_on_enemy_bust" => Some(Self::HealOnEnemyBust),
            "regen_per_hand" | "regen" => Some(Self::RegenPerHand),
            "battle_start_heal" => Some(Self::BattleStartHeal),
            "hp_loss_per_hand" => Some(Self::HpLossPerHand),
            "hp_loss_on_bust" => Some(Self::HpLossOnBust),
            "strike_on_dodge" => Some(Self::StrikeOnDodge),
            _ => None,
        }
    }
}

/// Conditions gate individual effect contributions. Evaluated against the
/// `ModifierContext` snapshot; the `Drew*`/`DoubledDown`/`Peeked` variants are
/// backed by a one-hand latch set by card-drawn and action callbacks and
/// cleared at hand start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Condition {
    PlayerHpBelowPercent(i64),
    PlayerHpAbovePercent(i64),
    PlayerHpFull,
    EnemyHpBelowPercent(i64),
    PlayerGoldAtLeast(i64),
    HandHasSuit(Suit),
    HandHasRank(Rank),
    HandIsSoft,
    ScoreAtLeast(i64),
    ScoreAtMost(i64),
    ScoreExactly(i64),
    PreviousScoreAtLeast(i64),
    CardCountAtLeast(i64),
    IsBossBattle,
    StageAtLeast(i64),
    FirstHandOfBattle,
    EveryNthHand(i64),
    WinStreakAtLeast(i64),
    LossStreakAtLeast(i64),
    OutcomeWin,
    OutcomeLoss,
    OutcomePush,
    OutcomeBlackjack,
    OutcomeBust,
    OutcomeEnemyBust,
    ChancePercent(i64),
    DrewSuitThisHand(Suit),
    DrewRankThisHand(Rank),
    DoubledDownThisHand,
    PeekedThisHand,
}

/// One declarative effect: a kind, a magnitude, and optional qualifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: i64,
    #[serde(default)]
    pub suit: Option<Suit>,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl Effect {
    pub fn new(kind: EffectKind, value: i64) -> Self {
        Self {
            kind,
            value,
            suit: None,
            rank: None,
            condition: None,
        }
    }

    pub fn with_suit(mut self, suit: Suit) -> Self {
        self.suit = Some(suit);
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A named bundle of effects, as produced by the boon collaborator or the
/// content catalogs. Always passed through `validate_definition` before
/// compilation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlessingDefinition {
    pub name: String,
    pub description: String,
    pub effects: Vec<Effect>,
}

/// Untrusted shape handed back across the boon-generation boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBlessing {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<RawEffect>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEffect {
    #[serde(default)]
    pub effect_type: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub suit: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
}

pub const DEFAULT_SUIT: Suit = Suit::Spades;
pub const DEFAULT_RANK: Rank = Rank::Ace;

pub fn fallback_effect() -> Effect {
    Effect::new(EffectKind::FlatDamage, 3)
}

/// The blessing substituted when the boon collaborator is unreachable, slow,
/// or returns garbage.
pub fn fallback_blessing() -> BlessingDefinition {
    BlessingDefinition {
        name: "Modest Boon".to_string(),
        description: "The genie shrugs. +3 damage on won hands.".to_string(),
        effects: vec![fallback_effect()],
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Clamps one effect into its documented bounds, filling missing qualifiers
/// with defaults. Conditions are stripped from transform kinds that run
/// outside a full context (rules, card-value, deck).
fn sanitize_effect(effect: &mut Effect) {
    let bounds = effect.kind.bounds();
    effect.value = effect.value.clamp(bounds.min, bounds.max);
    if bounds.needs_suit && effect.suit.is_none() {
        effect.suit = Some(DEFAULT_SUIT);
    }
    if bounds.needs_rank && effect.rank.is_none() {
        effect.rank = Some(DEFAULT_RANK);
    }
    if !bounds.needs_suit {
        effect.suit = None;
    }
    if !bounds.needs_rank {
        effect.rank = None;
    }
    if is_contextless_kind(effect.kind) {
        effect.condition = None;
    }
}

/// Kinds whose ops are applied where no `ModifierContext` exists.
pub fn is_contextless_kind(kind: EffectKind) -> bool {
    use EffectKind::*;
    matches!(
        kind,
        BustThresholdUp
            | BustThresholdDown
            | BustThresholdSet
            | DealerStandUp
            | DealerStandDown
            | DealerHitsSoft17
            | DealerStandsSoft17
            | FlexibleRank
            | ExtraBlackjackValue
            | ExtraInitialCard
            | FewerInitialCards
            | StrictBlackjack
            | LooseBlackjack
            | AllowDoubleDown
            | ForbidDoubleDown
            | AllowSurrender
            | ForbidSurrender
            | AllowPeek
            | ForbidPeek
            | AllowCardRemoval
            | TiesWinForPlayer
            | TiesWinForDealer
            | MaxHpUp
            | AceHighValue
            | AceLowValue
            | BaseDamageUp
            | BaseDamageDown
            | BlackjackDamageUp
            | SurrenderPenaltyUp
            | SurrenderPenaltyDown
            | DamageCap
            | RankValueDelta
            | SuitValueDelta
            | RankValueSet
            | FaceCardValueSet
            | PurgeSuit
            | PurgeRank
            | PurgeFaceCards
            | ExtraRankCopies
            | ExtraAces
            | PurgeLowCards
            | ThickDeck
    )
}

/// Never fails: clamps, substitutes, truncates, and falls back so the result
/// is always a well-formed definition with 1..=3 effects.
pub fn validate_definition(mut definition: BlessingDefinition) -> BlessingDefinition {
    definition.name = truncate(&definition.name, NAME_MAX_LEN);
    definition.description = truncate(&definition.description, DESCRIPTION_MAX_LEN);
    definition.effects.truncate(MAX_EFFECTS_PER_DEFINITION);
    if definition.effects.is_empty() {
        definition.effects.push(fallback_effect());
    }
    for effect in &mut definition.effects {
        sanitize_effect(effect);
    }
    definition
}

/// Parses the untrusted boundary shape. Unknown effect tags become the
/// fallback effect; the result then goes through `validate_definition`.
pub fn parse_raw_blessing(raw: RawBlessing) -> BlessingDefinition {
    let effects = raw
        .effects
        .into_iter()
        .take(MAX_EFFECTS_PER_DEFINITION)
        .map(|raw_effect| match EffectKind::from_keyword(&raw_effect.effect_type) {
            Some(kind) => Effect {
                kind,
                value: raw_effect.value,
                suit: raw_effect.suit.as_deref().and_then(suit_from_str),
                rank: raw_effect.rank.as_deref().and_then(rank_from_str),
                condition: None,
            },
            None => fallback_effect(),
        })
        .collect();
    validate_definition(BlessingDefinition {
        name: raw.name,
        description: raw.description,
        effects,
    })
}

pub fn suit_from_str(value: &str) -> Option<Suit> {
    match value.trim().to_lowercase().as_str() {
        "spades" | "spade" => Some(Suit::Spades),
        "hearts" | "heart" => Some(Suit::Hearts),
        "clubs" | "club" => Some(Suit::Clubs),
        "diamonds" | "diamond" => Some(Suit::Diamonds),
        _ => None,
    }
}

pub fn rank_from_str(value: &str) -> Option<Rank> {
    match value.trim().to_lowercase().as_str() {
        "ace" | "a" => Some(Rank::Ace),
        "two" | "2" => Some(Rank::Two),
        "three" | "3" => Some(Rank::Three),
        "four" | "4" => Some(Rank::Four),
        "five" | "5" => Some(Rank::Five),
        "six" | "6" => Some(Rank::Six),
        "seven" | "7" => Some(Rank::Seven),
        "eight" | "8" => Some(Rank::Eight),
        "nine" | "9" => Some(Rank::Nine),
        "ten" | "10" | "t" => Some(Rank::Ten),
        "jack" | "j" => Some(Rank::Jack),
        "queen" | "q" => Some(Rank::Queen),
        "king" | "k" => Some(Rank::King),
        _ => None,
    }
}
