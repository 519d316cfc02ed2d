use crate::{
    Card, Condition, Effect, EffectKind, EnemyState, Event, EventBus, GameRules, HandScore,
    KillCause, Outcome, PlayerState, Rank, RngState, Suit, TieRule, DEFAULT_RANK, DEFAULT_SUIT,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceTag {
    Equipment,
    Consumable,
    Enemy,
    Blessing,
    Curse,
}

/// One hook entry with an optional gate. A failed condition short-circuits
/// the entry to "no contribution".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hooked<T> {
    pub condition: Option<Condition>,
    pub op: T,
}

impl<T> Hooked<T> {
    fn new(condition: Option<Condition>, op: T) -> Self {
        Self { condition, op }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RulesOp {
    BustThresholdDelta(i64),
    BustThresholdSet(i64),
    DealerStandDelta(i64),
    DealerStandSet(i64),
    DealerHitsSoft17(bool),
    AddFlexibleRank(Rank),
    AddBlackjackValue(i64),
    InitialCardsDelta(i64),
    TenValueRanksOnly(bool),
    CanDoubleDown(bool),
    CanSurrender(bool),
    CanPeek(bool),
    CanRemoveCard(bool),
    TieRuleSet(TieRule),
    FlexHighSet(i64),
    FlexLowSet(i64),
    BaseDamageDelta(i64),
    BlackjackBonusDelta(i64),
    SurrenderDamageDelta(i64),
    DamageCapSet(i64),
    MaxHpBonus(i64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DamageOp {
    Flat(i64),
    /// Signed percent delta applied to the running total, in attachment order.
    Percent(i64),
    PerWinStreak(i64),
    PerHandWon(i64),
    PerWish(i64),
    PerFaceCard(i64),
    PerSuitCard { suit: Suit, amount: i64 },
    PerRankCard { rank: Rank, amount: i64 },
    PerGoldChunk { per: i64 },
    Thorns(i64),
    ShieldOnce,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum BustSaveOp {
    Chance(i64),
    OncePerBattle,
    AtExactly(i64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DodgeOp {
    Chance(i64),
    Certain,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum GoldOp {
    Flat(i64),
    Percent(i64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum CardValueOp {
    RankDelta { rank: Rank, delta: i64 },
    SuitDelta { suit: Suit, delta: i64 },
    RankSet { rank: Rank, value: i64 },
    FaceSet { value: i64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DeckOp {
    RemoveSuit(Suit),
    RemoveRank(Rank),
    RemoveFaceCards,
    AddRankCopies { rank: Rank, count: i64 },
    AddAces { count: i64 },
    RemoveRanksBelow(i64),
    DuplicateDeck,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecycleTrigger {
    HandStart,
    HandEnd,
    BattleStart,
    Push,
    EnemyBust,
    Dodge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum LifecycleOp {
    HealOwner(i64),
    DamageOwner(i64),
    DamageOpponent(i64),
    GainGold(i64),
    LoseGold(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifecycleHook {
    pub trigger: LifecycleTrigger,
    pub op: LifecycleOp,
}

/// A compiled bundle of hook op lists attached to one combatant. Never the
/// persisted source of truth: always re-derived from equipment, active
/// effects, wishes, or enemy data, in a fixed collection order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: SourceTag,
    pub owner: Side,
    pub rules: Vec<RulesOp>,
    pub damage_dealt: Vec<Hooked<DamageOp>>,
    pub damage_received: Vec<Hooked<DamageOp>>,
    pub bust_save: Vec<Hooked<BustSaveOp>>,
    pub dodge: Vec<Hooked<DodgeOp>>,
    pub gold: Vec<Hooked<GoldOp>>,
    pub card_value: Vec<CardValueOp>,
    pub deck: Vec<DeckOp>,
    pub lifecycle: Vec<Hooked<LifecycleHook>>,
}

impl Modifier {
    fn empty(id: &str, name: &str, description: &str, source: SourceTag, owner: Side) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            source,
            owner,
            rules: Vec::new(),
            damage_dealt: Vec::new(),
            damage_received: Vec::new(),
            bust_save: Vec::new(),
            dodge: Vec::new(),
            gold: Vec::new(),
            card_value: Vec::new(),
            deck: Vec::new(),
            lifecycle: Vec::new(),
        }
    }
}

/// Run counters and derived hand data snapshotted for one decision point.
#[derive(Debug, Clone, Default)]
pub struct HandFacts {
    pub stage: u32,
    pub battle: u32,
    pub hand: u32,
    pub win_streak: u32,
    pub loss_streak: u32,
    pub hands_won: u32,
    pub last_damage_dealt: i64,
    pub last_damage_received: i64,
    pub player_hand: Vec<Card>,
    pub enemy_hand: Vec<Card>,
    pub player_score: HandScore,
    pub enemy_score: HandScore,
    pub previous_score: Option<HandScore>,
    pub peeked_card: Option<Card>,
    pub drew_suits: Vec<Suit>,
    pub drew_ranks: Vec<Rank>,
    pub doubled_down: bool,
    pub peeked_this_hand: bool,
    pub is_boss: bool,
    pub outcome: Option<Outcome>,
    pub kill_cause: Option<KillCause>,
}

/// Ephemeral borrow scope handed to every hook invocation. Lifecycle ops
/// mutate the combatant states directly; query hooks only read them.
pub struct ModifierContext<'a> {
    pub player: &'a mut PlayerState,
    pub enemy: &'a mut EnemyState,
    pub rng: &'a mut RngState,
    pub rules: &'a GameRules,
    pub facts: &'a HandFacts,
}

impl Condition {
    pub fn eval(&self, side: Side, ctx: &mut ModifierContext) -> bool {
        let facts = ctx.facts;
        let (hand, score) = match side {
            Side::Player => (&facts.player_hand, facts.player_score),
            Side::Enemy => (&facts.enemy_hand, facts.enemy_score),
        };
        match *self {
            Condition::PlayerHpBelowPercent(p) => {
                let max = ctx.rules.effective_max_hp(ctx.player.max_hp);
                ctx.player.hp * 100 < max * p
            }
            Condition::PlayerHpAbovePercent(p) => {
                let max = ctx.rules.effective_max_hp(ctx.player.max_hp);
                ctx.player.hp * 100 > max * p
            }
            Condition::PlayerHpFull => {
                ctx.player.hp >= ctx.rules.effective_max_hp(ctx.player.max_hp)
            }
            Condition::EnemyHpBelowPercent(p) => {
                ctx.enemy.hp * 100 < ctx.enemy.data.max_hp * p
            }
            Condition::PlayerGoldAtLeast(amount) => ctx.player.gold >= amount,
            Condition::HandHasSuit(suit) => hand.iter().any(|card| card.suit == suit),
            Condition::HandHasRank(rank) => hand.iter().any(|card| card.rank == rank),
            Condition::HandIsSoft => score.soft,
            Condition::ScoreAtLeast(value) => score.value >= value,
            Condition::ScoreAtMost(value) => score.value <= value,
            Condition::ScoreExactly(value) => score.value == value,
            Condition::PreviousScoreAtLeast(value) => facts
                .previous_score
                .map(|prev| prev.value >= value)
                .unwrap_or(false),
            Condition::CardCountAtLeast(count) => hand.len() as i64 >= count,
            Condition::IsBossBattle => facts.is_boss,
            Condition::StageAtLeast(stage) => facts.stage as i64 >= stage,
            Condition::FirstHandOfBattle => facts.hand == 1,
            Condition::EveryNthHand(n) => n > 0 && facts.hand as i64 % n == 0,
            Condition::WinStreakAtLeast(n) => facts.win_streak as i64 >= n,
            Condition::LossStreakAtLeast(n) => facts.loss_streak as i64 >= n,
            Condition::OutcomeWin => matches!(
                facts.outcome,
                Some(Outcome::Win) | Some(Outcome::Blackjack) | Some(Outcome::EnemyBust)
            ),
            Condition::OutcomeLoss => matches!(
                facts.outcome,
                Some(Outcome::Lose) | Some(Outcome::Bust) | Some(Outcome::Surrender)
            ),
            Condition::OutcomePush => matches!(facts.outcome, Some(Outcome::Push)),
            Condition::OutcomeBlackjack => matches!(facts.outcome, Some(Outcome::Blackjack)),
            Condition::OutcomeBust => matches!(facts.outcome, Some(Outcome::Bust)),
            Condition::OutcomeEnemyBust => matches!(facts.outcome, Some(Outcome::EnemyBust)),
            Condition::ChancePercent(p) => ctx.rng.chance(p),
            Condition::DrewSuitThisHand(suit) => facts.drew_suits.contains(&suit),
            Condition::DrewRankThisHand(rank) => facts.drew_ranks.contains(&rank),
            Condition::DoubledDownThisHand => facts.doubled_down,
            Condition::PeekedThisHand => facts.peeked_this_hand,
        }
    }
}

fn passes(condition: &Option<Condition>, side: Side, ctx: &mut ModifierContext) -> bool {
    match condition {
        Some(cond) => cond.eval(side, ctx),
        None => true,
    }
}

/// Compiles validated effects into a modifier with one exhaustive match.
/// Effects of the same kind stack: flat ops are commutative, percent ops
/// apply in attachment order.
pub fn build_modifier(
    id: &str,
    name: &str,
    description: &str,
    source: SourceTag,
    owner: Side,
    effects: &[Effect],
) -> Modifier {
    let mut modifier = Modifier::empty(id, name, description, source, owner);
    for effect in effects {
        compile_effect(&mut modifier, effect);
    }
    modifier
}

/// "Desperate" kinds trigger on the owning side's hp, whichever side that is.
fn desperate_condition(owner: Side, percent: i64) -> Condition {
    match owner {
        Side::Player => Condition::PlayerHpBelowPercent(percent),
        Side::Enemy => Condition::EnemyHpBelowPercent(percent),
    }
}

fn compile_effect(modifier: &mut Modifier, effect: &Effect) {
    let v = effect.value;
    let suit = effect.suit.unwrap_or(DEFAULT_SUIT);
    let rank = effect.rank.unwrap_or(DEFAULT_RANK);
    let cond = effect.condition;
    let owner = modifier.owner;
    match effect.kind {
        EffectKind::BustThresholdUp => modifier.rules.push(RulesOp::BustThresholdDelta(v)),
        EffectKind::BustThresholdDown => modifier.rules.push(RulesOp::BustThresholdDelta(-v)),
        EffectKind::BustThresholdSet => modifier.rules.push(RulesOp::BustThresholdSet(v)),
        EffectKind::DealerStandUp => modifier.rules.push(RulesOp::DealerStandDelta(v)),
        EffectKind::DealerStandDown => modifier.rules.push(RulesOp::DealerStandDelta(-v)),
        EffectKind::DealerHitsSoft17 => modifier.rules.push(RulesOp::DealerHitsSoft17(true)),
        EffectKind::DealerStandsSoft17 => modifier.rules.push(RulesOp::DealerHitsSoft17(false)),
        EffectKind::FlexibleRank => modifier.rules.push(RulesOp::AddFlexibleRank(rank)),
        EffectKind::ExtraBlackjackValue => modifier.rules.push(RulesOp::AddBlackjackValue(v)),
        EffectKind::ExtraInitialCard => modifier.rules.push(RulesOp::InitialCardsDelta(v)),
        EffectKind::FewerInitialCards => modifier.rules.push(RulesOp::InitialCardsDelta(-1)),
        EffectKind::StrictBlackjack => modifier.rules.push(RulesOp::TenValueRanksOnly(true)),
        EffectKind::LooseBlackjack => modifier.rules.push(RulesOp::TenValueRanksOnly(false)),
        EffectKind::AllowDoubleDown => modifier.rules.push(RulesOp::CanDoubleDown(true)),
        EffectKind::ForbidDoubleDown => modifier.rules.push(RulesOp::CanDoubleDown(false)),
        EffectKind::AllowSurrender => modifier.rules.push(RulesOp::CanSurrender(true)),
        EffectKind::ForbidSurrender => modifier.rules.push(RulesOp::CanSurrender(false)),
        EffectKind::AllowPeek => modifier.rules.push(RulesOp::CanPeek(true)),
        EffectKind::ForbidPeek => modifier.rules.push(RulesOp::CanPeek(false)),
        EffectKind::AllowCardRemoval => modifier.rules.push(RulesOp::CanRemoveCard(true)),
        EffectKind::TiesWinForPlayer => {
            modifier.rules.push(RulesOp::TieRuleSet(TieRule::PlayerWins))
        }
        EffectKind::TiesWinForDealer => {
            modifier.rules.push(RulesOp::TieRuleSet(TieRule::DealerWins))
        }
        EffectKind::MaxHpUp => modifier.rules.push(RulesOp::MaxHpBonus(v)),
        EffectKind::AceHighValue => modifier.rules.push(RulesOp::FlexHighSet(v)),
        EffectKind::AceLowValue => modifier.rules.push(RulesOp::FlexLowSet(v)),
        EffectKind::BaseDamageUp => modifier.rules.push(RulesOp::BaseDamageDelta(v)),
        EffectKind::BaseDamageDown => modifier.rules.push(RulesOp::BaseDamageDelta(-v)),
        EffectKind::BlackjackDamageUp => modifier.rules.push(RulesOp::BlackjackBonusDelta(v)),
        EffectKind::SurrenderPenaltyUp => modifier.rules.push(RulesOp::SurrenderDamageDelta(v)),
        EffectKind::SurrenderPenaltyDown => {
            modifier.rules.push(RulesOp::SurrenderDamageDelta(-v))
        }
        EffectKind::DamageCap => modifier.rules.push(RulesOp::DamageCapSet(v)),
        EffectKind::FlatDamage => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::Flat(v))),
        EffectKind::PercentDamage => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::Percent(v))),
        EffectKind::DamagePerWinStreak => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerWinStreak(v))),
        EffectKind::DamagePerHandWon => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerHandWon(v))),
        EffectKind::DamagePerWish => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerWish(v))),
        EffectKind::DamagePerFaceCard => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerFaceCard(v))),
        EffectKind::DamagePerSuitCard => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerSuitCard { suit, amount: v })),
        EffectKind::DamagePerRankCard => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerRankCard { rank, amount: v })),
        EffectKind::DamageFromGold => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::PerGoldChunk { per: v })),
        EffectKind::BlackjackFlatDamage => modifier.damage_dealt.push(Hooked::new(
            cond.or(Some(Condition::OutcomeBlackjack)),
            DamageOp::Flat(v),
        )),
        EffectKind::SoftHandDamage => modifier.damage_dealt.push(Hooked::new(
            cond.or(Some(Condition::HandIsSoft)),
            DamageOp::Flat(v),
        )),
        EffectKind::WeakenedAttack => modifier
            .damage_dealt
            .push(Hooked::new(cond, DamageOp::Percent(-v))),
        EffectKind::Armor => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::Flat(-v))),
        EffectKind::ArmorPercent => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::Percent(-v))),
        EffectKind::Thorns => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::Thorns(v))),
        EffectKind::ShieldOncePerBattle => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::ShieldOnce)),
        EffectKind::Vulnerable => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::Flat(v))),
        EffectKind::VulnerablePercent => modifier
            .damage_received
            .push(Hooked::new(cond, DamageOp::Percent(v))),
        EffectKind::DesperateArmor => modifier.damage_received.push(Hooked::new(
            cond.or(Some(desperate_condition(owner, 30))),
            DamageOp::Flat(-v),
        )),
        EffectKind::FirstHandShield => modifier.damage_received.push(Hooked::new(
            cond.or(Some(Condition::FirstHandOfBattle)),
            DamageOp::Percent(-100),
        )),
        EffectKind::DodgeChance => modifier
            .dodge
            .push(Hooked::new(cond, DodgeOp::Chance(v))),
        EffectKind::DodgeFirstHand => modifier.dodge.push(Hooked::new(
            cond.or(Some(Condition::FirstHandOfBattle)),
            DodgeOp::Certain,
        )),
        EffectKind::DodgeWhenDesperate => modifier.dodge.push(Hooked::new(
            cond.or(Some(desperate_condition(owner, 25))),
            DodgeOp::Chance(v),
        )),
        EffectKind::DodgeOnSoftHand => modifier.dodge.push(Hooked::new(
            cond.or(Some(Condition::HandIsSoft)),
            DodgeOp::Chance(v),
        )),
        EffectKind::BustSaveChance => modifier
            .bust_save
            .push(Hooked::new(cond, BustSaveOp::Chance(v))),
        EffectKind::BustSaveOncePerBattle => modifier
            .bust_save
            .push(Hooked::new(cond, BustSaveOp::OncePerBattle)),
        EffectKind::BustSaveAtExactly => modifier
            .bust_save
            .push(Hooked::new(cond, BustSaveOp::AtExactly(v))),
        EffectKind::BustSaveWhenDesperate => modifier.bust_save.push(Hooked::new(
            cond.or(Some(desperate_condition(owner, 25))),
            BustSaveOp::Chance(v),
        )),
        EffectKind::GoldPerWin => modifier.gold.push(Hooked::new(cond, GoldOp::Flat(v))),
        EffectKind::GoldPercent => modifier.gold.push(Hooked::new(cond, GoldOp::Percent(v))),
        EffectKind::GoldOnBlackjack => modifier.gold.push(Hooked::new(
            cond.or(Some(Condition::OutcomeBlackjack)),
            GoldOp::Flat(v),
        )),
        EffectKind::GoldPerHand => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::GainGold(v),
            },
        )),
        EffectKind::GoldOnBattleStart => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::BattleStart,
                op: LifecycleOp::GainGold(v),
            },
        )),
        EffectKind::GoldLossPerHand => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::LoseGold(v),
            },
        )),
        EffectKind::GoldLossOnLoss => modifier.lifecycle.push(Hooked::new(
            cond.or(Some(Condition::OutcomeLoss)),
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::LoseGold(v),
            },
        )),
        EffectKind::RankValueDelta => modifier
            .card_value
            .push(CardValueOp::RankDelta { rank, delta: v }),
        EffectKind::SuitValueDelta => modifier
            .card_value
            .push(CardValueOp::SuitDelta { suit, delta: v }),
        EffectKind::RankValueSet => modifier
            .card_value
            .push(CardValueOp::RankSet { rank, value: v }),
        EffectKind::FaceCardValueSet => {
            modifier.card_value.push(CardValueOp::FaceSet { value: v })
        }
        EffectKind::PurgeSuit => modifier.deck.push(DeckOp::RemoveSuit(suit)),
        EffectKind::PurgeRank => modifier.deck.push(DeckOp::RemoveRank(rank)),
        EffectKind::PurgeFaceCards => modifier.deck.push(DeckOp::RemoveFaceCards),
        EffectKind::ExtraRankCopies => modifier
            .deck
            .push(DeckOp::AddRankCopies { rank, count: v }),
        EffectKind::ExtraAces => modifier.deck.push(DeckOp::AddAces { count: v }),
        EffectKind::PurgeLowCards => modifier.deck.push(DeckOp::RemoveRanksBelow(v)),
        EffectKind::ThickDeck => modifier.deck.push(DeckOp::DuplicateDeck),
        EffectKind::HealOnWin => modifier.lifecycle.push(Hooked::new(
            cond.or(Some(Condition::OutcomeWin)),
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::HealOnBlackjack => modifier.lifecycle.push(Hooked::new(
            cond.or(Some(Condition::OutcomeBlackjack)),
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::HealOnPush => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::Push,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::HealOnEnemyBust => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::EnemyBust,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::RegenPerHand => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::BattleStartHeal => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::BattleStart,
                op: LifecycleOp::HealOwner(v),
            },
        )),
        EffectKind::HpLossPerHand => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::HandStart,
                op: LifecycleOp::DamageOwner(v),
            },
        )),
        EffectKind::HpLossOnBust => modifier.lifecycle.push(Hooked::new(
            cond.or(Some(Condition::OutcomeBust)),
            LifecycleHook {
                trigger: LifecycleTrigger::HandEnd,
                op: LifecycleOp::DamageOwner(v),
            },
        )),
        EffectKind::StrikeOnDodge => modifier.lifecycle.push(Hooked::new(
            cond,
            LifecycleHook {
                trigger: LifecycleTrigger::Dodge,
                op: LifecycleOp::DamageOpponent(v),
            },
        )),
    }
}

/// Folds every active modifier's rules ops over the canonical default, in
/// collection order. Scalars are last-write-wins; list fields append only if
/// absent so stacking the same list effect twice is idempotent.
pub fn fold_rules(mods: &[Modifier]) -> GameRules {
    let mut rules = GameRules::standard();
    for modifier in mods {
        for op in &modifier.rules {
            apply_rules_op(&mut rules, op);
        }
    }
    rules
}

fn apply_rules_op(rules: &mut GameRules, op: &RulesOp) {
    match *op {
        RulesOp::BustThresholdDelta(delta) => {
            rules.scoring.bust_threshold = (rules.scoring.bust_threshold + delta).max(2)
        }
        RulesOp::BustThresholdSet(value) => rules.scoring.bust_threshold = value.max(2),
        RulesOp::DealerStandDelta(delta) => {
            rules.dealer.stand_value = (rules.dealer.stand_value + delta).max(2)
        }
        RulesOp::DealerStandSet(value) => rules.dealer.stand_value = value.max(2),
        RulesOp::DealerHitsSoft17(flag) => rules.dealer.hits_soft_17 = flag,
        RulesOp::AddFlexibleRank(rank) => {
            if !rules.scoring.flexible_ranks.contains(&rank) {
                rules.scoring.flexible_ranks.push(rank);
            }
        }
        RulesOp::AddBlackjackValue(value) => {
            if !rules.scoring.extra_blackjack_values.contains(&value) {
                rules.scoring.extra_blackjack_values.push(value);
            }
        }
        RulesOp::InitialCardsDelta(delta) => {
            rules.actions.initial_cards = (rules.actions.initial_cards + delta).clamp(1, 4)
        }
        RulesOp::TenValueRanksOnly(flag) => rules.scoring.ten_value_ranks_only = flag,
        RulesOp::CanDoubleDown(flag) => rules.actions.can_double_down = flag,
        RulesOp::CanSurrender(flag) => rules.actions.can_surrender = flag,
        RulesOp::CanPeek(flag) => rules.actions.can_peek = flag,
        RulesOp::CanRemoveCard(flag) => rules.actions.can_remove_card = flag,
        RulesOp::TieRuleSet(rule) => rules.tie_rule = rule,
        RulesOp::FlexHighSet(value) => rules.scoring.flex_high = value.max(1),
        RulesOp::FlexLowSet(value) => {
            rules.scoring.flex_low = value.clamp(0, rules.scoring.flex_high)
        }
        RulesOp::BaseDamageDelta(delta) => {
            rules.health.base_damage = (rules.health.base_damage + delta).max(1)
        }
        RulesOp::BlackjackBonusDelta(delta) => {
            rules.health.blackjack_bonus_damage =
                (rules.health.blackjack_bonus_damage + delta).max(0)
        }
        RulesOp::SurrenderDamageDelta(delta) => {
            rules.health.surrender_damage = (rules.health.surrender_damage + delta).max(0)
        }
        RulesOp::DamageCapSet(value) => rules.health.damage_cap = value.max(1),
        RulesOp::MaxHpBonus(delta) => rules.health.max_hp_bonus += delta,
    }
}

fn percent_apply(amount: i64, percent: i64) -> i64 {
    ((amount as f64) * (1.0 + percent as f64 / 100.0)).floor() as i64
}

fn count_suit(hand: &[Card], suit: Suit) -> i64 {
    hand.iter().filter(|card| card.suit == suit).count() as i64
}

fn count_rank(hand: &[Card], rank: Rank) -> i64 {
    hand.iter().filter(|card| card.rank == rank).count() as i64
}

fn count_faces(hand: &[Card]) -> i64 {
    hand.iter().filter(|card| card.rank.is_face()).count() as i64
}

/// Folds the attacker's damage-dealt chain over the base amount.
pub fn fold_damage_dealt(
    mods: &[Modifier],
    attacker: Side,
    base: i64,
    ctx: &mut ModifierContext,
) -> i64 {
    let mut amount = base;
    for modifier in mods.iter().filter(|m| m.owner == attacker) {
        for entry in &modifier.damage_dealt {
            if !passes(&entry.condition, attacker, ctx) {
                continue;
            }
            let hand = match attacker {
                Side::Player => &ctx.facts.player_hand,
                Side::Enemy => &ctx.facts.enemy_hand,
            };
            amount = match entry.op {
                DamageOp::Flat(v) => amount + v,
                DamageOp::Percent(p) => percent_apply(amount, p),
                DamageOp::PerWinStreak(v) => amount + v * ctx.facts.win_streak as i64,
                DamageOp::PerHandWon(v) => amount + v * ctx.facts.hands_won as i64,
                DamageOp::PerWish(v) => amount + v * ctx.player.wishes.len() as i64,
                DamageOp::PerFaceCard(v) => amount + v * count_faces(hand),
                DamageOp::PerSuitCard { suit, amount: v } => amount + v * count_suit(hand, suit),
                DamageOp::PerRankCard { rank, amount: v } => amount + v * count_rank(hand, rank),
                DamageOp::PerGoldChunk { per } => {
                    amount + if per > 0 { ctx.player.gold / per } else { 0 }
                }
                // Defensive ops contribute nothing on the dealt side.
                DamageOp::Thorns(_) | DamageOp::ShieldOnce => amount,
            };
        }
    }
    amount.max(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageTaken {
    pub amount: i64,
    pub reflect: i64,
}

/// Folds the defender's damage-received chain. Shields apply after the fold
/// and absorb the whole hit once per battle; thorns accumulate a reflect that
/// lands only when damage is actually committed.
pub fn fold_damage_received(
    mods: &[Modifier],
    defender: Side,
    base: i64,
    ctx: &mut ModifierContext,
    shields_used: &mut Vec<String>,
) -> DamageTaken {
    let mut amount = base;
    let mut reflect = 0;
    let mut shield_candidates: Vec<String> = Vec::new();
    for modifier in mods.iter().filter(|m| m.owner == defender) {
        for entry in &modifier.damage_received {
            if !passes(&entry.condition, defender, ctx) {
                continue;
            }
            match entry.op {
                DamageOp::Flat(v) => amount += v,
                DamageOp::Percent(p) => amount = percent_apply(amount, p),
                DamageOp::Thorns(v) => reflect += v,
                DamageOp::ShieldOnce => {
                    if !shields_used.contains(&modifier.id) {
                        shield_candidates.push(modifier.id.clone());
                    }
                }
                _ => {}
            }
        }
    }
    let mut amount = amount.max(0);
    if amount > 0 {
        if let Some(shield_id) = shield_candidates.into_iter().next() {
            shields_used.push(shield_id);
            amount = 0;
            reflect = 0;
        }
    }
    if amount == 0 {
        reflect = 0;
    }
    DamageTaken { amount, reflect }
}

/// First hook in the chain to come up true wins; the draws consumed along the
/// way are part of the deterministic sequence.
pub fn roll_dodge(mods: &[Modifier], defender: Side, ctx: &mut ModifierContext) -> bool {
    for modifier in mods.iter().filter(|m| m.owner == defender) {
        for entry in &modifier.dodge {
            if !passes(&entry.condition, defender, ctx) {
                continue;
            }
            let hit = match entry.op {
                DodgeOp::Chance(p) => ctx.rng.chance(p),
                DodgeOp::Certain => true,
            };
            if hit {
                return true;
            }
        }
    }
    false
}

/// Returns the overridden effective score when some hook rescues a bust.
pub fn bust_override(
    mods: &[Modifier],
    side: Side,
    raw_score: i64,
    ctx: &mut ModifierContext,
    saves_used: &mut Vec<String>,
) -> Option<i64> {
    for modifier in mods.iter().filter(|m| m.owner == side) {
        for entry in &modifier.bust_save {
            if !passes(&entry.condition, side, ctx) {
                continue;
            }
            match entry.op {
                BustSaveOp::Chance(p) => {
                    if ctx.rng.chance(p) {
                        return Some(ctx.rules.scoring.bust_threshold);
                    }
                }
                BustSaveOp::OncePerBattle => {
                    if !saves_used.contains(&modifier.id) {
                        saves_used.push(modifier.id.clone());
                        return Some(ctx.rules.scoring.bust_threshold);
                    }
                }
                BustSaveOp::AtExactly(value) => {
                    if raw_score == value {
                        return Some(value);
                    }
                }
            }
        }
    }
    None
}

pub fn fold_gold(mods: &[Modifier], side: Side, base: i64, ctx: &mut ModifierContext) -> i64 {
    let mut amount = base;
    for modifier in mods.iter().filter(|m| m.owner == side) {
        for entry in &modifier.gold {
            if !passes(&entry.condition, side, ctx) {
                continue;
            }
            amount = match entry.op {
                GoldOp::Flat(v) => amount + v,
                GoldOp::Percent(p) => percent_apply(amount, p),
            };
        }
    }
    amount.max(0)
}

/// Per-card value under the card-value transform chain. Unconditional by
/// construction (the validator strips conditions from card-value kinds).
pub fn card_value_adjust(mods: &[Modifier], card: Card, base: i64) -> i64 {
    let mut value = base;
    for modifier in mods {
        for op in &modifier.card_value {
            value = match *op {
                CardValueOp::RankDelta { rank, delta } if card.rank == rank => value + delta,
                CardValueOp::SuitDelta { suit, delta } if card.suit == suit => value + delta,
                CardValueOp::RankSet { rank, value: set } if card.rank == rank => set,
                CardValueOp::FaceSet { value: set } if card.rank.is_face() => set,
                _ => value,
            };
        }
    }
    value.max(0)
}

/// Filters/augments a freshly shuffled deck. Additions land on top of the
/// draw stack; a deck emptied by over-aggressive purges is restored whole.
pub fn apply_deck_ops(mods: &[Modifier], cards: &mut Vec<Card>) {
    for modifier in mods {
        for op in &modifier.deck {
            match *op {
                DeckOp::RemoveSuit(suit) => cards.retain(|card| card.suit != suit),
                DeckOp::RemoveRank(rank) => cards.retain(|card| card.rank != rank),
                DeckOp::RemoveFaceCards => cards.retain(|card| !card.rank.is_face()),
                DeckOp::AddRankCopies { rank, count } => {
                    for i in 0..count.max(0) as usize {
                        cards.push(Card::new(Suit::ALL[i % 4], rank));
                    }
                }
                DeckOp::AddAces { count } => {
                    for i in 0..count.max(0) as usize {
                        cards.push(Card::new(Suit::ALL[i % 4], Rank::Ace));
                    }
                }
                DeckOp::RemoveRanksBelow(limit) => cards.retain(|card| {
                    card.rank == Rank::Ace || card.rank.base_value() >= limit
                }),
                DeckOp::DuplicateDeck => {
                    let copy = cards.clone();
                    cards.extend(copy);
                }
            }
        }
    }
    if cards.is_empty() {
        cards.extend(crate::Deck::standard52().draw);
    }
}

/// Fires one lifecycle trigger across every collected modifier, in collection
/// order. `only` restricts firing to one side's hooks (the dodger's, for the
/// dodge trigger). Ops mutate combatant state in place; firing order is part
/// of the contract.
pub fn fire_lifecycle(
    mods: &[Modifier],
    trigger: LifecycleTrigger,
    only: Option<Side>,
    ctx: &mut ModifierContext,
    events: &mut EventBus,
) {
    for modifier in mods {
        if let Some(side) = only {
            if modifier.owner != side {
                continue;
            }
        }
        for entry in &modifier.lifecycle {
            if entry.op.trigger != trigger {
                continue;
            }
            if !passes(&entry.condition, modifier.owner, ctx) {
                continue;
            }
            apply_lifecycle_op(modifier, entry.op.op, ctx, events);
        }
    }
}

fn apply_lifecycle_op(
    modifier: &Modifier,
    op: LifecycleOp,
    ctx: &mut ModifierContext,
    events: &mut EventBus,
) {
    match op {
        LifecycleOp::HealOwner(v) => heal_side(modifier.owner, v, ctx, events),
        LifecycleOp::DamageOwner(v) => damage_side(modifier.owner, v, &modifier.name, ctx, events),
        LifecycleOp::DamageOpponent(v) => {
            damage_side(modifier.owner.opponent(), v, &modifier.name, ctx, events)
        }
        LifecycleOp::GainGold(v) => {
            ctx.player.gold += v.max(0);
            events.push(Event::GoldChanged {
                delta: v.max(0),
                gold: ctx.player.gold,
            });
        }
        LifecycleOp::LoseGold(v) => {
            let taken = v.max(0).min(ctx.player.gold);
            ctx.player.gold -= taken;
            if taken > 0 {
                events.push(Event::GoldChanged {
                    delta: -taken,
                    gold: ctx.player.gold,
                });
            }
        }
    }
}

fn heal_side(side: Side, amount: i64, ctx: &mut ModifierContext, events: &mut EventBus) {
    let amount = amount.max(0);
    match side {
        Side::Player => {
            let max = ctx.rules.effective_max_hp(ctx.player.max_hp);
            let healed = (ctx.player.hp + amount).min(max) - ctx.player.hp;
            ctx.player.hp += healed;
            if healed > 0 {
                events.push(Event::PlayerHealed {
                    amount: healed,
                    hp: ctx.player.hp,
                });
            }
        }
        Side::Enemy => {
            let max = ctx.enemy.data.max_hp;
            let healed = (ctx.enemy.hp + amount).min(max) - ctx.enemy.hp;
            ctx.enemy.hp += healed;
        }
    }
}

fn damage_side(
    side: Side,
    amount: i64,
    source: &str,
    ctx: &mut ModifierContext,
    events: &mut EventBus,
) {
    let amount = amount.max(0);
    match side {
        Side::Player => {
            let dealt = amount.min(ctx.player.hp);
            ctx.player.hp -= dealt;
            if dealt > 0 {
                events.push(Event::PlayerDamaged {
                    amount: dealt,
                    hp: ctx.player.hp,
                    source: source.to_string(),
                });
            }
        }
        Side::Enemy => {
            let dealt = amount.min(ctx.enemy.hp);
            ctx.enemy.hp -= dealt;
            if dealt > 0 {
                events.push(Event::EnemyDamaged {
                    amount: dealt,
                    hp: ctx.enemy.hp,
                });
            }
        }
    }
}
