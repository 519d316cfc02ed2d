use crate::{Card, HandScore, KillCause, Outcome, Side};
use serde::{Deserialize, Serialize};

/// Everything observable that happened, in the order it happened. Views and
/// frontends drain these; the engine never reads them back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RunStarted { seed: u64 },
    BattleStarted { enemy: String, boss: bool },
    CursedBy { curse: String },
    HandStarted { hand: u32 },
    CardDrawn { side: Side, card: Card },
    HoleCardDealt,
    Peeked { card: Card },
    CardRemoved { card: Card },
    DoubledDown,
    Surrendered { damage: i64 },
    HoleRevealed { card: Card },
    Dodged { side: Side },
    BustSaved { side: Side, score: i64 },
    HandResolved {
        outcome: Outcome,
        player: HandScore,
        enemy: HandScore,
    },
    PlayerDamaged { amount: i64, hp: i64, source: String },
    PlayerHealed { amount: i64, hp: i64 },
    EnemyDamaged { amount: i64, hp: i64 },
    GoldChanged { delta: i64, gold: i64 },
    EffectExpired { name: String },
    EnemyDefeated { enemy: String },
    StageCleared { stage: u32 },
    ShopEntered,
    ItemBought { name: String, price: i64 },
    WishGranted { blessing: String },
    GameOver { cause: KillCause },
    Victory,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.queue)
    }

    pub fn peek(&self) -> &[Event] {
        &self.queue
    }
}
