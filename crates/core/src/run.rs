pub mod actions;
pub mod hand;
pub mod view;

pub use actions::{ActionOutcome, PlayerAction};
pub use view::{EnemyView, GameView, HandView, PlayerView};

use crate::{
    build_modifier, fire_lifecycle, fold_rules, validate_definition, BlessingDefinition, Card,
    Content, CurseDef, Deck, EnemyState, EquipSlot, Event, EventBus, GameRules, HandFacts,
    HandScore, KillCause, LifecycleTrigger, Modifier, ModifierContext, Outcome, Phase,
    PlayerState, Rank, RngState, Side, SourceTag, Suit,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{action} is not available in phase {phase:?}")]
    ActionNotAvailable { action: String, phase: Phase },
    #[error("no battle in progress")]
    NoBattle,
    #[error("no enemy in the catalog for stage {stage}")]
    MissingEnemy { stage: u32 },
    #[error("replay diverged at action {step}: {source}")]
    ReplayDiverged {
        step: usize,
        #[source]
        source: Box<EngineError>,
    },
}

/// A run is fully reproducible from its seed and the accepted action log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Replay {
    pub seed: u64,
    pub actions: Vec<PlayerAction>,
}

/// Per-battle scratch state, dropped when the battle ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BattleState {
    pub enemy: EnemyState,
    pub curse: Option<CurseDef>,
    pub hand_number: u32,
    #[serde(skip)]
    pub deck: Vec<Card>,
    pub player_hand: Vec<Card>,
    pub enemy_hand: Vec<Card>,
    pub hole_revealed: bool,
    pub peeked_card: Option<Card>,
    // One-hand latches feeding conditions, cleared at hand start.
    pub drew_suits: Vec<Suit>,
    pub drew_ranks: Vec<Rank>,
    pub doubled_down: bool,
    pub peeked_this_hand: bool,
    pub removed_this_hand: bool,
    // Once-per-battle bookkeeping, keyed by modifier id.
    pub shields_used: Vec<String>,
    pub bust_saves_used: Vec<String>,
    /// Effective scores locked in by a bust save.
    pub player_score_override: Option<i64>,
    pub enemy_score_override: Option<i64>,
    pub last_outcome: Option<Outcome>,
}

impl BattleState {
    fn new(enemy: EnemyState) -> Self {
        let curse = if enemy.is_boss {
            enemy.data.curse.clone()
        } else {
            None
        };
        Self {
            enemy,
            curse,
            hand_number: 0,
            deck: Vec::new(),
            player_hand: Vec::new(),
            enemy_hand: Vec::new(),
            hole_revealed: false,
            peeked_card: None,
            drew_suits: Vec::new(),
            drew_ranks: Vec::new(),
            doubled_down: false,
            peeked_this_hand: false,
            removed_this_hand: false,
            shields_used: Vec::new(),
            bust_saves_used: Vec::new(),
            player_score_override: None,
            enemy_score_override: None,
            last_outcome: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunState {
    pub seed: u64,
    pub rng: RngState,
    pub content: Content,
    pub phase: Phase,
    pub player: PlayerState,
    pub stage: u32,
    pub battle_in_stage: u32,
    pub battle: Option<BattleState>,
    pub shop_stock: Vec<crate::ShopOffer>,
    pub win_streak: u32,
    pub loss_streak: u32,
    pub hands_won: u32,
    pub last_damage_dealt: i64,
    pub last_damage_received: i64,
    pub previous_score: Option<HandScore>,
    pub kill_cause: Option<KillCause>,
    pub actions: Vec<PlayerAction>,
    pub events: EventBus,
}

impl RunState {
    pub fn new(seed: u64, content: Content) -> Result<Self, EngineError> {
        let mut run = Self {
            seed,
            rng: RngState::from_seed(seed),
            content,
            phase: Phase::PreHand,
            player: PlayerState::new(),
            stage: 1,
            battle_in_stage: 1,
            battle: None,
            shop_stock: Vec::new(),
            win_streak: 0,
            loss_streak: 0,
            hands_won: 0,
            last_damage_dealt: 0,
            last_damage_received: 0,
            previous_score: None,
            kill_cause: None,
            actions: Vec::new(),
            events: EventBus::new(),
        };
        run.events.push(Event::RunStarted { seed });
        run.start_battle()?;
        Ok(run)
    }

    /// Rebuilds a run by replaying the accepted action log against the seed.
    /// A logged action the rebuilt run refuses means the log and seed no
    /// longer agree.
    pub fn from_replay(replay: &Replay, content: Content) -> Result<Self, EngineError> {
        let mut run = Self::new(replay.seed, content)?;
        for (step, action) in replay.actions.iter().enumerate() {
            let outcome = run
                .perform_action(action.clone())
                .map_err(|source| EngineError::ReplayDiverged {
                    step,
                    source: Box::new(source),
                })?;
            if !outcome.success {
                return Err(EngineError::ReplayDiverged {
                    step,
                    source: Box::new(EngineError::ActionNotAvailable {
                        action: action.name().to_string(),
                        phase: run.phase,
                    }),
                });
            }
            run.events.drain();
        }
        Ok(run)
    }

    pub fn replay(&self) -> Replay {
        Replay {
            seed: self.seed,
            actions: self.actions.clone(),
        }
    }

    pub fn is_boss_battle(&self) -> bool {
        self.battle.as_ref().map(|b| b.enemy.is_boss).unwrap_or(false)
    }

    /// Collects every live modifier in the canonical order: equipment by
    /// slot, then active effects, then wishes (blessing, then the carried
    /// curse), then the battle curse, then enemy abilities. Folds and hook
    /// chains walk this order.
    pub fn collect_modifiers(&self) -> Vec<Modifier> {
        let mut mods = Vec::new();
        for slot in [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Charm] {
            if let Some(def) = self.player.equipment.slot(slot) {
                mods.push(build_modifier(
                    &def.id,
                    &def.name,
                    &def.description,
                    SourceTag::Equipment,
                    Side::Player,
                    &def.effects,
                ));
            }
        }
        for (i, active) in self.player.active_effects.iter().enumerate() {
            mods.push(build_modifier(
                &format!("active:{i}:{}", active.name),
                &active.name,
                "",
                active.source,
                Side::Player,
                &active.effects,
            ));
        }
        for (i, wish) in self.player.wishes.iter().enumerate() {
            mods.push(build_modifier(
                &format!("wish:{i}"),
                &wish.blessing.name,
                &wish.blessing.description,
                SourceTag::Blessing,
                Side::Player,
                &wish.blessing.effects,
            ));
            if let Some(curse) = &wish.curse {
                mods.push(build_modifier(
                    &format!("wish:{i}:{}", curse.id),
                    &curse.name,
                    &curse.description,
                    SourceTag::Curse,
                    Side::Player,
                    &curse.effects,
                ));
            }
        }
        if let Some(battle) = &self.battle {
            if let Some(curse) = &battle.curse {
                mods.push(build_modifier(
                    &curse.id,
                    &curse.name,
                    &curse.description,
                    SourceTag::Curse,
                    Side::Player,
                    &curse.effects,
                ));
            }
            mods.push(build_modifier(
                &battle.enemy.data.id,
                &battle.enemy.data.name,
                &battle.enemy.data.description,
                SourceTag::Enemy,
                Side::Enemy,
                &battle.enemy.data.abilities,
            ));
        }
        mods
    }

    pub fn current_rules(&self) -> GameRules {
        fold_rules(&self.collect_modifiers())
    }

    pub(crate) fn build_facts(&self, rules: &GameRules, outcome: Option<Outcome>) -> HandFacts {
        let mods = self.collect_modifiers();
        let mut facts = HandFacts {
            stage: self.stage,
            battle: self.battle_in_stage,
            win_streak: self.win_streak,
            loss_streak: self.loss_streak,
            hands_won: self.hands_won,
            last_damage_dealt: self.last_damage_dealt,
            last_damage_received: self.last_damage_received,
            previous_score: self.previous_score,
            outcome,
            kill_cause: self.kill_cause,
            ..HandFacts::default()
        };
        if let Some(battle) = &self.battle {
            facts.hand = battle.hand_number;
            facts.is_boss = battle.enemy.is_boss;
            facts.player_hand = battle.player_hand.clone();
            facts.enemy_hand = battle.enemy_hand.clone();
            facts.peeked_card = battle.peeked_card;
            facts.drew_suits = battle.drew_suits.clone();
            facts.drew_ranks = battle.drew_ranks.clone();
            facts.doubled_down = battle.doubled_down;
            facts.peeked_this_hand = battle.peeked_this_hand;
            facts.player_score = self.effective_score(Side::Player, rules, &mods);
            facts.enemy_score = self.effective_score(Side::Enemy, rules, &mods);
        }
        facts
    }

    /// Hand score with any bust-save override applied.
    pub(crate) fn effective_score(
        &self,
        side: Side,
        rules: &GameRules,
        mods: &[Modifier],
    ) -> HandScore {
        let Some(battle) = &self.battle else {
            return HandScore::default();
        };
        let (hand, overridden) = match side {
            Side::Player => (&battle.player_hand, battle.player_score_override),
            Side::Enemy => (&battle.enemy_hand, battle.enemy_score_override),
        };
        let mut score = crate::score_hand(hand, rules, mods);
        if let Some(value) = overridden {
            score.value = value;
            score.busted = false;
        }
        score
    }

    pub(crate) fn start_battle(&mut self) -> Result<(), EngineError> {
        let rules = self.current_rules();
        let is_boss = self.battle_in_stage >= rules.progression.battles_per_stage;
        let def = if is_boss {
            self.content.boss_for(self.stage)
        } else {
            self.content.enemy_for(self.stage, self.battle_in_stage)
        }
        .ok_or(EngineError::MissingEnemy { stage: self.stage })?;
        let enemy = EnemyState::new(def, is_boss);
        self.events.push(Event::BattleStarted {
            enemy: enemy.data.name.clone(),
            boss: is_boss,
        });
        let battle = BattleState::new(enemy);
        if let Some(curse) = &battle.curse {
            self.events.push(Event::CursedBy {
                curse: curse.name.clone(),
            });
        }
        self.battle = Some(battle);
        self.drink_consumables();
        // Rules may have shifted now that the curse and abilities are live.
        let rules = self.current_rules();
        self.player.hp = self.player.hp.min(rules.effective_max_hp(self.player.max_hp));
        let mods = self.collect_modifiers();
        let facts = self.build_facts(&rules, None);
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        let mut ctx = ModifierContext {
            player: &mut self.player,
            enemy: &mut battle.enemy,
            rng: &mut self.rng,
            rules: &rules,
            facts: &facts,
        };
        fire_lifecycle(
            &mods,
            LifecycleTrigger::BattleStart,
            None,
            &mut ctx,
            &mut self.events,
        );
        self.phase = Phase::PreHand;
        if self.player.hp <= 0 {
            self.game_over(KillCause::Attrition);
        }
        Ok(())
    }

    /// Every owned consumable is drunk when the battle starts and persists
    /// for its duration in hands.
    fn drink_consumables(&mut self) {
        let stacks = std::mem::take(&mut self.player.consumables);
        for stack in stacks {
            let Some(def) = self.content.consumable_by_id(&stack.id).cloned() else {
                continue;
            };
            for _ in 0..stack.count {
                self.player.active_effects.push(crate::ActiveEffect {
                    name: def.name.clone(),
                    source: SourceTag::Consumable,
                    hands_left: def.duration_hands,
                    effects: def.effects.clone(),
                });
            }
        }
    }

    /// Grants the post-boss boon: the blessing and the defeated boss's curse
    /// are both appended for the rest of the run, and the player is restored
    /// to full before the next stage.
    pub(crate) fn grant_wish(&mut self, text: String, blessing: Option<BlessingDefinition>) {
        let blessing = match blessing {
            Some(raw) => validate_definition(raw),
            None => crate::fallback_blessing(),
        };
        let (curse, boss_name) = match &self.battle {
            Some(battle) => (battle.curse.clone(), battle.enemy.data.name.clone()),
            None => (None, String::new()),
        };
        self.events.push(Event::WishGranted {
            blessing: blessing.name.clone(),
        });
        self.player.wishes.push(crate::Wish {
            text,
            blessing,
            curse,
            boss_name,
        });
        let rules = self.current_rules();
        let max = rules.effective_max_hp(self.player.max_hp);
        let healed = max - self.player.hp;
        self.player.hp = max;
        if healed > 0 {
            self.events.push(Event::PlayerHealed {
                amount: healed,
                hp: self.player.hp,
            });
        }
    }

    pub(crate) fn advance_after_battle(&mut self) -> Result<(), EngineError> {
        let rules = self.current_rules();
        let was_boss = self.is_boss_battle();
        self.battle = None;
        if was_boss {
            self.events.push(Event::StageCleared { stage: self.stage });
            self.stage += 1;
            self.battle_in_stage = 1;
            if self.stage > rules.progression.total_stages {
                self.phase = Phase::Victory;
                self.events.push(Event::Victory);
                return Ok(());
            }
            self.start_battle()
        } else {
            self.battle_in_stage += 1;
            self.shop_stock = self.content.shop_offers(&mut self.rng, &self.player);
            self.phase = Phase::Shop;
            self.events.push(Event::ShopEntered);
            Ok(())
        }
    }

    pub(crate) fn game_over(&mut self, cause: KillCause) {
        self.kill_cause = Some(cause);
        self.phase = Phase::GameOver;
        self.events.push(Event::GameOver { cause });
    }

    /// Draws from the battle deck, rebuilding and reshuffling a fresh deck
    /// when it runs dry mid-hand.
    pub(crate) fn draw_card(&mut self) -> Result<Card, EngineError> {
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        if battle.deck.is_empty() {
            let mut deck = Deck::standard52();
            deck.shuffle(&mut self.rng);
            battle.deck = deck.draw;
        }
        // Non-empty by construction.
        Ok(battle.deck.pop().unwrap_or(Card::new(Suit::Spades, Rank::Two)))
    }
}
