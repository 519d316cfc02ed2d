use crate::{
    bust_override, dealer_should_hit, determine_outcome, fire_lifecycle, fold_damage_dealt,
    fold_damage_received, fold_gold, fold_rules, roll_dodge, Deck, EngineError, Event,
    KillCause, LifecycleTrigger, ModifierContext, Outcome, Phase, RunState, Side,
};

impl RunState {
    /// Deals the next hand: latches cleared, a fresh transformed deck, the
    /// opening cards, and an immediate resolution on a natural.
    pub(crate) fn begin_hand(&mut self) -> Result<(), EngineError> {
        {
            let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
            battle.hand_number += 1;
            battle.player_hand.clear();
            battle.enemy_hand.clear();
            battle.hole_revealed = false;
            battle.peeked_card = None;
            battle.drew_suits.clear();
            battle.drew_ranks.clear();
            battle.doubled_down = false;
            battle.peeked_this_hand = false;
            battle.removed_this_hand = false;
            battle.player_score_override = None;
            battle.enemy_score_override = None;
            battle.last_outcome = None;
            self.events.push(Event::HandStarted {
                hand: battle.hand_number,
            });
        }
        let mods = self.collect_modifiers();
        let rules = fold_rules(&mods);
        let facts = self.build_facts(&rules, None);
        {
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
                LifecycleTrigger::HandStart,
                None,
                &mut ctx,
                &mut self.events,
            );
        }
        if self.player.hp <= 0 {
            self.game_over(KillCause::Attrition);
            return Ok(());
        }
        let mut deck = Deck::standard52();
        deck.shuffle(&mut self.rng);
        crate::apply_deck_ops(&mods, &mut deck.draw);
        if let Some(battle) = self.battle.as_mut() {
            battle.deck = deck.draw;
        }
        for _ in 0..rules.initial_cards() {
            self.deal_player_card()?;
        }
        // The dealer gets the same opening count: one card up, the rest down.
        self.deal_enemy_card(true)?;
        for _ in 1..rules.initial_cards() {
            self.deal_enemy_card(false)?;
        }
        // A natural on either side skips the turn entirely.
        let player = self.effective_score(Side::Player, &rules, &mods);
        let enemy = self.effective_score(Side::Enemy, &rules, &mods);
        if player.blackjack || enemy.blackjack || player.busted {
            return self.resolve_hand(None);
        }
        if player.value == rules.scoring.bust_threshold {
            return self.player_stand();
        }
        self.phase = Phase::PlayerTurn;
        Ok(())
    }

    fn deal_player_card(&mut self) -> Result<(), EngineError> {
        let card = self.draw_card()?;
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        battle.player_hand.push(card);
        if !battle.drew_suits.contains(&card.suit) {
            battle.drew_suits.push(card.suit);
        }
        if !battle.drew_ranks.contains(&card.rank) {
            battle.drew_ranks.push(card.rank);
        }
        self.events.push(Event::CardDrawn {
            side: Side::Player,
            card,
        });
        Ok(())
    }

    fn deal_enemy_card(&mut self, face_up: bool) -> Result<(), EngineError> {
        let card = self.draw_card()?;
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        battle.enemy_hand.push(card);
        if face_up || battle.hole_revealed {
            self.events.push(Event::CardDrawn {
                side: Side::Enemy,
                card,
            });
        } else {
            self.events.push(Event::HoleCardDealt);
        }
        Ok(())
    }

    pub(crate) fn player_hit(&mut self) -> Result<(), EngineError> {
        self.draw_and_check(false)
    }

    pub(crate) fn player_stand(&mut self) -> Result<(), EngineError> {
        self.dealer_play()?;
        self.resolve_hand(None)
    }

    /// Double down takes exactly one card and then stands (or busts).
    pub(crate) fn player_double_down(&mut self) -> Result<(), EngineError> {
        {
            let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
            battle.doubled_down = true;
        }
        self.events.push(Event::DoubledDown);
        self.draw_and_check(true)
    }

    fn draw_and_check(&mut self, stand_after: bool) -> Result<(), EngineError> {
        self.deal_player_card()?;
        let mods = self.collect_modifiers();
        let rules = fold_rules(&mods);
        let score = self.effective_score(Side::Player, &rules, &mods);
        if !score.busted {
            // Sitting at exactly the threshold stands automatically; the
            // hand cannot improve.
            return if stand_after || score.value == rules.scoring.bust_threshold {
                self.player_stand()
            } else {
                Ok(())
            };
        }
        let facts = self.build_facts(&rules, None);
        let saved = {
            let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
            let mut ctx = ModifierContext {
                player: &mut self.player,
                enemy: &mut battle.enemy,
                rng: &mut self.rng,
                rules: &rules,
                facts: &facts,
            };
            let saved = bust_override(
                &mods,
                Side::Player,
                score.value,
                &mut ctx,
                &mut battle.bust_saves_used,
            );
            if let Some(value) = saved {
                battle.player_score_override = Some(value);
            }
            saved
        };
        match saved {
            Some(value) => {
                self.events.push(Event::BustSaved {
                    side: Side::Player,
                    score: value,
                });
                // A saved hand cannot improve; it stands immediately.
                self.player_stand()
            }
            None => self.resolve_hand(None),
        }
    }

    pub(crate) fn player_peek(&mut self) -> Result<(), EngineError> {
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        let hole = battle.enemy_hand.get(1).copied();
        if let Some(card) = hole {
            battle.peeked_card = Some(card);
            battle.peeked_this_hand = true;
            self.events.push(Event::Peeked { card });
        }
        Ok(())
    }

    pub(crate) fn player_remove_card(&mut self, index: usize) -> Result<(), EngineError> {
        let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
        let card = battle.player_hand.remove(index);
        battle.removed_this_hand = true;
        self.events.push(Event::CardRemoved { card });
        Ok(())
    }

    /// Dealer policy with the folded rules: reveal the hole, hit to the stand
    /// value, and give enemy bust saves their shot.
    fn dealer_play(&mut self) -> Result<(), EngineError> {
        self.reveal_hole();
        loop {
            let mods = self.collect_modifiers();
            let rules = fold_rules(&mods);
            let score = self.effective_score(Side::Enemy, &rules, &mods);
            if score.busted {
                let facts = self.build_facts(&rules, None);
                let saved = {
                    let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
                    let mut ctx = ModifierContext {
                        player: &mut self.player,
                        enemy: &mut battle.enemy,
                        rng: &mut self.rng,
                        rules: &rules,
                        facts: &facts,
                    };
                    let saved = bust_override(
                        &mods,
                        Side::Enemy,
                        score.value,
                        &mut ctx,
                        &mut battle.bust_saves_used,
                    );
                    if let Some(value) = saved {
                        battle.enemy_score_override = Some(value);
                    }
                    saved
                };
                if let Some(value) = saved {
                    self.events.push(Event::BustSaved {
                        side: Side::Enemy,
                        score: value,
                    });
                }
                return Ok(());
            }
            if !dealer_should_hit(score, &rules) {
                return Ok(());
            }
            let card = self.draw_card()?;
            let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
            battle.enemy_hand.push(card);
            self.events.push(Event::CardDrawn {
                side: Side::Enemy,
                card,
            });
        }
    }

    fn reveal_hole(&mut self) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        if battle.hole_revealed {
            return;
        }
        battle.hole_revealed = true;
        if let Some(card) = battle.enemy_hand.get(1).copied() {
            self.events.push(Event::HoleRevealed { card });
        }
    }

    /// The fixed resolution pipeline: outcome, damage fold and commit, gold,
    /// streaks, lifecycle triggers, effect ticks, death checks.
    pub(crate) fn resolve_hand(&mut self, forced: Option<Outcome>) -> Result<(), EngineError> {
        self.reveal_hole();
        let mods = self.collect_modifiers();
        let rules = fold_rules(&mods);
        let player_score = self.effective_score(Side::Player, &rules, &mods);
        let enemy_score = self.effective_score(Side::Enemy, &rules, &mods);
        let outcome = forced.unwrap_or_else(|| determine_outcome(player_score, enemy_score, &rules));
        self.events.push(Event::HandResolved {
            outcome,
            player: player_score,
            enemy: enemy_score,
        });
        let facts = self.build_facts(&rules, Some(outcome));
        let mut pending_cause: Option<KillCause> = None;
        {
            let battle = self.battle.as_mut().ok_or(EngineError::NoBattle)?;
            battle.last_outcome = Some(outcome);
            let doubled = battle.doubled_down;
            let enemy_name = battle.enemy.data.name.clone();
            let mut ctx = ModifierContext {
                player: &mut self.player,
                enemy: &mut battle.enemy,
                rng: &mut self.rng,
                rules: &rules,
                facts: &facts,
            };
            match outcome {
                Outcome::Blackjack | Outcome::EnemyBust | Outcome::Win => {
                    let mut base = rules.health.base_damage;
                    if outcome == Outcome::Blackjack {
                        base += rules.health.blackjack_bonus_damage;
                    }
                    if doubled {
                        base *= 2;
                    }
                    let amount = fold_damage_dealt(&mods, Side::Player, base, &mut ctx);
                    if roll_dodge(&mods, Side::Enemy, &mut ctx) {
                        self.events.push(Event::Dodged { side: Side::Enemy });
                        fire_lifecycle(
                            &mods,
                            LifecycleTrigger::Dodge,
                            Some(Side::Enemy),
                            &mut ctx,
                            &mut self.events,
                        );
                    } else {
                        let taken = fold_damage_received(
                            &mods,
                            Side::Enemy,
                            amount,
                            &mut ctx,
                            &mut battle.shields_used,
                        );
                        let mut dealt = taken.amount;
                        if rules.health.damage_cap > 0 {
                            dealt = dealt.min(rules.health.damage_cap);
                        }
                        ctx.enemy.hp = (ctx.enemy.hp - dealt).max(0);
                        self.last_damage_dealt = dealt;
                        if dealt > 0 {
                            self.events.push(Event::EnemyDamaged {
                                amount: dealt,
                                hp: ctx.enemy.hp,
                            });
                        }
                        if taken.reflect > 0 {
                            ctx.player.hp = (ctx.player.hp - taken.reflect).max(0);
                            self.events.push(Event::PlayerDamaged {
                                amount: taken.reflect,
                                hp: ctx.player.hp,
                                source: enemy_name.clone(),
                            });
                            if ctx.player.hp <= 0 {
                                pending_cause = Some(KillCause::Attrition);
                            }
                        }
                    }
                    let mut gold = rules.economy.gold_per_win;
                    if outcome == Outcome::Blackjack {
                        gold += rules.economy.gold_blackjack_bonus;
                    }
                    let gold = fold_gold(&mods, Side::Player, gold, &mut ctx);
                    if gold > 0 {
                        ctx.player.gold += gold;
                        self.events.push(Event::GoldChanged {
                            delta: gold,
                            gold: ctx.player.gold,
                        });
                    }
                }
                Outcome::Lose | Outcome::Bust => {
                    let mut base = rules.health.base_damage;
                    if enemy_score.blackjack {
                        base += rules.health.blackjack_bonus_damage;
                    }
                    if doubled {
                        base *= 2;
                    }
                    let amount = fold_damage_dealt(&mods, Side::Enemy, base, &mut ctx);
                    if roll_dodge(&mods, Side::Player, &mut ctx) {
                        self.events.push(Event::Dodged { side: Side::Player });
                        fire_lifecycle(
                            &mods,
                            LifecycleTrigger::Dodge,
                            Some(Side::Player),
                            &mut ctx,
                            &mut self.events,
                        );
                    } else {
                        let taken = fold_damage_received(
                            &mods,
                            Side::Player,
                            amount,
                            &mut ctx,
                            &mut battle.shields_used,
                        );
                        let mut dealt = taken.amount;
                        if rules.health.damage_cap > 0 {
                            dealt = dealt.min(rules.health.damage_cap);
                        }
                        ctx.player.hp = (ctx.player.hp - dealt).max(0);
                        self.last_damage_received = dealt;
                        if dealt > 0 {
                            self.events.push(Event::PlayerDamaged {
                                amount: dealt,
                                hp: ctx.player.hp,
                                source: enemy_name.clone(),
                            });
                        }
                        if ctx.player.hp <= 0 {
                            pending_cause = Some(KillCause::EnemyAttack);
                        }
                        if taken.reflect > 0 {
                            ctx.enemy.hp = (ctx.enemy.hp - taken.reflect).max(0);
                            self.events.push(Event::EnemyDamaged {
                                amount: taken.reflect,
                                hp: ctx.enemy.hp,
                            });
                        }
                    }
                }
                Outcome::Surrender => {
                    // Surrender damage is a concession, not an attack: no
                    // folds, no dodge, no shields.
                    let damage = rules.health.surrender_damage;
                    ctx.player.hp = (ctx.player.hp - damage).max(0);
                    self.events.push(Event::Surrendered { damage });
                    if damage > 0 {
                        self.events.push(Event::PlayerDamaged {
                            amount: damage,
                            hp: ctx.player.hp,
                            source: enemy_name.clone(),
                        });
                    }
                    if ctx.player.hp <= 0 {
                        pending_cause = Some(KillCause::Surrender);
                    }
                }
                Outcome::Push => {}
            }
            if outcome == Outcome::Push {
                fire_lifecycle(
                    &mods,
                    LifecycleTrigger::Push,
                    None,
                    &mut ctx,
                    &mut self.events,
                );
            }
            if outcome == Outcome::EnemyBust {
                fire_lifecycle(
                    &mods,
                    LifecycleTrigger::EnemyBust,
                    None,
                    &mut ctx,
                    &mut self.events,
                );
            }
            fire_lifecycle(
                &mods,
                LifecycleTrigger::HandEnd,
                None,
                &mut ctx,
                &mut self.events,
            );
        }
        if outcome.player_won() {
            self.win_streak += 1;
            self.loss_streak = 0;
            self.hands_won += 1;
        } else if outcome.player_lost() {
            self.loss_streak += 1;
            self.win_streak = 0;
        }
        self.previous_score = Some(player_score);
        self.tick_active_effects();
        if self.player.hp <= 0 {
            self.game_over(pending_cause.unwrap_or(KillCause::Attrition));
            return Ok(());
        }
        let enemy_dead = self
            .battle
            .as_ref()
            .map(|b| b.enemy.hp <= 0)
            .unwrap_or(false);
        if enemy_dead {
            if let Some(battle) = &self.battle {
                self.events.push(Event::EnemyDefeated {
                    enemy: battle.enemy.data.name.clone(),
                });
            }
            self.phase = Phase::BattleResult;
        } else {
            self.phase = Phase::HandResult;
        }
        Ok(())
    }

    fn tick_active_effects(&mut self) {
        let mut expired = Vec::new();
        self.player.active_effects.retain_mut(|active| {
            active.hands_left = active.hands_left.saturating_sub(1);
            if active.hands_left == 0 {
                expired.push(active.name.clone());
                false
            } else {
                true
            }
        });
        for name in expired {
            self.events.push(Event::EffectExpired { name });
        }
    }
}
