use jackdaw_core::{
    fallback_blessing, Condition, Content, CurseDef, Effect, EffectKind, EnemyDef, EngineError,
    EquipSlot, EquipmentDef, Event, Outcome, Phase, PlayerAction, Replay, RunState, Side,
    SourceTag, Wish,
};

fn test_content() -> Content {
    let enemy = |id: &str, hp: i64, stage: u32| EnemyDef {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        max_hp: hp,
        stage,
        abilities: Vec::new(),
        curse: None,
    };
    let boss = |id: &str, hp: i64, stage: u32, curse_effects: Vec<Effect>| EnemyDef {
        curse: Some(CurseDef {
            id: format!("{id}_curse"),
            name: format!("{id} curse"),
            description: String::new(),
            effects: curse_effects,
        }),
        ..enemy(id, hp, stage)
    };
    Content {
        equipment: vec![EquipmentDef {
            id: "knife".to_string(),
            name: "Knife".to_string(),
            description: String::new(),
            slot: EquipSlot::Weapon,
            price: 5,
            effects: vec![Effect::new(EffectKind::FlatDamage, 2)],
        }],
        consumables: Vec::new(),
        enemies: vec![
            enemy("rat", 10, 1),
            enemy("dog", 12, 1),
            enemy("wolf", 16, 2),
            enemy("bear", 20, 2),
            enemy("ogre", 24, 3),
            enemy("drake", 28, 3),
        ],
        bosses: vec![
            boss("warden", 18, 1, vec![Effect::new(EffectKind::Vulnerable, 3)]),
            boss("marid", 26, 2, vec![Effect::new(EffectKind::GoldLossPerHand, 2)]),
            boss("collector", 34, 3, vec![Effect::new(EffectKind::TiesWinForDealer, 1)]),
        ],
    }
}

fn policy_action(run: &RunState) -> PlayerAction {
    match run.phase {
        Phase::PlayerTurn => {
            let score = run
                .view()
                .hand
                .map(|hand| hand.player_score.value)
                .unwrap_or(0);
            if score < 17 {
                PlayerAction::Hit
            } else {
                PlayerAction::Stand
            }
        }
        Phase::Shop => PlayerAction::LeaveShop,
        Phase::Wish => PlayerAction::Wish {
            text: "ever more".to_string(),
            blessing: None,
        },
        _ => PlayerAction::Continue,
    }
}

fn drive(run: &mut RunState, max_actions: usize) {
    for _ in 0..max_actions {
        if matches!(run.phase, Phase::Victory | Phase::GameOver) {
            return;
        }
        let action = policy_action(run);
        let outcome = run.perform_action(action).expect("policy action accepted");
        assert!(outcome.success, "policy action refused: {}", outcome.message);
        run.events.drain();
    }
}

#[test]
fn same_seed_and_actions_give_identical_runs() {
    let mut first = RunState::new(42, test_content()).unwrap();
    let mut second = RunState::new(42, test_content()).unwrap();
    drive(&mut first, 300);
    drive(&mut second, 300);
    assert_eq!(first.phase, second.phase);
    assert_eq!(first.player, second.player);
    assert_eq!(first.stage, second.stage);
    assert_eq!(first.battle_in_stage, second.battle_in_stage);
    assert_eq!(
        first.battle.as_ref().map(|b| (b.enemy.hp, b.hand_number)),
        second.battle.as_ref().map(|b| (b.enemy.hp, b.hand_number))
    );
    assert_eq!(
        serde_json::to_string(&first.view()).unwrap(),
        serde_json::to_string(&second.view()).unwrap()
    );
}

#[test]
fn replay_rebuilds_the_exact_state() {
    let mut run = RunState::new(7, test_content()).unwrap();
    drive(&mut run, 300);
    let rebuilt = RunState::from_replay(&run.replay(), test_content()).unwrap();
    assert_eq!(rebuilt.phase, run.phase);
    assert_eq!(rebuilt.player, run.player);
    assert_eq!(rebuilt.hands_won, run.hands_won);
    assert_eq!(rebuilt.kill_cause, run.kill_cause);
    assert_eq!(
        serde_json::to_string(&rebuilt.view()).unwrap(),
        serde_json::to_string(&run.view()).unwrap()
    );
}

#[test]
fn every_offered_action_is_accepted() {
    let mut run = RunState::new(3, test_content()).unwrap();
    for _ in 0..60 {
        if matches!(run.phase, Phase::Victory | Phase::GameOver) {
            break;
        }
        for action in run.available_actions() {
            let mut probe = run.clone();
            let outcome = probe
                .perform_action(action.clone())
                .unwrap_or_else(|err| panic!("offered {action:?} errored: {err}"));
            assert!(outcome.success, "offered {action:?} refused: {}", outcome.message);
        }
        let action = policy_action(&run);
        run.perform_action(action).unwrap();
        run.events.drain();
    }
}

#[test]
fn refused_actions_are_values_and_do_not_touch_the_log() {
    let mut run = RunState::new(1, test_content()).unwrap();
    // Fresh run sits in PreHand; only Continue is legal there.
    let refused = run.perform_action(PlayerAction::Hit).unwrap();
    assert!(!refused.success);
    assert_eq!(refused.phase, Phase::PreHand);
    let refused = run.perform_action(PlayerAction::LeaveShop).unwrap();
    assert!(!refused.success);
    assert!(run.actions.is_empty());
    let accepted = run.perform_action(PlayerAction::Continue).unwrap();
    assert!(accepted.success);
    assert_eq!(run.actions.len(), 1);
}

#[test]
fn replaying_a_mismatched_log_reports_the_divergence() {
    let replay = Replay {
        seed: 1,
        actions: vec![PlayerAction::LeaveShop],
    };
    let err = RunState::from_replay(&replay, test_content()).unwrap_err();
    assert!(matches!(err, EngineError::ReplayDiverged { step: 0, .. }));
}

#[test]
fn hp_and_gold_never_leave_their_ranges() {
    for seed in 0..20 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..300 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            run.perform_action(policy_action(&run)).unwrap();
            run.events.drain();
            let rules = run.current_rules();
            assert!(run.player.hp >= 0);
            assert!(run.player.hp <= rules.effective_max_hp(run.player.max_hp));
            assert!(run.player.gold >= 0);
            if let Some(battle) = &run.battle {
                assert!(battle.enemy.hp >= 0);
            }
        }
    }
}

#[test]
fn a_natural_resolves_without_a_player_turn() {
    let mut found = false;
    for seed in 0..400 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        run.events.drain();
        run.perform_action(PlayerAction::Continue).unwrap();
        let events = run.events.drain();
        let natural = events.iter().any(|event| {
            matches!(
                event,
                Event::HandResolved {
                    outcome: Outcome::Blackjack,
                    ..
                }
            )
        });
        if natural {
            assert_ne!(run.phase, Phase::PlayerTurn);
            found = true;
            break;
        }
    }
    assert!(found, "no natural in 400 seeds");
}

#[test]
fn hole_card_stays_hidden_until_the_stand() {
    // Find a seed that leaves us in the player turn after the deal.
    for seed in 0..100 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        run.perform_action(PlayerAction::Continue).unwrap();
        if run.phase != Phase::PlayerTurn {
            continue;
        }
        let view = run.view();
        let hand = view.hand.expect("hand in progress");
        assert_eq!(hand.enemy_cards.len(), 1);
        assert!(hand.hole_hidden);
        assert!(hand.enemy_score.is_none());
        run.perform_action(PlayerAction::Stand).unwrap();
        let view = run.view();
        let hand = view.hand.expect("hand still shown");
        assert!(!hand.hole_hidden);
        assert!(hand.enemy_cards.len() >= 2);
        assert!(hand.enemy_score.is_some());
        return;
    }
    panic!("no seed left a player turn open");
}

#[test]
fn boss_battles_attach_the_curse() {
    for seed in 0..30 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..400 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            if run.is_boss_battle() {
                let mods = run.collect_modifiers();
                assert!(
                    mods.iter()
                        .any(|m| m.source == SourceTag::Curse),
                    "boss battle without curse modifier"
                );
                return;
            }
            run.perform_action(policy_action(&run)).unwrap();
            run.events.drain();
        }
    }
    panic!("no run reached a boss in 30 seeds");
}

#[test]
fn the_wish_restores_the_player_to_full() {
    for seed in 0..30 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..500 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            if run.phase == Phase::Wish {
                run.player.hp = 1;
                run.perform_action(PlayerAction::Wish {
                    text: "make me whole".to_string(),
                    blessing: None,
                })
                .unwrap();
                let rules = run.current_rules();
                assert_eq!(run.player.hp, rules.effective_max_hp(run.player.max_hp));
                return;
            }
            run.perform_action(policy_action(&run)).unwrap();
            run.events.drain();
        }
    }
    panic!("no run reached the genie in 30 seeds");
}

#[test]
fn a_defeated_boss_curse_follows_the_run() {
    for seed in 0..30 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..500 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            if run.phase == Phase::Wish {
                run.perform_action(PlayerAction::Wish {
                    text: "strength".to_string(),
                    blessing: None,
                })
                .unwrap();
                let wish = &run.player.wishes[0];
                assert_eq!(wish.boss_name, "warden");
                assert!(wish.curse.is_some());
                // The next battle is a regular one, yet the curse persists.
                assert!(!run.is_boss_battle());
                let mods = run.collect_modifiers();
                assert!(
                    mods.iter()
                        .any(|m| m.source == SourceTag::Curse && m.owner == Side::Player),
                    "defeated boss's curse missing from a later battle"
                );
                return;
            }
            run.perform_action(policy_action(&run)).unwrap();
            run.events.drain();
        }
    }
    panic!("no run reached the genie in 30 seeds");
}

#[test]
fn reaching_the_threshold_stands_automatically() {
    // Hit at every opportunity; an open turn must never sit at 21.
    for seed in 0..25 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..300 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            let action = if run.phase == Phase::PlayerTurn {
                let score = run
                    .view()
                    .hand
                    .map(|hand| hand.player_score.value)
                    .unwrap_or(0);
                assert!(score < 21, "seed {seed}: turn still open at {score}");
                PlayerAction::Hit
            } else {
                policy_action(&run)
            };
            run.perform_action(action).unwrap();
            run.events.drain();
        }
    }
}

#[test]
fn extra_initial_cards_reach_the_dealer_too() {
    let mut content = test_content();
    for enemy in &mut content.enemies {
        enemy
            .abilities
            .push(Effect::new(EffectKind::ExtraInitialCard, 1));
    }
    for seed in 0..50 {
        let mut run = RunState::new(seed, content.clone()).unwrap();
        run.perform_action(PlayerAction::Continue).unwrap();
        if run.phase != Phase::PlayerTurn {
            continue;
        }
        let battle = run.battle.as_ref().unwrap();
        assert_eq!(battle.player_hand.len(), 3);
        assert_eq!(battle.enemy_hand.len(), 3);
        // Only the upcard shows until the hole is revealed.
        let hand = run.view().hand.expect("hand in progress");
        assert_eq!(hand.enemy_cards.len(), 1);
        return;
    }
    panic!("no seed left the first hand open");
}

#[test]
fn a_cursed_bust_bleeds_and_a_clean_loss_does_not() {
    for seed in 0..20 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        run.events.drain();
        run.player.wishes.push(Wish {
            text: "power at a price".to_string(),
            blessing: fallback_blessing(),
            curse: Some(CurseDef {
                id: "bleak_tithe".to_string(),
                name: "Bleak Tithe".to_string(),
                description: String::new(),
                effects: vec![Effect::new(EffectKind::HpLossOnBust, 4)],
            }),
            boss_name: "warden".to_string(),
        });
        let mut saw_bust = false;
        for _ in 0..200 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            run.perform_action(policy_action(&run)).unwrap();
            let events = run.events.drain();
            let outcome = events.iter().find_map(|event| match event {
                Event::HandResolved { outcome, .. } => Some(*outcome),
                _ => None,
            });
            let tithe = events.iter().any(|event| {
                matches!(event, Event::PlayerDamaged { source, .. } if source == "Bleak Tithe")
            });
            match outcome {
                Some(Outcome::Bust) if run.phase != Phase::GameOver => {
                    // Surviving the hand means the full tithe was paid.
                    assert!(
                        events.iter().any(|event| matches!(
                            event,
                            Event::PlayerDamaged { amount: 4, source, .. }
                                if source == "Bleak Tithe"
                        )),
                        "seed {seed}: busted hand did not pay the tithe"
                    );
                    saw_bust = true;
                }
                Some(Outcome::Bust) => {}
                _ => assert!(!tithe, "seed {seed}: tithe paid without a bust"),
            }
        }
        if saw_bust {
            return;
        }
    }
    panic!("no survivable bust in 20 seeds");
}

#[test]
fn conditioned_blessing_survives_the_wish_path() {
    // Reach any wish phase, grant a typed blessing, and check it folds in.
    for seed in 0..30 {
        let mut run = RunState::new(seed, test_content()).unwrap();
        for _ in 0..500 {
            if matches!(run.phase, Phase::Victory | Phase::GameOver) {
                break;
            }
            if run.phase == Phase::Wish {
                let blessing = jackdaw_core::BlessingDefinition {
                    name: "Sharper Steel".to_string(),
                    description: String::new(),
                    effects: vec![
                        Effect::new(EffectKind::FlatDamage, 99)
                            .when(Condition::WinStreakAtLeast(2)),
                    ],
                };
                run.perform_action(PlayerAction::Wish {
                    text: "sharper steel".to_string(),
                    blessing: Some(blessing),
                })
                .unwrap();
                assert_eq!(run.player.wishes.len(), 1);
                // The validator clamps the overreach before it compiles.
                let effect = &run.player.wishes[0].blessing.effects[0];
                assert_eq!(effect.value, 10);
                assert_eq!(effect.condition, Some(Condition::WinStreakAtLeast(2)));
                return;
            }
            run.perform_action(policy_action(&run)).unwrap();
            run.events.drain();
        }
    }
    panic!("no run reached the genie in 30 seeds");
}
