use jackdaw_core::{
    apply_deck_ops, build_modifier, bust_override, card_value_adjust, fold_damage_dealt,
    fold_damage_received, fold_rules, roll_dodge, Card, Condition, Deck, Effect, EffectKind,
    EnemyDef, EnemyState, GameRules, HandFacts, Modifier, ModifierContext, PlayerState, Rank,
    RngState, Side, SourceTag, Suit,
};

fn enemy() -> EnemyState {
    EnemyState::new(
        EnemyDef {
            id: "dummy".to_string(),
            name: "Dummy".to_string(),
            description: String::new(),
            max_hp: 20,
            stage: 1,
            abilities: Vec::new(),
            curse: None,
        },
        false,
    )
}

fn player_mod(id: &str, effects: &[Effect]) -> Modifier {
    build_modifier(id, id, "", SourceTag::Equipment, Side::Player, effects)
}

macro_rules! with_ctx {
    ($rules:expr, $facts:expr, $seed:expr, |$ctx:ident| $body:block) => {{
        let mut player = PlayerState::new();
        let mut foe = enemy();
        let mut rng = RngState::from_seed($seed);
        let mut $ctx = ModifierContext {
            player: &mut player,
            enemy: &mut foe,
            rng: &mut rng,
            rules: $rules,
            facts: $facts,
        };
        $body
    }};
}

#[test]
fn flat_damage_stacks_additively() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![
        player_mod("a", &[Effect::new(EffectKind::FlatDamage, 3)]),
        player_mod("b", &[Effect::new(EffectKind::FlatDamage, 3)]),
    ];
    with_ctx!(&rules, &facts, 0, |ctx| {
        assert_eq!(fold_damage_dealt(&mods, Side::Player, 5, &mut ctx), 11);
    });
}

#[test]
fn percent_applies_to_running_total_in_attachment_order() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let flat_then_percent = vec![
        player_mod("flat", &[Effect::new(EffectKind::FlatDamage, 5)]),
        player_mod("pct", &[Effect::new(EffectKind::PercentDamage, 100)]),
    ];
    let percent_then_flat = vec![
        player_mod("pct", &[Effect::new(EffectKind::PercentDamage, 100)]),
        player_mod("flat", &[Effect::new(EffectKind::FlatDamage, 5)]),
    ];
    with_ctx!(&rules, &facts, 0, |ctx| {
        assert_eq!(fold_damage_dealt(&flat_then_percent, Side::Player, 5, &mut ctx), 20);
    });
    with_ctx!(&rules, &facts, 0, |ctx| {
        assert_eq!(fold_damage_dealt(&percent_then_flat, Side::Player, 5, &mut ctx), 15);
    });
}

#[test]
fn per_suit_damage_counts_the_attacker_hand() {
    let rules = GameRules::standard();
    let mut facts = HandFacts::default();
    facts.player_hand = vec![
        Card::new(Suit::Hearts, Rank::Four),
        Card::new(Suit::Hearts, Rank::Nine),
        Card::new(Suit::Clubs, Rank::King),
    ];
    let mods = vec![player_mod(
        "hearts",
        &[Effect::new(EffectKind::DamagePerSuitCard, 2).with_suit(Suit::Hearts)],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        assert_eq!(fold_damage_dealt(&mods, Side::Player, 5, &mut ctx), 9);
    });
}

#[test]
fn condition_gates_the_single_entry() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod(
        "desperate",
        &[Effect::new(EffectKind::FlatDamage, 5).when(Condition::PlayerHpBelowPercent(30))],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        assert_eq!(fold_damage_dealt(&mods, Side::Player, 5, &mut ctx), 5);
        ctx.player.hp = 5;
        assert_eq!(fold_damage_dealt(&mods, Side::Player, 5, &mut ctx), 10);
    });
}

#[test]
fn armor_floors_damage_at_zero() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod("plate", &[Effect::new(EffectKind::Armor, 8)])];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        let taken = fold_damage_received(&mods, Side::Player, 3, &mut ctx, &mut used);
        assert_eq!(taken.amount, 0);
        assert_eq!(taken.reflect, 0);
    });
}

#[test]
fn thorns_reflect_only_when_damage_lands() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod(
        "spiky",
        &[
            Effect::new(EffectKind::Armor, 8),
            Effect::new(EffectKind::Thorns, 2),
        ],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        let absorbed = fold_damage_received(&mods, Side::Player, 3, &mut ctx, &mut used);
        assert_eq!((absorbed.amount, absorbed.reflect), (0, 0));
        let landed = fold_damage_received(&mods, Side::Player, 10, &mut ctx, &mut used);
        assert_eq!((landed.amount, landed.reflect), (2, 2));
    });
}

#[test]
fn shield_absorbs_one_hit_per_battle() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod(
        "tower",
        &[Effect::new(EffectKind::ShieldOncePerBattle, 1)],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        let first = fold_damage_received(&mods, Side::Player, 7, &mut ctx, &mut used);
        assert_eq!(first.amount, 0);
        assert_eq!(used, vec!["tower".to_string()]);
        let second = fold_damage_received(&mods, Side::Player, 7, &mut ctx, &mut used);
        assert_eq!(second.amount, 7);
    });
}

#[test]
fn bust_save_once_per_battle_is_spent() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod(
        "locket",
        &[Effect::new(EffectKind::BustSaveOncePerBattle, 1)],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        assert_eq!(
            bust_override(&mods, Side::Player, 25, &mut ctx, &mut used),
            Some(21)
        );
        assert_eq!(bust_override(&mods, Side::Player, 25, &mut ctx, &mut used), None);
    });
}

#[test]
fn bust_save_at_exactly_matches_the_raw_score() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod(
        "precise",
        &[Effect::new(EffectKind::BustSaveAtExactly, 22)],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        assert_eq!(
            bust_override(&mods, Side::Player, 22, &mut ctx, &mut used),
            Some(22)
        );
        assert_eq!(bust_override(&mods, Side::Player, 23, &mut ctx, &mut used), None);
    });
}

#[test]
fn an_enemy_desperate_ability_keys_off_its_own_hp() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![build_modifier(
        "cornered",
        "Cornered",
        "",
        SourceTag::Enemy,
        Side::Enemy,
        &[Effect::new(EffectKind::DesperateArmor, 5)],
    )];
    with_ctx!(&rules, &facts, 0, |ctx| {
        let mut used = Vec::new();
        let healthy = fold_damage_received(&mods, Side::Enemy, 6, &mut ctx, &mut used);
        assert_eq!(healthy.amount, 6);
        // The player's hp is not this ability's trigger.
        ctx.player.hp = 1;
        let still = fold_damage_received(&mods, Side::Enemy, 6, &mut ctx, &mut used);
        assert_eq!(still.amount, 6);
        ctx.enemy.hp = 5;
        let cornered = fold_damage_received(&mods, Side::Enemy, 6, &mut ctx, &mut used);
        assert_eq!(cornered.amount, 1);
    });
}

#[test]
fn dodge_rate_stays_near_the_stated_chance() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod("feather", &[Effect::new(EffectKind::DodgeChance, 20)])];
    let mut hits = 0;
    for seed in 0..1000 {
        with_ctx!(&rules, &facts, seed, |ctx| {
            if roll_dodge(&mods, Side::Player, &mut ctx) {
                hits += 1;
            }
        });
    }
    assert!((140..=260).contains(&hits), "dodge rate off: {hits}/1000");
}

#[test]
fn chance_draws_are_deterministic_per_seed() {
    let rules = GameRules::standard();
    let facts = HandFacts::default();
    let mods = vec![player_mod("feather", &[Effect::new(EffectKind::DodgeChance, 35)])];
    let roll = |seed: u64| {
        let mut outcome = false;
        with_ctx!(&rules, &facts, seed, |ctx| {
            outcome = roll_dodge(&mods, Side::Player, &mut ctx);
        });
        outcome
    };
    for seed in 0..32 {
        assert_eq!(roll(seed), roll(seed));
    }
}

#[test]
fn rules_list_fields_fold_idempotently() {
    let mods = vec![
        player_mod("a", &[Effect::new(EffectKind::FlexibleRank, 1).with_rank(Rank::King)]),
        player_mod("b", &[Effect::new(EffectKind::FlexibleRank, 1).with_rank(Rank::King)]),
    ];
    let rules = fold_rules(&mods);
    let kings = rules
        .scoring
        .flexible_ranks
        .iter()
        .filter(|&&r| r == Rank::King)
        .count();
    assert_eq!(kings, 1);
    assert!(rules.scoring.flexible_ranks.contains(&Rank::Ace));
}

#[test]
fn rules_scalars_are_last_write_wins() {
    let mods = vec![
        player_mod("first", &[Effect::new(EffectKind::BustThresholdSet, 24)]),
        player_mod("second", &[Effect::new(EffectKind::BustThresholdSet, 18)]),
    ];
    assert_eq!(fold_rules(&mods).scoring.bust_threshold, 18);
}

#[test]
fn card_value_set_overrides_rank() {
    let mods = vec![player_mod(
        "cheap royals",
        &[Effect::new(EffectKind::RankValueSet, 1).with_rank(Rank::King)],
    )];
    assert_eq!(card_value_adjust(&mods, Card::new(Suit::Clubs, Rank::King), 10), 1);
    assert_eq!(card_value_adjust(&mods, Card::new(Suit::Clubs, Rank::Nine), 9), 9);
}

#[test]
fn deck_ops_filter_and_augment() {
    let purge = vec![player_mod("no hearts", &[Effect::new(EffectKind::PurgeSuit, 1).with_suit(Suit::Hearts)])];
    let mut cards = Deck::standard52().draw;
    apply_deck_ops(&purge, &mut cards);
    assert_eq!(cards.len(), 39);
    assert!(cards.iter().all(|c| c.suit != Suit::Hearts));

    let aces = vec![player_mod("sleeve", &[Effect::new(EffectKind::ExtraAces, 4)])];
    let mut cards = Deck::standard52().draw;
    apply_deck_ops(&aces, &mut cards);
    assert_eq!(cards.len(), 56);
}

#[test]
fn deck_emptied_by_purges_is_restored() {
    let effects: Vec<Effect> = Suit::ALL
        .iter()
        .map(|&suit| Effect::new(EffectKind::PurgeSuit, 1).with_suit(suit))
        .collect();
    let mods = vec![
        player_mod("a", &effects[..2]),
        player_mod("b", &effects[2..]),
    ];
    let mut cards = Deck::standard52().draw;
    apply_deck_ops(&mods, &mut cards);
    assert_eq!(cards.len(), 52);
}
