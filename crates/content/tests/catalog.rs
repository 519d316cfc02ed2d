use jackdaw_content::builtin_content;
use jackdaw_core::{Effect, PlayerState, RngState};

fn assert_effects_in_bounds(context: &str, effects: &[Effect]) {
    for effect in effects {
        let bounds = effect.kind.bounds();
        assert!(
            effect.value >= bounds.min && effect.value <= bounds.max,
            "{context}: {:?} value {} outside [{}, {}]",
            effect.kind,
            effect.value,
            bounds.min,
            bounds.max
        );
        if bounds.needs_suit {
            assert!(effect.suit.is_some(), "{context}: {:?} needs a suit", effect.kind);
        }
        if bounds.needs_rank {
            assert!(effect.rank.is_some(), "{context}: {:?} needs a rank", effect.kind);
        }
    }
}

#[test]
fn builtin_catalogs_load() {
    let content = builtin_content();
    assert!(!content.equipment.is_empty());
    assert!(!content.consumables.is_empty());
    assert!(!content.enemies.is_empty());
    assert!(!content.bosses.is_empty());
}

#[test]
fn all_catalog_effects_are_in_bounds() {
    let content = builtin_content();
    for def in &content.equipment {
        assert_effects_in_bounds(&def.id, &def.effects);
    }
    for def in &content.consumables {
        assert_effects_in_bounds(&def.id, &def.effects);
    }
    for def in content.enemies.iter().chain(&content.bosses) {
        assert_effects_in_bounds(&def.id, &def.abilities);
        if let Some(curse) = &def.curse {
            assert_effects_in_bounds(&curse.id, &curse.effects);
        }
    }
}

#[test]
fn every_stage_has_enemies_and_a_boss() {
    let content = builtin_content();
    for stage in 1..=3 {
        for battle in 1..=2 {
            assert!(
                content.enemy_for(stage, battle).is_some(),
                "no enemy for stage {stage} battle {battle}"
            );
        }
        let boss = content.boss_for(stage).unwrap();
        assert_eq!(boss.stage, stage);
        assert!(boss.curse.is_some(), "boss {} has no curse", boss.id);
    }
}

#[test]
fn catalog_ids_are_unique() {
    let content = builtin_content();
    let mut ids: Vec<&str> = content
        .equipment
        .iter()
        .map(|d| d.id.as_str())
        .chain(content.consumables.iter().map(|d| d.id.as_str()))
        .chain(content.enemies.iter().map(|d| d.id.as_str()))
        .chain(content.bosses.iter().map(|d| d.id.as_str()))
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "duplicate catalog id");
}

#[test]
fn shop_skips_owned_equipment_and_offers_distinct_stock() {
    let content = builtin_content();
    let mut rng = RngState::from_seed(7);
    let mut player = PlayerState::new();
    let dagger = content.equipment_by_id("rusty_dagger").unwrap().clone();
    player.equipment.equip(dagger);
    for _ in 0..20 {
        let offers = content.shop_offers(&mut rng, &player);
        assert!(offers.len() <= 3);
        let mut ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert!(!ids.contains(&"rusty_dagger"));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
