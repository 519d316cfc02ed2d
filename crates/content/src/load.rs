use anyhow::Context;
use jackdaw_core::{ConsumableDef, Content, EnemyDef, EquipmentDef};

const EQUIPMENT_JSON: &[u8] = include_bytes!("../assets/equipment.json");
const CONSUMABLES_JSON: &[u8] = include_bytes!("../assets/consumables.json");
const ENEMIES_JSON: &[u8] = include_bytes!("../assets/enemies.json");
const BOSSES_JSON: &[u8] = include_bytes!("../assets/bosses.json");

/// The embedded catalogs. Shipping with a broken catalog is a build defect,
/// so this panics rather than propagating.
pub fn builtin_content() -> Content {
    load_content(EQUIPMENT_JSON, CONSUMABLES_JSON, ENEMIES_JSON, BOSSES_JSON)
        .expect("built-in catalogs must be valid")
}

pub fn load_content(
    equipment_json: &[u8],
    consumables_json: &[u8],
    enemies_json: &[u8],
    bosses_json: &[u8],
) -> anyhow::Result<Content> {
    let equipment: Vec<EquipmentDef> =
        serde_json::from_slice(equipment_json).context("parse equipment JSON")?;
    let consumables: Vec<ConsumableDef> =
        serde_json::from_slice(consumables_json).context("parse consumables JSON")?;
    let enemies: Vec<EnemyDef> =
        serde_json::from_slice(enemies_json).context("parse enemies JSON")?;
    let bosses: Vec<EnemyDef> = serde_json::from_slice(bosses_json).context("parse bosses JSON")?;
    Ok(Content {
        equipment,
        consumables,
        enemies,
        bosses,
    })
}
