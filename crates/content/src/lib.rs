//! Built-in catalogs: equipment, consumables, enemies, and bosses.

pub mod load;

pub use load::*;
