//! Core combat and run logic. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod combat;
pub mod content;
pub mod deck;
pub mod effects;
pub mod events;
pub mod modifier;
pub mod rng;
pub mod rules;
pub mod run;
pub mod scoring;
pub mod state;

pub use cards::*;
pub use combat::*;
pub use content::*;
pub use deck::*;
pub use effects::*;
pub use events::*;
pub use modifier::*;
pub use rng::*;
pub use rules::*;
pub use run::*;
pub use scoring::*;
pub use state::*;
