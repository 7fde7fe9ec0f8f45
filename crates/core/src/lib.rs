//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod battle;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod events;
pub mod gems;
pub mod inventory;
pub mod meta;
pub mod progression;
pub mod rng;
pub mod run;
pub mod shop;
pub mod state;
pub mod status;

pub use battle::*;
pub use catalog::*;
pub use combat::*;
pub use config::*;
pub use enemy::*;
pub use events::*;
pub use gems::*;
pub use inventory::*;
pub use meta::*;
pub use progression::*;
pub use rng::*;
pub use run::*;
pub use shop::*;
pub use state::*;
pub use status::*;
