//! Seeded autoplay over the core run API: a heuristic pilot plus a flat
//! Monte Carlo search that replays action histories to evaluate candidates.

mod action;
mod config;
mod error;
mod objective;
mod search;
mod simulator;
mod trace;

pub use action::*;
pub use config::*;
pub use error::*;
pub use objective::*;
pub use search::*;
pub use simulator::*;
pub use trace::*;
