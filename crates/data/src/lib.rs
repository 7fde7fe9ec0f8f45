//! Data loading and validation for game content, plus run persistence.

pub mod load;
pub mod save;

pub use load::*;
pub use save::*;
