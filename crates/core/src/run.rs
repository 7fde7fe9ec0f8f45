use crate::{
    Battle, Catalog, DayPhase, GameConfig, Inventory, InventoryError, MetaProgress, Player,
    PlayerClass, Progression, RngState, ShopState, Stage,
};
use thiserror::Error;

mod battle;
mod camp;
mod enemy_turn;
mod shop;
mod state;

pub use state::{SaveSnapshot, SAVE_SCHEMA_VERSION};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("invalid gem selection")]
    InvalidSelection,
    #[error("not enough stamina: need {needed}, have {available}")]
    InsufficientStamina { needed: u32, available: u32 },
    #[error("not enough zenny: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("no living target")]
    NoTarget,
    #[error("invalid encounter context: {0}")]
    InvalidEncounterContext(&'static str),
    #[error("unknown gem {0}")]
    UnknownGem(String),
    #[error("missing class definition for {0:?}")]
    MissingClass(PlayerClass),
    #[error("unsupported save version {0}")]
    UnsupportedSave(u32),
}

impl From<InventoryError> for RunError {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::InvalidSelection => Self::InvalidSelection,
            InventoryError::InsufficientStamina { needed, available } => {
                Self::InsufficientStamina { needed, available }
            }
        }
    }
}

#[derive(Debug)]
pub struct RunState {
    pub config: GameConfig,
    pub catalog: Catalog,
    pub rng: RngState,
    pub player: Player,
    pub inventory: Inventory,
    pub meta: MetaProgress,
    pub day: u32,
    pub phase: DayPhase,
    pub stage: Stage,
    pub battle: Option<Battle>,
    pub shop: Option<ShopState>,
    pub camp_rested: bool,
    progression: Box<dyn Progression>,
}
