use crate::Enemy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Fled,
}

/// Sub-steps of the enemy's turn, run in declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnemyStep {
    Act,
    Tick,
    Plan,
    Finalize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Turn {
    Player,
    Enemy(EnemyStep),
    Over(BattleOutcome),
}

/// One encounter. A finished battle is kept (with `Turn::Over`) until the
/// next one starts so callers can inspect how it ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Battle {
    pub enemy: Enemy,
    pub turn: Turn,
    pub stamina_spent_this_turn: u32,
    pub boss: bool,
    pub round: u32,
    /// False when the enemy skipped its queued action this turn.
    pub action_consumed: bool,
}

impl Battle {
    pub fn new(enemy: Enemy) -> Self {
        Self {
            boss: enemy.boss,
            enemy,
            turn: Turn::Player,
            stamina_spent_this_turn: 0,
            round: 1,
            action_consumed: true,
        }
    }

    pub fn in_progress(&self) -> bool {
        !matches!(self.turn, Turn::Over(_))
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.turn {
            Turn::Over(outcome) => Some(outcome),
            _ => None,
        }
    }
}
