use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetConfig {
    pub target_day: Option<u32>,
    pub target_zenny: Option<i64>,
    pub stop_on_defeat: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            target_day: None,
            target_zenny: None,
            stop_on_defeat: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub progress: f64,
    pub health: f64,
    pub zenny: f64,
    pub survival: f64,
    pub steps_penalty: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            progress: 2.0,
            health: 1.5,
            zenny: 0.5,
            survival: 10.0,
            steps_penalty: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub day: u32,
    /// 0 for dawn, 1 for dusk, 2 for dark.
    pub phase_index: u8,
    pub health: i32,
    pub max_health: i32,
    pub zenny: i64,
    pub banked: i64,
    pub enemy_health: Option<i32>,
    pub defeated: bool,
    pub won: bool,
}

pub fn target_reached(metrics: EvalMetrics, targets: TargetConfig) -> bool {
    if let Some(target) = targets.target_day {
        if metrics.day < target {
            return false;
        }
    }
    if let Some(target) = targets.target_zenny {
        if metrics.zenny + metrics.banked < target {
            return false;
        }
    }
    targets.target_day.is_some() || targets.target_zenny.is_some()
}

pub fn weighted_score(metrics: EvalMetrics, weights: ObjectiveWeights, total_steps: u32) -> f64 {
    let progress = metrics.day.saturating_sub(1) as f64 * 3.0 + metrics.phase_index as f64;
    let health = if metrics.max_health > 0 {
        metrics.health.max(0) as f64 / metrics.max_health as f64
    } else {
        0.0
    };
    let zenny = (metrics.zenny + metrics.banked).max(0) as f64 / 100.0;
    let survival = if metrics.defeated {
        -1.0
    } else if metrics.won {
        1.0
    } else {
        0.0
    };
    let pressure = match metrics.enemy_health {
        Some(left) if left > 0 => -(left as f64) / 100.0,
        _ => 0.0,
    };

    weights.progress * (progress + pressure)
        + weights.health * health
        + weights.zenny * zenny
        + weights.survival * survival
        - weights.steps_penalty * total_steps as f64
}
