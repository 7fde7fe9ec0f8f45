use gemfire_core::PlayerClass;

#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    pub seed: u64,
    pub class: PlayerClass,
    pub max_steps: u32,
    /// Rollouts per candidate action. Zero plays the heuristic pilot only.
    pub rollouts_per_action: u32,
    pub rollout_depth: u32,
    pub rollout_top_k: usize,
    pub action_retry_limit: u32,
    pub max_play_candidates: usize,
    pub max_shop_candidates: usize,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            class: PlayerClass::Knight,
            max_steps: 600,
            rollouts_per_action: 4,
            rollout_depth: 16,
            rollout_top_k: 3,
            action_retry_limit: 4,
            max_play_candidates: 8,
            max_shop_candidates: 6,
        }
    }
}
