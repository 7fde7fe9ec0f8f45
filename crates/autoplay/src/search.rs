use crate::{
    action_score, target_reached, weighted_score, AutoAction, AutoplayConfig, AutoplayError,
    AutoplayResult, FinalMetrics, ObjectiveWeights, RunStatus, Simulator, StepRecord,
    StepSearchStats, SummaryStats, TargetConfig,
};
use gemfire_core::BattleOutcome;
use std::collections::HashSet;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct AutoplayRequest {
    pub config: AutoplayConfig,
    pub targets: TargetConfig,
    pub weights: ObjectiveWeights,
}

#[derive(Debug, Clone)]
struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self(
            seed.wrapping_mul(0x9E3779B97F4A7C15)
                .wrapping_add(0xD1B54A32D192ED03),
        )
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 7;
        self.0 ^= self.0 >> 9;
        self.0 ^= self.0 << 8;
        self.0
    }

    fn gen_unit_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }
}

/// Play a run to completion. `factory` must build the same starting state on
/// every call: candidate actions are evaluated by replaying the history onto
/// a fresh simulator.
pub fn run_autoplay<F>(
    factory: &F,
    request: &AutoplayRequest,
) -> Result<AutoplayResult, AutoplayError>
where
    F: Fn() -> Result<Simulator, AutoplayError>,
{
    let started_at = Instant::now();
    let cfg = &request.config;
    let mut sim = factory()?;
    let mut rng = SimpleRng::new(cfg.seed);
    let mut history: Vec<AutoAction> = Vec::new();
    let mut records: Vec<StepRecord> = Vec::new();
    let mut total_rollouts: u64 = 0;
    let mut battles_won = 0u32;
    let mut status = None;

    for step in 0..cfg.max_steps {
        let before = sim.metrics();
        if let Some(done) = finished_status(&sim, request.targets) {
            status = Some(done);
            break;
        }

        let mut blocked_actions: HashSet<String> = HashSet::new();
        let mut committed = false;
        for _ in 0..cfg.action_retry_limit.max(1) {
            let candidates = sim
                .legal_actions(cfg)
                .into_iter()
                .filter(|action| !blocked_actions.contains(&action.stable_key()))
                .collect::<Vec<_>>();
            if candidates.is_empty() {
                status = Some(RunStatus::NoLegalAction);
                break;
            }

            let step_started = Instant::now();
            let (action, mut search) = if cfg.rollouts_per_action == 0 || candidates.len() == 1 {
                pick_greedy(&sim, &candidates)
            } else {
                select_action_rollouts(
                    factory,
                    &history,
                    step,
                    request,
                    &candidates,
                    &mut rng,
                )?
            };
            search.elapsed_ms = step_started.elapsed().as_millis() as u64;
            total_rollouts = total_rollouts.saturating_add(search.rollouts as u64);

            let stage_before = sim.stage_name();
            let fighting = sim.run.battle_in_progress();
            let action_detail = sim.describe_action(&action);
            match sim.apply_action(&action) {
                Ok(event_count) => {
                    let after = sim.metrics();
                    let won_battle = fighting
                        && sim.run.battle.as_ref().and_then(|battle| battle.outcome())
                            == Some(BattleOutcome::Victory);
                    if won_battle {
                        battles_won += 1;
                    }
                    records.push(StepRecord {
                        step,
                        stage_before,
                        day_before: before.day,
                        health_before: before.health,
                        zenny_before: before.zenny,
                        enemy_health_before: before.enemy_health,
                        action: action.clone(),
                        action_detail,
                        search,
                        stage_after: sim.stage_name(),
                        day_after: after.day,
                        health_after: after.health,
                        zenny_after: after.zenny,
                        enemy_health_after: after.enemy_health,
                        event_count,
                    });
                    history.push(action);
                    committed = true;
                    break;
                }
                Err(err) => {
                    if !is_recoverable_action_error(&err) {
                        return Err(err);
                    }
                    blocked_actions.insert(action.stable_key());
                    sim = materialize(factory, &history, &[])?;
                }
            }
        }

        if !committed {
            status.get_or_insert(RunStatus::NoLegalAction);
            break;
        }
    }
    if status.is_none() {
        status = finished_status(&sim, request.targets);
    }

    let metrics = sim.metrics();
    Ok(AutoplayResult {
        seed: cfg.seed,
        status: status.unwrap_or(RunStatus::MaxSteps),
        final_metrics: FinalMetrics {
            day: metrics.day,
            stage: sim.stage_name(),
            health: metrics.health,
            max_health: metrics.max_health,
            zenny: metrics.zenny,
            banked: metrics.banked,
        },
        steps: records,
        summary: SummaryStats {
            steps: history.len() as u32,
            battles_won,
            total_rollouts,
            wall_time_ms: started_at.elapsed().as_millis() as u64,
        },
    })
}

fn finished_status(sim: &Simulator, targets: TargetConfig) -> Option<RunStatus> {
    let metrics = sim.metrics();
    if target_reached(metrics, targets) {
        Some(RunStatus::TargetReached)
    } else if metrics.won {
        Some(RunStatus::Won)
    } else if metrics.defeated && targets.stop_on_defeat {
        Some(RunStatus::Defeated)
    } else {
        None
    }
}

fn pick_greedy(sim: &Simulator, candidates: &[AutoAction]) -> (AutoAction, StepSearchStats) {
    let mut best = (candidates[0].clone(), f64::NEG_INFINITY);
    for action in candidates {
        let score = action_score(action, sim);
        if score > best.1 {
            best = (action.clone(), score);
        }
    }
    let stats = StepSearchStats {
        rollouts: 0,
        elapsed_ms: 0,
        candidates: candidates.len(),
        selected_value: best.1,
    };
    (best.0, stats)
}

/// Flat Monte Carlo: score every candidate by the mean objective reached
/// after a handful of short pilot-guided rollouts.
fn select_action_rollouts<F>(
    factory: &F,
    history: &[AutoAction],
    step: u32,
    request: &AutoplayRequest,
    candidates: &[AutoAction],
    rng: &mut SimpleRng,
) -> Result<(AutoAction, StepSearchStats), AutoplayError>
where
    F: Fn() -> Result<Simulator, AutoplayError>,
{
    let cfg = &request.config;
    let mut best: Option<(AutoAction, f64)> = None;
    let mut rollouts = 0u32;
    for action in candidates {
        let mut total = 0.0;
        let mut samples = 0u32;
        for _ in 0..cfg.rollouts_per_action {
            let mut sim = match materialize(factory, history, std::slice::from_ref(action)) {
                Ok(sim) => sim,
                Err(err) if is_recoverable_action_error(&err) => break,
                Err(err) => return Err(err),
            };
            total += rollout(&mut sim, step + 1, request, rng)?;
            samples += 1;
        }
        rollouts += samples;
        if samples == 0 {
            continue;
        }
        let mean = total / samples as f64;
        if best.as_ref().map_or(true, |(_, top)| mean > *top) {
            best = Some((action.clone(), mean));
        }
    }

    let Some((action, value)) = best else {
        return Ok(pick_greedy(&materialize(factory, history, &[])?, candidates));
    };
    Ok((
        action,
        StepSearchStats {
            rollouts,
            elapsed_ms: 0,
            candidates: candidates.len(),
            selected_value: value,
        },
    ))
}

fn materialize<F>(
    factory: &F,
    history: &[AutoAction],
    path: &[AutoAction],
) -> Result<Simulator, AutoplayError>
where
    F: Fn() -> Result<Simulator, AutoplayError>,
{
    let mut sim = factory()?;
    for action in history.iter().chain(path) {
        sim.apply_action(action)?;
    }
    Ok(sim)
}

fn rollout(
    sim: &mut Simulator,
    step: u32,
    request: &AutoplayRequest,
    rng: &mut SimpleRng,
) -> Result<f64, AutoplayError> {
    let cfg = &request.config;
    let mut depth = 0u32;
    loop {
        let metrics = sim.metrics();
        let total_steps = step.saturating_add(depth);
        if depth >= cfg.rollout_depth
            || total_steps >= cfg.max_steps
            || finished_status(sim, request.targets).is_some()
        {
            return Ok(weighted_score(metrics, request.weights, total_steps));
        }

        let mut legal = sim.legal_actions(cfg);
        let mut applied = false;
        while !legal.is_empty() {
            let action = select_rollout_action(&legal, sim, rng, cfg.rollout_top_k);
            match sim.apply_action(&action) {
                Ok(_) => {
                    applied = true;
                    break;
                }
                Err(err) if is_recoverable_action_error(&err) => {
                    let key = action.stable_key();
                    legal.retain(|item| item.stable_key() != key);
                }
                Err(err) => return Err(err),
            }
        }
        if !applied {
            return Ok(weighted_score(metrics, request.weights, total_steps));
        }
        depth += 1;
    }
}

/// Weighted pick among the `top_k` best actions by pilot score.
fn select_rollout_action(
    actions: &[AutoAction],
    sim: &Simulator,
    rng: &mut SimpleRng,
    top_k: usize,
) -> AutoAction {
    let mut scored: Vec<(f64, String, &AutoAction)> = actions
        .iter()
        .map(|action| (action_score(action, sim), action.stable_key(), action))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let limit = scored.len().min(top_k.max(1));
    if limit == 1 {
        return scored[0].2.clone();
    }

    let min_score = scored[..limit]
        .iter()
        .map(|item| item.0)
        .fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = scored[..limit]
        .iter()
        .map(|item| (item.0 - min_score + 0.15).max(0.01))
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut pick = rng.gen_unit_f64() * total_weight;
    for (idx, weight) in weights.into_iter().enumerate() {
        if pick <= weight {
            return scored[idx].2.clone();
        }
        pick -= weight;
    }
    scored[0].2.clone()
}

fn is_recoverable_action_error(err: &AutoplayError) -> bool {
    matches!(err, AutoplayError::Run(_) | AutoplayError::InvalidAction(_))
}
