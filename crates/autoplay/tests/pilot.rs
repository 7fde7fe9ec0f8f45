use gemfire_autoplay::{
    run_autoplay, target_reached, weighted_score, write_json, write_text, AutoAction,
    AutoplayConfig, AutoplayError, AutoplayRequest, AutoplayResult, EvalMetrics,
    ObjectiveWeights, RunStatus, Simulator, TargetConfig,
};
use gemfire_core::{Catalog, GameConfig, PlayerClass, Stage};
use std::collections::HashSet;

fn metrics(day: u32, zenny: i64, banked: i64) -> EvalMetrics {
    EvalMetrics {
        day,
        phase_index: 0,
        health: 30,
        max_health: 40,
        zenny,
        banked,
        enemy_health: None,
        defeated: false,
        won: false,
    }
}

macro_rules! target_case {
    ($name:ident, $day:expr, $zenny:expr, $banked:expr, $t_day:expr, $t_zenny:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let target = TargetConfig {
                target_day: $t_day,
                target_zenny: $t_zenny,
                stop_on_defeat: true,
            };
            assert_eq!(target_reached(metrics($day, $zenny, $banked), target), $expected);
        }
    };
}

target_case!(no_target_is_never_reached, 9, 500, 0, None, None, false);
target_case!(day_target_met, 3, 0, 0, Some(3), None, true);
target_case!(day_target_short, 2, 0, 0, Some(3), None, false);
target_case!(zenny_target_counts_bank, 1, 10, 30, None, Some(40), true);
target_case!(zenny_target_short, 1, 10, 29, None, Some(40), false);
target_case!(both_targets_needed, 4, 10, 0, Some(3), Some(40), false);
target_case!(both_targets_met, 4, 50, 0, Some(3), Some(40), true);

#[test]
fn score_prefers_progress_and_health() {
    let weights = ObjectiveWeights::default();
    let early = weighted_score(metrics(1, 0, 0), weights, 10);
    let later = weighted_score(metrics(2, 0, 0), weights, 10);
    assert!(later > early);

    let mut hurt = metrics(1, 0, 0);
    hurt.health = 5;
    assert!(weighted_score(hurt, weights, 10) < early);

    let mut dead = metrics(1, 0, 0);
    dead.defeated = true;
    assert!(weighted_score(dead, weights, 10) < weighted_score(hurt, weights, 10));
}

#[test]
fn open_enemy_health_lowers_the_score() {
    let weights = ObjectiveWeights::default();
    let mut fighting = metrics(1, 0, 0);
    fighting.enemy_health = Some(20);
    let mut nearly = fighting;
    nearly.enemy_health = Some(2);
    assert!(weighted_score(nearly, weights, 0) > weighted_score(fighting, weights, 0));
}

#[test]
fn stable_keys_are_unique_per_action() {
    let actions = vec![
        AutoAction::StartBattle,
        AutoAction::Wait,
        AutoAction::Flee,
        AutoAction::EnemyTurn,
        AutoAction::BuyOffer { index: 0 },
        AutoAction::BuyOffer { index: 1 },
        AutoAction::BuyHeal,
        AutoAction::LeaveShop,
        AutoAction::Rest,
        AutoAction::Bank { amount: 5 },
        AutoAction::UnlockGem {
            gem: "red-heavy-attack".to_string(),
        },
        AutoAction::LeaveCamp,
    ];
    let keys: HashSet<String> = actions.iter().map(AutoAction::stable_key).collect();
    assert_eq!(keys.len(), actions.len());
}

fn factory(seed: u64) -> impl Fn() -> Result<Simulator, AutoplayError> {
    move || {
        let cfg = AutoplayConfig {
            seed,
            ..AutoplayConfig::default()
        };
        Simulator::from_config(GameConfig::default(), Catalog::builtin(), &cfg)
    }
}

fn greedy_request(seed: u64) -> AutoplayRequest {
    AutoplayRequest {
        config: AutoplayConfig {
            seed,
            max_steps: 300,
            rollouts_per_action: 0,
            ..AutoplayConfig::default()
        },
        ..AutoplayRequest::default()
    }
}

#[test]
fn greedy_pilot_keeps_run_invariants() {
    let cfg = AutoplayConfig::default();
    for seed in [1u64, 7, 42, 99, 1234] {
        let mut sim = factory(seed)().expect("sim");
        let start_total = sim.run.inventory.total() as i64;
        let mut bought = 0i64;
        let mut removed = 0i64;
        for _ in 0..400 {
            let Some(action) = sim.greedy_action(&cfg) else {
                break;
            };
            sim.apply_action(&action)
                .unwrap_or_else(|err| panic!("seed {seed}: {action:?} failed: {err}"));
            match action {
                AutoAction::BuyOffer { .. } => bought += 1,
                AutoAction::RemoveGem { .. } => removed += 1,
                _ => {}
            }

            let run = &sim.run;
            assert!((0..=run.player.max_health).contains(&run.player.health));
            assert!(run.player.stamina <= run.player.max_stamina);
            assert!(run.player.zenny >= 0, "seed {seed}: negative zenny");
            assert!(run.meta.zenny >= 0);
            assert_eq!(
                run.inventory.total() as i64,
                start_total + bought - removed,
                "seed {seed}"
            );
            let mut seen = HashSet::new();
            for gem in run.inventory.iter() {
                assert!(seen.insert(gem.id), "seed {seed}: duplicate {}", gem.id);
            }
        }
        assert!(sim.run.day >= 1);
    }
}

#[test]
fn finished_runs_offer_no_actions() {
    let mut sim = factory(3)().expect("sim");
    sim.run.stage = Stage::GameOver;
    assert!(sim.legal_actions(&AutoplayConfig::default()).is_empty());
    assert!(sim.greedy_action(&AutoplayConfig::default()).is_none());
}

#[test]
fn same_seed_same_run() {
    let request = greedy_request(77);
    let first = run_autoplay(&factory(77), &request).expect("first");
    let second = run_autoplay(&factory(77), &request).expect("second");

    let actions = |result: &AutoplayResult| {
        result
            .steps
            .iter()
            .map(|step| step.action.stable_key())
            .collect::<Vec<_>>()
    };
    assert_eq!(actions(&first), actions(&second));
    assert_eq!(first.status, second.status);
    assert_eq!(first.final_metrics.day, second.final_metrics.day);
    assert_eq!(first.final_metrics.zenny, second.final_metrics.zenny);
}

#[test]
fn greedy_run_ends_with_a_terminal_status() {
    let result = run_autoplay(&factory(5), &greedy_request(5)).expect("run");
    assert!(result.steps.len() <= 300);
    assert_eq!(result.summary.steps as usize, result.steps.len());
    assert_eq!(result.summary.total_rollouts, 0);
    match result.status {
        RunStatus::Defeated => assert!(result.final_metrics.health <= 0),
        RunStatus::Won => assert_eq!(result.final_metrics.stage, "won"),
        RunStatus::MaxSteps => assert_eq!(result.steps.len(), 300),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn day_target_stops_the_run() {
    let mut request = greedy_request(11);
    request.targets.target_day = Some(2);
    let result = run_autoplay(&factory(11), &request).expect("run");
    if result.status == RunStatus::TargetReached {
        assert!(result.final_metrics.day >= 2);
        let last = result.steps.last().expect("steps");
        assert!(last.day_after >= 2);
    }
}

#[test]
fn rollout_search_spends_rollouts() {
    let request = AutoplayRequest {
        config: AutoplayConfig {
            seed: 21,
            max_steps: 12,
            rollouts_per_action: 2,
            rollout_depth: 4,
            ..AutoplayConfig::default()
        },
        ..AutoplayRequest::default()
    };
    let result = run_autoplay(&factory(21), &request).expect("run");
    assert!(result.steps.len() <= 12);
    assert!(result.summary.total_rollouts > 0);
    assert_eq!(result.steps[0].action, AutoAction::StartBattle);
}

#[test]
fn reports_are_written() {
    let result = run_autoplay(&factory(8), &greedy_request(8)).expect("run");
    let dir = tempfile::tempdir().expect("tempdir");
    let json = dir.path().join("out").join("run.json");
    let text = dir.path().join("out").join("run.txt");

    write_json(&json, &result).expect("json");
    write_text(&text, &result).expect("text");

    let decoded: AutoplayResult =
        serde_json::from_str(&std::fs::read_to_string(&json).expect("read")).expect("decode");
    assert_eq!(decoded.steps.len(), result.steps.len());
    let report = std::fs::read_to_string(&text).expect("read");
    assert!(report.starts_with("seed: 8"));
    assert!(report.contains("step    0 | start battle"));
}

#[test]
fn other_classes_can_be_piloted() {
    for class in [PlayerClass::Mage, PlayerClass::Rogue] {
        let build = move || {
            let cfg = AutoplayConfig {
                class,
                ..AutoplayConfig::default()
            };
            Simulator::from_config(GameConfig::default(), Catalog::builtin(), &cfg)
        };
        let mut request = greedy_request(4);
        request.config.class = class;
        request.config.max_steps = 60;
        let result = run_autoplay(&build, &request).expect("run");
        assert!(!result.steps.is_empty());
    }
}
