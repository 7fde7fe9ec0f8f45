use crate::{AutoAction, AutoplayError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStatus {
    TargetReached,
    Won,
    Defeated,
    MaxSteps,
    NoLegalAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSearchStats {
    pub rollouts: u32,
    pub elapsed_ms: u64,
    pub candidates: usize,
    pub selected_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u32,
    pub stage_before: String,
    pub day_before: u32,
    pub health_before: i32,
    pub zenny_before: i64,
    #[serde(default)]
    pub enemy_health_before: Option<i32>,
    pub action: AutoAction,
    #[serde(default)]
    pub action_detail: Option<String>,
    pub search: StepSearchStats,
    pub stage_after: String,
    pub day_after: u32,
    pub health_after: i32,
    pub zenny_after: i64,
    #[serde(default)]
    pub enemy_health_after: Option<i32>,
    pub event_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalMetrics {
    pub day: u32,
    pub stage: String,
    pub health: i32,
    pub max_health: i32,
    pub zenny: i64,
    pub banked: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub steps: u32,
    pub battles_won: u32,
    pub total_rollouts: u64,
    pub wall_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoplayResult {
    pub seed: u64,
    pub status: RunStatus,
    pub final_metrics: FinalMetrics,
    pub steps: Vec<StepRecord>,
    pub summary: SummaryStats,
}

impl AutoplayResult {
    pub fn to_text_report(&self) -> String {
        let metrics = &self.final_metrics;
        let mut lines = vec![
            format!("seed: {}", self.seed),
            format!("status: {}", run_status_label(self.status)),
            format!(
                "final: day={} stage={} health={}/{} zenny={} banked={}",
                metrics.day,
                metrics.stage,
                metrics.health,
                metrics.max_health,
                metrics.zenny,
                metrics.banked
            ),
            format!(
                "summary: steps={} battles_won={} rollouts={} wall_ms={}",
                self.summary.steps,
                self.summary.battles_won,
                self.summary.total_rollouts,
                self.summary.wall_time_ms
            ),
            String::new(),
            "steps:".to_string(),
        ];
        for step in &self.steps {
            lines.push(format!(
                "  step {:>4} | {}",
                step.step,
                step.action.short_label()
            ));
            lines.push(format!(
                "    state: {} day {} health {} zenny {}{}",
                step.stage_before,
                step.day_before,
                step.health_before,
                step.zenny_before,
                enemy_suffix(step.enemy_health_before)
            ));
            lines.push(format!(
                "      -> {} day {} health {} zenny {}{}",
                step.stage_after,
                step.day_after,
                step.health_after,
                step.zenny_after,
                enemy_suffix(step.enemy_health_after)
            ));
            if step.search.rollouts > 0 {
                lines.push(format!(
                    "    search: rollouts={} candidates={} value={:.2} elapsed={}ms",
                    step.search.rollouts,
                    step.search.candidates,
                    step.search.selected_value,
                    step.search.elapsed_ms
                ));
            }
            lines.push(format!("    events: {}", step.event_count));
            if let Some(detail) = step.action_detail.as_ref() {
                lines.push(format!("    action: {detail}"));
            }
        }
        lines.join("\n")
    }
}

fn enemy_suffix(health: Option<i32>) -> String {
    health
        .map(|value| format!(" enemy {value}"))
        .unwrap_or_default()
}

fn run_status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::TargetReached => "target reached",
        RunStatus::Won => "won",
        RunStatus::Defeated => "defeated",
        RunStatus::MaxSteps => "max steps",
        RunStatus::NoLegalAction => "no legal action",
    }
}

pub fn write_json(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(result)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, result.to_text_report())?;
    Ok(())
}
