use crate::{BattleOutcome, DayPhase, Stage};
use serde::{Deserialize, Serialize};

/// What the engine tells the progression layer when a battle ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub day: u32,
    pub phase: DayPhase,
    pub reward: i64,
}

/// Decides the next macro screen after a battle.
pub trait Progression: std::fmt::Debug {
    fn on_battle_end(&mut self, report: &BattleReport) -> Stage;
}

/// Dawn and dusk wins lead to the shop, a dark win to camp, a loss ends
/// the run. Beating the dark encounter of `final_day` wins it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardProgression {
    pub final_day: Option<u32>,
}

impl StandardProgression {
    pub fn new(final_day: Option<u32>) -> Self {
        Self { final_day }
    }
}

impl Progression for StandardProgression {
    fn on_battle_end(&mut self, report: &BattleReport) -> Stage {
        match report.outcome {
            BattleOutcome::Defeat => Stage::GameOver,
            BattleOutcome::Fled | BattleOutcome::Victory if report.phase != DayPhase::Dark => {
                Stage::Shop
            }
            BattleOutcome::Fled => Stage::Camp,
            BattleOutcome::Victory => {
                if self.final_day.is_some_and(|last| report.day >= last) {
                    Stage::Won
                } else {
                    Stage::Camp
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: BattleOutcome, day: u32, phase: DayPhase) -> BattleReport {
        BattleReport {
            outcome,
            day,
            phase,
            reward: 0,
        }
    }

    macro_rules! stage_case {
        ($name:ident, $outcome:expr, $day:expr, $phase:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let mut progression = StandardProgression::new(Some(3));
                assert_eq!(
                    progression.on_battle_end(&report($outcome, $day, $phase)),
                    $expected
                );
            }
        };
    }

    stage_case!(dawn_win_shops, BattleOutcome::Victory, 1, DayPhase::Dawn, Stage::Shop);
    stage_case!(dusk_flee_shops, BattleOutcome::Fled, 1, DayPhase::Dusk, Stage::Shop);
    stage_case!(dark_win_camps, BattleOutcome::Victory, 2, DayPhase::Dark, Stage::Camp);
    stage_case!(final_dark_win_wins, BattleOutcome::Victory, 3, DayPhase::Dark, Stage::Won);
    stage_case!(loss_ends_run, BattleOutcome::Defeat, 1, DayPhase::Dawn, Stage::GameOver);
}
