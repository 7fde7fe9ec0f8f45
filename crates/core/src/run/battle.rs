use super::*;
use crate::*;

impl RunState {
    /// Begin the encounter for the current day and phase.
    pub fn start_battle(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_stage(Stage::Battle, "no encounter is pending")?;
        let enemy = self
            .catalog
            .spawn_enemy(self.day, self.phase, self.config.progression.scaling_per_day)
            .ok_or(RunError::NoTarget)?;
        self.player.buffs.clear();
        self.player.stamina = self.player.max_stamina;
        events.push(Event::BattleStarted {
            day: self.day,
            phase: self.phase,
            enemy: enemy.name.clone(),
            health: enemy.health,
            boss: enemy.boss,
        });
        tracing::debug!(
            day = self.day,
            phase = ?self.phase,
            enemy = %enemy.name,
            "battle.started"
        );
        let mut battle = Battle::new(enemy);
        battle.enemy.next_action =
            determine_next_action(&battle.enemy, &self.config.ai, &mut self.rng);
        events.push(Event::EnemyActionChosen {
            action: battle.enemy.next_action.clone(),
        });
        self.battle = Some(battle);
        self.draw_hand(events);
        Ok(())
    }

    pub(super) fn battle_ref(&self) -> Result<&Battle, RunError> {
        self.battle
            .as_ref()
            .filter(|battle| battle.in_progress())
            .ok_or(RunError::InvalidEncounterContext("no battle in progress"))
    }

    pub(super) fn battle_mut(&mut self) -> Result<&mut Battle, RunError> {
        self.battle
            .as_mut()
            .filter(|battle| battle.in_progress())
            .ok_or(RunError::InvalidEncounterContext("no battle in progress"))
    }

    fn require_player_turn(&self) -> Result<&Battle, RunError> {
        let battle = self.battle_ref()?;
        if battle.turn != Turn::Player {
            return Err(RunError::InvalidEncounterContext("not the player's turn"));
        }
        Ok(battle)
    }

    /// Play `ids` from the hand. The gems resolve in the given order; once a
    /// combatant falls the rest are spent without effect.
    pub fn play_gems(
        &mut self,
        ids: &[GemInstanceId],
        events: &mut EventBus,
    ) -> Result<Option<BattleOutcome>, RunError> {
        let battle = self.require_player_turn()?;
        if !battle.enemy.is_alive() || !self.player.is_alive() {
            return Err(RunError::NoTarget);
        }
        let before = self.player.stamina;
        let played = self.inventory.play(ids, &mut self.player.stamina)?;
        let spent = before - self.player.stamina;
        self.battle_mut()?.stamina_spent_this_turn += spent;

        for gem in played {
            if let Some(outcome) = self.resolve_gem(gem, events) {
                return Ok(Some(outcome));
            }
        }
        if self.player.stamina == 0
            && self.config.stamina.auto_end_when_exhausted
            && !self.has_free_gem_in_hand()
        {
            self.end_turn(events)?;
        }
        Ok(None)
    }

    fn has_free_gem_in_hand(&self) -> bool {
        self.inventory.hand().iter().any(|gem| gem.cost() == 0)
    }

    /// Apply one played gem. Returns the outcome if it ended the battle.
    pub(super) fn resolve_gem(
        &mut self,
        gem: GemInstance,
        events: &mut EventBus,
    ) -> Option<BattleOutcome> {
        let rule = self.config.combat.clone();
        let value = {
            let enemy = self.battle.as_ref().map(|battle| &battle.enemy);
            gem_value(&gem.def, &self.player, enemy, &rule)
        };
        let threshold = success_threshold(gem.mastery, &self.player);
        let success = self.rng.roll_percent() < threshold;
        events.push(Event::GemPlayed {
            instance: gem.id,
            gem: gem.def.id.clone(),
            success,
        });
        if !success {
            self.apply_failure_effect(value, events);
            return self.check_battle_end(events);
        }

        match gem.def.kind {
            GemKind::Attack => {
                let piercing = piercing_of(&gem.def, &rule);
                self.strike_enemy(value, piercing, events);
                self.apply_parry(value, events);
            }
            GemKind::Heal => {
                let amount = self.player.heal(value);
                events.push(Event::Healed {
                    target: Actor::Player,
                    amount,
                    health: self.player.health,
                });
            }
            GemKind::Shield => {
                let turns = gem_duration(&gem.def, &rule);
                self.apply_status(
                    Actor::Player,
                    StatusEffect::new(StatusKind::Defense, value, turns),
                    events,
                );
            }
            GemKind::Poison => {
                let turns = gem_duration(&gem.def, &rule);
                self.apply_status(
                    Actor::Enemy,
                    StatusEffect::new(StatusKind::Poison, value, turns),
                    events,
                );
            }
        }
        self.record_mastery(&gem.def, events);
        if let Some(outcome) = self.check_battle_end(events) {
            return Some(outcome);
        }
        match gem.def.special {
            Some(SpecialEffect::DrawExtra) => {
                let report = self.inventory.draw(1, &mut self.rng);
                if report.recycled > 0 {
                    events.push(Event::DiscardRecycled {
                        count: report.recycled,
                    });
                }
                if report.drawn > 0 {
                    events.push(Event::HandDrawn {
                        count: report.drawn,
                    });
                }
            }
            Some(SpecialEffect::Stun) => self.apply_status(
                Actor::Enemy,
                StatusEffect::new(StatusKind::Stunned, 1, rule.special_stun_turns),
                events,
            ),
            Some(SpecialEffect::Focus) => self.apply_status(
                Actor::Player,
                StatusEffect::new(StatusKind::Focus, rule.focus_magnitude, rule.focus_turns),
                events,
            ),
            None => {}
        }
        None
    }

    fn apply_failure_effect(&mut self, intended: i32, events: &mut EventBus) {
        let rule = &self.config.mastery;
        let amount = failure_damage(intended, rule);
        let stun_chance = rule.failure_stun_chance;
        let stun_turns = rule.failure_stun_turns;
        let lost = self.player.take_damage(amount);
        events.push(Event::DamageDealt {
            source: Actor::Player,
            target: Actor::Player,
            amount: lost,
            absorbed: 0,
            health: self.player.health,
        });
        if self.rng.chance(stun_chance) {
            self.apply_status(
                Actor::Player,
                StatusEffect::new(StatusKind::Stunned, 1, stun_turns),
                events,
            );
        }
    }

    fn record_mastery(&mut self, def: &GemDef, events: &mut EventBus) {
        if let Some(level) = self.meta.record_success(def, &self.config.mastery) {
            self.inventory.set_mastery(def.mastery_key(), level);
            events.push(Event::MasteryImproved {
                gem: def.mastery_key().to_string(),
                mastery: level,
            });
        }
    }

    fn strike_enemy(&mut self, value: i32, piercing: Option<f64>, events: &mut EventBus) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        let absorption = absorb(value, &battle.enemy.buffs, piercing);
        let lost = battle.enemy.take_damage(absorption.damage);
        events.push(Event::DamageDealt {
            source: Actor::Player,
            target: Actor::Enemy,
            amount: lost,
            absorbed: absorption.absorbed,
            health: battle.enemy.health,
        });
    }

    /// Reflect part of an attack back at the player when the enemy parries.
    /// Runs after the hit and before the defeat check.
    fn apply_parry(&mut self, value: i32, events: &mut EventBus) {
        let percent = match self.battle.as_ref() {
            Some(battle) => battle.enemy.buffs.magnitude(StatusKind::Parrying),
            None => return,
        };
        if percent <= 0 {
            return;
        }
        let amount = reflected(value, percent);
        if amount == 0 {
            return;
        }
        let lost = self.player.take_damage(amount);
        events.push(Event::DamageReflected {
            amount: lost,
            health: self.player.health,
        });
    }

    pub(super) fn apply_status(&mut self, target: Actor, effect: StatusEffect, events: &mut EventBus) {
        let held = match target {
            Actor::Player => self.player.buffs.apply(effect),
            Actor::Enemy => match self.battle.as_mut() {
                Some(battle) => battle.enemy.buffs.apply(effect),
                None => return,
            },
        };
        events.push(Event::StatusApplied {
            target,
            kind: held.kind,
            magnitude: held.magnitude,
            turns: held.duration.turns(),
        });
    }

    /// Player defeat is checked first, so a reflected blow that kills the
    /// player loses the battle even if the enemy fell too.
    pub(super) fn check_battle_end(&mut self, events: &mut EventBus) -> Option<BattleOutcome> {
        let enemy_alive = self.battle.as_ref()?.enemy.is_alive();
        let outcome = if !self.player.is_alive() {
            BattleOutcome::Defeat
        } else if !enemy_alive {
            BattleOutcome::Victory
        } else {
            return None;
        };
        self.finish_battle(outcome, events);
        Some(outcome)
    }

    pub(super) fn finish_battle(&mut self, outcome: BattleOutcome, events: &mut EventBus) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        battle.turn = Turn::Over(outcome);
        let reward = match outcome {
            BattleOutcome::Victory => battle.enemy.reward,
            _ => 0,
        };
        self.player.buffs.clear();
        match outcome {
            BattleOutcome::Victory => {
                self.player.zenny = self.player.zenny.saturating_add(reward);
                events.push(Event::Victory {
                    reward,
                    zenny: self.player.zenny,
                });
            }
            BattleOutcome::Defeat => events.push(Event::Defeat),
            BattleOutcome::Fled => events.push(Event::Fled),
        }
        events.push(Event::BattleOver { outcome });
        tracing::debug!(outcome = ?outcome, day = self.day, phase = ?self.phase, "battle.over");

        let report = BattleReport {
            outcome,
            day: self.day,
            phase: self.phase,
            reward,
        };
        let stage = self.progression.on_battle_end(&report);
        self.enter_stage(stage, events);
    }

    fn enter_stage(&mut self, stage: Stage, events: &mut EventBus) {
        self.stage = stage;
        match stage {
            Stage::Shop => self.open_shop(events),
            Stage::Camp => {
                self.camp_rested = false;
                events.push(Event::CampEntered { day: self.day });
            }
            Stage::GameOver => events.push(Event::RunLost {
                day: self.day,
                phase: self.phase,
            }),
            Stage::Won => events.push(Event::RunWon { day: self.day }),
            Stage::Battle => {}
        }
    }

    /// End the player's turn; the enemy acts next.
    pub fn end_turn(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_player_turn()?;
        let battle = self.battle_mut()?;
        let spent = battle.stamina_spent_this_turn;
        battle.turn = Turn::Enemy(EnemyStep::Act);
        events.push(Event::TurnEnded {
            stamina_spent: spent,
        });
        Ok(())
    }

    /// Pass without playing anything.
    pub fn wait(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.end_turn(events)
    }

    /// Return the chosen hand gems to the bag and end the turn. Ids not in
    /// the hand are ignored.
    pub fn discard_and_end(
        &mut self,
        ids: &[GemInstanceId],
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_player_turn()?;
        let moved = self.inventory.discard(ids, &mut self.rng);
        if moved > 0 {
            events.push(Event::DiscardRecycled { count: moved });
        }
        self.end_turn(events)
    }

    /// Leave a non-boss battle with no reward. The hand is kept.
    pub fn flee(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        let battle = self.require_player_turn()?;
        if battle.boss {
            return Err(RunError::InvalidEncounterContext("cannot flee a boss encounter"));
        }
        self.finish_battle(BattleOutcome::Fled, events);
        Ok(())
    }
}
