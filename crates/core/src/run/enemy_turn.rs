use super::*;
use crate::*;

impl RunState {
    fn require_enemy_step(&self, step: EnemyStep) -> Result<(), RunError> {
        let battle = self.battle_ref()?;
        if battle.turn != Turn::Enemy(step) {
            return Err(RunError::InvalidEncounterContext("enemy step out of order"));
        }
        Ok(())
    }

    fn set_turn(&mut self, turn: Turn) {
        if let Some(battle) = self.battle.as_mut() {
            if battle.in_progress() {
                battle.turn = turn;
            }
        }
    }

    /// Run whatever is left of the current enemy turn, stopping early if the
    /// battle ends. Returns the turn the battle is on afterwards.
    pub fn run_enemy_turn(&mut self, events: &mut EventBus) -> Result<Turn, RunError> {
        let mut turn = self.battle_ref()?.turn;
        if !matches!(turn, Turn::Enemy(_)) {
            return Err(RunError::InvalidEncounterContext("not the enemy's turn"));
        }
        while let Turn::Enemy(step) = turn {
            match step {
                EnemyStep::Act => self.enemy_act(events)?,
                EnemyStep::Tick => self.enemy_tick(events)?,
                EnemyStep::Plan => self.enemy_plan(events)?,
                EnemyStep::Finalize => {
                    self.enemy_finalize(events)?;
                    return self.current_turn().ok_or(RunError::NoTarget);
                }
            }
            turn = self.current_turn().ok_or(RunError::NoTarget)?;
        }
        Ok(turn)
    }

    pub fn current_turn(&self) -> Option<Turn> {
        self.battle.as_ref().map(|battle| battle.turn)
    }

    /// Step 1: the enemy carries out its queued action, or the ultimate on
    /// the turn its phase threshold is crossed. Stunned enemies do nothing
    /// and keep the queued action.
    pub fn enemy_act(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_enemy_step(EnemyStep::Act)?;
        let ai = self.config.ai.clone();
        let battle = self.battle_mut()?;
        battle.enemy.turn_counter += 1;
        if battle.enemy.buffs.has(StatusKind::Stunned) {
            battle.action_consumed = false;
            events.push(Event::TurnSkipped {
                actor: Actor::Enemy,
            });
            self.set_turn(Turn::Enemy(EnemyStep::Tick));
            return Ok(());
        }

        let action = if battle.enemy.phase_due() {
            let enemy = &mut battle.enemy;
            enemy.phase_triggered = true;
            let bonus = (enemy.attack as f64 * ai.phase_attack_bonus).ceil() as i32;
            enemy.attack = enemy.attack.saturating_add(bonus.max(0));
            enemy
                .buffs
                .apply(StatusEffect::permanent(StatusKind::Empowered, bonus.max(0)));
            events.push(Event::EnemyPhaseShift {
                attack: enemy.attack,
            });
            battle.action_consumed = false;
            EnemyAction::Known(EnemyActionKind::Ultimate)
        } else {
            battle.action_consumed = true;
            battle.enemy.next_action.clone()
        };
        let had_minion = battle.enemy.buffs.has(StatusKind::Minion);
        events.push(Event::EnemyActed {
            action: action.clone(),
        });

        let kind = match action.kind() {
            Some(kind) => kind,
            None => {
                tracing::warn!(action = %action, "enemy.action.fallback_attack");
                EnemyActionKind::Attack
            }
        };
        if self.execute_enemy_action(kind, &ai, events).is_some() {
            return Ok(());
        }
        if had_minion && self.minion_strike(events).is_some() {
            return Ok(());
        }
        self.set_turn(Turn::Enemy(EnemyStep::Tick));
        Ok(())
    }

    fn execute_enemy_action(
        &mut self,
        kind: EnemyActionKind,
        ai: &AiRule,
        events: &mut EventBus,
    ) -> Option<BattleOutcome> {
        let effect = {
            let enemy = &self.battle.as_ref()?.enemy;
            action_effect(kind, enemy, ai)
        };

        if let Some(base) = effect.damage {
            let ritual = self
                .battle
                .as_mut()
                .and_then(|battle| battle.enemy.buffs.remove(StatusKind::Ritual))
                .map(|held| held.magnitude.max(0))
                .unwrap_or(0);
            let absorption = absorb(base.saturating_add(ritual), &self.player.buffs, None);
            let lost = self.player.take_damage(absorption.damage);
            events.push(Event::DamageDealt {
                source: Actor::Enemy,
                target: Actor::Player,
                amount: lost,
                absorbed: absorption.absorbed,
                health: self.player.health,
            });
            if let Some(outcome) = self.check_battle_end(events) {
                return Some(outcome);
            }
        }
        if effect.stun_chance > 0.0 && self.rng.chance(effect.stun_chance) {
            self.apply_status(
                Actor::Player,
                StatusEffect::new(StatusKind::Stunned, 1, ai.stun_turns),
                events,
            );
        }
        if let Some(status) = effect.player_status {
            self.apply_status(Actor::Player, status, events);
        }
        if let Some(status) = effect.self_status {
            self.apply_status(Actor::Enemy, status, events);
        }
        let battle = self.battle.as_mut()?;
        if effect.heal > 0 {
            let amount = battle.enemy.heal(effect.heal);
            events.push(Event::Healed {
                target: Actor::Enemy,
                amount,
                health: battle.enemy.health,
            });
        }
        if effect.enrage > 0 {
            battle.enemy.attack = battle.enemy.attack.saturating_add(effect.enrage);
            events.push(Event::EnemyEnraged {
                attack: battle.enemy.attack,
            });
        }
        if effect.steal > 0 {
            let amount = effect.steal.min(self.player.zenny).max(0);
            self.player.zenny -= amount;
            events.push(Event::ZennyStolen {
                amount,
                zenny: self.player.zenny,
            });
        }
        None
    }

    fn minion_strike(&mut self, events: &mut EventBus) -> Option<BattleOutcome> {
        let power = self
            .battle
            .as_ref()?
            .enemy
            .buffs
            .magnitude(StatusKind::Minion);
        if power <= 0 {
            return None;
        }
        let absorption = absorb(power, &self.player.buffs, None);
        let lost = self.player.take_damage(absorption.damage);
        events.push(Event::DamageDealt {
            source: Actor::Enemy,
            target: Actor::Player,
            amount: lost,
            absorbed: absorption.absorbed,
            health: self.player.health,
        });
        self.check_battle_end(events)
    }

    /// Step 2: periodic effects, player first then enemy, each checked for
    /// defeat; then every duration drops by one and expired effects go.
    pub fn enemy_tick(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_enemy_step(EnemyStep::Tick)?;
        for target in [Actor::Player, Actor::Enemy] {
            let hits = match target {
                Actor::Player => self.player.buffs.periodic_hits(),
                Actor::Enemy => self.battle_ref()?.enemy.buffs.periodic_hits(),
            };
            for hit in hits {
                self.apply_periodic(target, hit, events);
                if self.check_battle_end(events).is_some() {
                    return Ok(());
                }
            }
        }

        for expired in self.player.buffs.decrement() {
            events.push(Event::StatusExpired {
                target: Actor::Player,
                kind: expired.kind,
            });
        }
        let battle = self.battle_mut()?;
        for expired in battle.enemy.buffs.decrement() {
            events.push(Event::StatusExpired {
                target: Actor::Enemy,
                kind: expired.kind,
            });
        }
        self.set_turn(Turn::Enemy(EnemyStep::Plan));
        Ok(())
    }

    fn apply_periodic(&mut self, target: Actor, hit: PeriodicHit, events: &mut EventBus) {
        let heal = hit.kind == StatusKind::Regeneration;
        let (amount, health) = match target {
            Actor::Player => {
                let amount = if heal {
                    self.player.heal(hit.amount)
                } else {
                    self.player.take_damage(hit.amount)
                };
                (amount, self.player.health)
            }
            Actor::Enemy => {
                let Some(battle) = self.battle.as_mut() else {
                    return;
                };
                let amount = if heal {
                    battle.enemy.heal(hit.amount)
                } else {
                    battle.enemy.take_damage(hit.amount)
                };
                (amount, battle.enemy.health)
            }
        };
        events.push(Event::StatusTicked {
            target,
            kind: hit.kind,
            amount,
        });
        if heal {
            events.push(Event::Healed {
                target,
                amount,
                health,
            });
        }
    }

    /// Step 3: choose what the enemy does next turn. A queued action that
    /// was skipped stays queued.
    pub fn enemy_plan(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_enemy_step(EnemyStep::Plan)?;
        let consumed = self.battle_ref()?.action_consumed;
        if consumed {
            let battle = self
                .battle
                .as_ref()
                .ok_or(RunError::InvalidEncounterContext("no battle in progress"))?;
            let next = determine_next_action(&battle.enemy, &self.config.ai, &mut self.rng);
            self.battle_mut()?.enemy.next_action = next;
        }
        let action = self.battle_ref()?.enemy.next_action.clone();
        events.push(Event::EnemyActionChosen { action });
        self.set_turn(Turn::Enemy(EnemyStep::Finalize));
        Ok(())
    }

    /// Step 4: hand control back to the player. Stamina recovers based on
    /// what was spent, the hand is topped up, and a stunned player's turn is
    /// skipped straight into the next enemy turn.
    pub fn enemy_finalize(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_enemy_step(EnemyStep::Finalize)?;
        let spent = self.battle_ref()?.stamina_spent_this_turn;
        let webbed = self.player.buffs.magnitude(StatusKind::Webbed).max(0) as u32;
        let recovery = self
            .config
            .stamina
            .recovery(self.player.max_stamina, spent, webbed);
        let amount = self.player.recover_stamina(recovery);
        events.push(Event::StaminaRecovered {
            amount,
            stamina: self.player.stamina,
        });
        {
            let battle = self.battle_mut()?;
            battle.stamina_spent_this_turn = 0;
            battle.round += 1;
            battle.turn = Turn::Player;
        }
        self.draw_hand(events);

        if self.player.buffs.has(StatusKind::Stunned) {
            events.push(Event::TurnSkipped {
                actor: Actor::Player,
            });
            events.push(Event::TurnEnded { stamina_spent: 0 });
            self.set_turn(Turn::Enemy(EnemyStep::Act));
        }
        Ok(())
    }
}
