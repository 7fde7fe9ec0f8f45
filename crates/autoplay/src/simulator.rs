use crate::{AutoAction, AutoplayConfig, AutoplayError, EvalMetrics};
use gemfire_core::{
    absorb, failure_damage, gem_duration, gem_value, piercing_of, success_threshold,
    Augmentation, Catalog, DayPhase, Event, EventBus, GameConfig, GemColor, GemInstance, GemKind,
    RunState, Stage, StatusKind, Turn,
};

#[derive(Debug)]
pub struct Simulator {
    pub run: RunState,
    pub events: EventBus,
}

impl Simulator {
    pub fn new(run: RunState) -> Self {
        Self {
            run,
            events: EventBus::default(),
        }
    }

    pub fn from_config(
        config: GameConfig,
        catalog: Catalog,
        cfg: &AutoplayConfig,
    ) -> Result<Self, AutoplayError> {
        let run = RunState::new(config, catalog, cfg.class, cfg.seed)
            .map_err(|err| AutoplayError::Factory(err.to_string()))?;
        Ok(Self::new(run))
    }

    pub fn metrics(&self) -> EvalMetrics {
        EvalMetrics {
            day: self.run.day,
            phase_index: match self.run.phase {
                DayPhase::Dawn => 0,
                DayPhase::Dusk => 1,
                DayPhase::Dark => 2,
            },
            health: self.run.player.health,
            max_health: self.run.player.max_health,
            zenny: self.run.player.zenny,
            banked: self.run.meta.zenny,
            enemy_health: self
                .run
                .battle
                .as_ref()
                .filter(|battle| battle.in_progress())
                .map(|battle| battle.enemy.health),
            defeated: self.run.stage == Stage::GameOver,
            won: self.run.stage == Stage::Won,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.run.stage, Stage::GameOver | Stage::Won)
    }

    pub fn stage_name(&self) -> String {
        match self.run.current_turn() {
            Some(turn) if self.run.battle_in_progress() => format!("battle/{turn:?}"),
            _ => format!("{:?}", self.run.stage).to_lowercase(),
        }
    }

    pub fn describe_action(&self, action: &AutoAction) -> Option<String> {
        match action {
            AutoAction::Play { ids } | AutoAction::Discard { ids } => {
                let names = ids
                    .iter()
                    .filter_map(|id| self.run.inventory.get(*id))
                    .map(|gem| format!("{} (mastery {})", gem.def.name, gem.mastery))
                    .collect::<Vec<_>>();
                Some(format!("gems: [{}]", names.join(", ")))
            }
            AutoAction::BuyOffer { index } => {
                let offer = self.run.shop.as_ref()?.offers.get(*index)?;
                Some(format!("buy {} for {}", offer.gem.name, offer.price))
            }
            AutoAction::RemoveGem { id } | AutoAction::UpgradeGem { id, .. } => {
                let gem = self.run.inventory.get(*id)?;
                Some(format!("gem: {}", gem.def.name))
            }
            AutoAction::EnemyTurn => {
                let battle = self.run.battle.as_ref()?;
                Some(format!(
                    "{} plans {}",
                    battle.enemy.name, battle.enemy.next_action
                ))
            }
            _ => None,
        }
    }

    /// Apply `action` to the run. Returns how many events it produced.
    pub fn apply_action(&mut self, action: &AutoAction) -> Result<usize, AutoplayError> {
        Ok(self.apply_action_events(action)?.len())
    }

    /// Apply `action` and hand back the events it produced.
    pub fn apply_action_events(&mut self, action: &AutoAction) -> Result<Vec<Event>, AutoplayError> {
        let events = &mut self.events;
        match action {
            AutoAction::StartBattle => self.run.start_battle(events)?,
            AutoAction::Play { ids } => {
                self.run.play_gems(ids, events)?;
            }
            AutoAction::Wait => self.run.wait(events)?,
            AutoAction::Discard { ids } => self.run.discard_and_end(ids, events)?,
            AutoAction::Flee => self.run.flee(events)?,
            AutoAction::EnemyTurn => {
                self.run.run_enemy_turn(events)?;
            }
            AutoAction::BuyOffer { index } => {
                self.run.buy_offer(*index, events)?;
            }
            AutoAction::RemoveGem { id } => self.run.remove_gem(*id, events)?,
            AutoAction::UpgradeGem { id, augmentation } => {
                self.run.upgrade_gem(*id, *augmentation, events)?
            }
            AutoAction::BuyHeal => {
                self.run.buy_heal(events)?;
            }
            AutoAction::LeaveShop => self.run.leave_shop(events)?,
            AutoAction::Rest => {
                self.run.rest(events)?;
            }
            AutoAction::Bank { amount } => self.run.bank(*amount, events)?,
            AutoAction::UnlockGem { gem } => self.run.unlock_gem(gem, events)?,
            AutoAction::LeaveCamp => self.run.leave_camp(events)?,
        }
        Ok(self.events.drain().collect())
    }

    pub fn legal_actions(&self, cfg: &AutoplayConfig) -> Vec<AutoAction> {
        let mut actions = Vec::new();
        match self.run.stage {
            Stage::Battle if !self.run.battle_in_progress() => {
                actions.push(AutoAction::StartBattle);
            }
            Stage::Battle => match self.run.current_turn() {
                Some(Turn::Player) => {
                    actions.extend(legal_play_actions(&self.run, cfg.max_play_candidates));
                    actions.push(AutoAction::Wait);
                    for gem in self.run.inventory.hand() {
                        actions.push(AutoAction::Discard { ids: vec![gem.id] });
                    }
                    if self.run.battle.as_ref().is_some_and(|battle| !battle.boss) {
                        actions.push(AutoAction::Flee);
                    }
                }
                Some(Turn::Enemy(_)) => actions.push(AutoAction::EnemyTurn),
                Some(Turn::Over(_)) | None => {}
            },
            Stage::Shop => {
                actions.push(AutoAction::LeaveShop);
                actions.extend(legal_shop_actions(&self.run, cfg.max_shop_candidates));
            }
            Stage::Camp => {
                actions.push(AutoAction::LeaveCamp);
                actions.extend(legal_camp_actions(&self.run));
            }
            Stage::GameOver | Stage::Won => {}
        }

        actions.sort_by_key(|item| item.stable_key());
        actions.dedup_by_key(|item| item.stable_key());
        actions
    }

    /// The pilot's choice: the legal action with the best heuristic score.
    pub fn greedy_action(&self, cfg: &AutoplayConfig) -> Option<AutoAction> {
        let mut best: Option<(AutoAction, f64)> = None;
        for action in self.legal_actions(cfg) {
            let score = action_score(&action, self);
            if best.as_ref().map_or(true, |(_, top)| score > *top) {
                best = Some((action, score));
            }
        }
        best.map(|(action, _)| action)
    }
}

fn legal_play_actions(run: &RunState, cap: usize) -> Vec<AutoAction> {
    let hand = run.inventory.hand();
    let mut scored = Vec::new();
    let subsets = 1u32 << hand.len().min(8);
    for mask in 1..subsets {
        let picked: Vec<&GemInstance> = hand
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask & (1 << idx) != 0)
            .map(|(_, gem)| gem)
            .collect();
        let cost: u32 = picked.iter().map(|gem| gem.cost()).sum();
        if cost > run.player.stamina {
            continue;
        }
        let value: f64 = picked.iter().map(|gem| estimate_gem(run, gem)).sum();
        let ids = picked.iter().map(|gem| gem.id).collect();
        scored.push((AutoAction::Play { ids }, value));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(cap.max(1));
    scored.into_iter().map(|(action, _)| action).collect()
}

fn legal_shop_actions(run: &RunState, cap: usize) -> Vec<AutoAction> {
    let mut actions = Vec::new();
    let zenny = run.player.zenny;
    let rule = &run.config.shop;
    if let Some(shop) = run.shop.as_ref() {
        for (index, offer) in shop.offers.iter().enumerate().take(cap) {
            if !offer.sold && offer.price <= zenny {
                actions.push(AutoAction::BuyOffer { index });
            }
        }
    }
    if rule.heal_cost <= zenny && run.player.health < run.player.max_health {
        actions.push(AutoAction::BuyHeal);
    }
    if rule.upgrade_cost <= zenny {
        for gem in run.inventory.hand().iter().take(cap) {
            if gem.def.kind == GemKind::Attack && gem.def.augmentation.is_none() {
                actions.push(AutoAction::UpgradeGem {
                    id: gem.id,
                    augmentation: Augmentation::Powerful,
                });
            }
        }
    }
    if rule.removal_cost <= zenny && run.inventory.total() > 6 {
        let grey = run
            .inventory
            .iter()
            .filter(|gem| gem.def.color == GemColor::Grey)
            .take(cap);
        for gem in grey {
            actions.push(AutoAction::RemoveGem { id: gem.id });
        }
    }
    actions
}

fn legal_camp_actions(run: &RunState) -> Vec<AutoAction> {
    let mut actions = Vec::new();
    if !run.camp_rested {
        actions.push(AutoAction::Rest);
    }
    if run.player.zenny > 0 {
        actions.push(AutoAction::Bank {
            amount: run.player.zenny,
        });
    }
    let class = run.player.class;
    for gem in &run.catalog.gems {
        if gem.color == class.favored_color()
            && !run.meta.is_unlocked(class, &gem.id)
            && gem.unlock_cost <= run.meta.zenny
        {
            actions.push(AutoAction::UnlockGem {
                gem: gem.id.clone(),
            });
        }
    }
    actions
}

/// Expected worth of playing `gem` now, net of the self-damage a failed
/// roll would cost.
fn estimate_gem(run: &RunState, gem: &GemInstance) -> f64 {
    let enemy = run
        .battle
        .as_ref()
        .filter(|battle| battle.in_progress())
        .map(|battle| &battle.enemy);
    let rule = &run.config.combat;
    let value = gem_value(&gem.def, &run.player, enemy, rule);
    let success = success_threshold(gem.mastery, &run.player) / 100.0;
    let missing = (run.player.max_health - run.player.health).max(0);
    let raw = match gem.def.kind {
        GemKind::Attack => enemy.map_or(0.0, |enemy| {
            let hit = absorb(value, &enemy.buffs, piercing_of(&gem.def, rule));
            hit.damage.min(enemy.health) as f64
        }),
        GemKind::Heal => value.min(missing) as f64,
        GemKind::Shield => {
            if run.player.buffs.has(StatusKind::Defense) {
                value as f64 * 0.3
            } else {
                value as f64 * 0.8
            }
        }
        GemKind::Poison => {
            let turns = gem_duration(&gem.def, rule) as f64;
            let poisoned = enemy.is_some_and(|enemy| enemy.buffs.has(StatusKind::Poison));
            value as f64 * turns * if poisoned { 0.4 } else { 0.6 }
        }
    };
    let failure = failure_damage(value, &run.config.mastery) as f64;
    raw * success - failure * (1.0 - success)
}

fn health_ratio(run: &RunState) -> f64 {
    run.player.health.max(0) as f64 / run.player.max_health.max(1) as f64
}

/// Heuristic desirability of `action` in the current state. Higher is better.
pub fn action_score(action: &AutoAction, sim: &Simulator) -> f64 {
    let run = &sim.run;
    match action {
        AutoAction::StartBattle | AutoAction::EnemyTurn => 1.0,
        AutoAction::Play { ids } => ids
            .iter()
            .filter_map(|id| run.inventory.get(*id))
            .map(|gem| estimate_gem(run, gem))
            .sum(),
        AutoAction::Wait => 0.0,
        AutoAction::Discard { .. } => -0.1,
        AutoAction::Flee => {
            let enemy_ratio = run.battle.as_ref().map_or(0.0, |battle| {
                battle.enemy.health as f64 / battle.enemy.max_health.max(1) as f64
            });
            if health_ratio(run) < 0.25 && enemy_ratio > 0.5 {
                50.0
            } else {
                -5.0
            }
        }
        AutoAction::BuyHeal => {
            if health_ratio(run) < 0.6 {
                6.0
            } else {
                0.5
            }
        }
        AutoAction::BuyOffer { index } => run
            .shop
            .as_ref()
            .and_then(|shop| shop.offers.get(*index))
            .map_or(0.0, |offer| {
                let affinity = if offer.gem.color == run.player.class.favored_color() {
                    1.5
                } else {
                    0.0
                };
                1.5 + affinity + offer.gem.base_value as f64 / 10.0
            }),
        AutoAction::UpgradeGem { .. } => 2.0,
        AutoAction::RemoveGem { .. } => 1.2,
        AutoAction::LeaveShop | AutoAction::LeaveCamp => 1.0,
        AutoAction::Rest => {
            if run.player.health < run.player.max_health {
                10.0
            } else {
                0.5
            }
        }
        AutoAction::UnlockGem { .. } => 4.0,
        AutoAction::Bank { amount } => {
            let class = run.player.class;
            let reachable = run.catalog.gems.iter().any(|gem| {
                gem.color == class.favored_color()
                    && !run.meta.is_unlocked(class, &gem.id)
                    && gem.unlock_cost > run.meta.zenny
                    && gem.unlock_cost <= run.meta.zenny + amount
            });
            if reachable {
                3.0
            } else {
                0.2
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulator {
        Simulator::from_config(
            GameConfig::default(),
            Catalog::builtin(),
            &AutoplayConfig::default(),
        )
        .expect("sim")
    }

    #[test]
    fn fresh_run_only_starts_a_battle() {
        let sim = sim();
        let actions = sim.legal_actions(&AutoplayConfig::default());
        assert_eq!(actions, vec![AutoAction::StartBattle]);
    }

    #[test]
    fn player_turn_offers_affordable_plays() {
        let mut sim = sim();
        sim.apply_action(&AutoAction::StartBattle).expect("start");
        let actions = sim.legal_actions(&AutoplayConfig::default());
        assert!(actions.contains(&AutoAction::Wait));
        assert!(actions.contains(&AutoAction::Flee));
        for action in &actions {
            if let AutoAction::Play { ids } = action {
                let cost: u32 = ids
                    .iter()
                    .filter_map(|id| sim.run.inventory.get(*id))
                    .map(GemInstance::cost)
                    .sum();
                assert!(cost <= sim.run.player.stamina);
            }
        }
    }

    #[test]
    fn pilot_attacks_a_healthy_enemy() {
        let mut sim = sim();
        sim.apply_action(&AutoAction::StartBattle).expect("start");
        let choice = sim
            .greedy_action(&AutoplayConfig::default())
            .expect("some action");
        assert!(matches!(choice, AutoAction::Play { .. }), "{choice:?}");
    }
}
