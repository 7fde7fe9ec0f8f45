use super::*;
use crate::*;

impl RunState {
    /// Recover a share of max health. Allowed once per camp.
    pub fn rest(&mut self, events: &mut EventBus) -> Result<i32, RunError> {
        self.require_stage(Stage::Camp, "not at camp")?;
        if self.camp_rested {
            return Err(RunError::InvalidEncounterContext("already rested tonight"));
        }
        let target = (self.player.max_health as f64 * self.config.camp.rest_heal_ratio).ceil() as i32;
        let amount = self.player.heal(target.max(0));
        self.camp_rested = true;
        events.push(Event::Rested {
            amount,
            health: self.player.health,
        });
        Ok(amount)
    }

    /// Move run zenny into the meta bank, where it survives the run.
    pub fn bank(&mut self, amount: i64, events: &mut EventBus) -> Result<(), RunError> {
        self.require_stage(Stage::Camp, "not at camp")?;
        if amount <= 0 {
            return Err(RunError::InvalidSelection);
        }
        self.spend_zenny(amount)?;
        self.meta.zenny = self.meta.zenny.saturating_add(amount);
        events.push(Event::ZennyBanked {
            amount,
            banked: self.meta.zenny,
        });
        Ok(())
    }

    /// Spend banked zenny to add a gem of the class color to the shop pool.
    pub fn unlock_gem(&mut self, gem: &str, events: &mut EventBus) -> Result<(), RunError> {
        self.require_stage(Stage::Camp, "not at camp")?;
        let class = self.player.class;
        let def = self
            .catalog
            .gem(gem)
            .ok_or_else(|| RunError::UnknownGem(gem.to_string()))?;
        if def.color != class.favored_color() || self.meta.is_unlocked(class, gem) {
            return Err(RunError::InvalidSelection);
        }
        let cost = def.unlock_cost.max(0);
        if cost > self.meta.zenny {
            return Err(RunError::InsufficientFunds {
                needed: cost,
                available: self.meta.zenny,
            });
        }
        self.meta.zenny -= cost;
        self.meta.unlock(class, gem);
        events.push(Event::GemUnlocked {
            gem: gem.to_string(),
            banked: self.meta.zenny,
        });
        tracing::info!(gem, class = ?class, "meta.gem.unlocked");
        Ok(())
    }

    pub fn leave_camp(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_stage(Stage::Camp, "not at camp")?;
        self.start_new_day(events);
        Ok(())
    }
}
