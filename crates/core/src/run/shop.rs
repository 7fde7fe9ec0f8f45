use super::*;
use crate::*;

impl RunState {
    pub(super) fn roll_shop(&mut self) -> ShopState {
        let unlocked = self.meta.unlocked_for(self.player.class);
        ShopState::generate(
            &self.config.shop,
            &self.catalog,
            self.player.class,
            &unlocked,
            &mut self.rng,
        )
    }

    pub(super) fn open_shop(&mut self, events: &mut EventBus) {
        let shop = self.roll_shop();
        events.push(Event::ShopEntered {
            offers: shop.offers.len(),
        });
        self.shop = Some(shop);
    }

    fn shop_ref(&self) -> Result<&ShopState, RunError> {
        self.require_stage(Stage::Shop, "not in a shop")?;
        self.shop
            .as_ref()
            .ok_or(RunError::InvalidEncounterContext("not in a shop"))
    }

    /// Buy the offer at `index`. The gem goes into the bag.
    pub fn buy_offer(&mut self, index: usize, events: &mut EventBus) -> Result<GemInstanceId, RunError> {
        let offer = self
            .shop_ref()?
            .offers
            .get(index)
            .filter(|offer| !offer.sold)
            .cloned()
            .ok_or(RunError::InvalidSelection)?;
        self.spend_zenny(offer.price)?;
        if let Some(slot) = self.shop.as_mut().and_then(|shop| shop.offers.get_mut(index)) {
            slot.sold = true;
        }
        let mastery = self.mastery_for(&offer.gem);
        let id = self.inventory.add_to_bag(offer.gem.clone(), mastery);
        events.push(Event::GemBought {
            gem: offer.gem.id.clone(),
            cost: offer.price,
            zenny: self.player.zenny,
        });
        tracing::debug!(gem = %offer.gem.id, cost = offer.price, "shop.gem.bought");
        Ok(id)
    }

    /// Remove a gem from the run, wherever it currently sits.
    pub fn remove_gem(&mut self, id: GemInstanceId, events: &mut EventBus) -> Result<(), RunError> {
        self.shop_ref()?;
        if self.inventory.get(id).is_none() {
            return Err(RunError::InvalidSelection);
        }
        let cost = self.config.shop.removal_cost;
        self.spend_zenny(cost)?;
        self.inventory.remove(id);
        events.push(Event::GemRemoved {
            instance: id,
            cost,
            zenny: self.player.zenny,
        });
        Ok(())
    }

    /// Augment a gem in the hand. An existing augmentation is replaced;
    /// asking for the one it already has is rejected.
    pub fn upgrade_gem(
        &mut self,
        id: GemInstanceId,
        augmentation: Augmentation,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.shop_ref()?;
        let current = self
            .inventory
            .hand()
            .iter()
            .find(|gem| gem.id == id)
            .map(|gem| gem.def.clone())
            .ok_or(RunError::InvalidSelection)?;
        if current.augmentation == Some(augmentation) {
            return Err(RunError::InvalidSelection);
        }
        let cost = self.config.shop.upgrade_cost;
        self.spend_zenny(cost)?;
        let upgraded = current.with_augmentation(augmentation);
        let gem = upgraded.id.clone();
        self.inventory.upgrade_in_hand(id, upgraded)?;
        events.push(Event::GemUpgraded {
            instance: id,
            gem,
            cost,
            zenny: self.player.zenny,
        });
        Ok(())
    }

    /// Pay for a flat heal. Refused at full health.
    pub fn buy_heal(&mut self, events: &mut EventBus) -> Result<i32, RunError> {
        self.shop_ref()?;
        if self.player.health >= self.player.max_health {
            return Err(RunError::InvalidSelection);
        }
        let cost = self.config.shop.heal_cost;
        self.spend_zenny(cost)?;
        let amount = self.player.heal(self.config.shop.heal_amount);
        events.push(Event::Healed {
            target: Actor::Player,
            amount,
            health: self.player.health,
        });
        Ok(amount)
    }

    /// Close the shop and move on to the next encounter of the day.
    pub fn leave_shop(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.shop_ref()?;
        self.shop = None;
        match self.phase.next() {
            Some(phase) => {
                self.phase = phase;
                self.stage = Stage::Battle;
            }
            None => self.start_new_day(events),
        }
        Ok(())
    }
}
