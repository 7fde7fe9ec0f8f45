use crate::{GemDef, GemInstance, GemInstanceId, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HAND_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Zone {
    Bag,
    Hand,
    Discard,
    Played,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("gem not in the expected zone")]
    InvalidSelection,
    #[error("not enough stamina: need {needed}, have {available}")]
    InsufficientStamina { needed: u32, available: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawReport {
    pub drawn: usize,
    pub recycled: usize,
}

/// The player's gems across the four zones. Every instance lives in exactly
/// one zone; moves take the instance out of one vector and push it into
/// another within a single call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    bag: Vec<GemInstance>,
    hand: Vec<GemInstance>,
    discard: Vec<GemInstance>,
    played: Vec<GemInstance>,
    next_id: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            bag: Vec::new(),
            hand: Vec::new(),
            discard: Vec::new(),
            played: Vec::new(),
            next_id: 1,
        }
    }

    pub fn bag(&self) -> &[GemInstance] {
        &self.bag
    }

    pub fn hand(&self) -> &[GemInstance] {
        &self.hand
    }

    pub fn discard_pile(&self) -> &[GemInstance] {
        &self.discard
    }

    pub fn played(&self) -> &[GemInstance] {
        &self.played
    }

    pub fn hand_ids(&self) -> Vec<GemInstanceId> {
        self.hand.iter().map(|gem| gem.id).collect()
    }

    pub fn total(&self) -> usize {
        self.bag.len() + self.hand.len() + self.discard.len() + self.played.len()
    }

    pub fn zone_of(&self, id: GemInstanceId) -> Option<Zone> {
        [
            (Zone::Bag, &self.bag),
            (Zone::Hand, &self.hand),
            (Zone::Discard, &self.discard),
            (Zone::Played, &self.played),
        ]
        .into_iter()
        .find(|(_, gems)| gems.iter().any(|gem| gem.id == id))
        .map(|(zone, _)| zone)
    }

    pub fn get(&self, id: GemInstanceId) -> Option<&GemInstance> {
        self.bag
            .iter()
            .chain(&self.hand)
            .chain(&self.discard)
            .chain(&self.played)
            .find(|gem| gem.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GemInstance> {
        self.bag
            .iter()
            .chain(&self.hand)
            .chain(&self.discard)
            .chain(&self.played)
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut Vec<GemInstance> {
        match zone {
            Zone::Bag => &mut self.bag,
            Zone::Hand => &mut self.hand,
            Zone::Discard => &mut self.discard,
            Zone::Played => &mut self.played,
        }
    }

    fn alloc_id(&mut self) -> GemInstanceId {
        let id = GemInstanceId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Create a new instance of `def` in `zone`.
    pub fn insert(&mut self, zone: Zone, def: GemDef, mastery: u8) -> GemInstanceId {
        let id = self.alloc_id();
        self.zone_mut(zone).push(GemInstance { id, def, mastery });
        id
    }

    pub fn add_to_bag(&mut self, def: GemDef, mastery: u8) -> GemInstanceId {
        self.insert(Zone::Bag, def, mastery)
    }

    /// Take an instance out of whichever zone holds it.
    pub fn remove(&mut self, id: GemInstanceId) -> Option<GemInstance> {
        let zone = self.zone_of(id)?;
        let gems = self.zone_mut(zone);
        let idx = gems.iter().position(|gem| gem.id == id)?;
        Some(gems.remove(idx))
    }

    /// Move up to `count` gems from the bag into the hand. An empty bag is
    /// refilled from the discard pile first.
    pub fn draw(&mut self, count: usize, rng: &mut RngState) -> DrawReport {
        let mut report = DrawReport::default();
        let room = HAND_LIMIT.saturating_sub(self.hand.len());
        if room == 0 || count == 0 {
            return report;
        }
        if self.bag.is_empty() {
            report.recycled = self.recycle_discard(rng);
        }
        let take = count.min(room).min(self.bag.len());
        for _ in 0..take {
            if let Some(gem) = self.bag.pop() {
                self.hand.push(gem);
                report.drawn += 1;
            }
        }
        report
    }

    /// Total effective cost of `ids`, all of which must be distinct hand gems.
    pub fn hand_cost(&self, ids: &[GemInstanceId]) -> Result<u32, InventoryError> {
        if ids.is_empty() {
            return Err(InventoryError::InvalidSelection);
        }
        let mut cost = 0u32;
        for (pos, id) in ids.iter().enumerate() {
            if ids[..pos].contains(id) {
                return Err(InventoryError::InvalidSelection);
            }
            let gem = self
                .hand
                .iter()
                .find(|gem| gem.id == *id)
                .ok_or(InventoryError::InvalidSelection)?;
            cost = cost.saturating_add(gem.cost());
        }
        Ok(cost)
    }

    /// Move `ids` from the hand to the played zone and pay their stamina.
    /// Nothing changes unless every id is in the hand and the stamina covers
    /// the combined cost.
    pub fn play(
        &mut self,
        ids: &[GemInstanceId],
        stamina: &mut u32,
    ) -> Result<Vec<GemInstance>, InventoryError> {
        let needed = self.hand_cost(ids)?;
        if needed > *stamina {
            return Err(InventoryError::InsufficientStamina {
                needed,
                available: *stamina,
            });
        }
        let mut played = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(idx) = self.hand.iter().position(|gem| gem.id == *id) {
                let gem = self.hand.remove(idx);
                played.push(gem.clone());
                self.played.push(gem);
            }
        }
        *stamina -= needed;
        Ok(played)
    }

    /// Move the matching hand gems to the discard pile, then recycle the pile
    /// into the bag. Ids not in the hand are ignored. Returns how many moved.
    pub fn discard(&mut self, ids: &[GemInstanceId], rng: &mut RngState) -> usize {
        let mut moved = 0;
        for id in ids {
            if let Some(idx) = self.hand.iter().position(|gem| gem.id == *id) {
                let gem = self.hand.remove(idx);
                self.discard.push(gem);
                moved += 1;
            }
        }
        if moved > 0 {
            self.recycle_discard(rng);
        }
        moved
    }

    /// Shuffle the discard pile into the bag. Returns how many gems moved.
    pub fn recycle_discard(&mut self, rng: &mut RngState) -> usize {
        if self.discard.is_empty() {
            return 0;
        }
        let count = self.discard.len();
        self.bag.append(&mut self.discard);
        rng.shuffle(&mut self.bag);
        count
    }

    /// Gather bag, discard and played into one shuffled bag. The hand stays.
    pub fn reset_for_new_day(&mut self, rng: &mut RngState) {
        self.bag.append(&mut self.discard);
        self.bag.append(&mut self.played);
        rng.shuffle(&mut self.bag);
    }

    /// Swap the definition of a hand gem, keeping its id and zone.
    pub fn upgrade_in_hand(&mut self, id: GemInstanceId, def: GemDef) -> Result<(), InventoryError> {
        let gem = self
            .hand
            .iter_mut()
            .find(|gem| gem.id == id)
            .ok_or(InventoryError::InvalidSelection)?;
        gem.def = def;
        Ok(())
    }

    /// Update the mastery of every instance sharing `key`.
    pub fn set_mastery(&mut self, key: &str, mastery: u8) {
        for zone in [Zone::Bag, Zone::Hand, Zone::Discard, Zone::Played] {
            for gem in self.zone_mut(zone).iter_mut() {
                if gem.def.mastery_key() == key {
                    gem.mastery = mastery;
                }
            }
        }
    }
}
