use super::*;
use crate::*;
use serde::{Deserialize, Serialize};

pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// Everything the persistence layer needs to rebuild a run between
/// encounters. Battles are not saved: a run saved mid-battle resumes at the
/// start of that encounter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveSnapshot {
    pub version: u32,
    pub seed: u64,
    pub player: Player,
    pub inventory: Inventory,
    pub meta: MetaProgress,
    pub day: u32,
    pub phase: DayPhase,
    pub stage: Stage,
    #[serde(default)]
    pub camp_rested: bool,
}

/// Random stream a restored run continues on. Keyed by the save point so a
/// reload never replays the opening rolls of the run.
fn resume_stream(day: u32, phase: DayPhase, stage: Stage) -> u64 {
    let phase = match phase {
        DayPhase::Dawn => 0,
        DayPhase::Dusk => 1,
        DayPhase::Dark => 2,
    };
    let stage = match stage {
        Stage::Battle => 0,
        Stage::Shop => 1,
        Stage::Camp => 2,
        Stage::GameOver => 3,
        Stage::Won => 4,
    };
    (u64::from(day.max(1)) << 8) | (phase << 4) | stage
}

impl RunState {
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        class: PlayerClass,
        seed: u64,
    ) -> Result<Self, RunError> {
        let meta = MetaProgress::new(&catalog);
        Self::with_meta(config, catalog, class, meta, seed)
    }

    /// Start a run for `class`, carrying unlocks and mastery from `meta`.
    pub fn with_meta(
        config: GameConfig,
        catalog: Catalog,
        class: PlayerClass,
        meta: MetaProgress,
        seed: u64,
    ) -> Result<Self, RunError> {
        let class_def = catalog
            .class_def(class)
            .cloned()
            .ok_or(RunError::MissingClass(class))?;
        let mut rng = RngState::from_seed(seed);
        let mut inventory = Inventory::new();
        for id in &class_def.starting_bag {
            let def = catalog
                .resolve_gem_or_basic(id)
                .ok_or_else(|| RunError::UnknownGem(id.clone()))?;
            let mastery = meta.mastery_of(&def, &config.mastery);
            inventory.add_to_bag(def, mastery);
        }
        inventory.reset_for_new_day(&mut rng);
        let player = Player::new(class, class_def.max_health, class_def.max_stamina);
        let progression = StandardProgression::new(config.progression.final_day);
        Ok(Self {
            config,
            catalog,
            rng,
            player,
            inventory,
            meta,
            day: 1,
            phase: DayPhase::Dawn,
            stage: Stage::Battle,
            battle: None,
            shop: None,
            camp_rested: false,
            progression: Box::new(progression),
        })
    }

    pub fn set_progression(&mut self, progression: Box<dyn Progression>) {
        self.progression = progression;
    }

    pub fn snapshot(&self) -> SaveSnapshot {
        let mut player = self.player.clone();
        let mut stage = self.stage;
        if self.battle_in_progress() {
            player.buffs.clear();
            stage = Stage::Battle;
        }
        SaveSnapshot {
            version: SAVE_SCHEMA_VERSION,
            seed: self.rng.seed(),
            player,
            inventory: self.inventory.clone(),
            meta: self.meta.clone(),
            day: self.day,
            phase: self.phase,
            stage,
            camp_rested: self.camp_rested,
        }
    }

    pub fn restore(
        config: GameConfig,
        catalog: Catalog,
        snapshot: SaveSnapshot,
    ) -> Result<Self, RunError> {
        if snapshot.version != SAVE_SCHEMA_VERSION {
            return Err(RunError::UnsupportedSave(snapshot.version));
        }
        for gem in snapshot.inventory.iter() {
            if catalog.resolve_gem(&gem.def.id).is_none() {
                tracing::warn!(gem = %gem.def.id, "save.gem.unknown");
            }
        }
        let progression = StandardProgression::new(config.progression.final_day);
        let mut run = Self {
            config,
            catalog,
            rng: RngState::with_stream(
                snapshot.seed,
                resume_stream(snapshot.day, snapshot.phase, snapshot.stage),
            ),
            player: snapshot.player,
            inventory: snapshot.inventory,
            meta: snapshot.meta,
            day: snapshot.day.max(1),
            phase: snapshot.phase,
            stage: snapshot.stage,
            battle: None,
            shop: None,
            camp_rested: snapshot.camp_rested,
            progression: Box::new(progression),
        };
        if run.stage == Stage::Shop {
            run.shop = Some(run.roll_shop());
        }
        Ok(run)
    }

    pub fn battle_in_progress(&self) -> bool {
        self.battle.as_ref().is_some_and(Battle::in_progress)
    }

    pub(super) fn require_stage(&self, stage: Stage, reason: &'static str) -> Result<(), RunError> {
        if self.stage != stage || self.battle_in_progress() {
            return Err(RunError::InvalidEncounterContext(reason));
        }
        Ok(())
    }

    pub(super) fn spend_zenny(&mut self, cost: i64) -> Result<(), RunError> {
        if cost > self.player.zenny {
            return Err(RunError::InsufficientFunds {
                needed: cost,
                available: self.player.zenny,
            });
        }
        self.player.zenny -= cost;
        Ok(())
    }

    pub(super) fn mastery_for(&self, def: &GemDef) -> u8 {
        self.meta.mastery_of(def, &self.config.mastery)
    }

    pub(super) fn draw_hand(&mut self, events: &mut EventBus) {
        let report = self.inventory.draw(HAND_LIMIT, &mut self.rng);
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

    /// Start the next day: gather the bag, move to dawn, back to battle.
    pub(super) fn start_new_day(&mut self, events: &mut EventBus) {
        self.day = self.day.saturating_add(1);
        self.phase = DayPhase::Dawn;
        self.stage = Stage::Battle;
        self.shop = None;
        self.camp_rested = false;
        self.inventory.reset_for_new_day(&mut self.rng);
        tracing::debug!(day = self.day, "run.day.started");
        events.push(Event::DayStarted { day: self.day });
    }
}
