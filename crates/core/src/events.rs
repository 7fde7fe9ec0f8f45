use crate::{
    BattleOutcome, DayPhase, EnemyAction, GemInstanceId, StatusKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Actor {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    BattleStarted {
        day: u32,
        phase: DayPhase,
        enemy: String,
        health: i32,
        boss: bool,
    },
    HandDrawn { count: usize },
    DiscardRecycled { count: usize },
    GemPlayed {
        instance: GemInstanceId,
        gem: String,
        success: bool,
    },
    MasteryImproved { gem: String, mastery: u8 },
    DamageDealt {
        source: Actor,
        target: Actor,
        amount: i32,
        absorbed: i32,
        health: i32,
    },
    DamageReflected { amount: i32, health: i32 },
    Healed {
        target: Actor,
        amount: i32,
        health: i32,
    },
    StatusApplied {
        target: Actor,
        kind: StatusKind,
        magnitude: i32,
        turns: Option<u32>,
    },
    StatusTicked {
        target: Actor,
        kind: StatusKind,
        amount: i32,
    },
    StatusExpired { target: Actor, kind: StatusKind },
    EnemyActionChosen { action: EnemyAction },
    EnemyActed { action: EnemyAction },
    EnemyEnraged { attack: i32 },
    EnemyPhaseShift { attack: i32 },
    ZennyStolen { amount: i64, zenny: i64 },
    TurnSkipped { actor: Actor },
    TurnEnded { stamina_spent: u32 },
    StaminaRecovered { amount: u32, stamina: u32 },
    Victory { reward: i64, zenny: i64 },
    Defeat,
    Fled,
    BattleOver { outcome: BattleOutcome },
    ShopEntered { offers: usize },
    GemBought { gem: String, cost: i64, zenny: i64 },
    GemRemoved { instance: GemInstanceId, cost: i64, zenny: i64 },
    GemUpgraded {
        instance: GemInstanceId,
        gem: String,
        cost: i64,
        zenny: i64,
    },
    CampEntered { day: u32 },
    Rested { amount: i32, health: i32 },
    ZennyBanked { amount: i64, banked: i64 },
    GemUnlocked { gem: String, banked: i64 },
    DayStarted { day: u32 },
    RunWon { day: u32 },
    RunLost { day: u32, phase: DayPhase },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn peek(&self) -> &[Event] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
