use serde::{Deserialize, Serialize};

/// Buffs and debuffs a combatant can carry. Declaration order is the order
/// periodic effects resolve in during a round tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poison,
    Bleeding,
    Burning,
    Regeneration,
    Defense,
    Focus,
    Stunned,
    Webbed,
    Curse,
    AttackBoost,
    Minion,
    Empowered,
    Phased,
    Parrying,
    Ritual,
}

impl StatusKind {
    /// Damage-over-time kinds.
    pub fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Poison | Self::Bleeding | Self::Burning)
    }

    pub fn is_periodic(self) -> bool {
        self.is_damage_over_time() || self == Self::Regeneration
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    Turns(u32),
    Permanent,
}

impl Duration {
    pub fn is_active(self) -> bool {
        match self {
            Self::Turns(turns) => turns > 0,
            Self::Permanent => true,
        }
    }

    pub fn turns(self) -> Option<u32> {
        match self {
            Self::Turns(turns) => Some(turns),
            Self::Permanent => None,
        }
    }

    fn longer(self, other: Duration) -> Duration {
        match (self, other) {
            (Self::Turns(a), Self::Turns(b)) => Self::Turns(a.max(b)),
            _ => Self::Permanent,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: i32,
    pub duration: Duration,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, magnitude: i32, turns: u32) -> Self {
        Self {
            kind,
            magnitude,
            duration: Duration::Turns(turns),
        }
    }

    pub fn permanent(kind: StatusKind, magnitude: i32) -> Self {
        Self {
            kind,
            magnitude,
            duration: Duration::Permanent,
        }
    }
}

/// One periodic effect resolved during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicHit {
    pub kind: StatusKind,
    pub amount: i32,
}

/// Active effects on one combatant, at most one per kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusLedger {
    effects: Vec<StatusEffect>,
}

impl StatusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects
            .iter()
            .find(|effect| effect.kind == kind && effect.duration.is_active())
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn magnitude(&self, kind: StatusKind) -> i32 {
        self.get(kind).map(|effect| effect.magnitude).unwrap_or(0)
    }

    /// Apply `effect`, replacing any effect of the same kind. Poison is the
    /// one kind that stacks: magnitudes add and the longer duration wins.
    /// Returns the effect now held.
    pub fn apply(&mut self, effect: StatusEffect) -> StatusEffect {
        let existing = self.effects.iter().position(|held| held.kind == effect.kind);
        match existing {
            Some(idx) if effect.kind == StatusKind::Poison && self.effects[idx].duration.is_active() => {
                let held = &mut self.effects[idx];
                held.magnitude = held.magnitude.saturating_add(effect.magnitude);
                held.duration = held.duration.longer(effect.duration);
                *held
            }
            Some(idx) => {
                self.effects[idx] = effect;
                effect
            }
            None => {
                self.effects.push(effect);
                effect
            }
        }
    }

    pub fn remove(&mut self, kind: StatusKind) -> Option<StatusEffect> {
        let idx = self.effects.iter().position(|held| held.kind == kind)?;
        Some(self.effects.remove(idx))
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Periodic effects that fire this tick, in kind order.
    pub fn periodic_hits(&self) -> Vec<PeriodicHit> {
        let mut hits: Vec<PeriodicHit> = self
            .effects
            .iter()
            .filter(|effect| effect.kind.is_periodic() && effect.duration.is_active())
            .map(|effect| PeriodicHit {
                kind: effect.kind,
                amount: effect.magnitude.max(0),
            })
            .collect();
        hits.sort_by_key(|hit| hit.kind);
        hits
    }

    /// Decrement every timed effect by one turn and drop the ones that
    /// reach zero. Returns the removed effects.
    pub fn decrement(&mut self) -> Vec<StatusEffect> {
        for effect in &mut self.effects {
            if let Duration::Turns(turns) = effect.duration {
                effect.duration = Duration::Turns(turns.saturating_sub(1));
            }
        }
        let mut expired = Vec::new();
        self.effects.retain(|effect| {
            if effect.duration.is_active() {
                true
            } else {
                expired.push(*effect);
                false
            }
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapplying_replaces() {
        let mut ledger = StatusLedger::new();
        ledger.apply(StatusEffect::new(StatusKind::Defense, 5, 2));
        ledger.apply(StatusEffect::new(StatusKind::Defense, 3, 4));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.magnitude(StatusKind::Defense), 3);
        assert_eq!(
            ledger.get(StatusKind::Defense).map(|effect| effect.duration),
            Some(Duration::Turns(4))
        );
    }

    #[test]
    fn poison_stacks() {
        let mut ledger = StatusLedger::new();
        ledger.apply(StatusEffect::new(StatusKind::Poison, 3, 3));
        let held = ledger.apply(StatusEffect::new(StatusKind::Poison, 2, 1));
        assert_eq!(held.magnitude, 5);
        assert_eq!(held.duration, Duration::Turns(3));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn decrement_expires_and_keeps_permanent() {
        let mut ledger = StatusLedger::new();
        ledger.apply(StatusEffect::new(StatusKind::Defense, 5, 2));
        ledger.apply(StatusEffect::new(StatusKind::Stunned, 1, 1));
        ledger.apply(StatusEffect::permanent(StatusKind::Empowered, 4));
        let expired = ledger.decrement();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].kind, StatusKind::Stunned);
        assert_eq!(
            ledger.get(StatusKind::Defense).map(|effect| effect.duration),
            Some(Duration::Turns(1))
        );
        assert!(ledger.has(StatusKind::Empowered));
    }

    #[test]
    fn periodic_hits_in_kind_order() {
        let mut ledger = StatusLedger::new();
        ledger.apply(StatusEffect::new(StatusKind::Regeneration, 2, 2));
        ledger.apply(StatusEffect::new(StatusKind::Burning, 4, 2));
        ledger.apply(StatusEffect::new(StatusKind::Defense, 9, 2));
        ledger.apply(StatusEffect::new(StatusKind::Poison, 1, 2));
        let kinds: Vec<StatusKind> = ledger.periodic_hits().iter().map(|hit| hit.kind).collect();
        assert_eq!(
            kinds,
            vec![StatusKind::Poison, StatusKind::Burning, StatusKind::Regeneration]
        );
    }
}
