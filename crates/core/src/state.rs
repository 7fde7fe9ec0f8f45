use crate::{GemColor, StatusLedger};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PlayerClass {
    Knight,
    Mage,
    Rogue,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 3] = [PlayerClass::Knight, PlayerClass::Mage, PlayerClass::Rogue];

    pub fn favored_color(self) -> GemColor {
        match self {
            Self::Knight => GemColor::Red,
            Self::Mage => GemColor::Blue,
            Self::Rogue => GemColor::Green,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "knight" => Some(Self::Knight),
            "mage" => Some(Self::Mage),
            "rogue" => Some(Self::Rogue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Dawn,
    Dusk,
    Dark,
}

impl DayPhase {
    pub fn next(self) -> Option<DayPhase> {
        match self {
            Self::Dawn => Some(Self::Dusk),
            Self::Dusk => Some(Self::Dark),
            Self::Dark => None,
        }
    }

    pub fn is_boss_tier(self) -> bool {
        self == Self::Dark
    }
}

/// Macro screen the run is on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Battle,
    Shop,
    Camp,
    GameOver,
    Won,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub class: PlayerClass,
    pub health: i32,
    pub max_health: i32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub zenny: i64,
    #[serde(default)]
    pub buffs: StatusLedger,
}

impl Player {
    pub fn new(class: PlayerClass, max_health: i32, max_stamina: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            class,
            health: max_health,
            max_health,
            stamina: max_stamina,
            max_stamina,
            zenny: 0,
            buffs: StatusLedger::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount.max(0)).clamp(0, self.max_health);
        before - self.health
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount.max(0)).clamp(0, self.max_health);
        self.health - before
    }

    pub fn recover_stamina(&mut self, amount: u32) -> u32 {
        let before = self.stamina;
        self.stamina = self.stamina.saturating_add(amount).min(self.max_stamina);
        self.stamina - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_stays_in_bounds() {
        let mut player = Player::new(PlayerClass::Knight, 40, 3);
        assert_eq!(player.take_damage(i32::MAX), 40);
        assert_eq!(player.health, 0);
        assert_eq!(player.heal(i32::MAX), 40);
        assert_eq!(player.health, 40);
        assert_eq!(player.take_damage(-5), 0);
    }

    #[test]
    fn stamina_recovery_caps_at_max() {
        let mut player = Player::new(PlayerClass::Mage, 30, 3);
        player.stamina = 1;
        assert_eq!(player.recover_stamina(5), 2);
        assert_eq!(player.stamina, 3);
    }

    #[test]
    fn phases_advance_to_dark() {
        assert_eq!(DayPhase::Dawn.next(), Some(DayPhase::Dusk));
        assert_eq!(DayPhase::Dusk.next(), Some(DayPhase::Dark));
        assert_eq!(DayPhase::Dark.next(), None);
        assert!(DayPhase::Dark.is_boss_tier());
    }
}
