use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GemColor {
    Red,
    Blue,
    Green,
    Grey,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GemKind {
    Attack,
    Heal,
    Shield,
    Poison,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Augmentation {
    /// Halves the target's defense before absorption.
    Piercing,
    /// One stamina cheaper.
    Swift,
    /// +30% value.
    Powerful,
    /// One extra turn on shields and poisons.
    Lasting,
}

impl Augmentation {
    pub const ALL: [Augmentation; 4] = [
        Augmentation::Piercing,
        Augmentation::Swift,
        Augmentation::Powerful,
        Augmentation::Lasting,
    ];

    pub fn id_suffix(self) -> &'static str {
        match self {
            Self::Piercing => "piercing",
            Self::Swift => "swift",
            Self::Powerful => "powerful",
            Self::Lasting => "lasting",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEffect {
    DrawExtra,
    Stun,
    Focus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemDef {
    pub id: String,
    pub name: String,
    pub color: GemColor,
    pub kind: GemKind,
    pub base_value: i32,
    pub stamina_cost: u32,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub special: Option<SpecialEffect>,
    #[serde(default)]
    pub augmentation: Option<Augmentation>,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub unlock_cost: i64,
}

impl GemDef {
    pub fn effective_cost(&self) -> u32 {
        match self.augmentation {
            Some(Augmentation::Swift) => self.stamina_cost.saturating_sub(1),
            _ => self.stamina_cost,
        }
    }

    /// Copy of this definition carrying `augmentation`, with an id and name
    /// that tell the two apart.
    pub fn with_augmentation(&self, augmentation: Augmentation) -> Self {
        let base_id = match self.augmentation {
            Some(current) => self
                .id
                .strip_suffix(&format!("+{}", current.id_suffix()))
                .unwrap_or(&self.id)
                .to_string(),
            None => self.id.clone(),
        };
        let base_name = match self.augmentation {
            Some(_) => self
                .name
                .split_once(' ')
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_else(|| self.name.clone()),
            None => self.name.clone(),
        };
        let mut def = self.clone();
        def.id = format!("{base_id}+{}", augmentation.id_suffix());
        def.name = format!("{} {base_name}", augmentation_label(augmentation));
        def.augmentation = Some(augmentation);
        def
    }

    /// Mastery id: augmented copies share the mastery of their base gem.
    pub fn mastery_key(&self) -> &str {
        self.id.split_once('+').map(|(base, _)| base).unwrap_or(&self.id)
    }
}

fn augmentation_label(augmentation: Augmentation) -> &'static str {
    match augmentation {
        Augmentation::Piercing => "Piercing",
        Augmentation::Swift => "Swift",
        Augmentation::Powerful => "Powerful",
        Augmentation::Lasting => "Lasting",
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemInstanceId(pub u32);

impl fmt::Display for GemInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemInstance {
    pub id: GemInstanceId,
    pub def: GemDef,
    /// Success chance in percent.
    pub mastery: u8,
}

impl GemInstance {
    pub fn cost(&self) -> u32 {
        self.def.effective_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike() -> GemDef {
        GemDef {
            id: "red-attack".to_string(),
            name: "Ruby Strike".to_string(),
            color: GemColor::Red,
            kind: GemKind::Attack,
            base_value: 10,
            stamina_cost: 2,
            duration: None,
            special: None,
            augmentation: None,
            advanced: false,
            price: 8,
            unlock_cost: 0,
        }
    }

    #[test]
    fn swift_lowers_cost_but_not_below_zero() {
        let swift = strike().with_augmentation(Augmentation::Swift);
        assert_eq!(swift.effective_cost(), 1);
        let mut free = swift.clone();
        free.stamina_cost = 0;
        assert_eq!(free.effective_cost(), 0);
    }

    #[test]
    fn reaugmenting_replaces_previous_tag() {
        let piercing = strike().with_augmentation(Augmentation::Piercing);
        assert_eq!(piercing.id, "red-attack+piercing");
        assert_eq!(piercing.name, "Piercing Ruby Strike");
        let powerful = piercing.with_augmentation(Augmentation::Powerful);
        assert_eq!(powerful.id, "red-attack+powerful");
        assert_eq!(powerful.name, "Powerful Ruby Strike");
        assert_eq!(powerful.mastery_key(), "red-attack");
    }
}
