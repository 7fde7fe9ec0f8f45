use crate::{AiRule, RngState, StatusEffect, StatusKind, StatusLedger};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnemyActionKind {
    Attack,
    Defend,
    Heal,
    Harden,
    Howl,
    Enrage,
    Curse,
    Poison,
    Bite,
    Claw,
    Breathe,
    Burn,
    Tail,
    Steal,
    Summon,
    Web,
    Phase,
    Parry,
    Ritual,
    Ultimate,
}

impl EnemyActionKind {
    pub const ALL: [EnemyActionKind; 20] = [
        EnemyActionKind::Attack,
        EnemyActionKind::Defend,
        EnemyActionKind::Heal,
        EnemyActionKind::Harden,
        EnemyActionKind::Howl,
        EnemyActionKind::Enrage,
        EnemyActionKind::Curse,
        EnemyActionKind::Poison,
        EnemyActionKind::Bite,
        EnemyActionKind::Claw,
        EnemyActionKind::Breathe,
        EnemyActionKind::Burn,
        EnemyActionKind::Tail,
        EnemyActionKind::Steal,
        EnemyActionKind::Summon,
        EnemyActionKind::Web,
        EnemyActionKind::Phase,
        EnemyActionKind::Parry,
        EnemyActionKind::Ritual,
        EnemyActionKind::Ultimate,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Heal => "heal",
            Self::Harden => "harden",
            Self::Howl => "howl",
            Self::Enrage => "enrage",
            Self::Curse => "curse",
            Self::Poison => "poison",
            Self::Bite => "bite",
            Self::Claw => "claw",
            Self::Breathe => "breathe",
            Self::Burn => "burn",
            Self::Tail => "tail",
            Self::Steal => "steal",
            Self::Summon => "summon",
            Self::Web => "web",
            Self::Phase => "phase",
            Self::Parry => "parry",
            Self::Ritual => "ritual",
            Self::Ultimate => "ultimate",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    pub fn default_weight(self) -> f64 {
        match self {
            Self::Attack => 0.6,
            Self::Bite | Self::Claw | Self::Poison => 0.4,
            Self::Defend
            | Self::Heal
            | Self::Harden
            | Self::Howl
            | Self::Curse
            | Self::Breathe
            | Self::Tail
            | Self::Web
            | Self::Parry => 0.3,
            Self::Enrage | Self::Steal | Self::Summon | Self::Phase | Self::Ritual | Self::Burn => {
                0.2
            }
            Self::Ultimate => 0.0,
        }
    }
}

/// An entry in an enemy's action set. Identifiers the engine does not know
/// are kept so they still take part in selection; they resolve as a basic
/// attack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnemyAction {
    Known(EnemyActionKind),
    Unknown(String),
}

impl EnemyAction {
    pub fn parse(id: &str) -> Self {
        match EnemyActionKind::from_id(id) {
            Some(kind) => Self::Known(kind),
            None => Self::Unknown(id.to_string()),
        }
    }

    pub fn kind(&self) -> Option<EnemyActionKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unknown(_) => None,
        }
    }

    pub fn weight(&self, ai: &AiRule) -> f64 {
        match self {
            Self::Known(kind) => ai.weight_for(*kind),
            Self::Unknown(_) => ai.unknown_weight,
        }
    }
}

impl fmt::Display for EnemyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(kind) => f.write_str(kind.id()),
            Self::Unknown(id) => write!(f, "{id}?"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyTemplate {
    pub name: String,
    pub day: u32,
    pub phase: crate::DayPhase,
    pub max_health: i32,
    pub attack: i32,
    pub actions: Vec<String>,
    pub reward: i64,
    #[serde(default)]
    pub phase_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub actions: Vec<EnemyAction>,
    pub buffs: StatusLedger,
    pub next_action: EnemyAction,
    pub turn_counter: u32,
    pub phase_threshold: Option<f64>,
    pub phase_triggered: bool,
    pub reward: i64,
    pub boss: bool,
}

impl Enemy {
    /// Build an enemy from `template`, multiplying health, attack and reward
    /// by `scale` for days past the authored range.
    pub fn from_template(template: &EnemyTemplate, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let max_health = ((template.max_health as f64 * scale).round() as i32).max(1);
        let attack = ((template.attack as f64 * scale).round() as i32).max(0);
        let reward = (template.reward as f64 * scale).round() as i64;
        let mut actions: Vec<EnemyAction> = template
            .actions
            .iter()
            .map(|id| {
                let action = EnemyAction::parse(id);
                if let EnemyAction::Unknown(raw) = &action {
                    tracing::warn!(
                        enemy = %template.name,
                        action = %raw,
                        "enemy.action.unknown"
                    );
                }
                action
            })
            .collect();
        if actions.is_empty() {
            actions.push(EnemyAction::Known(EnemyActionKind::Attack));
        }
        Self {
            name: template.name.clone(),
            health: max_health,
            max_health,
            attack,
            next_action: actions[0].clone(),
            actions,
            buffs: StatusLedger::new(),
            turn_counter: 0,
            phase_threshold: template.phase_threshold,
            phase_triggered: false,
            reward: reward.max(0),
            boss: template.phase == crate::DayPhase::Dark,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Attack after temporary boosts.
    pub fn effective_attack(&self) -> i32 {
        self.attack
            .saturating_add(self.buffs.magnitude(StatusKind::AttackBoost))
            .max(0)
    }

    pub fn has_action(&self, kind: EnemyActionKind) -> bool {
        self.actions.iter().any(|action| action.kind() == Some(kind))
    }

    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount.max(0)).clamp(0, self.max_health);
        before - self.health
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount.max(0)).clamp(0, self.max_health);
        self.health - before
    }

    pub fn phase_due(&self) -> bool {
        match self.phase_threshold {
            Some(threshold) if !self.phase_triggered => {
                (self.health as f64) <= threshold * self.max_health as f64
            }
            _ => false,
        }
    }
}

/// Pick the enemy's next action.
///
/// Below the low-health ratio a defensive action wins outright (heal, then
/// defend, then harden). Otherwise the greedy branch takes the heaviest
/// action and the remaining branch picks uniformly, ignoring weights.
pub fn determine_next_action(enemy: &Enemy, ai: &AiRule, rng: &mut RngState) -> EnemyAction {
    if (enemy.health as f64) < ai.low_health_ratio * enemy.max_health as f64 {
        for kind in [
            EnemyActionKind::Heal,
            EnemyActionKind::Defend,
            EnemyActionKind::Harden,
        ] {
            if enemy.has_action(kind) {
                return EnemyAction::Known(kind);
            }
        }
    }
    if enemy.actions.is_empty() {
        return EnemyAction::Known(EnemyActionKind::Attack);
    }
    if rng.chance(ai.greedy_chance) {
        let mut best = &enemy.actions[0];
        let mut best_weight = best.weight(ai);
        for action in &enemy.actions[1..] {
            let weight = action.weight(ai);
            if weight > best_weight {
                best = action;
                best_weight = weight;
            }
        }
        return best.clone();
    }
    let idx = rng.index(enemy.actions.len()).unwrap_or(0);
    enemy.actions[idx].clone()
}

/// Resolved numbers for one enemy action, derived from the enemy's current
/// attack. Application order: damage to player, player status, self status,
/// heal, enrage, steal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionEffect {
    pub damage: Option<i32>,
    pub stun_chance: f64,
    pub player_status: Option<StatusEffect>,
    pub self_status: Option<StatusEffect>,
    pub heal: i32,
    pub enrage: i32,
    pub steal: i64,
}

fn scaled(attack: i32, ratio: f64) -> i32 {
    (attack as f64 * ratio).round() as i32
}

fn scaled_up(attack: i32, ratio: f64) -> i32 {
    (attack as f64 * ratio - 1e-9).ceil() as i32
}

pub fn action_effect(kind: EnemyActionKind, enemy: &Enemy, ai: &AiRule) -> ActionEffect {
    let atk = enemy.effective_attack();
    let mut effect = ActionEffect::default();
    match kind {
        EnemyActionKind::Attack => effect.damage = Some(atk),
        EnemyActionKind::Defend => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Defense, scaled_up(atk, 0.5), 2));
        }
        EnemyActionKind::Heal => effect.heal = scaled_up(enemy.max_health, 0.2),
        EnemyActionKind::Harden => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Defense, atk, 3));
        }
        EnemyActionKind::Howl => {
            effect.self_status = Some(StatusEffect::new(
                StatusKind::AttackBoost,
                scaled_up(atk, 0.3),
                3,
            ));
        }
        EnemyActionKind::Enrage => effect.enrage = scaled_up(enemy.attack, 0.2),
        EnemyActionKind::Curse => {
            effect.player_status = Some(StatusEffect::new(StatusKind::Curse, ai.curse_magnitude, 3));
        }
        EnemyActionKind::Poison => {
            effect.player_status = Some(StatusEffect::new(StatusKind::Poison, scaled_up(atk, 0.3), 3));
        }
        EnemyActionKind::Bite => {
            effect.damage = Some(scaled(atk, 1.3));
            effect.stun_chance = ai.bite_stun_chance;
        }
        EnemyActionKind::Claw => {
            effect.damage = Some(scaled(atk, 0.8));
            effect.player_status = Some(StatusEffect::new(
                StatusKind::Bleeding,
                scaled_up(atk, 0.2),
                3,
            ));
        }
        EnemyActionKind::Breathe => effect.damage = Some(scaled(atk, 1.5)),
        EnemyActionKind::Burn => {
            effect.damage = Some(scaled(atk, 0.5));
            effect.player_status = Some(StatusEffect::new(
                StatusKind::Burning,
                scaled_up(atk, 0.3),
                2,
            ));
        }
        EnemyActionKind::Tail => {
            effect.damage = Some(scaled(atk, 0.7));
            effect.stun_chance = 1.0;
        }
        EnemyActionKind::Steal => effect.steal = scaled_up(atk, 0.5) as i64,
        EnemyActionKind::Summon => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Minion, scaled_up(atk, 0.3), 3));
        }
        EnemyActionKind::Web => {
            effect.player_status = Some(StatusEffect::new(StatusKind::Webbed, 1, 2));
        }
        EnemyActionKind::Phase => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Phased, 1, 2));
        }
        EnemyActionKind::Parry => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Parrying, ai.parry_percent, 2));
        }
        EnemyActionKind::Ritual => {
            effect.self_status = Some(StatusEffect::new(StatusKind::Ritual, scaled_up(atk, 0.5), 3));
        }
        EnemyActionKind::Ultimate => effect.damage = Some(scaled(atk, 2.0)),
    }
    effect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DayPhase;

    fn template(actions: &[&str]) -> EnemyTemplate {
        EnemyTemplate {
            name: "Test Beast".to_string(),
            day: 1,
            phase: DayPhase::Dawn,
            max_health: 20,
            attack: 10,
            actions: actions.iter().map(|id| id.to_string()).collect(),
            reward: 10,
            phase_threshold: None,
        }
    }

    #[test]
    fn low_health_prefers_heal_over_defend() {
        let mut enemy = Enemy::from_template(&template(&["attack", "defend", "heal"]), 1.0);
        enemy.health = 5;
        let mut rng = RngState::scripted(&[0.99, 0.99]);
        let action = determine_next_action(&enemy, &AiRule::default(), &mut rng);
        assert_eq!(action, EnemyAction::Known(EnemyActionKind::Heal));
    }

    #[test]
    fn low_health_without_defensive_actions_uses_weights() {
        let mut enemy = Enemy::from_template(&template(&["bite", "attack"]), 1.0);
        enemy.health = 1;
        let mut rng = RngState::scripted(&[0.1]);
        let action = determine_next_action(&enemy, &AiRule::default(), &mut rng);
        assert_eq!(action, EnemyAction::Known(EnemyActionKind::Attack));
    }

    #[test]
    fn greedy_branch_takes_heaviest() {
        let enemy = Enemy::from_template(&template(&["howl", "bite", "attack"]), 1.0);
        let mut rng = RngState::scripted(&[0.69]);
        let action = determine_next_action(&enemy, &AiRule::default(), &mut rng);
        assert_eq!(action, EnemyAction::Known(EnemyActionKind::Attack));
    }

    #[test]
    fn random_branch_ignores_weights() {
        let enemy = Enemy::from_template(&template(&["howl", "bite", "attack"]), 1.0);
        let mut rng = RngState::scripted(&[0.7, 0.0]);
        let action = determine_next_action(&enemy, &AiRule::default(), &mut rng);
        assert_eq!(action, EnemyAction::Known(EnemyActionKind::Howl));
    }

    #[test]
    fn unknown_actions_are_kept_with_low_weight() {
        let enemy = Enemy::from_template(&template(&["gnaw", "howl"]), 1.0);
        assert_eq!(enemy.actions[0], EnemyAction::Unknown("gnaw".to_string()));
        let mut rng = RngState::scripted(&[0.0]);
        let action = determine_next_action(&enemy, &AiRule::default(), &mut rng);
        assert_eq!(action, EnemyAction::Known(EnemyActionKind::Howl));
    }

    #[test]
    fn scaling_rounds_stats() {
        let enemy = Enemy::from_template(&template(&["attack"]), 1.5);
        assert_eq!(enemy.max_health, 30);
        assert_eq!(enemy.health, 30);
        assert_eq!(enemy.attack, 15);
        assert_eq!(enemy.reward, 15);
    }

    #[test]
    fn action_ratios_follow_attack() {
        let enemy = Enemy::from_template(&template(&["attack"]), 1.0);
        let ai = AiRule::default();
        assert_eq!(action_effect(EnemyActionKind::Bite, &enemy, &ai).damage, Some(13));
        assert_eq!(action_effect(EnemyActionKind::Breathe, &enemy, &ai).damage, Some(15));
        let tail = action_effect(EnemyActionKind::Tail, &enemy, &ai);
        assert_eq!(tail.damage, Some(7));
        assert_eq!(tail.stun_chance, 1.0);
        assert_eq!(action_effect(EnemyActionKind::Enrage, &enemy, &ai).enrage, 2);
        assert_eq!(action_effect(EnemyActionKind::Heal, &enemy, &ai).heal, 4);
    }

    #[test]
    fn attack_boost_feeds_effective_attack() {
        let mut enemy = Enemy::from_template(&template(&["attack"]), 1.0);
        enemy.buffs.apply(StatusEffect::new(StatusKind::AttackBoost, 3, 2));
        assert_eq!(enemy.effective_attack(), 13);
        assert_eq!(
            action_effect(EnemyActionKind::Attack, &enemy, &AiRule::default()).damage,
            Some(13)
        );
    }

    #[test]
    fn phase_due_only_once() {
        let mut enemy = Enemy::from_template(&template(&["attack"]), 1.0);
        enemy.phase_threshold = Some(0.5);
        assert!(!enemy.phase_due());
        enemy.health = 10;
        assert!(enemy.phase_due());
        enemy.phase_triggered = true;
        assert!(!enemy.phase_due());
    }
}
