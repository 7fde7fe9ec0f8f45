use gemfire_core::{Augmentation, GemInstanceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AutoAction {
    StartBattle,
    Play { ids: Vec<GemInstanceId> },
    Wait,
    Discard { ids: Vec<GemInstanceId> },
    Flee,
    EnemyTurn,
    BuyOffer { index: usize },
    RemoveGem { id: GemInstanceId },
    UpgradeGem {
        id: GemInstanceId,
        augmentation: Augmentation,
    },
    BuyHeal,
    LeaveShop,
    Rest,
    Bank { amount: i64 },
    UnlockGem { gem: String },
    LeaveCamp,
}

impl AutoAction {
    pub fn stable_key(&self) -> String {
        match self {
            Self::StartBattle => "start_battle".to_string(),
            Self::Play { ids } => format!("play:{}", join_ids(ids)),
            Self::Wait => "wait".to_string(),
            Self::Discard { ids } => format!("discard:{}", join_ids(ids)),
            Self::Flee => "flee".to_string(),
            Self::EnemyTurn => "enemy_turn".to_string(),
            Self::BuyOffer { index } => format!("buy_offer:{index}"),
            Self::RemoveGem { id } => format!("remove_gem:{id}"),
            Self::UpgradeGem { id, augmentation } => {
                format!("upgrade_gem:{id}:{}", augmentation.id_suffix())
            }
            Self::BuyHeal => "buy_heal".to_string(),
            Self::LeaveShop => "leave_shop".to_string(),
            Self::Rest => "rest".to_string(),
            Self::Bank { amount } => format!("bank:{amount}"),
            Self::UnlockGem { gem } => format!("unlock_gem:{gem}"),
            Self::LeaveCamp => "leave_camp".to_string(),
        }
    }

    pub fn short_label(&self) -> String {
        match self {
            Self::Play { ids } => format!("play [{}]", join_ids(ids)),
            Self::Discard { ids } => format!("discard [{}]", join_ids(ids)),
            Self::RemoveGem { id } => format!("remove gem {id}"),
            Self::UpgradeGem { id, augmentation } => {
                format!("upgrade gem {id} ({})", augmentation.id_suffix())
            }
            Self::BuyOffer { index } => format!("buy offer {index}"),
            Self::Bank { amount } => format!("bank {amount}"),
            Self::UnlockGem { gem } => format!("unlock {gem}"),
            other => other.stable_key().replace('_', " "),
        }
    }

    /// True for the actions that belong to the player's battle turn.
    pub fn is_battle_move(&self) -> bool {
        matches!(
            self,
            Self::Play { .. } | Self::Wait | Self::Discard { .. } | Self::Flee
        )
    }
}

fn join_ids(ids: &[GemInstanceId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
