use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag identifying which action produced a coin movement. Open-ended:
/// unrecognized tags read back from storage survive as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Checkin,
    TransferOut,
    TransferIn,
    SpinWheel,
    SpinWheelReward,
    SpinWheelHalf,
    Lottery,
    LotteryWin,
    SlotMachine,
    SlotMachineWin,
    ShopBuy,
    PoorBonus,
    Other(String),
}

impl ChangeType {
    pub fn as_key(&self) -> String {
        match self {
            Self::Checkin => "checkin".to_string(),
            Self::TransferOut => "transfer_out".to_string(),
            Self::TransferIn => "transfer_in".to_string(),
            Self::SpinWheel => "spin_wheel".to_string(),
            Self::SpinWheelReward => "spin_wheel_reward".to_string(),
            Self::SpinWheelHalf => "spin_wheel_half".to_string(),
            Self::Lottery => "lottery".to_string(),
            Self::LotteryWin => "lottery_win".to_string(),
            Self::SlotMachine => "slot_machine".to_string(),
            Self::SlotMachineWin => "slot_machine_win".to_string(),
            Self::ShopBuy => "shop_buy".to_string(),
            Self::PoorBonus => "poor_bonus".to_string(),
            Self::Other(value) => value.to_ascii_lowercase(),
        }
    }

    pub fn from_key(value: &str) -> Self {
        match value {
            "checkin" => Self::Checkin,
            "transfer_out" => Self::TransferOut,
            "transfer_in" => Self::TransferIn,
            "spin_wheel" => Self::SpinWheel,
            "spin_wheel_reward" => Self::SpinWheelReward,
            "spin_wheel_half" => Self::SpinWheelHalf,
            "lottery" => Self::Lottery,
            "lottery_win" => Self::LotteryWin,
            "slot_machine" => Self::SlotMachine,
            "slot_machine_win" => Self::SlotMachineWin,
            "shop_buy" => Self::ShopBuy,
            "poor_bonus" => Self::PoorBonus,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One signed balance change. A user's balance is always the sum of
/// their movements; there is no cached balance field anywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinMovement {
    pub id: String,
    pub user_id: String,
    pub change_type: ChangeType,
    pub day: NaiveDate,
    pub amount: i64,
    pub related_user: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl CoinMovement {
    pub fn new(
        user_id: impl Into<String>,
        amount: i64,
        change_type: ChangeType,
        related_user: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            change_type,
            day: now.date_naive(),
            amount,
            related_user,
            recorded_at: now,
        }
    }

    /// Same-day same-type movements may be merged into one stored row,
    /// but only when no counterpart reference would be lost.
    pub fn is_mergeable(&self) -> bool {
        self.related_user.is_none()
    }
}
