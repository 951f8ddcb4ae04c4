//! Plain-text reply builders. Every reply is a single message string
//! with `<@Uxxxx>` mention placeholders; the transport layer posts it
//! verbatim.

use usagi_core::domain::shop::ShopItem;
use usagi_core::games::slot::{line_name, SlotGrid};
use usagi_core::games::wheel::WheelOutcome;
use usagi_economy::{
    BagEntry, CheckinReceipt, EconomyError, LotteryPlay, LotteryResult, PurchaseReceipt, SlotPlay,
    TransferReceipt, WheelPlay,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

pub fn help_message() -> Reply {
    Reply::new(
        "*Usagi coin commands*\n\
         • `/coin checkin` — collect the daily 100 coins\n\
         • `/coin balance` — show your balance\n\
         • `/coin transfer <@user> <amount>` — send coins\n\
         • `/coin wheel [bet]` — spin the wheel (default bet 10)\n\
         • `/coin lottery [bet]` — play for the shared daily jackpot\n\
         • `/coin slot [bet]` — pull the slot machine\n\
         • `/coin shop` — list items for sale\n\
         • `/coin buy <id>` — buy an item\n\
         • `/coin bag` — show what you own"
            .to_owned(),
    )
}

pub fn usage_message(usage: &str) -> Reply {
    Reply::new(format!("Usage: `/coin {usage}`"))
}

pub fn error_message(text: &str) -> Reply {
    Reply::new(text.to_owned())
}

/// One reply per user-error variant; repository failures get a generic
/// line so internals never leak into the channel.
pub fn economy_error_message(user_id: &str, error: &EconomyError) -> Reply {
    let who = mention(user_id);
    let text = match error {
        EconomyError::MinimumBet { minimum } => {
            format!("{who} stakes start at {minimum} coins.")
        }
        EconomyError::InvalidAmount => format!("{who} the amount must be a positive number."),
        EconomyError::InsufficientBalance { balance, required } => {
            format!("{who} you need {required} coins but only have {balance}.")
        }
        EconomyError::ItemNotFound { item_id } => {
            format!("{who} there is no item #{item_id}. See `/coin shop`.")
        }
        EconomyError::AlreadyCheckedIn => {
            format!("{who} you already checked in today. Come back tomorrow!")
        }
        EconomyError::JackpotAlreadyWon { winner } => {
            format!("{} already took today's jackpot. Try again tomorrow!", mention(winner))
        }
        EconomyError::Repository(_) => {
            format!("{who} something went wrong, please try again later.")
        }
    };
    Reply::new(text)
}

pub fn checkin_message(user_id: &str, receipt: &CheckinReceipt) -> Reply {
    Reply::new(format!(
        "{} checked in and collected {} coins. Balance: {} coins.",
        mention(user_id),
        receipt.amount,
        receipt.balance
    ))
}

pub fn balance_message(user_id: &str, balance: i64) -> Reply {
    Reply::new(format!("{} has {balance} coins.", mention(user_id)))
}

pub fn transfer_message(receipt: &TransferReceipt) -> Reply {
    Reply::new(format!(
        "{} sent {} coins to {}. Balance: {} coins.",
        mention(&receipt.from),
        receipt.amount,
        mention(&receipt.to),
        receipt.sender_balance
    ))
}

pub fn wheel_message(user_id: &str, play: &WheelPlay) -> Reply {
    let who = mention(user_id);
    let mut text = match play.outcome {
        WheelOutcome::NoWin => format!("{who} spun the wheel... nothing this time."),
        WheelOutcome::Prize(amount) => {
            format!("{who} spun the wheel and won {amount} coins! 🎉")
        }
        WheelOutcome::Thanks => format!("{who} spun the wheel. Thanks for playing!"),
        WheelOutcome::Halved => format!(
            "{who} spun the wheel and hit the dreaded halver — {} coins gone. 💸",
            play.halved_loss
        ),
    };
    if play.stake_waived {
        text.push_str(" (Your Golden Pocket covered the stake.)");
    }
    text.push_str(&format!(" Balance: {} coins.", play.balance));
    Reply::new(text)
}

pub fn lottery_message(user_id: &str, play: &LotteryPlay) -> Reply {
    let who = mention(user_id);
    let mut text = match play.result {
        LotteryResult::Won { pot } => {
            format!("🎊 {who} hit the jackpot and takes the whole pool of {pot} coins!")
        }
        LotteryResult::Lost { pool } => format!(
            "{who} played the lottery at {}% and lost. The pool is now {pool} coins.",
            play.win_rate
        ),
    };
    if play.stake_waived {
        text.push_str(" (Your Golden Pocket covered the stake.)");
    }
    text.push_str(&format!(" Balance: {} coins.", play.balance));
    Reply::new(text)
}

fn render_grid(grid: &SlotGrid) -> String {
    grid.iter()
        .map(|row| row.iter().map(|symbol| symbol.emoji()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn slot_message(user_id: &str, play: &SlotPlay) -> Reply {
    let who = mention(user_id);
    let mut text = format!("{who} pulls the lever...\n{}\n", render_grid(&play.grid));
    if play.line_wins.is_empty() {
        text.push_str("No lines this time.");
    } else {
        for win in &play.line_wins {
            text.push_str(&format!(
                "{} of {} pays {} coins!\n",
                line_name(win.line),
                win.symbol.emoji(),
                win.payout
            ));
        }
        text.push_str(&format!("Total win: {} coins. 🎰", play.payout));
    }
    if play.stake_waived {
        text.push_str(" (Your Golden Pocket covered the stake.)");
    }
    text.push_str(&format!(" Balance: {} coins.", play.balance));
    Reply::new(text)
}

pub fn shop_list_message(items: &[ShopItem]) -> Reply {
    let mut text = String::from("*Usagi shop*\n");
    for item in items {
        let duration = match item.expire_days {
            Some(days) => format!("{days}d"),
            None => "forever".to_owned(),
        };
        text.push_str(&format!(
            "#{} *{}* — {} coins ({duration}): {}\n",
            item.id, item.name, item.price, item.description
        ));
    }
    text.push_str("Buy with `/coin buy <id>`.");
    Reply::new(text)
}

pub fn purchase_message(user_id: &str, receipt: &PurchaseReceipt) -> Reply {
    Reply::new(format!(
        "{} bought *{}* for {} coins. Balance: {} coins.",
        mention(user_id),
        receipt.item_name,
        receipt.price,
        receipt.balance
    ))
}

pub fn bag_message(user_id: &str, entries: &[BagEntry]) -> Reply {
    let who = mention(user_id);
    if entries.is_empty() {
        return Reply::new(format!("{who}'s bag is empty. See `/coin shop`."));
    }
    let mut text = format!("{who}'s bag:\n");
    for entry in entries {
        let status = if entry.expired { "expired" } else { "active" };
        text.push_str(&format!("• {} ({status})\n", entry.item.item_name));
    }
    Reply::new(text.trim_end().to_owned())
}
