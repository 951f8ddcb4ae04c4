use async_trait::async_trait;
use thiserror::Error;

use usagi_core::games::{DEFAULT_BET, MINIMUM_BET};

use crate::messages::{self, Reply};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub command: String,
    pub verb: String,
    pub freeform_args: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
}

/// Stake argument for the three games. `Default` when the user typed
/// no amount; `Invalid` keeps the raw token for the usage reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakeArg {
    Default,
    Bet(i64),
    Invalid(String),
}

impl StakeArg {
    fn parse(args: &str) -> Self {
        let token = match args.split_whitespace().next() {
            Some(token) => token,
            None => return Self::Default,
        };
        match token.parse::<i64>() {
            Ok(bet) => Self::Bet(bet),
            Err(_) => Self::Invalid(token.to_owned()),
        }
    }

    pub fn amount(&self) -> Option<i64> {
        match self {
            Self::Default => Some(DEFAULT_BET),
            Self::Bet(bet) => Some(*bet),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoinCommand {
    Checkin,
    Balance,
    Transfer { to: Option<String>, amount: Option<i64> },
    Wheel { bet: StakeArg },
    Lottery { bet: StakeArg },
    Slot { bet: StakeArg },
    Shop,
    Buy { item_id: Option<u32> },
    Bag,
    Help,
    Unknown { verb: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

pub fn normalize_coin_command(
    payload: SlashCommandPayload,
) -> Result<CommandEnvelope, CommandParseError> {
    if payload.command != "/coin" {
        return Err(CommandParseError::UnsupportedCommand(payload.command));
    }

    let text = payload.text.trim().to_owned();
    let mut parts = text.split_whitespace();
    let verb = parts.next().unwrap_or("help").to_ascii_lowercase();
    let freeform_args = parts.collect::<Vec<_>>().join(" ");

    Ok(CommandEnvelope {
        command: "coin".to_owned(),
        verb,
        freeform_args,
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        trigger_ts: payload.trigger_ts,
        request_id: payload.request_id,
    })
}

pub fn parse_coin_command(input: &str) -> CoinCommand {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CoinCommand::Help;
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let freeform_args = parts.collect::<Vec<_>>().join(" ");
    classify_coin_command(&verb, &freeform_args)
}

fn classify_coin_command(verb: &str, freeform_args: &str) -> CoinCommand {
    match verb {
        "checkin" | "check-in" => CoinCommand::Checkin,
        "balance" => CoinCommand::Balance,
        "transfer" | "give" => {
            let mut tokens = freeform_args.split_whitespace();
            let to = tokens.next().and_then(parse_mention_token);
            let amount = tokens.next().and_then(|token| token.parse::<i64>().ok());
            CoinCommand::Transfer { to, amount }
        }
        "wheel" => CoinCommand::Wheel { bet: StakeArg::parse(freeform_args) },
        "lottery" => CoinCommand::Lottery { bet: StakeArg::parse(freeform_args) },
        "slot" => CoinCommand::Slot { bet: StakeArg::parse(freeform_args) },
        "shop" => CoinCommand::Shop,
        "buy" => CoinCommand::Buy {
            item_id: freeform_args.split_whitespace().next().and_then(|t| t.parse().ok()),
        },
        "bag" => CoinCommand::Bag,
        "help" => CoinCommand::Help,
        _ => CoinCommand::Unknown { verb: verb.to_owned() },
    }
}

/// Accepts `<@U123>` and `<@U123|display-name>` mention tokens.
pub fn parse_mention_token(token: &str) -> Option<String> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    let user_id = inner.split('|').next().unwrap_or(inner);
    if user_id.is_empty() || !user_id.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    Some(user_id.to_owned())
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: CoinCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(&self, envelope: CommandEnvelope) -> Result<Reply, CommandRouteError> {
        match classify_coin_command(&envelope.verb, &envelope.freeform_args) {
            CoinCommand::Checkin => self.service.check_in(&envelope).await,
            CoinCommand::Balance => self.service.balance(&envelope).await,
            CoinCommand::Transfer { to: Some(to), amount: Some(amount) } => {
                self.service.transfer(&to, amount, &envelope).await
            }
            CoinCommand::Transfer { .. } => {
                Ok(messages::usage_message("transfer `<@user> <amount>`"))
            }
            CoinCommand::Wheel { bet } => self.route_stake(bet, &envelope, "wheel").await,
            CoinCommand::Lottery { bet } => self.route_stake(bet, &envelope, "lottery").await,
            CoinCommand::Slot { bet } => self.route_stake(bet, &envelope, "slot").await,
            CoinCommand::Shop => self.service.shop(&envelope).await,
            CoinCommand::Buy { item_id: Some(item_id) } => {
                self.service.buy(item_id, &envelope).await
            }
            CoinCommand::Buy { item_id: None } => Ok(messages::usage_message("buy `<item id>`")),
            CoinCommand::Bag => self.service.bag(&envelope).await,
            CoinCommand::Help => Ok(messages::help_message()),
            CoinCommand::Unknown { verb } => Ok(messages::error_message(&format!(
                "Unsupported command `/coin {verb}`. Try `/coin help`."
            ))),
        }
    }

    async fn route_stake(
        &self,
        bet: StakeArg,
        envelope: &CommandEnvelope,
        game: &str,
    ) -> Result<Reply, CommandRouteError> {
        let Some(amount) = bet.amount() else {
            return Ok(messages::usage_message(&format!(
                "{game} `[bet]` (a whole number of at least {MINIMUM_BET} coins)"
            )));
        };
        match game {
            "wheel" => self.service.wheel(amount, envelope).await,
            "lottery" => self.service.lottery(amount, envelope).await,
            _ => self.service.slot(amount, envelope).await,
        }
    }
}

#[async_trait]
pub trait CoinCommandService: Send + Sync {
    async fn check_in(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError>;

    async fn balance(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError>;

    async fn transfer(
        &self,
        to: &str,
        amount: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError>;

    async fn wheel(&self, bet: i64, envelope: &CommandEnvelope)
        -> Result<Reply, CommandRouteError>;

    async fn lottery(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError>;

    async fn slot(&self, bet: i64, envelope: &CommandEnvelope)
        -> Result<Reply, CommandRouteError>;

    async fn shop(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError>;

    async fn buy(
        &self,
        item_id: u32,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError>;

    async fn bag(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError>;
}

#[derive(Default)]
pub struct NoopCoinCommandService;

#[async_trait]
impl CoinCommandService for NoopCoinCommandService {
    async fn check_in(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{} checked in", messages::mention(&envelope.user_id))))
    }

    async fn balance(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(messages::balance_message(&envelope.user_id, 0))
    }

    async fn transfer(
        &self,
        to: &str,
        amount: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!(
            "{} would send {amount} coins to {}",
            messages::mention(&envelope.user_id),
            messages::mention(to)
        )))
    }

    async fn wheel(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{} spins for {bet}", messages::mention(&envelope.user_id))))
    }

    async fn lottery(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{} plays lottery for {bet}", messages::mention(&envelope.user_id))))
    }

    async fn slot(
        &self,
        bet: i64,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{} pulls the lever for {bet}", messages::mention(&envelope.user_id))))
    }

    async fn shop(&self, _envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new("shop listing".to_owned()))
    }

    async fn buy(
        &self,
        item_id: u32,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{} buys item {item_id}", messages::mention(&envelope.user_id))))
    }

    async fn bag(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        Ok(Reply::new(format!("{}'s bag is empty", messages::mention(&envelope.user_id))))
    }
}
