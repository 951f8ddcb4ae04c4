//! Slack-facing command surface for the coin economy.
//!
//! This crate stays transport-free: it normalizes `/coin` slash-command
//! payloads, classifies verbs, and routes them through the
//! [`CoinCommandService`] trait. Reply builders in [`messages`] produce
//! plain-text messages with `<@user>` mention placeholders; whatever
//! posts them (Socket Mode runner, HTTP responder, CLI) is wired
//! elsewhere.

pub mod commands;
pub mod messages;

pub use commands::{
    normalize_coin_command, parse_coin_command, CoinCommand, CoinCommandService, CommandEnvelope,
    CommandParseError, CommandRouteError, CommandRouter, NoopCoinCommandService,
    SlashCommandPayload, StakeArg,
};
pub use messages::Reply;
