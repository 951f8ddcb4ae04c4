use usagi_core::config::{AppConfig, LoadOptions};
use usagi_db::{connect_with_settings, migrations};
use usagi_slack::commands::{normalize_coin_command, CommandRouter, SlashCommandPayload};

use crate::commands::CommandResult;
use crate::logging;
use crate::service::EconomyCommandService;

/// Runs one `/coin` command as `user_id` against the configured
/// database and prints the reply the bot would have posted.
pub fn run(user_id: &str, text: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "exec",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    logging::init(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "exec",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let envelope = match normalize_coin_command(SlashCommandPayload {
        command: "/coin".to_owned(),
        text: text.to_owned(),
        channel_id: "cli".to_owned(),
        user_id: user_id.to_owned(),
        trigger_ts: "0".to_owned(),
        request_id: "cli-exec".to_owned(),
    }) {
        Ok(envelope) => envelope,
        Err(error) => {
            return CommandResult::failure("exec", "command_parse", error.to_string(), 6);
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let router = CommandRouter::new(EconomyCommandService::new(pool.clone()));
        let reply = router
            .route(envelope)
            .await
            .map_err(|error| ("command_route", error.to_string(), 7u8))?;
        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(reply.text)
    });

    match result {
        Ok(reply) => CommandResult::success_with_reply("exec", "command executed", reply),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("exec", error_class, message, exit_code)
        }
    }
}
