pub mod commands;
pub mod logging;
pub mod service;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "usagi",
    about = "Usagi coin economy operator CLI",
    long_about = "Operate the usagi coin economy: migrations, readiness checks, and \
                  running bot commands against the configured database.",
    after_help = "Examples:\n  usagi migrate\n  usagi doctor --json\n  usagi exec --user U123 wheel 50"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run one /coin command through the real service and print the reply")]
    Exec {
        #[arg(long, help = "Slack user id the command runs as, e.g. U123")]
        user: String,
        #[arg(
            required = true,
            trailing_var_arg = true,
            help = "Command text, e.g. `wheel 50` or `buy 3`"
        )]
        text: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Exec { user, text } => commands::exec::run(&user, &text.join(" ")),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
