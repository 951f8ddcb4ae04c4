use std::process::ExitCode;

fn main() -> ExitCode {
    usagi_cli::run()
}
