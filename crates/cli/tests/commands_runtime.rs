use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use usagi_cli::commands::{exec, migrate};

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("USAGI_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_reports_bad_database_urls() {
    with_env(&[("USAGI_DATABASE_URL", "sqlite:///nonexistent-dir/usagi.db")], || {
        let result = migrate::run();
        assert_ne!(result.exit_code, 0, "expected migrate failure");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
    });
}

#[test]
fn exec_runs_a_checkin_and_reports_the_reply() {
    // One connection: an in-memory database exists per connection.
    with_env(
        &[
            ("USAGI_DATABASE_URL", "sqlite::memory:"),
            ("USAGI_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = exec::run("U777", "checkin");
            assert_eq!(result.exit_code, 0, "expected successful exec run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "exec");
            assert_eq!(payload["status"], "ok");

            let reply = payload["reply"].as_str().unwrap_or_default();
            assert!(reply.contains("<@U777>"), "reply should mention the user: {reply}");
            assert!(reply.contains("100 coins"), "reply should name the credit: {reply}");
        },
    );
}

#[test]
fn exec_answers_help_for_empty_text() {
    with_env(
        &[
            ("USAGI_DATABASE_URL", "sqlite::memory:"),
            ("USAGI_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = exec::run("U777", "");
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            let reply = payload["reply"].as_str().unwrap_or_default();
            assert!(reply.contains("/coin checkin"), "help should list the verbs: {reply}");
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "USAGI_DATABASE_URL",
        "USAGI_DATABASE_MAX_CONNECTIONS",
        "USAGI_DATABASE_TIMEOUT_SECS",
        "USAGI_SLACK_APP_TOKEN",
        "USAGI_SLACK_BOT_TOKEN",
        "USAGI_LOGGING_LEVEL",
        "USAGI_LOGGING_FORMAT",
        "USAGI_LOG_LEVEL",
        "USAGI_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
