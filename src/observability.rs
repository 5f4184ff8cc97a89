//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Switches the log output to JSON when set to `json`.
pub const ENV_LOG_FORMAT: &str = "RELAY_LOG_FORMAT";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// Log format defaults to compact text and can be switched to JSON via
/// `RELAY_LOG_FORMAT=json`. Filter defaults to `info` if `RUST_LOG` is unset.
/// ANSI colours and timestamps are off: CloudWatch adds its own.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var(ENV_LOG_FORMAT)
            .map(|v| wants_json(&v))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(true).without_time())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_ansi(false).without_time())
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

fn wants_json(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("json")
}
