//! Tracing subscriber setup for the binary

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Switches log output to JSON lines when truthy
pub const ENV_LOG_JSON: &str = "KGVIZ_LOG_JSON";

/// Filter used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "info";

/// Read a boolean flag through `lookup`, falling back to `default`
pub fn env_bool<F>(lookup: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Install the global subscriber: `RUST_LOG` filter, text or JSON output
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// # Errors
/// - `TryInitError` if a global subscriber is already installed
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_parses_known_spellings() {
        assert!(env_bool(|_| Some("YES".to_string()), ENV_LOG_JSON, false));
        assert!(!env_bool(|_| Some("0".to_string()), ENV_LOG_JSON, true));
    }

    #[test]
    fn env_bool_falls_back() {
        assert!(env_bool(|_| None, ENV_LOG_JSON, true));
        assert!(!env_bool(|_| Some("sometimes".to_string()), ENV_LOG_JSON, false));
    }
}
