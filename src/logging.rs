// src/logging.rs

//! Subscriber setup for the `bootstrapper` binary.
//!
//! The filter comes from `--log-level` when given. Otherwise
//! `BOOTSTRAPPER_LOG` is read, either as a bare level (`warning` is accepted
//! for `warn`) or as a full directive list such as
//! `info,bootstrapper::exec=trace`. Child output forwarded by the tracing
//! sink goes through the same subscriber, so everything lands on stderr and
//! stdout stays free for `--dry-run`.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "BOOTSTRAPPER_LOG";

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_value.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(flag_level(level).into());
    }

    let Some(raw) = env_value.map(str::trim).filter(|v| !v.is_empty()) else {
        return EnvFilter::default().add_directive(LevelFilter::INFO.into());
    };

    if let Some(level) = bare_level(raw) {
        return EnvFilter::default().add_directive(level.into());
    }
    EnvFilter::try_new(raw)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
}

fn flag_level(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

fn bare_level(raw: &str) -> Option<LevelFilter> {
    match raw.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
