// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `bootstrapper`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootstrapper",
    version,
    about = "Run the pre- and post-build steps of an analysis run.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Bootstrapper.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Bootstrapper.toml")]
    pub config: String,

    /// Run only the step with this name.
    #[arg(long, value_name = "NAME")]
    pub step: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BOOTSTRAPPER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the steps, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Kill steps that exceed their timeout instead of leaving them running.
    ///
    /// Overrides `[config].kill_on_timeout` when set.
    #[arg(long)]
    pub kill_on_timeout: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["bootstrapper"]).unwrap();
        assert_eq!(args.config, "Bootstrapper.toml");
        assert!(args.step.is_none());
        assert!(!args.dry_run);
        assert!(!args.kill_on_timeout);
    }

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::try_parse_from([
            "bootstrapper",
            "--config",
            "ci/steps.toml",
            "--step",
            "end",
            "--log-level",
            "debug",
            "--dry-run",
            "--kill-on-timeout",
        ])
        .unwrap();
        assert_eq!(args.config, "ci/steps.toml");
        assert_eq!(args.step.as_deref(), Some("end"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
        assert!(args.kill_on_timeout);
    }
}
