// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use std::path::PathBuf;

/// Errors from configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Command-line configuration.
#[derive(Debug, Parser)]
#[command(
    name = "garbagedog",
    about = "Tail JVM garbage-collector logs and emit GC metrics over DogStatsD",
    after_help = "\
EXAMPLES:
    garbagedog --log-dir /var/log/myapp               Tail the newest gc* file
    java -Xloggc:/dev/stdout ... | garbagedog --stdin  Read GC output from a pipe"
)]
pub struct Config {
    /// Directory containing rotating gc log files
    #[arg(long, value_name = "DIR", conflicts_with = "stdin", required_unless_present = "stdin")]
    pub log_dir: Option<PathBuf>,

    /// Read GC log lines from standard input instead of a log directory
    #[arg(long)]
    pub stdin: bool,

    /// DogStatsD agent host
    #[arg(long, default_value = "localhost")]
    pub statsd_host: String,

    /// DogStatsD agent port
    #[arg(long, default_value = "8125")]
    pub statsd_port: u16,

    /// Extra key:value tag appended to every metric (repeatable)
    #[arg(long = "tag", value_name = "KEY:VALUE")]
    pub tags: Vec<String>,

    /// Reselect the newest log file after this many seconds without output
    #[arg(long, default_value = "60")]
    pub refresh_logfiles_seconds: u64,

    /// Poll interval in seconds while the current log file has no new lines
    #[arg(long, default_value = "1")]
    pub sleep_seconds: u64,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.statsd_host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "statsd host cannot be empty".to_string(),
            ));
        }
        if self.statsd_port == 0 {
            return Err(ConfigError::InvalidConfig(
                "statsd port must be greater than 0".to_string(),
            ));
        }
        if !self.stdin {
            if self.sleep_seconds == 0 {
                return Err(ConfigError::InvalidConfig(
                    "poll interval must be greater than 0".to_string(),
                ));
            }
            if self.refresh_logfiles_seconds == 0 {
                return Err(ConfigError::InvalidConfig(
                    "log refresh window must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_mode_parses_and_validates() {
        let config = Config::try_parse_from(["garbagedog", "--stdin"]).unwrap();
        assert!(config.stdin);
        assert!(config.log_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_dir_mode_with_defaults() {
        let config = Config::try_parse_from(["garbagedog", "--log-dir", "/var/log/gc"]).unwrap();
        assert_eq!(config.statsd_host, "localhost");
        assert_eq!(config.statsd_port, 8125);
        assert_eq!(config.refresh_logfiles_seconds, 60);
        assert_eq!(config.sleep_seconds, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_selection_is_required() {
        assert!(Config::try_parse_from(["garbagedog"]).is_err());
    }

    #[test]
    fn test_sources_are_mutually_exclusive() {
        assert!(
            Config::try_parse_from(["garbagedog", "--stdin", "--log-dir", "/var/log/gc"]).is_err()
        );
    }

    #[test]
    fn test_repeated_tags() {
        let config = Config::try_parse_from([
            "garbagedog",
            "--stdin",
            "--tag",
            "env:prod",
            "--tag",
            "service:billing",
        ])
        .unwrap();
        assert_eq!(config.tags, vec!["env:prod", "service:billing"]);
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let config = Config::try_parse_from([
            "garbagedog",
            "--log-dir",
            "/var/log/gc",
            "--sleep-seconds",
            "0",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ignores_poll_settings_for_stdin() {
        let config =
            Config::try_parse_from(["garbagedog", "--stdin", "--sleep-seconds", "0"]).unwrap();
        assert!(config.validate().is_ok());
    }
}
