//! Configuration
//!
//! Every tunable is carried in an explicit value handed to constructors.
//! `Config` groups them and can be loaded from a TOML file; any missing
//! field falls back to its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, ConfigError};

/// Default capacity of each inbound queue
const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default number of report workers
const DEFAULT_MAX_CONCURRENT_REPORTS: usize = 64;

/// Default number of reports waiting for a worker
const DEFAULT_REPORT_QUEUE_CAPACITY: usize = 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dispatcher: DispatcherConfig,
    pub hashing: HashConfig,
    pub accounts: AccountPolicy,
    pub prompts: CliPrompts,
    pub report_format: ReportFormat,
    /// File for JSON reports; stderr when unset
    pub report_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(content)?;
        config.dispatcher.validate()?;
        config.accounts.validate()?;
        Ok(config)
    }
}

/// Room dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Capacity of each of the three inbound queues
    pub queue_capacity: usize,
    /// Number of report workers, i.e. reports being recorded at once
    pub max_concurrent_reports: usize,
    /// Reports waiting for a worker; further reports are dropped with a warning
    pub report_queue_capacity: usize,
}

impl DispatcherConfig {
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.max_concurrent_reports == 0 {
            return Err(ConfigError::ZeroReportLimit);
        }
        if self.report_queue_capacity == 0 {
            return Err(ConfigError::ZeroReportQueue);
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_concurrent_reports: DEFAULT_MAX_CONCURRENT_REPORTS,
            report_queue_capacity: DEFAULT_REPORT_QUEUE_CAPACITY,
        }
    }
}

/// Argon2id parameters
///
/// Defaults: 1 pass, 64 MiB, 4 lanes, 32-byte digest, 16-byte salt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub salt_len: usize,
    pub time_cost: u32,
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub lanes: u32,
    pub key_len: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            salt_len: 16,
            time_cost: 1,
            memory_kib: 64 * 1024,
            lanes: 4,
            key_len: 32,
        }
    }
}

/// Account creation rules
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountPolicy {
    /// Minimum username length in bytes
    pub min_username_len: usize,
    /// Maximum username length in bytes
    pub max_username_len: usize,
}

impl AccountPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_username_len > self.max_username_len {
            return Err(ConfigError::InvalidUsernameBounds {
                min: self.min_username_len,
                max: self.max_username_len,
            });
        }
        Ok(())
    }
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            min_username_len: 5,
            max_username_len: 20,
        }
    }
}

/// Prompt strings shown by the interactive binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliPrompts {
    pub username: String,
    pub password: String,
    pub role: String,
    pub message: String,
    pub leave_chat: String,
}

impl Default for CliPrompts {
    fn default() -> Self {
        Self {
            username: "Enter username: ".to_string(),
            password: "Enter password: ".to_string(),
            role: "Enter role (admin/user): ".to_string(),
            message: "Enter message: ".to_string(),
            leave_chat: "Do you want to leave the chat? (y/n): ".to_string(),
        }
    }
}

/// Where processed room events are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Log lines through `tracing`
    #[default]
    Log,
    /// One JSON object per line, kept off stdout so prompts stay readable
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dispatcher.queue_capacity, 1000);
        assert_eq!(config.hashing.memory_kib, 65536);
        assert_eq!(config.accounts.min_username_len, 5);
        assert_eq!(config.accounts.max_username_len, 20);
        assert_eq!(config.report_format, ReportFormat::Log);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            report_format = "json"
            report_path = "/var/log/chat/reports.jsonl"

            [dispatcher]
            queue_capacity = 8

            [accounts]
            max_username_len = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatcher.queue_capacity, 8);
        assert_eq!(config.dispatcher.max_concurrent_reports, 64);
        assert_eq!(config.dispatcher.report_queue_capacity, 1024);
        assert_eq!(config.accounts.min_username_len, 5);
        assert_eq!(config.accounts.max_username_len, 12);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(
            config.report_path,
            Some(PathBuf::from("/var/log/chat/reports.jsonl"))
        );
        assert_eq!(config.prompts, CliPrompts::default());
    }

    #[test]
    fn test_parse_rejects_zero_capacity() {
        let result = Config::parse("[dispatcher]\nqueue_capacity = 0\n");
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::ZeroQueueCapacity))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let result = Config::parse("[dispatcher\n");
        assert!(matches!(result, Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn test_dispatcher_config_validate() {
        assert!(DispatcherConfig::with_capacity(1).validate().is_ok());
        let config = DispatcherConfig {
            queue_capacity: 4,
            max_concurrent_reports: 0,
            ..DispatcherConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroReportLimit));

        let config = DispatcherConfig {
            report_queue_capacity: 0,
            ..DispatcherConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroReportQueue));
    }

    #[test]
    fn test_account_policy_validate() {
        let policy = AccountPolicy {
            min_username_len: 10,
            max_username_len: 3,
        };
        assert_eq!(
            policy.validate(),
            Err(ConfigError::InvalidUsernameBounds { min: 10, max: 3 })
        );
    }
}
