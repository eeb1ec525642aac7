//! Stage configuration with sensible defaults.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::StageError;
use crate::directory::DirectoryConfig;
use crate::mailbox::MailboxConfig;

/// Default timeout applied to each actor stop during stage close.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Stage-wide configuration.
///
/// # Examples
///
/// ```rust
/// use stagehand::stage::StageConfig;
/// use stagehand::directory::DirectoryConfig;
///
/// let config = StageConfig::default();
/// assert!(config.validate().is_ok());
///
/// let config = StageConfig::builder()
///     .with_directory(DirectoryConfig::SMALL)
///     .build();
/// assert_eq!(config.directory, DirectoryConfig::SMALL);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Shard and capacity sizing for the directory.
    pub directory: DirectoryConfig,

    /// Mailbox used when a definition does not specify one.
    pub default_mailbox: MailboxConfig,

    /// Deadline applied to each actor stop while the stage closes.
    pub shutdown_timeout: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            default_mailbox: MailboxConfig::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl StageConfig {
    /// Create a configuration builder.
    pub fn builder() -> StageConfigBuilder {
        StageConfigBuilder::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfig`] naming the offending value.
    pub fn validate(&self) -> Result<(), StageError> {
        self.directory
            .validate()
            .map_err(StageError::InvalidConfig)?;
        self.default_mailbox
            .validate()
            .map_err(StageError::InvalidConfig)?;
        if self.shutdown_timeout.is_zero() {
            return Err(StageError::InvalidConfig(
                "shutdown_timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`StageConfig`].
#[derive(Debug, Default)]
pub struct StageConfigBuilder {
    directory: Option<DirectoryConfig>,
    default_mailbox: Option<MailboxConfig>,
    shutdown_timeout: Option<Duration>,
}

impl StageConfigBuilder {
    /// Set the directory sizing.
    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Set the default mailbox configuration.
    pub fn with_default_mailbox(mut self, mailbox: MailboxConfig) -> Self {
        self.default_mailbox = Some(mailbox);
        self
    }

    /// Set the close-time stop deadline.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StageConfig {
        let defaults = StageConfig::default();
        StageConfig {
            directory: self.directory.unwrap_or(defaults.directory),
            default_mailbox: self.default_mailbox.unwrap_or(defaults.default_mailbox),
            shutdown_timeout: self.shutdown_timeout.unwrap_or(defaults.shutdown_timeout),
        }
    }
}
