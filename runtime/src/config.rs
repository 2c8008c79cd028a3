//! Store configuration.
//!
//! Settings can be built in code, deserialized with serde, or read from the
//! process environment:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `STORE_LABEL` | `label` | `store` |
//! | `STORE_SUBSCRIPTION_WARN_THRESHOLD` | `subscription_warn_threshold` | `1024` |

use crate::error::ConfigError;
use serde::Deserialize;

/// Environment variable naming the store in logs and metrics
pub const LABEL_VAR: &str = "STORE_LABEL";

/// Environment variable setting the subscription warning threshold
pub const WARN_THRESHOLD_VAR: &str = "STORE_SUBSCRIPTION_WARN_THRESHOLD";

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use shared_store_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_label("dashboard")
///     .with_subscription_warn_threshold(64);
///
/// assert_eq!(config.label, "dashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name attached to every log line and metric emitted by the store
    pub label: String,
    /// Subscription count above which a warning is logged
    ///
    /// Subscriptions are unbounded; crossing this usually means a view forgot
    /// to unsubscribe.
    pub subscription_warn_threshold: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(label: impl Into<String>, subscription_warn_threshold: usize) -> Self {
        Self {
            label: label.into(),
            subscription_warn_threshold,
        }
    }

    /// Set the store label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the subscription warning threshold
    #[must_use]
    pub const fn with_subscription_warn_threshold(mut self, threshold: usize) -> Self {
        self.subscription_warn_threshold = threshold;
        self
    }

    /// Load configuration from the process environment
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but cannot be
    /// parsed, or [`ConfigError::EmptyLabel`] if the label is blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(label) = lookup(LABEL_VAR) {
            if label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel);
            }
            config.label = label.trim().to_string();
        }

        if let Some(raw) = lookup(WARN_THRESHOLD_VAR) {
            config.subscription_warn_threshold =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        var: WARN_THRESHOLD_VAR,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
        }

        Ok(config)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: "store".to_string(),
            subscription_warn_threshold: 1024,
        }
    }
}
