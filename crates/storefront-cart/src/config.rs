//! Cart store configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Key the cart snapshot is stored under by default.
pub const DEFAULT_STORAGE_KEY: &str = "products";

/// What increment/decrement do with an id that is not in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingItemPolicy {
    /// Leave the cart unchanged and still write it.
    #[default]
    Ignore,
    /// Fail with [`CartError::ItemNotInCart`] and skip the write.
    Reject,
}

/// Configuration for a [`crate::CartStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Timeout for each store read or write, in milliseconds. `0` disables it.
    #[serde(default = "default_persist_timeout_ms")]
    pub persist_timeout_ms: u64,

    /// Policy for operations on unknown ids.
    #[serde(default)]
    pub missing_item: MissingItemPolicy,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_persist_timeout_ms() -> u64 {
    5_000
}

fn ceil_millis(d: Duration) -> u64 {
    let millis = d.as_nanos().div_ceil(1_000_000).max(1);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            persist_timeout_ms: default_persist_timeout_ms(),
            missing_item: MissingItemPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the store timeout. `None` waits indefinitely.
    ///
    /// Durations are rounded up to whole milliseconds, and never down to the
    /// `0` that disables the timeout.
    pub fn with_persist_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.persist_timeout_ms = timeout.map_or(0, ceil_millis);
        self
    }

    /// Set the missing-item policy.
    pub fn with_missing_item(mut self, policy: MissingItemPolicy) -> Self {
        self.missing_item = policy;
        self
    }

    /// Store timeout, if any.
    pub fn persist_timeout(&self) -> Option<Duration> {
        (self.persist_timeout_ms > 0).then(|| Duration::from_millis(self.persist_timeout_ms))
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.storage_key.trim().is_empty() {
            return Err(CartError::Config("storage_key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        let config: Self =
            toml::from_str(content).map_err(|e| CartError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CartError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.storage_key, "products");
        assert_eq!(config.persist_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.missing_item, MissingItemPolicy::Ignore);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(CartConfig::from_toml_str("").unwrap(), CartConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let config = CartConfig::from_toml_str(
            r#"
            storage_key = "cart-v2"
            persist_timeout_ms = 0
            missing_item = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_key, "cart-v2");
        assert_eq!(config.persist_timeout(), None);
        assert_eq!(config.missing_item, MissingItemPolicy::Reject);
    }

    #[test]
    fn test_rejects_empty_key() {
        let result = CartConfig::from_toml_str(r#"storage_key = "  ""#);
        assert!(matches!(result, Err(CartError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = CartConfig::from_toml_str(r#"missing_item = "explode""#);
        assert!(matches!(result, Err(CartError::Config(_))));
    }

    #[test]
    fn test_builder() {
        let config = CartConfig::new()
            .with_storage_key("k")
            .with_persist_timeout(Some(Duration::from_millis(250)))
            .with_missing_item(MissingItemPolicy::Reject);

        assert_eq!(config.persist_timeout_ms, 250);
        assert_eq!(config.storage_key, "k");
    }

    #[test]
    fn test_sub_millisecond_timeout_is_kept() {
        let config = CartConfig::new().with_persist_timeout(Some(Duration::from_micros(500)));
        assert_eq!(config.persist_timeout(), Some(Duration::from_millis(1)));

        let config = CartConfig::new().with_persist_timeout(Some(Duration::from_micros(1500)));
        assert_eq!(config.persist_timeout_ms, 2);

        let config = CartConfig::new().with_persist_timeout(Some(Duration::ZERO));
        assert!(config.persist_timeout().is_some());

        let config = CartConfig::new().with_persist_timeout(Some(Duration::MAX));
        assert_eq!(config.persist_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "persist_timeout_ms = 100\n").unwrap();

        let config = CartConfig::load(&path).unwrap();
        assert_eq!(config.persist_timeout(), Some(Duration::from_millis(100)));

        assert!(CartConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
