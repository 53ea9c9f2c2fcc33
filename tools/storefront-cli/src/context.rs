//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use storefront_cart::{CartScope, CartStore, Hydration};
use storefront_kv::FileStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Outcome of walking up the directory tree for a config file.
#[derive(Default)]
struct ConfigSearch {
    /// First config file that loaded, nearest directory first.
    found: Option<(CliConfig, PathBuf)>,
    /// Config files passed over because they failed to load.
    rejected: Vec<(PathBuf, anyhow::Error)>,
}

/// Find config file in directory tree.
fn find_config(start: &Path) -> ConfigSearch {
    let mut search = ConfigSearch::default();
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if !config_path.exists() {
                continue;
            }
            match CliConfig::load(&config_path.to_string_lossy()) {
                Ok(config) => {
                    search.found = Some((config, config_path));
                    return search;
                }
                Err(e) => search.rejected.push((config_path, e)),
            }
        }

        if !current.pop() {
            return search;
        }
    }
}

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Path the configuration was loaded from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            let search = find_config(&cwd);
            for (path, error) in &search.rejected {
                output.warn(&format!("Ignoring {}: {:#}", path.display(), error));
            }
            match search.found {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory the cart file store lives in.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Mount a cart over the file store. The scope must outlive the handle.
    pub async fn mount_cart(&self) -> Result<(CartScope, CartStore)> {
        let dir = self.storage_dir();
        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open cart storage: {}", dir.display()))?;

        let mut scope = CartScope::new();
        let hydration = scope
            .mount(Arc::new(store), self.config.cart.clone())
            .await
            .context("Failed to load cart")?;

        match hydration {
            Hydration::Discarded => self
                .output
                .warn("Stored cart was unreadable and has been ignored."),
            Hydration::Restored { items } => {
                self.output.debug(&format!("Restored {} line(s) from {}", items, dir.display()))
            }
            _ => self.output.debug(&format!("Using cart storage {}", dir.display())),
        }

        let cart = scope.cart()?;
        Ok((scope, cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_reports_broken_file_and_keeps_looking() {
        let root = tempfile::tempdir().unwrap();
        let child = root.path().join("shop");
        std::fs::create_dir(&child).unwrap();
        std::fs::write(root.path().join("storefront.toml"), "[storage]\ndir = \"parent\"\n").unwrap();
        std::fs::write(child.join("storefront.toml"), "[storage\n").unwrap();

        let search = find_config(&child);

        assert_eq!(search.rejected.len(), 1);
        assert_eq!(search.rejected[0].0, child.join("storefront.toml"));
        let (config, path) = search.found.unwrap();
        assert_eq!(config.storage.dir, "parent");
        assert_eq!(path, root.path().join("storefront.toml"));
    }

    #[test]
    fn test_find_config_rejects_invalid_cart_section() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".storefront.toml"), "[cart]\nstorage_key = \"\"\n").unwrap();

        let search = find_config(root.path());

        assert!(search.rejected.iter().any(|(p, _)| p == &root.path().join(".storefront.toml")));
    }
}
