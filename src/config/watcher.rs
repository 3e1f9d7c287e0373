//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::FilterConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<FilterConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<FilterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Sender feeding the same update channel (e.g. for SIGHUP reloads).
    pub fn sender(&self) -> mpsc::UnboundedSender<FilterConfig> {
        self.update_tx.clone()
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                tracing::info!(path = ?path, "Config file change detected, reloading");
                reload_into(&path, &tx);
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Config watch error"),
        };
        let mut watcher = RecommendedWatcher::new(
            handler,
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and send it on success; an invalid file keeps the current configuration.
pub fn reload_into(path: &Path, tx: &mpsc::UnboundedSender<FilterConfig>) -> bool {
    match load_config(path) {
        Ok(new_config) => tx.send(new_config).is_ok(),
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current configuration");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_into_sends_valid_config() {
        let path = std::env::temp_dir().join(format!("vanity-reload-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[vanity]\nroot_paths = [\"/content/site/\"]\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        assert!(reload_into(&path, &watcher.sender()));

        let config = rx.try_recv().unwrap();
        assert_eq!(config.vanity.root_paths, Some(vec!["/content/site/".to_string()]));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_reload_into_keeps_current_on_error() {
        let path = std::env::temp_dir().join(format!("vanity-reload-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        assert!(!reload_into(&path, &watcher.sender()));
        assert!(rx.try_recv().is_err());

        std::fs::remove_file(&path).unwrap();
    }
}
