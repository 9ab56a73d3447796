//! `capture-session` and `clear-cache` subcommands.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use transparency_browser::{capture_session_state, BrowserManager, SessionPaths};
use transparency_config::Config;
use transparency_core::BrowserDriver;

/// Load the portal in the configured browser profile and save its session
/// state for later searches.
pub(crate) async fn capture_session(manager: &BrowserManager, config: &Config) -> anyhow::Result<()> {
    manager.connect().await.context("Failed to start the browser")?;
    manager
        .navigate(&config.portal.base_url)
        .await
        .with_context(|| format!("Failed to open {}", config.portal.base_url))?;
    tokio::time::sleep(config.timeouts.settle()).await;

    capture_session_state(manager, &SessionPaths::from(&config.paths)).await?;
    info!("Session state captured");
    Ok(())
}

/// Delete every `.json` file in `dir`. Returns how many were removed.
pub(crate) fn clear_cache(dir: &Path) -> anyhow::Result<usize> {
    if !dir.exists() {
        warn!("Cache directory {} does not exist", dir.display());
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            info!("File {} has been deleted", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}
