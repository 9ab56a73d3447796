//! Search refinement panel.

use tracing::{debug, info, warn};

use transparency_config::TimeoutConfig;

use crate::driver::BrowserDriver;
use crate::error::DriverError;
use crate::request::FilterKind;
use crate::selectors::{FILTER_PANEL_TOGGLE, VISIBLE_FILTER_PANEL_TOGGLE};

const ACTIVE_CLASS: &str = "active";

/// Open the refine panel if needed and click each filter in order.
///
/// An unreachable panel skips all filters. A filter control that never
/// becomes clickable is returned as a timeout.
pub async fn apply_filters(
    driver: &dyn BrowserDriver,
    filters: &[FilterKind],
    timeouts: &TimeoutConfig,
) -> Result<(), DriverError> {
    if filters.is_empty() {
        debug!("No filters to apply");
        return Ok(());
    }

    if !open_panel(driver, timeouts).await? {
        return Ok(());
    }

    for filter in filters {
        let control = driver
            .wait_until_clickable(filter.locator(), timeouts.element())
            .await?;
        driver.click(&control).await?;
        info!("Applied filter: {}", filter);
    }

    Ok(())
}

/// Returns false when the panel could not be reached.
async fn open_panel(driver: &dyn BrowserDriver, timeouts: &TimeoutConfig) -> Result<bool, DriverError> {
    let toggle = match driver
        .wait_until_present(VISIBLE_FILTER_PANEL_TOGGLE, timeouts.element())
        .await
    {
        Ok(toggle) => toggle,
        Err(e) if e.is_transient() => {
            warn!("Filter panel not found, skipping filters: {}", e);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let class = driver.read_attribute(&toggle, "class").await?.unwrap_or_default();
    if class.split_whitespace().any(|c| c == ACTIVE_CLASS) {
        debug!("Filter panel already open");
        return Ok(true);
    }

    match driver
        .wait_until_clickable(FILTER_PANEL_TOGGLE, timeouts.element())
        .await
    {
        Ok(button) => {
            driver.click(&button).await?;
            debug!("Opened filter panel");
            Ok(true)
        }
        Err(e) if e.is_transient() => {
            warn!("Filter panel toggle not clickable, skipping filters: {}", e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
