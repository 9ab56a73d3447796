//! End-to-end driver tests against a real Chrome.
//!
//! Run with: cargo test -p transparency-browser --test integration_test -- --ignored

use std::path::PathBuf;
use std::time::Duration;

use transparency_browser::{BrowserManager, BrowserManagerConfig};
use transparency_core::{BrowserDriver, Locator};

fn test_config() -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: 9333,
        profile_dir: Some(PathBuf::from("/tmp/transparency-test-profile")),
        headless: true,
        ..BrowserManagerConfig::default()
    }
}

const PAGE: &str = "data:text/html,<title>Fixture</title>\
    <input id='termo'><button id='go' onclick=\"document.title='clicked'\">Go</button>\
    <ul><li>one</li><li>two</li></ul>";

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_connect_and_shutdown() {
    let manager = BrowserManager::new(test_config());

    manager.connect().await.unwrap();
    assert_eq!(manager.context_handles().await.len(), 1);

    manager.shutdown_chrome().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_driver_interactions() {
    let manager = BrowserManager::new(test_config());
    manager.connect().await.unwrap();

    manager.navigate(PAGE).await.unwrap();
    assert_eq!(manager.current_page_title().await.unwrap(), "Fixture");

    let items = manager.find_all(Locator::XPath("//li")).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(manager.read_text(&items[1]).await.unwrap(), "two");

    let input = manager
        .wait_until_clickable(Locator::Css("#termo"), Duration::from_secs(5))
        .await
        .unwrap();
    manager.type_text(&input, "12345678901").await.unwrap();
    let value = manager
        .execute_script("document.getElementById('termo').value")
        .await
        .unwrap();
    assert_eq!(value, "12345678901");

    let button = manager.find(Locator::Css("#go")).await.unwrap().unwrap();
    manager.click(&button).await.unwrap();
    assert_eq!(manager.current_page_title().await.unwrap(), "clicked");

    let png = manager.screenshot(&button).await.unwrap();
    assert!(png.starts_with(b"\x89PNG"));

    manager.shutdown_chrome().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_context_lifecycle() {
    let manager = BrowserManager::new(test_config());
    manager.connect().await.unwrap();
    let origin = manager.current_context().await.unwrap();

    let opened = manager.open_new_context("about:blank").await.unwrap();
    assert_eq!(manager.current_context().await.unwrap(), opened);
    assert_eq!(manager.list_context_handles().await.unwrap().len(), 2);

    manager.close_current_context().await.unwrap();
    assert!(manager.current_context().await.is_err());

    manager.switch_to_context(&origin).await.unwrap();
    assert_eq!(manager.list_context_handles().await.unwrap(), vec![origin]);

    manager.shutdown_chrome().await.unwrap();
}
