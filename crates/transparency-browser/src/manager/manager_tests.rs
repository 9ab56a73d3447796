use std::time::Duration;

use transparency_config::Config;
use transparency_core::DriverError;

use super::*;
use crate::cdp::CdpError;

#[test]
fn test_config_from_defaults() {
    let config = BrowserManagerConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.viewport_width, 1920);
    assert_eq!(config.viewport_height, 1080);
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert!(!config.headless);
}

#[test]
fn test_config_from_file_values() {
    let mut config = Config::default();
    config.browser.debug_port = 9333;
    config.browser.headless = true;
    config.timeouts.poll_interval_ms = 250;

    let browser = BrowserManagerConfig::from_config(&config);
    assert_eq!(browser.endpoint(), "http://localhost:9333");
    assert!(browser.headless);
    assert_eq!(browser.poll_interval, Duration::from_millis(250));
}

#[test]
fn test_config_profile_dir() {
    let config = BrowserManagerConfig::default();
    assert!(config.get_profile_dir().ends_with(".transparency/browser-profile"));
}

#[test]
fn test_browser_error_display() {
    let err = BrowserError::ConnectionFailed("timeout".to_string());
    assert_eq!(err.to_string(), "Connection failed: timeout");

    let err = BrowserError::LaunchFailed("permission denied".to_string());
    assert_eq!(err.to_string(), "Failed to launch Chrome: permission denied");
}

#[test]
fn test_cdp_error_conversion() {
    assert!(matches!(
        BrowserError::from(CdpError::JavaScript("boom".to_string())),
        BrowserError::ScriptFailed(_)
    ));
    assert!(matches!(
        BrowserError::from(CdpError::SessionClosed),
        BrowserError::NotConnected
    ));

    let err = BrowserError::from(CdpError::Unreachable {
        endpoint: "http://localhost:9222".to_string(),
        reason: "connection refused".to_string(),
    });
    match err {
        BrowserError::ConnectionFailed(msg) => {
            assert!(msg.contains("localhost:9222"));
            assert!(msg.contains("connection refused"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        BrowserError::from(CdpError::MissingField("sessionId")),
        BrowserError::ActionFailed(msg) if msg == "DevTools reply has no sessionId"
    ));
}

#[test]
fn test_driver_error_conversion() {
    assert!(matches!(
        DriverError::from(BrowserError::ContextNotFound("T1".to_string())),
        DriverError::NoSuchContext(handle) if handle == "T1"
    ));
    assert!(matches!(
        DriverError::from(BrowserError::ScriptFailed("x".to_string())),
        DriverError::Script(_)
    ));
    let err = DriverError::from(BrowserError::NotConnected);
    assert!(matches!(err, DriverError::Browser(_)));
    assert!(!err.is_transient());
}

#[test]
fn test_find_chrome() {
    let _result = BrowserManager::find_chrome();
}

#[tokio::test]
async fn test_missing_explicit_chrome_path() {
    let config = BrowserManagerConfig {
        chrome_path: Some("/nonexistent/chrome".into()),
        debug_port: 1,
        ..BrowserManagerConfig::default()
    };
    let manager = BrowserManager::new(config);

    let err = manager.connect().await.unwrap_err();
    assert!(matches!(err, BrowserError::LaunchFailed(_)));
}

#[tokio::test]
async fn test_close_without_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(manager.close().await.is_ok());
    assert!(manager.shutdown_chrome().await.is_ok());
}

#[tokio::test]
async fn test_no_contexts_before_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(manager.context_handles().await.is_empty());
    assert!(matches!(
        manager.current_handle().await,
        Err(BrowserError::NoCurrentContext)
    ));
    assert!(matches!(
        manager.close_current().await,
        Err(BrowserError::NoCurrentContext)
    ));
    assert!(matches!(
        manager.switch_to("T1").await,
        Err(BrowserError::ContextNotFound(_))
    ));
}
