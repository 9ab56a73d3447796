//! The shipped configuration file stays loadable and valid.

use std::path::PathBuf;

use transparency_config::{ConfigLoader, ConfigValidator};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml")
}

#[test]
fn test_shipped_config_is_valid() {
    let config = ConfigLoader::load(&shipped_config()).unwrap();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid(), "{:?}", result.errors);
    assert_eq!(config.portal.base_url, "https://portaldatransparencia.gov.br");
    assert!(!config.paths.cookies.starts_with("~"));
    assert_eq!(config.pager.max_pages, 200);
}

#[test]
fn test_shipped_config_needs_no_environment() {
    let content = std::fs::read_to_string(shipped_config()).unwrap();
    assert!(ConfigLoader::load_str(&content).is_ok());
}
