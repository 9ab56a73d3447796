    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "  ".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "portal.base_url"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "ftp://portal".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.message.contains("http")));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.timeouts.element_secs = 0;
        config.timeouts.poll_interval_ms = 0;

        let result = ConfigValidator::validate(&config);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_validate_large_timeout_warning() {
        let mut config = Config::default();
        config.timeouts.results_secs = 600;

        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_validate_zero_attempts() {
        let mut config = Config::default();
        config.retry.attempts = 0;

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.path == "retry.attempts"));
    }

    #[test]
    fn test_validate_zero_max_pages() {
        let mut config = Config::default();
        config.pager.max_pages = 0;

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.path == "pager.max_pages"));
    }

    #[test]
    fn test_into_result_reports_first_error() {
        let mut config = Config::default();
        config.browser.debug_port = 0;

        let err = ConfigValidator::validate(&config).into_result().unwrap_err();
        assert!(err.to_string().contains("browser.debug_port"));
    }

    #[test]
    fn test_into_result_passes_warnings_through() {
        let mut config = Config::default();
        config.retry.attempts = 50;

        let warnings = ConfigValidator::validate(&config).into_result().unwrap();
        assert_eq!(warnings.len(), 1);
    }
