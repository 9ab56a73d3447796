//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_portal(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        Self::validate_pager(config, &mut result);
        Self::validate_retry(config, &mut result);

        result
    }

    fn validate_portal(config: &Config, result: &mut ValidationResult) {
        let url = config.portal.base_url.trim();
        if url.is_empty() {
            result.add_error(ValidationError::new(
                "portal.base_url",
                "base_url cannot be empty",
            ));
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "portal.base_url",
                "base_url must start with http:// or https://",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if let Some(ref path) = config.browser.chrome_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "browser.chrome_path",
                    format!("Chrome path does not exist: {:?}", path),
                ));
            }
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        let timeouts = &config.timeouts;

        if timeouts.element_secs == 0 {
            result.add_error(ValidationError::new(
                "timeouts.element_secs",
                "element_secs must be greater than 0",
            ));
        }

        if timeouts.results_secs == 0 {
            result.add_error(ValidationError::new(
                "timeouts.results_secs",
                "results_secs must be greater than 0",
            ));
        }

        if timeouts.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "timeouts.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }

        if timeouts.element_secs > 120 || timeouts.results_secs > 120 {
            result.add_warning(ValidationWarning::new(
                "timeouts",
                "timeouts above 120s make a stuck page look like a hang",
            ));
        }
    }

    fn validate_pager(config: &Config, result: &mut ValidationResult) {
        if config.pager.max_pages == 0 {
            result.add_error(ValidationError::new(
                "pager.max_pages",
                "max_pages must be greater than 0",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.attempts == 0 {
            result.add_error(ValidationError::new(
                "retry.attempts",
                "attempts must be at least 1",
            ));
        }

        if config.retry.attempts > 10 {
            result.add_warning(ValidationWarning::new(
                "retry.attempts",
                "attempts is very high (>10), the portal may start serving verification pages",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
