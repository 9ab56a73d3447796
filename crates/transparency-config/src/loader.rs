//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Expand `~` in every configured path.
    fn expand_paths(config: &mut Config) {
        let paths = &mut config.paths;
        for path in [
            &mut paths.cache_dir,
            &mut paths.cookies,
            &mut paths.local_storage,
            &mut paths.error_log,
            &mut paths.error_screenshot,
            &mut config.output.dir,
            &mut config.logging.dir,
        ] {
            Self::expand_in_place(path);
        }
        for path in [&mut config.browser.profile_dir, &mut config.browser.chrome_path]
            .into_iter()
            .flatten()
        {
            Self::expand_in_place(path);
        }
    }

    fn expand_in_place(path: &mut PathBuf) {
        if let Some(raw) = path.to_str() {
            *path = PathBuf::from(Self::expand_path(raw));
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Comments are copied through untouched.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            let (code, comment) = line.split_at(Self::comment_start(line));
            let mut expanded = code.to_string();
            for cap in ENV_VAR.captures_iter(code) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            result.push_str(&expanded);
            result.push_str(comment);
        }

        Ok(result)
    }

    /// Byte offset of the first `#` outside a quoted string, or the line length.
    fn comment_start(line: &str) -> usize {
        let mut quote = None;
        let mut escaped = false;

        for (i, c) in line.char_indices() {
            match quote {
                Some('"') if escaped => escaped = false,
                Some('"') if c == '\\' => escaped = true,
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '#' => return i,
                None => {}
            }
        }
        line.len()
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
