//! Configuration management for mxd.
//!
//! Parses `mxd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `matrix.displayname`
//! - `matrix.url_shortener.endpoint`
//! - `matrix.url_shortener.extra_body.*`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override code language auto-detection.
    pub determine_code_language: Option<bool>,
    /// Override the displayname used for emote messages.
    pub displayname: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mxd.toml";

/// Default threshold above which edits use the stacked layout.
const DEFAULT_EDIT_INLINE_MAX_LENGTH: usize = 50;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat-markdown to Matrix settings.
    pub discord: DiscordConfig,
    /// Matrix to chat-markdown settings.
    pub matrix: MatrixConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Settings for converting chat-markdown messages to Matrix.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Longest new content (in characters) still rendered as a one-line edit.
    pub edit_inline_max_length: usize,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            edit_inline_max_length: DEFAULT_EDIT_INLINE_MAX_LENGTH,
        }
    }
}

/// Settings for converting Matrix messages to chat markdown.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Guess the language of fenced code without a `language-*` class.
    pub determine_code_language: bool,
    /// Sender displayname prepended to emote messages.
    pub displayname: String,
    /// Optional shortener for image fallback links.
    pub url_shortener: Option<UrlShortenerConfig>,
}

/// HTTP method used to call the URL shortener.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

/// URL shortener service.
///
/// The long URL is sent as `url_field` (query parameter for GET, JSON body
/// field otherwise) together with `extra_body`; the short URL is read from
/// the `short_field` of the JSON response.
#[derive(Debug, Deserialize)]
pub struct UrlShortenerConfig {
    /// Service endpoint.
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_url_field")]
    pub url_field: String,
    #[serde(default = "default_short_field")]
    pub short_field: String,
    /// Static fields added to every request.
    #[serde(default)]
    pub extra_body: BTreeMap<String, String>,
}

impl UrlShortenerConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.endpoint, "matrix.url_shortener.endpoint")?;
        require_http_url(&self.endpoint, "matrix.url_shortener.endpoint")?;
        require_non_empty(&self.url_field, "matrix.url_shortener.url_field")?;
        require_non_empty(&self.short_field, "matrix.url_shortener.short_field")?;
        Ok(())
    }
}

fn default_url_field() -> String {
    "url".to_owned()
}

fn default_short_field() -> String {
    "short_url".to_owned()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`matrix.url_shortener.endpoint`").
        field: String,
        /// Error message (e.g., "${`SHORTENER_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mxd.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(determine) = settings.determine_code_language {
            self.matrix.determine_code_language = determine;
        }
        if let Some(displayname) = &settings.displayname {
            self.matrix.displayname.clone_from(displayname);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.edit_inline_max_length == 0 {
            return Err(ConfigError::Validation(
                "discord.edit_inline_max_length must be greater than 0".to_owned(),
            ));
        }
        if let Some(shortener) = &self.matrix.url_shortener {
            shortener.validate()?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.matrix.displayname =
            expand::expand_env(&self.matrix.displayname, "matrix.displayname")?;

        if let Some(ref mut shortener) = self.matrix.url_shortener {
            shortener.endpoint =
                expand::expand_env(&shortener.endpoint, "matrix.url_shortener.endpoint")?;
            for (key, value) in &mut shortener.extra_body {
                *value = expand::expand_env(
                    value,
                    &format!("matrix.url_shortener.extra_body.{key}"),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discord.edit_inline_max_length, 50);
        assert!(!config.matrix.determine_code_language);
        assert!(config.matrix.displayname.is_empty());
        assert!(config.matrix.url_shortener.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.discord.edit_inline_max_length, 50);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[discord]
edit_inline_max_length = 80

[matrix]
determine_code_language = true
displayname = "bridge"

[matrix.url_shortener]
endpoint = "https://short.example/api"
method = "PUT"
url_field = "long"
short_field = "short"
extra_body = { domain = "s.example" }
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.discord.edit_inline_max_length, 80);
        assert!(config.matrix.determine_code_language);
        assert_eq!(config.matrix.displayname, "bridge");

        let shortener = config.matrix.url_shortener.unwrap();
        assert_eq!(shortener.endpoint, "https://short.example/api");
        assert_eq!(shortener.method, HttpMethod::Put);
        assert_eq!(shortener.url_field, "long");
        assert_eq!(shortener.short_field, "short");
        assert_eq!(
            shortener.extra_body.get("domain").map(String::as_str),
            Some("s.example")
        );
    }

    #[test]
    fn test_shortener_defaults() {
        let toml = r#"
[matrix.url_shortener]
endpoint = "https://short.example"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let shortener = config.matrix.url_shortener.unwrap();
        assert_eq!(shortener.method, HttpMethod::Post);
        assert_eq!(shortener.url_field, "url");
        assert_eq!(shortener.short_field, "short_url");
        assert!(shortener.extra_body.is_empty());
    }

    #[test]
    fn test_shortener_requires_http_endpoint() {
        let toml = r#"
[matrix.url_shortener]
endpoint = "ftp://short.example"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_zero_edit_length_is_invalid() {
        let toml = r"
[discord]
edit_inline_max_length = 0
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let toml = r#"
[matrix.url_shortener]
endpoint = "https://short.example"
method = "DELETE"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            determine_code_language: Some(true),
            displayname: Some("Foxer".to_owned()),
        });
        assert!(config.matrix.determine_code_language);
        assert_eq!(config.matrix.displayname, "Foxer");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(!config.matrix.determine_code_language);
        assert!(config.matrix.displayname.is_empty());
    }

    #[test]
    fn test_expand_env_vars_shortener() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_MXD_SHORTENER", "https://short.test");
            std::env::set_var("TEST_MXD_DOMAIN", "s.test");
        }

        let toml = r#"
[matrix.url_shortener]
endpoint = "${TEST_MXD_SHORTENER}"
extra_body = { domain = "${TEST_MXD_DOMAIN}", key = "${TEST_MXD_KEY:-none}" }
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let shortener = config.matrix.url_shortener.unwrap();
        assert_eq!(shortener.endpoint, "https://short.test");
        assert_eq!(shortener.extra_body["domain"], "s.test");
        assert_eq!(shortener.extra_body["key"], "none");

        unsafe {
            std::env::remove_var("TEST_MXD_SHORTENER");
            std::env::remove_var("TEST_MXD_DOMAIN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_MXD_CONFIG_TEST");
        }

        let toml = r#"
[matrix.url_shortener]
endpoint = "${MISSING_VAR_MXD_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_MXD_CONFIG_TEST"));
        assert!(err.to_string().contains("matrix.url_shortener.endpoint"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mxd.toml");
        std::fs::write(&path, "[matrix]\ndisplayname = \"bridge\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.matrix.displayname, "bridge");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mxd.toml");
        std::fs::write(&path, "[matrix]\ndisplayname = \"bridge\"\n").unwrap();

        let settings = CliSettings {
            displayname: Some("override".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.matrix.displayname, "override");
    }
}
