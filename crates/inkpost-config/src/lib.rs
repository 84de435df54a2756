//! Configuration management for inkpost.
//!
//! Parses `inkpost.toml` configuration files with serde and provides
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
//! - `wordpress.base_url`
//! - `wordpress.username`
//! - `wordpress.password`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override remote base URL.
    pub base_url: Option<String>,
    /// Override post type.
    pub post_type: Option<String>,
    /// Override status given to created and updated posts.
    pub post_status: Option<String>,
    /// Override orphan deletion flag.
    pub delete_not_found: Option<bool>,
    /// Override tag generation flag.
    pub generate_tags: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "inkpost.toml";

/// Post statuses accepted by the remote backend.
const POST_STATUSES: &[&str] = &["draft", "publish", "pending", "private", "future"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote backend configuration.
    pub wordpress: Option<WordPressConfig>,
    /// Synchronization settings.
    pub sync: SyncConfig,
    /// Document rendering settings.
    pub render: RenderConfig,

    /// Directory relative paths and globs are resolved against (set after loading).
    #[serde(skip)]
    pub base_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Transport used to talk to the remote backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON resource API (`/wp-json/wp/v2`).
    #[default]
    Rest,
    /// Procedural remote-call API (`/xmlrpc.php`).
    XmlRpc,
}

/// Remote backend configuration.
#[derive(Debug, Deserialize)]
pub struct WordPressConfig {
    /// Site base URL.
    pub base_url: String,
    /// Account name.
    pub username: String,
    /// Application password.
    pub password: String,
    /// Transport variant.
    #[serde(default)]
    pub transport: Transport,
    /// Blog id passed to XML-RPC calls.
    #[serde(default = "default_blog_id")]
    pub blog_id: u32,
}

fn default_blog_id() -> u32 {
    1
}

impl WordPressConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "wordpress.base_url")?;
        require_http_url(&self.base_url, "wordpress.base_url")?;
        require_non_empty(&self.username, "wordpress.username")?;
        require_non_empty(&self.password, "wordpress.password")?;
        Ok(())
    }
}

/// Synchronization settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Remote post type documents are published as.
    pub post_type: String,
    /// Status given to created and updated posts.
    pub post_status: String,
    /// Delete remote posts whose slug has no local document.
    pub delete_not_found: bool,
    /// Create missing tags remotely and attach them to posts.
    pub generate_tags: bool,
    /// Document glob patterns used when no paths are given on the command line.
    pub paths: Vec<String>,
    /// Custom fields attached to every synced post.
    pub custom_fields: BTreeMap<String, String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            post_type: "post".to_owned(),
            post_status: "draft".to_owned(),
            delete_not_found: false,
            generate_tags: false,
            paths: Vec::new(),
            custom_fields: BTreeMap::new(),
        }
    }
}

/// Document rendering settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Use the leading H1 heading as title when no `title` attribute is set.
    pub extract_title: bool,
    /// Default document attributes; a document's own front matter wins.
    pub attributes: BTreeMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            extract_title: true,
            attributes: BTreeMap::new(),
        }
    }
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
        /// Config field path (e.g., "`wordpress.password`").
        field: String,
        /// Error message (e.g., "${`WP_PASSWORD`} not set").
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
    /// Otherwise, searches for `inkpost.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
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
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url
            && let Some(wordpress) = self.wordpress.as_mut()
        {
            wordpress.base_url.clone_from(base_url);
        }
        if let Some(post_type) = &settings.post_type {
            self.sync.post_type.clone_from(post_type);
        }
        if let Some(post_status) = &settings.post_status {
            self.sync.post_status.clone_from(post_status);
        }
        if let Some(delete_not_found) = settings.delete_not_found {
            self.sync.delete_not_found = delete_not_found;
        }
        if let Some(generate_tags) = settings.generate_tags {
            self.sync.generate_tags = generate_tags;
        }
    }

    /// Get validated remote backend configuration.
    ///
    /// Use this instead of accessing the `wordpress` field directly when the
    /// command talks to the remote backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_wordpress(&self) -> Result<&WordPressConfig, ConfigError> {
        let wordpress = self.wordpress.as_ref().ok_or_else(|| {
            ConfigError::Validation("[wordpress] section required in config".into())
        })?;
        wordpress.validate()?;
        Ok(wordpress)
    }

    /// Resolve a path or glob pattern against the config directory.
    #[must_use]
    pub fn resolve_pattern(&self, pattern: &str) -> String {
        if Path::new(pattern).is_absolute() {
            pattern.to_owned()
        } else {
            self.base_dir.join(pattern).to_string_lossy().into_owned()
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            wordpress: None,
            sync: SyncConfig::default(),
            render: RenderConfig::default(),
            base_dir: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        config.base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[wordpress]` section is not validated here; commands that need it
    /// call [`Config::require_wordpress`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.sync.post_type, "sync.post_type")?;
        if !POST_STATUSES.contains(&self.sync.post_status.as_str()) {
            return Err(ConfigError::Validation(format!(
                "sync.post_status must be one of: {}",
                POST_STATUSES.join(", ")
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut wordpress) = self.wordpress {
            wordpress.base_url = expand::expand_env(&wordpress.base_url, "wordpress.base_url")?;
            wordpress.username = expand::expand_env(&wordpress.username, "wordpress.username")?;
            wordpress.password = expand::expand_env(&wordpress.password, "wordpress.password")?;
        }
        Ok(())
    }
}
