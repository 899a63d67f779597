//! Configuration management for mdtex.
//!
//! Parses `mdtex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! These fields support `${VAR}` and `${VAR:-default}`:
//!
//! - `server.host`
//! - `typeset.mathjax_url`
//!
//! Delimiter strings are never expanded since they usually contain `$`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override raw HTML passthrough.
    pub allow_raw_html: Option<bool>,
    /// Override single-newline line breaks.
    pub line_breaks: Option<bool>,
    /// Override fenced code skipping.
    pub skip_code_fences: Option<bool>,
    /// Override live rendering on input change.
    pub live: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdtex.toml";

/// Default MathJax loader.
const DEFAULT_MATHJAX_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Markdown rendering configuration.
    pub render: RenderConfig,
    /// Typesetting engine configuration.
    pub typeset: TypesetConfig,
    /// File watching configuration.
    pub watch: WatchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pass raw HTML in the source through to the output.
    pub allow_raw_html: bool,
    /// Turn single newlines into `<br />`.
    pub line_breaks: bool,
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Leave math delimiters inside fenced code blocks alone.
    pub skip_code_fences: bool,
    /// Re-render whenever the input changes.
    pub live: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            allow_raw_html: true,
            line_breaks: false,
            gfm: true,
            skip_code_fences: false,
            live: false,
        }
    }
}

/// Typesetting engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Opening delimiter written before inline math.
    pub inline_open: String,
    /// Closing delimiter written after inline math.
    pub inline_close: String,
    /// Opening delimiter written before display math.
    pub display_open: String,
    /// Closing delimiter written after display math.
    pub display_close: String,
    /// MathJax loader used by the editor page.
    pub mathjax_url: String,
    /// External command run on the output file after each render in watch
    /// mode. The output path is appended as the last argument.
    pub command: Vec<String>,
    /// Command that must succeed before the first typeset pass runs.
    pub ready_command: Vec<String>,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            inline_open: "$".to_owned(),
            inline_close: "$".to_owned(),
            display_open: "$$".to_owned(),
            display_close: "$$".to_owned(),
            mathjax_url: DEFAULT_MATHJAX_URL.to_owned(),
            command: Vec::new(),
            ready_command: Vec::new(),
        }
    }
}

impl TypesetConfig {
    /// Whether an external typeset command is configured.
    #[must_use]
    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }
}

/// File watching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of file events triggers a render.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`MDTEX_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

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
    /// Otherwise, searches for `mdtex.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied last and take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or a value is invalid.
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
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(allow_raw_html) = settings.allow_raw_html {
            self.render.allow_raw_html = allow_raw_html;
        }
        if let Some(line_breaks) = settings.line_breaks {
            self.render.line_breaks = line_breaks;
        }
        if let Some(skip_code_fences) = settings.skip_code_fences {
            self.render.skip_code_fences = skip_code_fences;
        }
        if let Some(live) = settings.live {
            self.render.live = live;
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
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_typeset()?;
        self.validate_watch()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_typeset(&self) -> Result<(), ConfigError> {
        let typeset = &self.typeset;
        require_non_empty(&typeset.inline_open, "typeset.inline_open")?;
        require_non_empty(&typeset.inline_close, "typeset.inline_close")?;
        require_non_empty(&typeset.display_open, "typeset.display_open")?;
        require_non_empty(&typeset.display_close, "typeset.display_close")?;

        if typeset.inline_open == typeset.display_open
            && typeset.inline_close == typeset.display_close
        {
            return Err(ConfigError::Validation(
                "typeset inline and display delimiters must differ".to_owned(),
            ));
        }

        require_non_empty(&typeset.mathjax_url, "typeset.mathjax_url")?;
        require_http_url(&typeset.mathjax_url, "typeset.mathjax_url")?;

        if typeset.command.first().is_some_and(String::is_empty) {
            return Err(ConfigError::Validation(
                "typeset.command program cannot be empty".to_owned(),
            ));
        }
        if typeset.ready_command.first().is_some_and(String::is_empty) {
            return Err(ConfigError::Validation(
                "typeset.ready_command program cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_watch(&self) -> Result<(), ConfigError> {
        const MAX_DEBOUNCE_MS: u64 = 10_000;

        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.debounce_ms must be greater than 0".to_owned(),
            ));
        }
        if self.watch.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "watch.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.typeset.mathjax_url =
            expand::expand_env(&self.typeset.mathjax_url, "typeset.mathjax_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert!(config.render.allow_raw_html);
        assert!(!config.render.line_breaks);
        assert!(config.render.gfm);
        assert!(!config.render.skip_code_fences);
        assert!(!config.render.live);
        assert_eq!(config.typeset.inline_open, "$");
        assert_eq!(config.typeset.display_open, "$$");
        assert!(!config.typeset.has_command());
        assert_eq!(config.watch.debounce_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.typeset.mathjax_url, DEFAULT_MATHJAX_URL);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[render]
allow_raw_html = false
line_breaks = true
gfm = false
skip_code_fences = true
live = true

[typeset]
inline_open = '\('
inline_close = '\)'
display_open = '\['
display_close = '\]'
mathjax_url = "https://example.com/mathjax.js"
command = ["mathjax-cli", "--in-place"]
ready_command = ["mathjax-cli", "--version"]

[watch]
debounce_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.render.allow_raw_html);
        assert!(config.render.line_breaks);
        assert!(!config.render.gfm);
        assert!(config.render.skip_code_fences);
        assert!(config.render.live);
        assert_eq!(config.typeset.inline_open, r"\(");
        assert_eq!(config.typeset.display_close, r"\]");
        assert_eq!(
            config.typeset.command,
            vec!["mathjax-cli".to_owned(), "--in-place".to_owned()]
        );
        assert_eq!(config.typeset.ready_command.len(), 2);
        assert_eq!(config.watch.debounce_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mdtex.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtex.toml");
        std::fs::write(&path, "[server]\nport = 8123\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 8123);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtex.toml");
        std::fs::write(&path, "[watch]\ndebounce_ms = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("watch.debounce_ms"));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtex.toml");
        std::fs::write(&path, "[server\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_cli_settings_server() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            ..Default::default()
        });

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_apply_cli_settings_render() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            allow_raw_html: Some(false),
            line_breaks: Some(true),
            skip_code_fences: Some(true),
            live: Some(true),
            ..Default::default()
        });

        assert!(!config.render.allow_raw_html);
        assert!(config.render.line_breaks);
        assert!(config.render.skip_code_fences);
        assert!(config.render.live);
        assert!(config.render.gfm); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.render.allow_raw_html);
    }

    #[test]
    fn test_load_validates_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtex.toml");
        std::fs::write(&path, "").unwrap();

        let err = Config::load(
            Some(&path),
            Some(&CliSettings {
                port: Some(0),
                ..Default::default()
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_expand_env_vars_host_and_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDTEX_CFG_HOST", "10.0.0.1");
            std::env::set_var("MDTEX_CFG_CDN", "cdn.example.com");
        }
        let mut config: Config = toml::from_str(
            r#"
[server]
host = "${MDTEX_CFG_HOST}"

[typeset]
mathjax_url = "https://${MDTEX_CFG_CDN}/mathjax.js"
"#,
        )
        .unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.typeset.mathjax_url, "https://cdn.example.com/mathjax.js");
        unsafe {
            std::env::remove_var("MDTEX_CFG_HOST");
            std::env::remove_var("MDTEX_CFG_CDN");
        }
    }

    #[test]
    fn test_expand_leaves_delimiters_alone() {
        let mut config: Config = toml::from_str(
            r#"
[typeset]
display_open = "$${"
display_close = "}$$"
"#,
        )
        .unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.typeset.display_open, "$${");
    }

    fn assert_validation_error(config: &Config, expected: &str) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(
            err.to_string().contains(expected),
            "Expected '{expected}' in '{err}'"
        );
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default();
        config.server.host = String::new();
        assert_validation_error(&config, "server.host");
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_validation_error(&config, "server.port");
    }

    #[test]
    fn test_validate_empty_delimiter() {
        let mut config = Config::default();
        config.typeset.inline_close = String::new();
        assert_validation_error(&config, "typeset.inline_close");
    }

    #[test]
    fn test_validate_identical_delimiters() {
        let mut config = Config::default();
        config.typeset.display_open = "$".to_owned();
        config.typeset.display_close = "$".to_owned();
        assert_validation_error(&config, "must differ");
    }

    #[test]
    fn test_validate_mathjax_url_scheme() {
        let mut config = Config::default();
        config.typeset.mathjax_url = "ftp://example.com/mathjax.js".to_owned();
        assert_validation_error(&config, "typeset.mathjax_url");
    }

    #[test]
    fn test_validate_empty_command_program() {
        let mut config = Config::default();
        config.typeset.command = vec![String::new()];
        assert_validation_error(&config, "typeset.command");
    }

    #[test]
    fn test_validate_debounce_too_high() {
        let mut config = Config::default();
        config.watch.debounce_ms = 60_000;
        assert_validation_error(&config, "watch.debounce_ms");
    }
}
