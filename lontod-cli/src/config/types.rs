use std::path::PathBuf;
use std::time::Duration;

use lontod_server::IdentifierStyle;
use serde::Deserialize;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLontodConfig {
    #[serde(default)]
    pub database: RawDatabaseConfig,

    #[serde(default)]
    pub index: RawIndexConfig,

    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub watch: RawWatchConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDatabaseConfig {
    /// SQLite database file
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawIndexConfig {
    /// Files and directories to index
    pub paths: Option<Vec<PathBuf>>,

    /// Preferred label languages, most preferred first
    pub languages: Option<Vec<String>>,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub route: Option<String>,
    pub identifier_style: Option<IdentifierStyle>,
    pub public_url: Option<String>,
    pub insecure_skip_routes: Option<bool>,

    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,

    pub index_html_header: Option<PathBuf>,
    pub index_html_footer: Option<PathBuf>,
    pub index_txt_header: Option<PathBuf>,
    pub index_txt_footer: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWatchConfig {
    /// Quiet period before changed files are reindexed
    #[serde(default, with = "humantime_serde")]
    pub debounce: Option<Duration>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct LontodConfig {
    /// `None` until a command decides between a file and memory
    pub database: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub languages: Vec<String>,
    pub server: ServerSection,
    pub debounce: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub route: String,
    pub identifier_style: IdentifierStyle,
    pub public_url: Option<String>,
    pub insecure_skip_routes: bool,
    pub request_timeout: Duration,
    pub snippets: SnippetFiles,
}

/// Files whose contents replace the overview's default header and footer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetFiles {
    pub html_header: Option<PathBuf>,
    pub html_footer: Option<PathBuf>,
    pub txt_header: Option<PathBuf>,
    pub txt_footer: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            route: "/".to_string(),
            identifier_style: IdentifierStyle::default(),
            public_url: None,
            insecure_skip_routes: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            snippets: SnippetFiles::default(),
        }
    }
}

impl Default for LontodConfig {
    fn default() -> Self {
        Self {
            database: None,
            paths: Vec::new(),
            languages: Vec::new(),
            server: ServerSection::default(),
            debounce: lontod_watch::DEFAULT_DEBOUNCE,
        }
    }
}

/// Database used when nothing else is configured and no paths are given
pub const DEFAULT_DATABASE: &str = "onto.db";

/// Default host for the server
pub const DEFAULT_HOST: &str = "localhost";

/// Default port for the server
pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = LontodConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.route, "/");
        assert_eq!(config.debounce, Duration::from_secs(1));
        assert!(config.database.is_none());
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[server]
port = 9000
identifier_style = "path"
request_timeout = "5s"

[watch]
debounce = "250ms"
"#;
        let raw: RawLontodConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.server.port, Some(9000));
        assert_eq!(raw.server.identifier_style, Some(IdentifierStyle::Path));
        assert_eq!(raw.server.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(raw.watch.debounce, Some(Duration::from_millis(250)));
        assert!(raw.server.host.is_none());
        assert!(raw.database.path.is_none());
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawLontodConfig = toml::from_str("").unwrap();
        assert!(raw.server.port.is_none());
        assert!(raw.index.languages.is_none());
        assert!(raw.watch.debounce.is_none());
    }
}
