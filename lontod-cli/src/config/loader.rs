use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::types::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT, LontodConfig, RawDatabaseConfig,
    RawIndexConfig, RawLontodConfig, RawServerConfig, RawWatchConfig, ServerSection, SnippetFiles,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, then project)
    pub fn load() -> Result<LontodConfig, ConfigError> {
        let mut layers = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            layers.push(user_path);
        }
        layers.push(Self::project_config_path());
        Self::load_layers(&layers)
    }

    /// Merge the files in `paths`, later files overriding earlier ones.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<LontodConfig, ConfigError> {
        let mut raw = RawLontodConfig::default();
        for path in paths {
            if !path.exists() {
                continue;
            }
            tracing::debug!(path = %path.display(), "loading config file");
            raw = Self::merge_raw(raw, Self::read(path)?);
        }
        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lontod").join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with the LONTOD_CONFIG env var
    pub fn project_config_path() -> PathBuf {
        match std::env::var_os("LONTOD_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("lontod.toml"),
        }
    }

    fn read(path: &Path) -> Result<RawLontodConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawLontodConfig, overlay: RawLontodConfig) -> RawLontodConfig {
        RawLontodConfig {
            database: RawDatabaseConfig {
                path: overlay.database.path.or(base.database.path),
            },
            index: RawIndexConfig {
                paths: overlay.index.paths.or(base.index.paths),
                languages: overlay.index.languages.or(base.index.languages),
            },
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                route: overlay.server.route.or(base.server.route),
                identifier_style: overlay
                    .server
                    .identifier_style
                    .or(base.server.identifier_style),
                public_url: overlay.server.public_url.or(base.server.public_url),
                insecure_skip_routes: overlay
                    .server
                    .insecure_skip_routes
                    .or(base.server.insecure_skip_routes),
                request_timeout: overlay.server.request_timeout.or(base.server.request_timeout),
                index_html_header: overlay
                    .server
                    .index_html_header
                    .or(base.server.index_html_header),
                index_html_footer: overlay
                    .server
                    .index_html_footer
                    .or(base.server.index_html_footer),
                index_txt_header: overlay
                    .server
                    .index_txt_header
                    .or(base.server.index_txt_header),
                index_txt_footer: overlay
                    .server
                    .index_txt_footer
                    .or(base.server.index_txt_footer),
            },
            watch: RawWatchConfig {
                debounce: overlay.watch.debounce.or(base.watch.debounce),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawLontodConfig) -> LontodConfig {
        LontodConfig {
            database: raw.database.path,
            paths: raw.index.paths.unwrap_or_default(),
            languages: raw.index.languages.unwrap_or_default(),
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                route: raw.server.route.unwrap_or_else(|| "/".to_string()),
                identifier_style: raw.server.identifier_style.unwrap_or_default(),
                public_url: raw.server.public_url,
                insecure_skip_routes: raw.server.insecure_skip_routes.unwrap_or(false),
                request_timeout: raw.server.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
                snippets: SnippetFiles {
                    html_header: raw.server.index_html_header,
                    html_footer: raw.server.index_html_footer,
                    txt_header: raw.server.index_txt_header,
                    txt_footer: raw.server.index_txt_footer,
                },
            },
            debounce: raw.watch.debounce.unwrap_or(lontod_watch::DEFAULT_DEBOUNCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lontod_server::IdentifierStyle;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_layers(&[temp_dir.path().join("none.toml")]).unwrap();
        assert_eq!(config, LontodConfig::default());
    }

    #[test]
    fn test_project_overrides_user() {
        let temp_dir = TempDir::new().unwrap();
        let user = write(
            &temp_dir,
            "user.toml",
            r#"
[server]
port = 9000
host = "0.0.0.0"

[index]
languages = ["de"]
"#,
        );
        let project = write(
            &temp_dir,
            "project.toml",
            r#"
[server]
port = 9100
identifier_style = "path"

[watch]
debounce = "2s"
"#,
        );

        let config = ConfigLoader::load_layers(&[user, project]).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.identifier_style, IdentifierStyle::Path);
        assert_eq!(config.languages, vec!["de".to_string()]);
        assert_eq!(config.debounce, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_toml_is_reported_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "bad.toml", "[server\nport = ");
        let err = ConfigLoader::load_layers(&[path.clone()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    #[serial]
    fn test_project_path_env_override() {
        // SAFETY: serialized with the other env-dependent tests
        unsafe { std::env::set_var("LONTOD_CONFIG", "/tmp/custom.toml") };
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from("/tmp/custom.toml")
        );
        unsafe { std::env::remove_var("LONTOD_CONFIG") };
        assert_eq!(ConfigLoader::project_config_path(), PathBuf::from("lontod.toml"));
    }
}
