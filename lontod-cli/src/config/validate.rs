//! Turns the merged configuration into checked runtime settings.

use std::path::Path;

use lontod_server::{ServerConfig, Snippets};
use url::Url;

use super::error::ConfigError;
use super::types::ServerSection;

pub fn check_route(route: &str) -> Result<(), ConfigError> {
    if route.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Route(route.to_string()))
    }
}

/// Build the server configuration, reading snippet files and parsing the
/// public URL.
pub fn server_config(section: &ServerSection) -> Result<ServerConfig, ConfigError> {
    check_route(&section.route)?;

    let public_url = section
        .public_url
        .as_deref()
        .map(parse_public_url)
        .transpose()?;

    let defaults = Snippets::default();
    let files = &section.snippets;
    let snippets = Snippets {
        html_header: read_snippet(files.html_header.as_deref(), defaults.html_header)?,
        html_footer: read_snippet(files.html_footer.as_deref(), defaults.html_footer)?,
        txt_header: read_snippet(files.txt_header.as_deref(), defaults.txt_header)?,
        txt_footer: read_snippet(files.txt_footer.as_deref(), defaults.txt_footer)?,
    };

    Ok(ServerConfig {
        host: section.host.clone(),
        port: section.port,
        route: section.route.clone(),
        identifier_style: section.identifier_style,
        public_url,
        insecure_skip_routes: section.insecure_skip_routes,
        snippets,
        request_timeout: section.request_timeout,
    })
}

fn parse_public_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::PublicUrl {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("no host".to_string()));
    }
    Ok(url)
}

fn read_snippet(path: Option<&Path>, default: String) -> Result<String, ConfigError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ConfigError::Snippet {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::SnippetFiles;
    use tempfile::TempDir;

    #[test]
    fn test_route_must_be_absolute() {
        assert!(check_route("/").is_ok());
        assert!(check_route("/ontology").is_ok());
        assert!(matches!(check_route("ontology"), Err(ConfigError::Route(_))));
    }

    #[test]
    fn test_public_url_must_be_absolute() {
        let mut section = ServerSection {
            public_url: Some("example.org".into()),
            ..Default::default()
        };
        assert!(matches!(
            server_config(&section),
            Err(ConfigError::PublicUrl { .. })
        ));

        section.public_url = Some("https://w3id.example/".into());
        let config = server_config(&section).unwrap();
        assert_eq!(config.public_authority().as_deref(), Some("w3id.example"));
    }

    #[test]
    fn test_snippets_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let header = temp_dir.path().join("header.txt");
        std::fs::write(&header, "Custom header\n").unwrap();

        let section = ServerSection {
            snippets: SnippetFiles {
                txt_header: Some(header),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = server_config(&section).unwrap();
        assert_eq!(config.snippets.txt_header, "Custom header\n");
        assert_eq!(config.snippets.html_header, Snippets::default().html_header);
    }

    #[test]
    fn test_missing_snippet_fails() {
        let section = ServerSection {
            snippets: SnippetFiles {
                html_footer: Some("/nonexistent/footer.html".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            server_config(&section),
            Err(ConfigError::Snippet { .. })
        ));
    }
}
