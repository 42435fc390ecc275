//! Server configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// How ontologies are addressed below the route prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierStyle {
    /// `<route>?uri=<slug-or-IRI>`
    #[default]
    Query,
    /// `<route>/<slug-or-IRI>`
    Path,
}

impl FromStr for IdentifierStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(IdentifierStyle::Query),
            "path" => Ok(IdentifierStyle::Path),
            other => Err(format!("unknown identifier style {other:?} (expected query or path)")),
        }
    }
}

impl fmt::Display for IdentifierStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierStyle::Query => "query",
            IdentifierStyle::Path => "path",
        })
    }
}

/// Header and footer text framing the overview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippets {
    pub html_header: String,
    pub html_footer: String,
    pub txt_header: String,
    pub txt_footer: String,
}

impl Default for Snippets {
    fn default() -> Self {
        Self {
            html_header: DEFAULT_HTML_HEADER.to_string(),
            html_footer: DEFAULT_HTML_FOOTER.to_string(),
            txt_header: "# Ontologies\n\n".to_string(),
            txt_footer: "---\nServed by lontod\n".to_string(),
        }
    }
}

const DEFAULT_HTML_HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Ontologies</title>
<style>
  main { margin: 1em; }
  fieldset { margin-bottom: 1em; }
  footer { font-size: small; color: gray; }
</style>
</head>
<body>
<h1>Ontologies</h1>
<main>
"#;

const DEFAULT_HTML_FOOTER: &str = r#"</main>
<footer>Served by lontod</footer>
</body>
</html>
"#;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path the overview and ontologies are served under
    pub route: String,
    pub identifier_style: IdentifierStyle,
    /// Public base URL; its host replaces the request `Host` when
    /// looking up concept IRIs
    pub public_url: Option<Url>,
    /// Serve `/.well-known/`, `/favicon.ico` and `/robots.txt` through
    /// concept lookup instead of answering 404
    pub insecure_skip_routes: bool,
    pub snippets: Snippets,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            route: "/".to_string(),
            identifier_style: IdentifierStyle::default(),
            public_url: None,
            insecure_skip_routes: false,
            snippets: Snippets::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the address string for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The route prefix without a trailing slash, `/` for the root.
    pub fn route(&self) -> &str {
        match self.route.trim_end_matches('/') {
            "" => "/",
            route => route,
        }
    }

    /// Host (and port) that concept IRIs are looked up under, if fixed.
    pub fn public_authority(&self) -> Option<String> {
        let url = self.public_url.as_ref()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Server-local link to an ontology, the overview when `identifier` is
    /// `None`.
    pub fn link(
        &self,
        identifier: Option<&str>,
        format: Option<&str>,
        download: bool,
        fragment: Option<&str>,
    ) -> String {
        let route = self.route();
        let mut link = route.to_string();
        let mut query = Vec::new();

        match (identifier, self.identifier_style) {
            (Some(id), IdentifierStyle::Query) => {
                query.push(format!("uri={}", urlencoding::encode(id)));
            }
            (Some(id), IdentifierStyle::Path) => {
                if !link.ends_with('/') {
                    link.push('/');
                }
                link.push_str(&urlencoding::encode(id));
            }
            (None, _) => {}
        }
        if let Some(format) = format {
            query.push(format!("format={}", urlencoding::encode(format)));
        }
        if download {
            query.push("download=1".to_string());
        }

        if !query.is_empty() {
            link.push('?');
            link.push_str(&query.join("&"));
        }
        if let Some(fragment) = fragment {
            link.push('#');
            link.push_str(&urlencoding::encode(fragment));
        }
        link
    }
}
