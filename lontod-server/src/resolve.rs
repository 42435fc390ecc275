//! Maps an incoming request onto a stored representation or a redirect.
//!
//! The resolver knows nothing about axum; [`crate::http`] extracts the
//! inputs and turns a [`Resolution`] into a response.

use lontod_core::{ConceptMatch, IndexStore, MediaRange, negotiate};
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::overview;

/// Inputs of a request to the ontology route.
#[derive(Debug, Clone, Default)]
pub struct OntologyRequest<'a> {
    /// Slug or IRI; `None` asks for the overview
    pub identifier: Option<&'a str>,
    /// Explicit media type, bypassing negotiation
    pub format: Option<&'a str>,
    pub download: bool,
    pub accept: Option<&'a str>,
}

/// What to answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Overview {
        mime_type: &'static str,
        body: String,
    },
    Representation {
        slug: String,
        mime_type: String,
        data: Vec<u8>,
        download: bool,
    },
    /// `303 See Other` to a server-local URL
    Redirect(String),
}

pub struct Resolver<'a> {
    store: &'a IndexStore,
    config: &'a ServerConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a IndexStore, config: &'a ServerConfig) -> Self {
        Self { store, config }
    }

    /// Resolve a request to the ontology route.
    ///
    /// An identifier naming a concept rather than an ontology redirects to
    /// the defining page, so `?uri=` works for concept IRIs with a fragment.
    pub fn ontology(&self, request: &OntologyRequest<'_>) -> Result<Resolution, ServerError> {
        let Some(identifier) = request.identifier else {
            return self.overview(request.format, request.accept);
        };

        let Some(slug) = self.store.resolve_ontology(identifier)? else {
            return match self.store.resolve_concept(&[identifier])? {
                Some(found) => self.concept_redirect(&found),
                None => Err(ServerError::NotFound("ontology not found".into())),
            };
        };
        let available = self.store.mime_types(&slug)?;
        if available.is_empty() {
            return Err(ServerError::NotFound("ontology not found".into()));
        }

        let mime_type = match request.format {
            Some(format) => available
                .iter()
                .find(|mime| *mime == format)
                .cloned()
                .ok_or_else(|| ServerError::NotFound("format not available".into()))?,
            None => {
                let accept = MediaRange::parse_accept(request.accept);
                negotiate(&accept, &available, None)?.to_string()
            }
        };
        debug!(slug = %slug, mime_type = %mime_type, "serving representation");

        // the ontology may have been replaced since the types were listed
        let data = self
            .store
            .get_representation(&slug, &mime_type)?
            .ok_or_else(|| ServerError::Internal("negotiated representation went away".into()))?;

        Ok(Resolution::Representation {
            slug,
            mime_type,
            data,
            download: request.download,
        })
    }

    /// The overview of every indexed ontology.
    ///
    /// Falls back to plain text when the `Accept` header matches neither
    /// offered type.
    pub fn overview(
        &self,
        format: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Resolution, ServerError> {
        let mime_type = match format {
            Some(overview::HTML) => overview::HTML,
            Some(overview::TEXT) => overview::TEXT,
            Some(_) => return Err(ServerError::NotFound("format not available".into())),
            None => {
                let offered = overview::offered();
                let accept = MediaRange::parse_accept(accept);
                match negotiate(&accept, &offered, None) {
                    Ok(overview::HTML) => overview::HTML,
                    _ => overview::TEXT,
                }
            }
        };

        let ontologies = self.store.list_ontologies()?;
        let body = if mime_type == overview::HTML {
            overview::render_html(self.config, &ontologies)
        } else {
            overview::render_text(self.config, &ontologies)
        };
        Ok(Resolution::Overview { mime_type, body })
    }

    /// Resolve a request outside the ontology route by treating its URL as a
    /// concept IRI.
    ///
    /// `host` is the request's `Host` header; a configured public URL takes
    /// precedence.
    pub fn fallback(&self, host: Option<&str>, path: &str) -> Result<Resolution, ServerError> {
        let authority = self
            .config
            .public_authority()
            .or_else(|| host.map(|h| hostname(h).to_string()));

        if let Some(authority) = authority {
            let candidates = concept_candidates(&authority, path);
            debug!(?candidates, "looking up concept");
            if let Some(found) = self.store.resolve_concept(&candidates)? {
                return self.concept_redirect(&found);
            }
        }

        if path == "/" && self.config.route() != "/" {
            return Ok(Resolution::Redirect(self.config.link(None, None, false, None)));
        }
        Err(ServerError::NotFound("not found".into()))
    }

    /// Whether `identifier` names an ontology or a concept.
    pub fn knows(&self, identifier: &str) -> Result<bool, ServerError> {
        Ok(self.store.resolve_ontology(identifier)?.is_some()
            || self.store.resolve_concept(&[identifier])?.is_some())
    }

    /// Redirect to the page of the ontology documenting a concept.
    fn concept_redirect(&self, found: &ConceptMatch) -> Result<Resolution, ServerError> {
        let uri = self
            .store
            .primary_uri(&found.slug)?
            .unwrap_or_else(|| found.slug.clone());
        let identifier = overview::link_identifier(self.config, &found.slug, &uri);
        Ok(Resolution::Redirect(self.config.link(
            Some(identifier),
            None,
            false,
            found.fragment.as_deref(),
        )))
    }
}

/// IRIs a request for `path` on `authority` may stand for, in lookup order.
///
/// Browsers never send the fragment, so the `#`-terminated namespace of a
/// hash IRI is tried last; the client keeps its fragment across the redirect.
pub fn concept_candidates(authority: &str, path: &str) -> Vec<String> {
    let path = path.trim_end_matches('/');
    vec![
        format!("http://{authority}{path}"),
        format!("https://{authority}{path}"),
        format!("http://{authority}{path}/"),
        format!("https://{authority}{path}/"),
        format!("http://{authority}{path}#"),
        format!("https://{authority}{path}#"),
    ]
}

/// The host part of a `Host` header value.
fn hostname(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}
