//! HTTP server module

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::config::IdentifierStyle;
use crate::error::ServerError;
use crate::resolve::{OntologyRequest, Resolution, Resolver};
use lontod_core::Format;

/// Query parameters of the ontology route.
#[derive(Debug, Default, Deserialize)]
pub struct OntologyParams {
    pub uri: Option<String>,
    pub format: Option<String>,
    pub download: Option<String>,
}

impl OntologyParams {
    fn download(&self) -> bool {
        self.download.as_deref() == Some("1")
    }
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();
    let route = config.route();

    let mut router = Router::new();
    if !config.insecure_skip_routes {
        router = router
            .route("/.well-known/*rest", get(not_found))
            .route("/favicon.ico", get(not_found))
            .route("/robots.txt", get(not_found));
    }

    router = match config.identifier_style {
        IdentifierStyle::Query => router.route(route, get(ontology_by_query)),
        IdentifierStyle::Path => {
            let item = format!("{}/:identifier", route.trim_end_matches('/'));
            router
                .route(route, get(ontology_by_query))
                .route(&item, get(ontology_by_path))
        }
    };

    router
        .fallback(concept_lookup)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(timeout_layer(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Requests running longer than `timeout` answer `408 Request Timeout`.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

async fn not_found() -> ServerError {
    ServerError::NotFound("not found".into())
}

/// Run a resolution against the store off the async executor.
async fn resolve<F>(state: Arc<AppState>, resolution: F) -> Result<Response, ServerError>
where
    F: FnOnce(Resolver<'_>) -> Result<Resolution, ServerError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || resolution(state.resolver()))
        .await
        .map_err(|e| ServerError::Internal(format!("resolver task failed: {e}")))?
        .map(respond)
}

/// `<route>?uri=...&format=...&download=1`
async fn ontology_by_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OntologyParams>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let accept = header_string(&headers, header::ACCEPT);
    resolve(state, move |resolver| {
        resolver.ontology(&OntologyRequest {
            identifier: params.uri.as_deref(),
            format: params.format.as_deref(),
            download: params.download(),
            accept: accept.as_deref(),
        })
    })
    .await
}

/// `<route>/<identifier>?format=...&download=1`
///
/// Identifiers that name neither an ontology nor a concept are looked up
/// from the request URL instead.
async fn ontology_by_path(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
    Query(params): Query<OntologyParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ServerError> {
    let accept = header_string(&headers, header::ACCEPT);
    let host = host(&headers, &uri);
    let path = uri.path().to_string();
    resolve(state, move |resolver| {
        if !resolver.knows(&identifier)? {
            return resolver.fallback(host.as_deref(), &path);
        }
        resolver.ontology(&OntologyRequest {
            identifier: Some(&identifier),
            format: params.format.as_deref(),
            download: params.download(),
            accept: accept.as_deref(),
        })
    })
    .await
}

async fn concept_lookup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ServerError> {
    let host = host(&headers, &uri);
    let path = uri.path().to_string();
    resolve(state, move |resolver| resolver.fallback(host.as_deref(), &path)).await
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    header_string(headers, header::HOST).or_else(|| uri.host().map(str::to_string))
}

fn respond(resolution: Resolution) -> Response {
    match resolution {
        Resolution::Overview { mime_type, body } => (
            [
                (header::CONTENT_TYPE, format!("{mime_type}; charset=utf-8")),
                (header::VARY, "Accept".to_string()),
            ],
            body,
        )
            .into_response(),
        Resolution::Representation {
            slug,
            mime_type,
            data,
            download,
        } => {
            let filename = match Format::from_mime_type(&mime_type) {
                Some(format) => format!("{slug}.{}", format.file_extension()),
                None => slug,
            };
            let disposition = format!(
                "{}; filename*=UTF-8''{}",
                if download { "attachment" } else { "inline" },
                urlencoding::encode(&filename)
            );
            (
                [
                    (header::CONTENT_TYPE, mime_type),
                    (header::VARY, "Accept".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                data,
            )
                .into_response()
        }
        Resolution::Redirect(location) => match HeaderValue::from_str(&location) {
            Ok(value) => (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, value)],
                format!("Redirecting to {location}..."),
            )
                .into_response(),
            Err(_) => ServerError::Internal(format!("invalid redirect target {location:?}"))
                .into_response(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum_test::TestServer;
    use lontod_core::IndexStore;

    fn server(config: ServerConfig) -> TestServer {
        let store = Arc::new(IndexStore::open_in_memory().unwrap());
        let state = Arc::new(AppState::new(store, config));
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_overview_on_empty_index() {
        let server = server(ServerConfig::default());
        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("Ontologies"));
    }

    #[tokio::test]
    async fn test_reserved_routes_answer_not_found() {
        let server = server(ServerConfig::default());
        server.get("/favicon.ico").await.assert_status_not_found();
        server.get("/robots.txt").await.assert_status_not_found();
        server
            .get("/.well-known/security.txt")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_slow_requests_time_out() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(20)));
        let server = TestServer::new(app).unwrap();

        server
            .get("/slow")
            .await
            .assert_status(StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_root_redirects_to_prefix() {
        let server = server(ServerConfig {
            route: "/ontology".into(),
            ..Default::default()
        });
        let response = server.get("/").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/ontology");
    }
}
