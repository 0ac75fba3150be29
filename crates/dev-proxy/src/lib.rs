//! Development reverse proxy for the CRM agent console
//!
//! Local UI development talks to a same-origin backend; this proxy forwards
//! the two backend path prefixes (`/voipcall_token`, `/voipcall`) to the
//! real origin and answers 404 for everything else. The origin sits behind
//! a host-checked gateway, so the `Host` header is rewritten to the
//! upstream's own host; upstream certificate verification can be disabled
//! for environments with interception proxies.
//!
//! Strictly a development tool - no auth, no rate limiting, permissive CORS.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use url::Url;

/// Default upstream origin the reference console develops against
pub const DEFAULT_UPSTREAM: &str = "http://crm.leads.qq.com";

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream origin requests are forwarded to
    pub upstream: String,
    /// Skip upstream TLS certificate verification
    pub insecure: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { upstream: DEFAULT_UPSTREAM.to_string(), insecure: false }
    }
}

#[derive(Clone)]
struct ProxyState {
    http: reqwest::Client,
    upstream: Url,
}

/// Build the proxy router.
///
/// Only the backend path prefixes are forwarded; any other path gets the
/// router's default 404 so a misconfigured UI fails loudly instead of
/// leaking requests upstream.
pub fn router(config: &ProxyConfig) -> anyhow::Result<Router> {
    let upstream = Url::parse(&config.upstream)?;
    let mut builder = reqwest::Client::builder();
    if config.insecure {
        tracing::warn!("upstream certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }
    let http = builder.build()?;

    let state = ProxyState { http, upstream };
    Ok(Router::new()
        .route("/voipcall_token", any(forward))
        .route("/voipcall_token/*rest", any(forward))
        .route("/voipcall", any(forward))
        .route("/voipcall/*rest", any(forward))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()))
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match proxy_request(&state, method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(path = %uri.path(), error = %e, "upstream request failed");
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}

async fn proxy_request(
    state: &ProxyState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> anyhow::Result<Response> {
    let mut target = state.upstream.join(uri.path().trim_start_matches('/'))?;
    target.set_query(uri.query());
    tracing::debug!(%method, target = %target, "forwarding");

    let mut request = state.http.request(method, target);
    for (name, value) in headers {
        // Host is rewritten to the upstream's own host; hop-by-hop headers
        // do not survive the proxy hop.
        if name == header::HOST || is_hop_by_hop(name) {
            continue;
        }
        request = request.header(name, value.clone());
    }

    let upstream_response = request.body(body).send().await?;

    let mut builder = Response::builder().status(upstream_response.status());
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop(name) {
            builder = builder.header(name, value.clone());
        }
    }
    let bytes = upstream_response.bytes().await?;
    Ok(builder.body(Body::from(bytes))?)
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}
