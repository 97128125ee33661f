//! HTTP metrics middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::infrastructure::observability::record_http_request;

/// Probe and scrape endpoints that are not counted
const UNTRACKED_PATHS: [&str; 4] = ["/health", "/live", "/ready", "/metrics"];

/// Record count and latency of every request by route template
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    if is_tracked(&path) {
        record_http_request(
            method.as_str(),
            &path,
            response.status().as_u16(),
            start.elapsed(),
        );
    }

    response
}

fn is_tracked(path: &str) -> bool {
    !UNTRACKED_PATHS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probes_are_not_tracked() {
        assert!(!is_tracked("/health"));
        assert!(!is_tracked("/metrics"));
        assert!(is_tracked("/form/{form_id}/submissions"));
    }
}
