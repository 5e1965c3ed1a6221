//! Request ID middleware for request tracing and correlation.
//!
//! Each request carries an ID that is recorded in the current tracing span,
//! tagged on the Sentry scope and echoed in the `x-request-id` response
//! header. An upstream ID is reused when it looks sane; otherwise a UUID v4
//! is generated.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream IDs longer than this are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Accept an upstream ID only if it is short, non-empty visible ASCII.
fn accept_upstream_id(id: &str) -> Option<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.chars().all(|c| c.is_ascii_graphic());
    valid.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_upstream_id() {
        assert_eq!(accept_upstream_id("abc-123"), Some("abc-123"));
        assert_eq!(accept_upstream_id("  cf-ray-1 "), Some("cf-ray-1"));
    }

    #[test]
    fn test_reject_bad_upstream_id() {
        assert_eq!(accept_upstream_id(""), None);
        assert_eq!(accept_upstream_id("has space"), None);
        assert_eq!(accept_upstream_id(&"x".repeat(MAX_REQUEST_ID_LEN + 1)), None);
    }
}
