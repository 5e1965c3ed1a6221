//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (the SPA is served from a different origin)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
