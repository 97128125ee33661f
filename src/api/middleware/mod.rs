//! API middleware components

pub mod admin_auth;
pub mod auth;
pub mod logging;
pub mod metrics;
pub mod security;

pub use admin_auth::RequireAdmin;
pub use auth::{bearer_token, FormAccess};
pub use logging::{logging_middleware, REQUEST_ID_HEADER};
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
