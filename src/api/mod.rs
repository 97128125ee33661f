//! API layer - HTTP endpoints and middleware

pub mod admin;
pub mod forms;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::FormAccess;
pub use router::create_router;
pub use state::AppState;
