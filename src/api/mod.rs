//! Desa Portal View Server Module
//! Server-side view layer over the village REST API

pub mod context;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use context::{AppState, ViewContext};
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
