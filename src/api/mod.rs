//! HTTP layer: ward dashboard pages, form handlers and a JSON view.
//!
//! Page and form routes sit behind the session gate and redirect
//! anonymous callers to `/login`. `app_router()` returns a `Router` that
//! can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server_on, ServerSession, WardServer};
pub use types::ApiContext;
