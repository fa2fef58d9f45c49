//! Web server module
//!
//! Provides the HTTP/JSON API used by the browser front end.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
