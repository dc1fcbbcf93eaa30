//! Web server module
//!
//! JSON API over the domain catalog and search.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
