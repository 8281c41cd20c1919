//! Tryla storefront service library.
//!
//! Serves the pass-through API routes the browser front-end calls instead of
//! the backend directly. Exposed as a library so the router can be tested
//! in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::StorefrontConfig;
pub use routes::router;
pub use state::AppState;
