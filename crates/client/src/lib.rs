//! Tryla storefront client library.
//!
//! Typed access to the Tryla REST backend plus the stateful pieces a
//! front-end builds on:
//!
//! - [`ApiClient`] - catalog, auth, orders and admin endpoints, with bearer
//!   tokens, centralized 401 handling and a coalescing catalog cache
//! - [`CartStore`] - in-memory mirror of the server-side cart
//! - [`admin`] - product, category and order management views
//! - [`SessionHandle`] - the logged-in user and token, persisted by a
//!   [`SessionStore`]
//! - [`UiSink`] - where toasts and navigation requests go
//!
//! The backend owns all state. Nothing here retries, merges or queues.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
mod auth;
pub mod cart;
mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
mod orders;
pub mod scope;
pub mod session;
pub mod types;

pub use cart::{CartBackend, CartOutcome, CartStore};
pub use client::{ApiClient, Auth};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Result, ValidationError};
pub use notify::{RecordingSink, Route, Toast, ToastLevel, TracingSink, UiEvent, UiSink};
pub use scope::RequestScope;
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionError, SessionHandle, SessionStore,
};
