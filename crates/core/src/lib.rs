//! Tryla Core - Shared domain types.
//!
//! This crate provides the types shared by every Tryla component:
//! - `client` - Typed client for the Tryla REST backend (session, cart, admin views)
//! - `storefront` - Pass-through route handlers and health checks
//! - `cli` - Command-line storefront and admin front-end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. The REST
//! backend owns all business state; these types only give its JSON a shape.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
