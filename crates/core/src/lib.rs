//! Terra Core - Shared types library.
//!
//! This crate provides common types used across all Terra Admin components:
//! - `console` - Session and order-workflow client library
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the status/role/method enums with their
//!   display metadata

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
