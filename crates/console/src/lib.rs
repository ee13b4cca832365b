//! Terra console core library.
//!
//! Session/authorization lifecycle and the order state-transition workflow
//! for the Terra admin backend. Everything else the admin panel does
//! (product and category CRUD, uploads, dashboard statistics) lives in other
//! layers; this crate owns the two components where incorrect behavior
//! causes real damage: credentials and order transitions.
//!
//! # Architecture
//!
//! - [`session::SessionManager`] sits below everything: it owns the one live
//!   session per process, persists it, and decorates every outbound request
//!   with the current credential.
//! - [`orders::OrderWorkflow`] issues transition commands through the
//!   session manager and adopts the backend's canonical order records.
//!
//! The backend is the only source of truth for whether a transition was
//! accepted; the console never patches local state optimistically.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod orders;
pub mod session;

pub use config::{ConfigError, ConsoleConfig};
pub use error::ApiError;
pub use orders::{FulfillmentUpdate, Order, OrderWorkflow, PaymentLinkDispatch};
pub use session::{AuthOutcome, Principal, SessionManager};
