//! Core domain + application logic for the Telegram message relay.
//!
//! This crate is intentionally framework-agnostic. The Telegram client lives
//! behind a port (trait) implemented in the adapter crate; everything here is
//! testable without a network.

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod journal;
pub mod logging;
pub mod port;
pub mod routing;

pub use errors::{Error, Result};
