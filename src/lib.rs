//! # CSRF Bootstrap Library
//!
//! Fetches the CSRF token an admin panel origin issues, once the page is
//! ready, and keeps it in an injectable page-lifetime state for later readers.
//!
//! Modules:
//! - `config` — service configuration and validation
//! - `cache` — the token slot and its shared state holder
//! - `sources` — the same-origin HTTP fetch of the token
//! - `parser` — extracting the token field from the response body
//! - `lifecycle` — the one-shot page-ready trigger

pub mod config;
pub mod cache;
pub mod sources;
pub mod parser;
pub mod lifecycle;
pub mod observability;
pub mod server;
pub mod utils;
#[cfg(test)]
pub mod tests;


pub use crate::cache::{token::Token, token_state::TokenState};
pub use crate::config::page::{PageConfig, ServiceConfig};
pub use crate::lifecycle::page::PageSession;
pub use crate::sources::{csrf::TokenBootstrapper, FetchToken};
