//! # instadash Common Library
//!
//! Shared code for the instadash API server and admin CLI:
//! - Configuration loading
//! - Error taxonomy
//! - Store row models and the `Store` access layer (Supabase, SQLite)
//! - Alert read-state transitions
//! - Maintenance operations (competitor activation, demo cleanup, table report)
//! - Outbound integrations (punctuation, workflow automation)

pub mod alerts;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
