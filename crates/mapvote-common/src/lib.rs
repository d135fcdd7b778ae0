//! Shared data model for the map-vote client.
//!
//! Wire types mirror the JSON served by the election demo API. Nothing in
//! here performs I/O beyond reading a config file.

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

pub use config::ClientConfig;
pub use errors::{Error, Result};
pub use types::*;
