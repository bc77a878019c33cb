//! biostructx-common — Shared errors, HTTP client, and configuration used across all BioStructX crates.

pub mod error;
pub mod http;
pub mod config;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{BioStructXError, Result};
pub use http::HttpClient;
