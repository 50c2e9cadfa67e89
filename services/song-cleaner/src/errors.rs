//!
//! src/errors.rs
//!
//! Defines enums and methods of error conversion
//! for errors the cleaning service uses
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("source fetch error: {0}")]
    SourceFetch(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<reqwest::Error> for CleanerError {
    fn from(e: reqwest::Error) -> Self { CleanerError::SourceFetch(e.to_string()) }
}

impl From<serde_json::Error> for CleanerError {
    fn from(e: serde_json::Error) -> Self { CleanerError::SourceFetch(e.to_string()) }
}
