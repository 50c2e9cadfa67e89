//!
//! src/lib.rs
//!
//! Song cleaning service: loads raw song records from a file or url,
//! cleans them and serves the result over http
//!

pub mod api;
pub mod cleaner;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use crate::cleaner::{clean, clean_with_stats, CleanStats};
pub use crate::errors::CleanerError;
pub use crate::fetch::{Source, SourceLoader};
pub use crate::types::{CleanedRecord, RawRecord};
