//!
//! src/pipeline.rs
//!
//! One load followed by one clean, run per request
//!

use tracing::instrument;

use crate::cleaner;
use crate::errors::CleanerError;
use crate::fetch::{Source, SourceLoader};
use crate::types::CleanedRecord;

#[instrument(skip(loader, source), fields(source = %source))]
pub async fn run(loader: &SourceLoader, source: &Source) ->
    Result<Vec<CleanedRecord>, CleanerError> {
    let raw = loader.load(source).await?;
    Ok( cleaner::clean(raw) )
}
