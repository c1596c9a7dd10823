//! Error types
//!
//! Typed failures for path composition and upload persistence. Handlers
//! translate every one of these into an inline report fragment; none of
//! them ever escapes as a non-success HTTP status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path '{0}' contains a parent-directory segment")]
    Traversal(String),
    #[error("absolute path '{0}' is not allowed")]
    Absolute(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("failed to write '{dest}': {source}", dest = .dest.display())]
    Write { dest: PathBuf, source: io::Error },
}
