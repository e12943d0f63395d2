use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving inputs or running a generation pass.
#[derive(Debug, Error)]
pub enum GenError {
    /// A required path was left empty.
    #[error("the {0} path is empty")]
    EmptyPath(&'static str),
    /// A referenced file does not exist.
    #[error("the {what} file at {path:?} does not exist")]
    MissingResource { what: &'static str, path: PathBuf },
    /// Zero-sized grid, or a non-square grid where a square one is required.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Bytes that could not be decoded into an image.
    #[error("could not decode image: {0}")]
    DecodeError(#[from] image::ImageError),
    /// A custom material was requested but none was supplied.
    #[error("a custom material was requested but none was supplied")]
    MissingMaterial,
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
