use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while scoring or aggregating prediction outputs.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid caller configuration, detected before any prediction file is opened.
    #[error("configuration error: {0}")]
    Config(String),

    /// A metric name that is not recognized.
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    /// Failed to read or write a file.
    #[error("{path}: {source}", path = .path.display())]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse a JSON file.
    #[error("failed to parse '{path}': {source}", path = .path.display())]
    Json {
        /// File that could not be parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to load a structure file.
    #[error("failed to load structure '{path}': {message}", path = .path.display())]
    Structure {
        /// File that could not be loaded.
        path: PathBuf,
        /// Reader diagnostics, joined.
        message: String,
    },

    /// Inconsistent or incomplete prediction data.
    #[error("{0}")]
    Data(String),

    /// Failure while assembling or writing the output table.
    #[error(transparent)]
    Table(#[from] polars::error::PolarsError),

    /// Failure while building the worker pool.
    #[error(transparent)]
    Threads(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}
