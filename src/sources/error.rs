use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("cannot write cache file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no cached copy of {0} and remote unavailable")]
    Unavailable(String),
}

impl FetchError {
    /// Network-level failures are recovered by serving the cached copy.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Status(_))
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive {0} has no members")]
    Empty(String),
    #[error("archive member has an unsafe path: {0}")]
    UnsafePath(String),
}
