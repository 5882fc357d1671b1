use std::path::PathBuf;
use thiserror::Error;

/// Common error type shared by the chaingen tools
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CommonError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        CommonError::NotFound { path: path.into() }
    }
}

impl From<walkdir::Error> for CommonError {
    fn from(error: walkdir::Error) -> Self {
        match error.into_io_error() {
            Some(io) => CommonError::Io(io),
            None => CommonError::Generic("file system loop".to_string()),
        }
    }
}

/// Common Result type alias
pub type CommonResult<T> = Result<T, CommonError>;
