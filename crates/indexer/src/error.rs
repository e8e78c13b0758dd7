use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Directory walk error: {0}")]
    IgnoreError(#[from] ignore::Error),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),
}
