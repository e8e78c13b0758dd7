use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Indexing failed: {0}")]
    Index(#[from] depgraph_indexer::IndexerError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] depgraph_extractor::ExtractError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Graph file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Component not found: {0}")]
    NodeNotFound(String),
}
