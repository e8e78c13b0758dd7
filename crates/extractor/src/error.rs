use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{path}: source is not valid UTF-8: {source}")]
    Decode {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("{path}:{line}:{column}: syntax error")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Parser error: {0}")]
    ParserError(String),
}

impl ExtractError {
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    pub fn parser(message: impl Into<String>) -> Self {
        Self::ParserError(message.into())
    }
}
