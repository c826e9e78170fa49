use thiserror::Error;

use crate::types::SourceKind;

#[derive(Error, Debug)]
pub enum DakError {
    #[error("Invalid source: {message}")]
    InvalidSource { message: String },

    #[error("Resolution error for {kind} source `{reference}`: {message}")]
    Resolution {
        kind: SourceKind,
        reference: String,
        message: String,
    },

    #[error("Source index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No component registered for type `{component}`")]
    ComponentNotFound { component: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("HTTP error: {message}")]
    Http { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl DakError {
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource {
            message: message.into(),
        }
    }

    pub fn resolution(
        kind: SourceKind,
        reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            kind,
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DakError>;
