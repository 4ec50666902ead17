use thiserror::Error;

/// Errors raised at the edges of the engine.
///
/// The sanitizer and the metric calculator never fail. Encoders only fail
/// when the underlying writer does.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid duration: {minutes} minutes (must be between {minimum} and {maximum})")]
    InvalidDuration {
        minutes: u32,
        minimum: u32,
        maximum: u32,
    },

    #[error("Malformed external timeline: {0}")]
    MalformedExternalTimeline(String),

    #[error("Malformed workout document: {0}")]
    MalformedStructuredDocument(String),

    #[error("Timeline collaborator failed: {0}")]
    Collaborator(String),

    #[error("Failed to encode workout: {0}")]
    Encoding(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn malformed_timeline(message: impl Into<String>) -> Self {
        EngineError::MalformedExternalTimeline(message.into())
    }

    pub fn malformed_document(message: impl Into<String>) -> Self {
        EngineError::MalformedStructuredDocument(message.into())
    }

    pub fn encoding(err: impl std::fmt::Display) -> Self {
        EngineError::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::MalformedExternalTimeline(err.to_string())
    }
}

impl From<quick_xml::Error> for EngineError {
    fn from(err: quick_xml::Error) -> Self {
        EngineError::MalformedStructuredDocument(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for EngineError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        EngineError::MalformedStructuredDocument(err.to_string())
    }
}
