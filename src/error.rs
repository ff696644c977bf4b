use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationMessage;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum DdmsError {
    /// A structural rule was broken. Always fatal, always located.
    #[error("{0}")]
    Invalid(ValidationMessage),

    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(String),

    #[error("Vocabulary load failed: {key} from {location} - {details}")]
    VocabularyLoad {
        key: String,
        location: String,
        details: String,
    },

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DdmsError {
    /// Create a structural error at the given locator
    pub fn invalid(text: impl Into<String>, locator: impl Into<String>) -> Self {
        DdmsError::Invalid(ValidationMessage::error(text, locator))
    }

    /// The validation message behind a structural error
    pub fn message(&self) -> Option<&ValidationMessage> {
        match self {
            DdmsError::Invalid(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, DdmsError::Invalid(_))
    }

    /// Prefix the locator of a structural error with an ancestor's qualified name.
    ///
    /// Non-structural errors pass through untouched.
    pub fn located_under(self, ancestor: &str) -> Self {
        match self {
            DdmsError::Invalid(message) => DdmsError::Invalid(message.into_under(ancestor)),
            other => other,
        }
    }
}

/// Vocabulary loader error types.
///
/// These are `Clone` because the vocabulary cache shares one failure
/// among every caller waiting on the same entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Vocabulary resource not found: {key} at {location}")]
    NotFound { key: String, location: String },

    #[error("Vocabulary resource unreadable: {key} at {location} - {details}")]
    Unreadable {
        key: String,
        location: String,
        details: String,
    },

    #[error("Malformed vocabulary resource: {key} at {location} - {details}")]
    Malformed {
        key: String,
        location: String,
        details: String,
    },

    #[error("Invalid pattern in vocabulary {key}: {pattern} - {details}")]
    Pattern {
        key: String,
        location: String,
        pattern: String,
        details: String,
    },
}

impl VocabularyError {
    pub fn key(&self) -> &str {
        match self {
            VocabularyError::NotFound { key, .. }
            | VocabularyError::Unreadable { key, .. }
            | VocabularyError::Malformed { key, .. }
            | VocabularyError::Pattern { key, .. } => key,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            VocabularyError::NotFound { location, .. }
            | VocabularyError::Unreadable { location, .. }
            | VocabularyError::Malformed { location, .. }
            | VocabularyError::Pattern { location, .. } => location,
        }
    }
}

impl From<VocabularyError> for DdmsError {
    fn from(err: VocabularyError) -> Self {
        DdmsError::VocabularyLoad {
            key: err.key().to_string(),
            location: err.location().to_string(),
            details: err.to_string(),
        }
    }
}

impl From<roxmltree::Error> for DdmsError {
    fn from(err: roxmltree::Error) -> Self {
        DdmsError::Xml(err.to_string())
    }
}

impl From<ConfigError> for DdmsError {
    fn from(err: ConfigError) -> Self {
        DdmsError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DdmsError>;
