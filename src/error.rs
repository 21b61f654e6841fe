//! Error types for quiz-adapt.

use thiserror::Error;

use crate::question::Category;

/// Result type alias using quiz-adapt's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading questions or managing adaptive state.
#[derive(Error, Debug)]
pub enum Error {
    /// A question bank entry failed validation
    #[error("Invalid question ({category} level {level} #{index}): {reason}")]
    InvalidQuestion {
        category: Category,
        level: u32,
        index: usize,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// State persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Create an invalid question error.
    pub fn invalid_question(
        category: Category,
        level: u32,
        index: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidQuestion {
            category,
            level,
            index,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}
