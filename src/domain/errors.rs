//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::entities::{Category, RiskLevel};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("No screening session is active")]
    NoActiveSession,

    /// Completion was requested before every question had an answer.
    #[error("Screening incomplete: {answered} of {total} questions answered")]
    IncompleteScreening { answered: usize, total: usize },

    #[error("Screening {0} is already complete")]
    AlreadyComplete(String),

    #[error("Question {question_id} has no {risk} answer")]
    ChoiceUnavailable {
        question_id: String,
        risk: RiskLevel,
    },

    #[error("No questions in category {0} for this age group")]
    EmptyCategory(Category),

    #[error("Question catalog error: {0}")]
    Catalog(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl DomainError {
    pub fn question_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Question",
            id: id.into(),
        }
    }

    pub fn child_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Child",
            id: id.into(),
        }
    }

    pub fn screening_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Screening",
            id: id.into(),
        }
    }
}
