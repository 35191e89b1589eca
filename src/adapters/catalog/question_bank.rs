//! Implements QuestionProvider over the built-in question catalog.
//!
//! The catalog is a JSON asset compiled into the binary: 3 age groups x 3 categories x 5 questions.

use crate::domain::{AgeGroup, Category, DomainError, Question};
use crate::ports::QuestionProvider;
use std::collections::HashSet;
use tracing::debug;

const BUILTIN_QUESTIONS: &str = include_str!("../../../data/questions.json");

/// In-memory question catalog. Keeps catalog (insertion) order for stable sorting.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load the catalog shipped with the crate.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let questions: Vec<Question> =
            serde_json::from_str(json).map_err(|e| DomainError::Catalog(e.to_string()))?;
        Self::from_questions(questions)
    }

    /// Build a catalog. Rejects duplicate ids and questions that offer no answer at all.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(DomainError::Catalog(format!("duplicate question id {}", q.id)));
            }
            if q.answers.offered().next().is_none() {
                return Err(DomainError::Catalog(format!(
                    "question {} offers no answer",
                    q.id
                )));
            }
        }
        debug!(count = questions.len(), "question catalog loaded");
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn sorted<'a>(mut questions: Vec<&'a Question>) -> Vec<&'a Question> {
        // sort_by_key is stable: equal order_index keeps catalog order
        questions.sort_by_key(|q| q.order_index);
        questions
    }
}

impl QuestionProvider for QuestionBank {
    fn questions_for_age_group(&self, age_group: AgeGroup) -> Vec<&Question> {
        Self::sorted(
            self.questions
                .iter()
                .filter(|q| q.age_group == age_group)
                .collect(),
        )
    }

    fn questions_for_age_group_and_category(
        &self,
        age_group: AgeGroup,
        category: Category,
    ) -> Vec<&Question> {
        Self::sorted(
            self.questions
                .iter()
                .filter(|q| q.age_group == age_group && q.category == category)
                .collect(),
        )
    }

    fn question_by_id(&self, id: &str) -> Result<&Question, DomainError> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| DomainError::question_not_found(id))
    }

    fn question_count(&self, age_group: AgeGroup) -> usize {
        self.questions
            .iter()
            .filter(|q| q.age_group == age_group)
            .count()
    }
}
