//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AgeGroup, Category, Child, DomainError, Question, Screening};

/// Read-only question catalog. Fully loaded in memory; lookups never block.
pub trait QuestionProvider: Send + Sync {
    /// Questions of an age group, ascending by `order_index`; ties keep catalog order.
    fn questions_for_age_group(&self, age_group: AgeGroup) -> Vec<&Question>;

    /// Same ordering as `questions_for_age_group`, restricted to one category.
    fn questions_for_age_group_and_category(
        &self,
        age_group: AgeGroup,
        category: Category,
    ) -> Vec<&Question>;

    /// Look up a question. `DomainError::NotFound` for an unknown id.
    fn question_by_id(&self, id: &str) -> Result<&Question, DomainError>;

    /// Number of questions in an age group.
    fn question_count(&self, age_group: AgeGroup) -> usize {
        self.questions_for_age_group(age_group).len()
    }
}

/// Child store.
#[async_trait::async_trait]
pub trait ChildRepository: Send + Sync {
    async fn insert_child(&self, child: &Child) -> Result<(), DomainError>;

    async fn update_child(&self, child: &Child) -> Result<(), DomainError>;

    async fn get_child(&self, id: &str) -> Result<Option<Child>, DomainError>;

    /// Case-insensitive substring match on the name, ordered by name.
    async fn search_children(&self, query: &str) -> Result<Vec<Child>, DomainError>;

    /// Most recently updated first.
    async fn recent_children(&self, limit: usize) -> Result<Vec<Child>, DomainError>;
}

/// Screening store. Keyed by `Screening.id`; writes must be idempotent so auto-save can retry.
#[async_trait::async_trait]
pub trait ScreeningRepository: Send + Sync {
    async fn insert_screening(&self, screening: &Screening) -> Result<(), DomainError>;

    /// Overwrite the stored screening with the same id.
    async fn update_screening(&self, screening: &Screening) -> Result<(), DomainError>;

    async fn get_screening(&self, id: &str) -> Result<Option<Screening>, DomainError>;

    /// Newest incomplete screening of a child, if any.
    async fn get_incomplete_screening(
        &self,
        child_id: &str,
    ) -> Result<Option<Screening>, DomainError>;

    /// All screenings of a child, newest first.
    async fn screenings_for_child(&self, child_id: &str) -> Result<Vec<Screening>, DomainError>;

    /// All screenings, newest first.
    async fn all_screenings(&self) -> Result<Vec<Screening>, DomainError>;
}
