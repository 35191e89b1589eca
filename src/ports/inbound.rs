//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive main menu until the user quits.
    async fn run(&self) -> Result<(), DomainError>;

    /// Register a child through prompts. Returns the new child id, or None if cancelled.
    async fn run_registration(&self) -> Result<Option<String>, DomainError>;

    /// Screen (or resume screening) one child.
    async fn run_screening(&self, child_id: &str) -> Result<(), DomainError>;
}
