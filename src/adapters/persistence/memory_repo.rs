//! In-memory store for tests and throwaway demo runs. Nothing survives the process.

use crate::domain::{Child, DomainError, Screening};
use crate::ports::{ChildRepository, ScreeningRepository};
use tokio::sync::RwLock;

/// Volatile child and screening store. Rows are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRepo {
    children: RwLock<Vec<Child>>,
    screenings: RwLock<Vec<Screening>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut screenings: Vec<Screening>) -> Vec<Screening> {
    screenings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    screenings
}

#[async_trait::async_trait]
impl ChildRepository for MemoryRepo {
    async fn insert_child(&self, child: &Child) -> Result<(), DomainError> {
        let mut children = self.children.write().await;
        if children.iter().any(|c| c.id == child.id) {
            return Err(DomainError::Repo(format!("child {} already exists", child.id)));
        }
        children.push(child.clone());
        Ok(())
    }

    async fn update_child(&self, child: &Child) -> Result<(), DomainError> {
        let mut children = self.children.write().await;
        match children.iter_mut().find(|c| c.id == child.id) {
            Some(existing) => {
                *existing = child.clone();
                Ok(())
            }
            None => Err(DomainError::child_not_found(&child.id)),
        }
    }

    async fn get_child(&self, id: &str) -> Result<Option<Child>, DomainError> {
        let children = self.children.read().await;
        Ok(children.iter().find(|c| c.id == id).cloned())
    }

    async fn search_children(&self, query: &str) -> Result<Vec<Child>, DomainError> {
        let needle = query.to_lowercase();
        let children = self.children.read().await;
        let mut found: Vec<Child> = children
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn recent_children(&self, limit: usize) -> Result<Vec<Child>, DomainError> {
        let mut children = self.children.read().await.clone();
        children.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        children.truncate(limit);
        Ok(children)
    }
}

#[async_trait::async_trait]
impl ScreeningRepository for MemoryRepo {
    async fn insert_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        let mut screenings = self.screenings.write().await;
        if screenings.iter().any(|s| s.id == screening.id) {
            return Err(DomainError::Repo(format!(
                "screening {} already exists",
                screening.id
            )));
        }
        screenings.push(screening.clone());
        Ok(())
    }

    async fn update_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        let mut screenings = self.screenings.write().await;
        match screenings.iter_mut().find(|s| s.id == screening.id) {
            Some(existing) => {
                *existing = screening.clone();
                Ok(())
            }
            None => Err(DomainError::screening_not_found(&screening.id)),
        }
    }

    async fn get_screening(&self, id: &str) -> Result<Option<Screening>, DomainError> {
        let screenings = self.screenings.read().await;
        Ok(screenings.iter().find(|s| s.id == id).cloned())
    }

    async fn get_incomplete_screening(
        &self,
        child_id: &str,
    ) -> Result<Option<Screening>, DomainError> {
        Ok(self
            .screenings_for_child(child_id)
            .await?
            .into_iter()
            .find(|s| !s.is_complete))
    }

    async fn screenings_for_child(&self, child_id: &str) -> Result<Vec<Screening>, DomainError> {
        let screenings = self.screenings.read().await;
        Ok(newest_first(
            screenings
                .iter()
                .filter(|s| s.child_id == child_id)
                .cloned()
                .collect(),
        ))
    }

    async fn all_screenings(&self) -> Result<Vec<Screening>, DomainError> {
        let screenings = self.screenings.read().await;
        Ok(newest_first(screenings.clone()))
    }
}
