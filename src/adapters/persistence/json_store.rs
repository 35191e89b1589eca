//! Implements ChildRepository and ScreeningRepository with a single JSON document.
//!
//! The whole document is cached in memory and rewritten after every change.

use crate::domain::{Child, DomainError, Screening};
use crate::ports::{ChildRepository, ScreeningRepository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    children: Vec<Child>,
    #[serde(default)]
    screenings: Vec<Screening>,
}

/// JSON file-based store.
pub struct JsonStore {
    path: PathBuf,
    cache: tokio::sync::RwLock<StoreData>,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(StoreData::default()),
        }
    }

    /// Load the document from disk. A missing file starts empty; a corrupt one is an error.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s)
                .map_err(|e| DomainError::Repo(format!("parse {}: {}", self.path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no store file yet; starting empty");
                StoreData::default()
            }
            Err(e) => return Err(DomainError::Repo(e.to_string())),
        };
        *self.cache.write().await = data;
        Ok(())
    }

    /// Write-replace: temp file, sync_all, then rename over the target.
    /// A crash mid-write leaves the previous document intact.
    async fn save(&self, data: &StoreData) -> Result<(), DomainError> {
        let json =
            serde_json::to_string_pretty(data).map_err(|e| DomainError::Repo(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Repo(format!("create store dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Repo(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Repo(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Repo(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "store rename failed");
            DomainError::Repo(format!("atomic rename failed: {}", e))
        })?;
        Ok(())
    }

    /// Apply `change` to a copy of the document, write it, and only then publish it to the cache.
    /// A failed write leaves the cache untouched.
    async fn commit<F>(&self, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut StoreData) -> Result<(), DomainError> + Send,
    {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        change(&mut next)?;
        self.save(&next).await?;
        *cache = next;
        Ok(())
    }
}

fn newest_first(mut screenings: Vec<Screening>) -> Vec<Screening> {
    screenings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    screenings
}

#[async_trait::async_trait]
impl ChildRepository for JsonStore {
    async fn insert_child(&self, child: &Child) -> Result<(), DomainError> {
        self.commit(|data| {
            if data.children.iter().any(|c| c.id == child.id) {
                return Err(DomainError::Repo(format!("child {} already exists", child.id)));
            }
            data.children.push(child.clone());
            Ok(())
        })
        .await
    }

    async fn update_child(&self, child: &Child) -> Result<(), DomainError> {
        self.commit(|data| {
            let existing = data
                .children
                .iter_mut()
                .find(|c| c.id == child.id)
                .ok_or_else(|| DomainError::child_not_found(&child.id))?;
            *existing = child.clone();
            Ok(())
        })
        .await
    }

    async fn get_child(&self, id: &str) -> Result<Option<Child>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.children.iter().find(|c| c.id == id).cloned())
    }

    async fn search_children(&self, query: &str) -> Result<Vec<Child>, DomainError> {
        let needle = query.to_lowercase();
        let cache = self.cache.read().await;
        let mut found: Vec<Child> = cache
            .children
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn recent_children(&self, limit: usize) -> Result<Vec<Child>, DomainError> {
        let mut children = self.cache.read().await.children.clone();
        children.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        children.truncate(limit);
        Ok(children)
    }
}

#[async_trait::async_trait]
impl ScreeningRepository for JsonStore {
    async fn insert_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        self.commit(|data| {
            if data.screenings.iter().any(|s| s.id == screening.id) {
                return Err(DomainError::Repo(format!(
                    "screening {} already exists",
                    screening.id
                )));
            }
            data.screenings.push(screening.clone());
            Ok(())
        })
        .await
    }

    async fn update_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        self.commit(|data| {
            let existing = data
                .screenings
                .iter_mut()
                .find(|s| s.id == screening.id)
                .ok_or_else(|| DomainError::screening_not_found(&screening.id))?;
            *existing = screening.clone();
            Ok(())
        })
        .await
    }

    async fn get_screening(&self, id: &str) -> Result<Option<Screening>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.screenings.iter().find(|s| s.id == id).cloned())
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
        let cache = self.cache.read().await;
        Ok(newest_first(
            cache
                .screenings
                .iter()
                .filter(|s| s.child_id == child_id)
                .cloned()
                .collect(),
        ))
    }

    async fn all_screenings(&self) -> Result<Vec<Screening>, DomainError> {
        let cache = self.cache.read().await;
        Ok(newest_first(cache.screenings.clone()))
    }
}
