//! Screening history: every stored screening with its child, filterable by name and overall risk.

use crate::domain::{DomainError, RiskLevel, Screening};
use crate::ports::{ChildRepository, ScreeningRepository};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One history row. `child_name` is `None` when the child record is gone.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub screening: Screening,
    pub child_name: Option<String>,
}

impl HistoryEntry {
    /// Completion time, or creation time for unfinished screenings.
    pub fn when(&self) -> DateTime<Utc> {
        self.screening
            .completed_at
            .unwrap_or(self.screening.created_at)
    }

    pub fn overall(&self) -> Option<RiskLevel> {
        self.screening.risk_result.as_ref().map(|r| r.overall)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the child's name. Blank matches everything.
    pub name: String,
    /// Only screenings whose overall result is this level. Unfinished screenings have no result
    /// and never match a risk filter.
    pub risk: Option<RiskLevel>,
}

impl HistoryFilter {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        let query = self.name.trim().to_lowercase();
        if !query.is_empty() {
            let Some(name) = &entry.child_name else {
                return false;
            };
            if !name.to_lowercase().contains(&query) {
                return false;
            }
        }
        match self.risk {
            Some(risk) => entry.overall() == Some(risk),
            None => true,
        }
    }
}

/// Where a child stands, for the child picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    NotScreened,
    InProgress { answered: usize },
    Screened { overall: RiskLevel, on: DateTime<Utc> },
}

pub struct HistoryService {
    children: Arc<dyn ChildRepository>,
    screenings: Arc<dyn ScreeningRepository>,
}

impl HistoryService {
    pub fn new(
        children: Arc<dyn ChildRepository>,
        screenings: Arc<dyn ScreeningRepository>,
    ) -> Self {
        Self {
            children,
            screenings,
        }
    }

    /// Matching screenings, newest first by completion (or creation) time.
    pub async fn list(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, DomainError> {
        let all = self.screenings.all_screenings().await?;
        let mut names: HashMap<String, Option<String>> = HashMap::new();
        let mut entries = Vec::with_capacity(all.len());
        for screening in all {
            let child_name = match names.get(&screening.child_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .children
                        .get_child(&screening.child_id)
                        .await?
                        .map(|c| c.name);
                    names.insert(screening.child_id.clone(), name.clone());
                    name
                }
            };
            let entry = HistoryEntry {
                screening,
                child_name,
            };
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| b.when().cmp(&a.when()));
        debug!(count = entries.len(), risk = ?filter.risk, "history listed");
        Ok(entries)
    }

    /// An unfinished screening wins over older completed ones, since that is what a visit resumes.
    pub async fn status(&self, child_id: &str) -> Result<ChildStatus, DomainError> {
        let screenings = self.screenings.screenings_for_child(child_id).await?;
        if let Some(open) = screenings.iter().find(|s| !s.is_complete) {
            return Ok(ChildStatus::InProgress {
                answered: open.answers.len(),
            });
        }
        let latest = screenings
            .iter()
            .filter_map(|s| {
                let result = s.risk_result.as_ref()?;
                Some((s.completed_at.unwrap_or(s.created_at), result.overall))
            })
            .max_by_key(|(on, _)| *on);
        Ok(match latest {
            Some((on, overall)) => ChildStatus::Screened { overall, on },
            None => ChildStatus::NotScreened,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryRepo;
    use crate::domain::{AgeGroup, Answer, Category, Child, Sex, calculate_risk_result};
    use chrono::Duration;

    fn child(id: &str, name: &str) -> Child {
        Child {
            id: id.into(),
            name: name.into(),
            date_of_birth: None,
            age_in_months: Some(10),
            sex: Sex::Male,
            village: "Kilifi".into(),
            caregiver_phone: None,
            caregiver_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            synced: false,
        }
    }

    fn finished(id: &str, child_id: &str, risk: RiskLevel, days_ago: i64) -> Screening {
        let mut s = Screening::new(id, child_id, AgeGroup::Toddler);
        s.answers = vec![Answer::new("q-6-24m-health-1", Category::Health, risk)];
        s.risk_result = Some(calculate_risk_result(&s.answers));
        s.is_complete = true;
        s.created_at = Utc::now() - Duration::days(days_ago + 1);
        s.completed_at = Some(Utc::now() - Duration::days(days_ago));
        s
    }

    async fn seeded() -> (Arc<MemoryRepo>, HistoryService) {
        let repo = Arc::new(MemoryRepo::new());
        repo.insert_child(&child("c1", "Amina Wanjiru")).await.unwrap();
        repo.insert_child(&child("c2", "Juma Otieno")).await.unwrap();
        repo.insert_screening(&finished("s1", "c1", RiskLevel::Red, 4))
            .await
            .unwrap();
        repo.insert_screening(&finished("s2", "c2", RiskLevel::Green, 1))
            .await
            .unwrap();
        repo.insert_screening(&finished("s3", "c1", RiskLevel::Green, 2))
            .await
            .unwrap();
        repo.insert_screening(&finished("orphan", "gone", RiskLevel::Red, 0))
            .await
            .unwrap();
        let service = HistoryService::new(repo.clone(), repo.clone());
        (repo, service)
    }

    fn ids(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.screening.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_newest_first_with_names() {
        let (_repo, service) = seeded().await;
        let all = service.list(&HistoryFilter::default()).await.unwrap();

        assert_eq!(ids(&all), vec!["orphan", "s2", "s3", "s1"]);
        assert_eq!(all[0].child_name, None);
        assert_eq!(all[1].child_name.as_deref(), Some("Juma Otieno"));
    }

    #[tokio::test]
    async fn test_list_filters_by_risk_and_name() {
        let (repo, service) = seeded().await;
        repo.insert_screening(&Screening::new("open", "c1", AgeGroup::Toddler))
            .await
            .unwrap();

        let green = HistoryFilter {
            risk: Some(RiskLevel::Green),
            ..Default::default()
        };
        assert_eq!(ids(&service.list(&green).await.unwrap()), vec!["s2", "s3"]);

        let amina = HistoryFilter {
            name: "  amina ".into(),
            risk: None,
        };
        assert_eq!(
            ids(&service.list(&amina).await.unwrap()),
            vec!["open", "s3", "s1"]
        );

        let amina_red = HistoryFilter {
            name: "AMINA".into(),
            risk: Some(RiskLevel::Red),
        };
        assert_eq!(ids(&service.list(&amina_red).await.unwrap()), vec!["s1"]);
    }

    #[tokio::test]
    async fn test_status_reports_latest() {
        let (repo, service) = seeded().await;
        repo.insert_child(&child("c3", "Baraka")).await.unwrap();

        assert_eq!(service.status("c3").await.unwrap(), ChildStatus::NotScreened);
        assert!(matches!(
            service.status("c1").await.unwrap(),
            ChildStatus::Screened {
                overall: RiskLevel::Green,
                ..
            }
        ));

        let mut open = Screening::new("open", "c1", AgeGroup::Toddler);
        open.answers = vec![Answer::new("q-6-24m-health-1", Category::Health, RiskLevel::Yellow)];
        repo.insert_screening(&open).await.unwrap();
        assert_eq!(
            service.status("c1").await.unwrap(),
            ChildStatus::InProgress { answered: 1 }
        );
    }
}
