//! Dashboard counters over all stored screenings.

use crate::domain::{DashboardStats, DomainError, RecentScreening, RiskLevel, Screening};
use crate::ports::{ChildRepository, ScreeningRepository};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

/// Counters only; `recent_screenings` is left empty.
///
/// Totals, today and the distribution count completed screenings. Pending sync counts every
/// unsynced screening, finished or not.
pub fn summarize(screenings: &[Screening], today: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for s in screenings {
        if !s.synced {
            stats.pending_sync += 1;
        }
        if !s.is_complete {
            continue;
        }
        stats.total_screenings += 1;
        if s.created_at.date_naive() == today {
            stats.screenings_today += 1;
        }
        if let Some(result) = &s.risk_result {
            stats.risk_distribution.record(result.overall);
            if result.overall >= RiskLevel::Orange {
                stats.pending_referrals += 1;
            }
        }
    }
    stats
}

pub struct DashboardService {
    children: Arc<dyn ChildRepository>,
    screenings: Arc<dyn ScreeningRepository>,
    recent_limit: usize,
}

impl DashboardService {
    pub fn new(
        children: Arc<dyn ChildRepository>,
        screenings: Arc<dyn ScreeningRepository>,
        recent_limit: usize,
    ) -> Self {
        Self {
            children,
            screenings,
            recent_limit,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DomainError> {
        self.stats_on(Utc::now().date_naive()).await
    }

    /// Stats with "today" fixed to the given date. Recent screenings whose child is gone are
    /// left out.
    pub async fn stats_on(&self, today: NaiveDate) -> Result<DashboardStats, DomainError> {
        let all = self.screenings.all_screenings().await?;
        let mut stats = summarize(&all, today);

        let mut completed: Vec<&Screening> = all.iter().filter(|s| s.is_complete).collect();
        completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for s in completed {
            if stats.recent_screenings.len() >= self.recent_limit {
                break;
            }
            if let Some(child) = self.children.get_child(&s.child_id).await? {
                stats.recent_screenings.push(RecentScreening {
                    screening: s.clone(),
                    child_name: child.name,
                });
            }
        }

        debug!(
            total = stats.total_screenings,
            pending_sync = stats.pending_sync,
            "dashboard stats computed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryRepo;
    use crate::domain::{AgeGroup, Answer, Category, Child, Sex, calculate_risk_result};
    use chrono::Duration;

    fn finished(id: &str, child_id: &str, risk: RiskLevel, days_ago: i64) -> Screening {
        let mut s = Screening::new(id, child_id, AgeGroup::Toddler);
        s.answers = vec![Answer::new("q-6-24m-health-1", Category::Health, risk)];
        s.risk_result = Some(calculate_risk_result(&s.answers));
        s.is_complete = true;
        s.created_at = Utc::now() - Duration::days(days_ago);
        s.completed_at = Some(s.created_at);
        s
    }

    fn child(id: &str, name: &str) -> Child {
        Child {
            id: id.into(),
            name: name.into(),
            date_of_birth: None,
            age_in_months: Some(10),
            sex: Sex::Female,
            village: "Ganze".into(),
            caregiver_phone: None,
            caregiver_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            synced: false,
        }
    }

    #[test]
    fn test_summarize_counts() {
        let today = Utc::now().date_naive();
        let mut synced = finished("s3", "c1", RiskLevel::Green, 3);
        synced.synced = true;
        let screenings = vec![
            finished("s1", "c1", RiskLevel::Red, 0),
            finished("s2", "c2", RiskLevel::Orange, 1),
            synced,
            finished("s4", "c2", RiskLevel::Yellow, 0),
            Screening::new("s5", "c1", AgeGroup::Toddler),
        ];
        let stats = summarize(&screenings, today);

        assert_eq!(stats.total_screenings, 4);
        assert_eq!(stats.screenings_today, 2);
        assert_eq!(stats.pending_referrals, 2);
        assert_eq!(stats.pending_sync, 4);
        assert_eq!(stats.risk_distribution.get(RiskLevel::Red), 1);
        assert_eq!(stats.risk_distribution.get(RiskLevel::Green), 1);
        assert!(stats.recent_screenings.is_empty());
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize(&[], Utc::now().date_naive());
        assert_eq!(stats.total_screenings, 0);
        assert_eq!(stats.pending_sync, 0);
    }

    #[tokio::test]
    async fn test_recent_screenings_are_completed_newest_first() {
        let repo = Arc::new(MemoryRepo::new());
        repo.insert_child(&child("c1", "Amina")).await.unwrap();
        repo.insert_child(&child("c2", "Juma")).await.unwrap();
        for (i, days_ago) in [5, 1, 3].into_iter().enumerate() {
            repo.insert_screening(&finished(&format!("s{i}"), "c1", RiskLevel::Green, days_ago))
                .await
                .unwrap();
        }
        repo.insert_screening(&finished("orphan", "gone", RiskLevel::Red, 0))
            .await
            .unwrap();
        repo.insert_screening(&Screening::new("open", "c2", AgeGroup::Toddler))
            .await
            .unwrap();

        let service = DashboardService::new(repo.clone(), repo, 2);
        let stats = service.stats().await.unwrap();

        let ids: Vec<&str> = stats
            .recent_screenings
            .iter()
            .map(|r| r.screening.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!(stats.recent_screenings[0].child_name, "Amina");
        assert_eq!(stats.total_screenings, 4);
        assert_eq!(stats.pending_referrals, 1);
    }
}
