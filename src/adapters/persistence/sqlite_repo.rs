//! SQLite-backed store via libsql. Implements ChildRepository and ScreeningRepository.
//!
//! Two tables: `children` and `screenings`. Answers and the risk result are JSON columns.
//! All data shares one database file: data/toto.db

use crate::domain::{AgeGroup, Answer, Child, DomainError, RiskResult, Screening, Sex};
use crate::ports::{ChildRepository, ScreeningRepository};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use libsql::{Connection, Database, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CHILDREN_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS children (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    date_of_birth TEXT,
    age_in_months INTEGER,
    sex TEXT NOT NULL,
    village TEXT NOT NULL,
    caregiver_phone TEXT,
    caregiver_name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0
)"#;

const SCREENINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS screenings (
    id TEXT PRIMARY KEY NOT NULL,
    child_id TEXT NOT NULL REFERENCES children(id),
    age_group TEXT NOT NULL,
    answers TEXT NOT NULL,
    risk_result TEXT,
    is_complete INTEGER NOT NULL DEFAULT 0,
    current_question_index INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    completed_at TEXT,
    synced INTEGER NOT NULL DEFAULT 0
)"#;

const SCREENINGS_CHILD_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_screenings_child_id ON screenings (child_id)";
const SCREENINGS_CREATED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_screenings_created_at ON screenings (created_at DESC)";

const CHILD_COLUMNS: &str = "id, name, date_of_birth, age_in_months, sex, village, \
     caregiver_phone, caregiver_name, created_at, updated_at, synced";
const SCREENING_COLUMNS: &str = "id, child_id, age_group, answers, risk_result, is_complete, \
     current_question_index, created_at, completed_at, synced";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// SQLite store. One database file (toto.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the returned repo is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("toto.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row; consume it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Repo(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(repo_err)?.is_some() {}

        for ddl in [
            CHILDREN_TABLE,
            SCREENINGS_TABLE,
            SCREENINGS_CHILD_INDEX,
            SCREENINGS_CREATED_INDEX,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    fn row_to_child(row: &Row) -> Result<Child, DomainError> {
        let date_of_birth = row
            .get::<String>(2)
            .ok()
            .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
            .transpose()
            .map_err(repo_err)?;
        let sex: String = row.get(4).map_err(repo_err)?;
        Ok(Child {
            id: row.get(0).map_err(repo_err)?,
            name: row.get(1).map_err(repo_err)?,
            date_of_birth,
            age_in_months: row.get::<i64>(3).ok().map(|m| m.max(0) as u32),
            sex: sex.parse::<Sex>()?,
            village: row.get(5).map_err(repo_err)?,
            caregiver_phone: row.get::<String>(6).ok(),
            caregiver_name: row.get::<String>(7).ok(),
            created_at: parse_timestamp(&row.get::<String>(8).map_err(repo_err)?)?,
            updated_at: parse_timestamp(&row.get::<String>(9).map_err(repo_err)?)?,
            synced: row.get::<i64>(10).map_err(repo_err)? != 0,
        })
    }

    fn row_to_screening(row: &Row) -> Result<Screening, DomainError> {
        let age_group: String = row.get(2).map_err(repo_err)?;
        let answers_json: String = row.get(3).map_err(repo_err)?;
        let answers: Vec<Answer> = serde_json::from_str(&answers_json).map_err(repo_err)?;
        let risk_result = row
            .get::<String>(4)
            .ok()
            .map(|s| serde_json::from_str::<RiskResult>(&s))
            .transpose()
            .map_err(repo_err)?;
        let completed_at = row
            .get::<String>(8)
            .ok()
            .map(|s| parse_timestamp(&s))
            .transpose()?;
        Ok(Screening {
            id: row.get(0).map_err(repo_err)?,
            child_id: row.get(1).map_err(repo_err)?,
            age_group: age_group.parse::<AgeGroup>()?,
            answers,
            risk_result,
            is_complete: row.get::<i64>(5).map_err(repo_err)? != 0,
            current_question_index: row.get::<i64>(6).map_err(repo_err)?.max(0) as usize,
            created_at: parse_timestamp(&row.get::<String>(7).map_err(repo_err)?)?,
            completed_at,
            synced: row.get::<i64>(9).map_err(repo_err)? != 0,
        })
    }

    async fn query_children(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Child>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn.query(sql, params).await.map_err(repo_err)?;
        let mut children = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            children.push(Self::row_to_child(&row)?);
        }
        Ok(children)
    }

    async fn query_screenings(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Screening>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn.query(sql, params).await.map_err(repo_err)?;
        let mut screenings = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            screenings.push(Self::row_to_screening(&row)?);
        }
        Ok(screenings)
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Repo(format!("bad timestamp {:?}: {}", s, e)))
}

fn risk_result_json(screening: &Screening) -> Result<Option<String>, DomainError> {
    screening
        .risk_result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(repo_err)
}

#[async_trait::async_trait]
impl ChildRepository for SqliteRepo {
    async fn insert_child(&self, child: &Child) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO children (id, name, date_of_birth, age_in_months, sex, village,
                caregiver_phone, caregiver_name, created_at, updated_at, synced)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                child.id.as_str(),
                child.name.as_str(),
                child.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
                child.age_in_months.map(i64::from),
                child.sex.as_str(),
                child.village.as_str(),
                child.caregiver_phone.clone(),
                child.caregiver_name.clone(),
                timestamp(&child.created_at),
                timestamp(&child.updated_at),
                child.synced as i64
            ],
        )
        .await
        .map_err(repo_err)?;
        debug!(child_id = %child.id, "child inserted");
        Ok(())
    }

    async fn update_child(&self, child: &Child) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE children SET name = ?2, date_of_birth = ?3, age_in_months = ?4, sex = ?5,
                    village = ?6, caregiver_phone = ?7, caregiver_name = ?8, updated_at = ?9,
                    synced = ?10
                WHERE id = ?1
                "#,
                params![
                    child.id.as_str(),
                    child.name.as_str(),
                    child.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
                    child.age_in_months.map(i64::from),
                    child.sex.as_str(),
                    child.village.as_str(),
                    child.caregiver_phone.clone(),
                    child.caregiver_name.clone(),
                    timestamp(&child.updated_at),
                    child.synced as i64
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::child_not_found(&child.id));
        }
        Ok(())
    }

    async fn get_child(&self, id: &str) -> Result<Option<Child>, DomainError> {
        let sql = format!("SELECT {CHILD_COLUMNS} FROM children WHERE id = ?1");
        Ok(self.query_children(&sql, params![id]).await?.into_iter().next())
    }

    /// Matched in Rust rather than with LIKE: SQLite folds case for ASCII only and treats `%`
    /// and `_` in the query as wildcards.
    async fn search_children(&self, query: &str) -> Result<Vec<Child>, DomainError> {
        let needle = query.to_lowercase();
        let sql = format!("SELECT {CHILD_COLUMNS} FROM children ORDER BY name");
        let mut found = self.query_children(&sql, ()).await?;
        found.retain(|c| c.name.to_lowercase().contains(&needle));
        Ok(found)
    }

    async fn recent_children(&self, limit: usize) -> Result<Vec<Child>, DomainError> {
        let sql =
            format!("SELECT {CHILD_COLUMNS} FROM children ORDER BY updated_at DESC LIMIT ?1");
        self.query_children(&sql, params![limit as i64]).await
    }
}

#[async_trait::async_trait]
impl ScreeningRepository for SqliteRepo {
    async fn insert_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        let answers = serde_json::to_string(&screening.answers).map_err(repo_err)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO screenings (id, child_id, age_group, answers, risk_result, is_complete,
                current_question_index, created_at, completed_at, synced)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                screening.id.as_str(),
                screening.child_id.as_str(),
                screening.age_group.as_str(),
                answers,
                risk_result_json(screening)?,
                screening.is_complete as i64,
                screening.current_question_index as i64,
                timestamp(&screening.created_at),
                screening.completed_at.as_ref().map(timestamp),
                screening.synced as i64
            ],
        )
        .await
        .map_err(repo_err)?;
        debug!(screening_id = %screening.id, "screening inserted");
        Ok(())
    }

    async fn update_screening(&self, screening: &Screening) -> Result<(), DomainError> {
        let answers = serde_json::to_string(&screening.answers).map_err(repo_err)?;
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE screenings SET answers = ?2, risk_result = ?3, is_complete = ?4,
                    current_question_index = ?5, completed_at = ?6, synced = ?7
                WHERE id = ?1
                "#,
                params![
                    screening.id.as_str(),
                    answers,
                    risk_result_json(screening)?,
                    screening.is_complete as i64,
                    screening.current_question_index as i64,
                    screening.completed_at.as_ref().map(timestamp),
                    screening.synced as i64
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::screening_not_found(&screening.id));
        }
        Ok(())
    }

    async fn get_screening(&self, id: &str) -> Result<Option<Screening>, DomainError> {
        let sql = format!("SELECT {SCREENING_COLUMNS} FROM screenings WHERE id = ?1");
        Ok(self
            .query_screenings(&sql, params![id])
            .await?
            .into_iter()
            .next())
    }

    async fn get_incomplete_screening(
        &self,
        child_id: &str,
    ) -> Result<Option<Screening>, DomainError> {
        let sql = format!(
            "SELECT {SCREENING_COLUMNS} FROM screenings \
             WHERE child_id = ?1 AND is_complete = 0 ORDER BY created_at DESC LIMIT 1"
        );
        Ok(self
            .query_screenings(&sql, params![child_id])
            .await?
            .into_iter()
            .next())
    }

    async fn screenings_for_child(&self, child_id: &str) -> Result<Vec<Screening>, DomainError> {
        let sql = format!(
            "SELECT {SCREENING_COLUMNS} FROM screenings WHERE child_id = ?1 ORDER BY created_at DESC"
        );
        self.query_screenings(&sql, params![child_id]).await
    }

    async fn all_screenings(&self) -> Result<Vec<Screening>, DomainError> {
        let sql = format!("SELECT {SCREENING_COLUMNS} FROM screenings ORDER BY created_at DESC");
        self.query_screenings(&sql, ()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, RiskLevel, calculate_risk_result};

    fn child(id: &str, name: &str) -> Child {
        Child {
            id: id.into(),
            name: name.into(),
            date_of_birth: NaiveDate::from_ymd_opt(2024, 1, 15),
            age_in_months: None,
            sex: Sex::Male,
            village: "Rabai".into(),
            caregiver_phone: None,
            caregiver_name: Some("Mary".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            synced: true,
        }
    }

    #[tokio::test]
    async fn test_child_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let c = child("c1", "John Mwangi");
        repo.insert_child(&c).await.unwrap();

        let loaded = repo.get_child("c1").await.unwrap().unwrap();
        assert_eq!(loaded.name, c.name);
        assert_eq!(loaded.date_of_birth, c.date_of_birth);
        assert_eq!(loaded.caregiver_name.as_deref(), Some("Mary"));
        assert!(loaded.caregiver_phone.is_none());
        assert!(loaded.synced);

        assert_eq!(repo.search_children("mwan").await.unwrap().len(), 1);
        assert!(repo.get_child("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_is_literal_and_unicode_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        repo.insert_child(&child("c1", "Zawadi Achieng")).await.unwrap();
        repo.insert_child(&child("c2", "Ana_Maria")).await.unwrap();
        repo.insert_child(&child("c3", "ÉLODIE Njeri")).await.unwrap();

        assert!(repo.search_children("%").await.unwrap().is_empty());
        let underscore = repo.search_children("_").await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].id, "c2");
        let accented = repo.search_children("élodie").await.unwrap();
        assert_eq!(accented.len(), 1);
        assert_eq!(accented[0].id, "c3");

        let names: Vec<String> = repo
            .search_children("")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ana_Maria", "Zawadi Achieng", "ÉLODIE Njeri"]);
    }

    #[tokio::test]
    async fn test_screening_update_and_resume_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        repo.insert_child(&child("c1", "John Mwangi")).await.unwrap();

        let mut screening = Screening::new("s1", "c1", AgeGroup::Preschool);
        repo.insert_screening(&screening).await.unwrap();
        assert_eq!(
            repo.get_incomplete_screening("c1").await.unwrap().unwrap().id,
            "s1"
        );

        screening
            .answers
            .push(Answer::new("q-2-5y-health-1", Category::Health, RiskLevel::Red));
        screening.risk_result = Some(calculate_risk_result(&screening.answers));
        screening.is_complete = true;
        screening.completed_at = Some(Utc::now());
        repo.update_screening(&screening).await.unwrap();

        let loaded = repo.get_screening("s1").await.unwrap().unwrap();
        assert!(loaded.is_complete);
        assert_eq!(loaded.answers, screening.answers);
        assert_eq!(loaded.risk_result, screening.risk_result);
        assert!(repo.get_incomplete_screening("c1").await.unwrap().is_none());
        assert_eq!(repo.all_screenings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_screening_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let ghost = Screening::new("ghost", "c1", AgeGroup::Infant);
        assert!(matches!(
            repo.update_screening(&ghost).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
