//! Child registration, editing and lookup.

use crate::domain::{Child, DomainError, Sex};
use crate::ports::ChildRepository;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Registration form contents. Either a date of birth or an age in months is required.
#[derive(Debug, Clone)]
pub struct NewChild {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age_in_months: Option<u32>,
    pub sex: Sex,
    pub village: String,
    pub caregiver_phone: Option<String>,
    pub caregiver_name: Option<String>,
}

impl NewChild {
    /// Trim and check the form. Blank optional fields become `None`.
    fn validated(self, today: NaiveDate) -> Result<NewChild, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid("name", &self.name));
        }
        let village = self.village.trim().to_string();
        if village.is_empty() {
            return Err(invalid("village", &self.village));
        }
        match (self.date_of_birth, self.age_in_months) {
            (None, None) => return Err(invalid("age", "")),
            (Some(dob), _) if dob > today => return Err(invalid("date_of_birth", &dob.to_string())),
            _ => {}
        }

        let caregiver_phone = match non_blank(self.caregiver_phone) {
            Some(phone) => {
                let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
                if !is_valid_phone(&digits) {
                    return Err(invalid("caregiver_phone", &phone));
                }
                Some(digits)
            }
            None => None,
        };

        Ok(NewChild {
            name,
            village,
            caregiver_phone,
            caregiver_name: non_blank(self.caregiver_name),
            ..self
        })
    }
}

fn invalid(field: &'static str, value: &str) -> DomainError {
    DomainError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional leading `+`, then 10 to 13 digits.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (10..=13).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub struct ChildService {
    children: Arc<dyn ChildRepository>,
}

impl ChildService {
    pub fn new(children: Arc<dyn ChildRepository>) -> Self {
        Self { children }
    }

    /// Validate and store a new child. Returns the stored record.
    pub async fn register(&self, form: NewChild) -> Result<Child, DomainError> {
        let now = Utc::now();
        let form = form.validated(now.date_naive())?;
        let child = Child {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            date_of_birth: form.date_of_birth,
            age_in_months: form.age_in_months,
            sex: form.sex,
            village: form.village,
            caregiver_phone: form.caregiver_phone,
            caregiver_name: form.caregiver_name,
            created_at: now,
            updated_at: now,
            synced: false,
        };
        self.children.insert_child(&child).await?;
        info!(child_id = %child.id, village = %child.village, "child registered");
        Ok(child)
    }

    /// Replace a child's details. Keeps the id and creation time; marks the record unsynced.
    pub async fn update(&self, id: &str, form: NewChild) -> Result<Child, DomainError> {
        let existing = self.get(id).await?;
        let now = Utc::now();
        let form = form.validated(now.date_naive())?;
        let child = Child {
            name: form.name,
            date_of_birth: form.date_of_birth,
            age_in_months: form.age_in_months,
            sex: form.sex,
            village: form.village,
            caregiver_phone: form.caregiver_phone,
            caregiver_name: form.caregiver_name,
            updated_at: now,
            synced: false,
            ..existing
        };
        self.children.update_child(&child).await?;
        info!(child_id = %child.id, "child updated");
        Ok(child)
    }

    pub async fn get(&self, id: &str) -> Result<Child, DomainError> {
        self.children
            .get_child(id)
            .await?
            .ok_or_else(|| DomainError::child_not_found(id))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Child>, DomainError> {
        self.children.search_children(query.trim()).await
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<Child>, DomainError> {
        self.children.recent_children(limit).await
    }
}
