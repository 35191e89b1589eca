//! Domain entities. Pure data structures for the screening core.
//!
//! No storage or UI types here. Adapters map rows and prompts into these.

use crate::domain::errors::DomainError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Child age band. Selects which fixed question set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0-6m")]
    Infant,
    #[serde(rename = "6-24m")]
    Toddler,
    #[serde(rename = "2-5y")]
    Preschool,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [AgeGroup::Infant, AgeGroup::Toddler, AgeGroup::Preschool];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Infant => "0-6m",
            AgeGroup::Toddler => "6-24m",
            AgeGroup::Preschool => "2-5y",
        }
    }

    /// Band for a child of `months` whole months.
    pub fn for_age_in_months(months: u32) -> Self {
        if months < 6 {
            AgeGroup::Infant
        } else if months < 24 {
            AgeGroup::Toddler
        } else {
            AgeGroup::Preschool
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (AgeGroup::Infant, Language::En) => "0-6 months",
            (AgeGroup::Infant, Language::Sw) => "Miezi 0-6",
            (AgeGroup::Toddler, Language::En) => "6-24 months",
            (AgeGroup::Toddler, Language::Sw) => "Miezi 6-24",
            (AgeGroup::Preschool, Language::En) => "2-5 years",
            (AgeGroup::Preschool, Language::Sw) => "Miaka 2-5",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-6m" => Ok(AgeGroup::Infant),
            "6-24m" => Ok(AgeGroup::Toddler),
            "2-5y" => Ok(AgeGroup::Preschool),
            other => Err(DomainError::InvalidValue {
                field: "age_group",
                value: other.to_string(),
            }),
        }
    }
}

/// Question category within an age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Development,
    Nutrition,
}

impl Category {
    /// Presentation order; also the order of the question sequence.
    pub const ALL: [Category; 3] = [Category::Health, Category::Development, Category::Nutrition];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Development => "development",
            Category::Nutrition => "nutrition",
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Category::Health, Language::En) => "Health",
            (Category::Health, Language::Sw) => "Afya",
            (Category::Development, Language::En) => "Development",
            (Category::Development, Language::Sw) => "Maendeleo",
            (Category::Nutrition, Language::En) => "Nutrition",
            (Category::Nutrition, Language::Sw) => "Lishe",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a single answer or a rollup. Ordered: green < yellow < orange < red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl RiskLevel {
    /// Rollup scan order, highest severity first.
    pub const PRIORITY: [RiskLevel; 4] = [
        RiskLevel::Red,
        RiskLevel::Orange,
        RiskLevel::Yellow,
        RiskLevel::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Yellow => "yellow",
            RiskLevel::Orange => "orange",
            RiskLevel::Red => "red",
        }
    }

    /// Ordinal for sorting and filtering: green 0, yellow 1, orange 2, red 3.
    pub fn value(&self) -> u8 {
        match self {
            RiskLevel::Green => 0,
            RiskLevel::Yellow => 1,
            RiskLevel::Orange => 2,
            RiskLevel::Red => 3,
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (RiskLevel::Green, Language::En) => "Green - no risk",
            (RiskLevel::Green, Language::Sw) => "Kijani - hakuna hatari",
            (RiskLevel::Yellow, Language::En) => "Yellow - mild risk",
            (RiskLevel::Yellow, Language::Sw) => "Njano - hatari kidogo",
            (RiskLevel::Orange, Language::En) => "Orange - moderate risk",
            (RiskLevel::Orange, Language::Sw) => "Machungwa - hatari ya wastani",
            (RiskLevel::Red, Language::En) => "Red - high risk",
            (RiskLevel::Red, Language::Sw) => "Nyekundu - hatari kubwa",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display language for localized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sw,
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "sw" | "swahili" | "kiswahili" => Ok(Language::Sw),
            other => Err(DomainError::InvalidValue {
                field: "language",
                value: other.to_string(),
            }),
        }
    }
}

/// Text in every supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub sw: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, sw: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            sw: sw.into(),
        }
    }

    pub fn resolve(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Sw => &self.sw,
        }
    }
}

/// Answer choices of a question keyed by severity. A question may leave some severities out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityChoices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellow: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orange: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<LocalizedText>,
}

impl SeverityChoices {
    pub fn get(&self, risk: RiskLevel) -> Option<&LocalizedText> {
        match risk {
            RiskLevel::Green => self.green.as_ref(),
            RiskLevel::Yellow => self.yellow.as_ref(),
            RiskLevel::Orange => self.orange.as_ref(),
            RiskLevel::Red => self.red.as_ref(),
        }
    }

    pub fn offers(&self, risk: RiskLevel) -> bool {
        self.get(risk).is_some()
    }

    /// Offered choices from green to red.
    pub fn offered(&self) -> impl Iterator<Item = (RiskLevel, &LocalizedText)> {
        [
            RiskLevel::Green,
            RiskLevel::Yellow,
            RiskLevel::Orange,
            RiskLevel::Red,
        ]
        .into_iter()
        .filter_map(|risk| self.get(risk).map(|text| (risk, text)))
    }
}

/// Follow-up guidance attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    /// Clinical note for the health worker. English only.
    pub chw: String,
    pub parent: LocalizedText,
    pub prevention: LocalizedText,
    pub when_to_refer: LocalizedText,
}

/// A catalog question. Immutable; defined at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub age_group: AgeGroup,
    pub category: Category,
    pub order_index: u32,
    pub text: LocalizedText,
    pub answers: SeverityChoices,
    pub guidance: Guidance,
}

/// Selected severity for exactly one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub category: Category,
    pub selected_risk: RiskLevel,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, category: Category, selected_risk: RiskLevel) -> Self {
        Self {
            question_id: question_id.into(),
            category,
            selected_risk,
        }
    }
}

/// Worst severity per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRisks {
    pub health: RiskLevel,
    pub development: RiskLevel,
    pub nutrition: RiskLevel,
}

impl CategoryRisks {
    pub fn get(&self, category: Category) -> RiskLevel {
        match category {
            Category::Health => self.health,
            Category::Development => self.development,
            Category::Nutrition => self.nutrition,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, RiskLevel)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// Derived classification of a completed screening. Never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskResult {
    pub overall: RiskLevel,
    pub categories: CategoryRisks,
    /// Question ids answered red, in answer order.
    pub red_flags: Vec<String>,
    /// Question ids answered yellow or orange, in answer order.
    pub areas_of_concern: Vec<String>,
}

/// Urgency tier of a recommended action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Routine,
    FollowUp,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub text: LocalizedText,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(DomainError::InvalidValue {
                field: "sex",
                value: other.to_string(),
            }),
        }
    }
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// A registered child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Used when the date of birth is unknown.
    #[serde(default)]
    pub age_in_months: Option<u32>,
    pub sex: Sex,
    pub village: String,
    #[serde(default)]
    pub caregiver_phone: Option<String>,
    #[serde(default)]
    pub caregiver_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub synced: bool,
}

impl Child {
    /// Whole calendar months at `today`. Date of birth wins over the stored age.
    pub fn age_in_months(&self, today: NaiveDate) -> u32 {
        match self.date_of_birth {
            Some(dob) => {
                let months = (today.year() - dob.year()) * 12 + today.month() as i32
                    - dob.month() as i32;
                months.max(0) as u32
            }
            None => self.age_in_months.unwrap_or(0),
        }
    }

    pub fn age_group(&self, today: NaiveDate) -> AgeGroup {
        AgeGroup::for_age_in_months(self.age_in_months(today))
    }
}

/// A screening session aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screening {
    pub id: String,
    pub child_id: String,
    pub age_group: AgeGroup,
    pub answers: Vec<Answer>,
    pub risk_result: Option<RiskResult>,
    pub is_complete: bool,
    pub current_question_index: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub synced: bool,
}

impl Screening {
    /// Fresh, empty, unsynced screening.
    pub fn new(id: impl Into<String>, child_id: impl Into<String>, age_group: AgeGroup) -> Self {
        Self {
            id: id.into(),
            child_id: child_id.into(),
            age_group,
            answers: Vec::new(),
            risk_result: None,
            is_complete: false,
            current_question_index: 0,
            created_at: Utc::now(),
            completed_at: None,
            synced: false,
        }
    }
}

/// Completed screenings per overall severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub green: usize,
    pub yellow: usize,
    pub orange: usize,
    pub red: usize,
}

impl RiskDistribution {
    pub fn record(&mut self, risk: RiskLevel) {
        match risk {
            RiskLevel::Green => self.green += 1,
            RiskLevel::Yellow => self.yellow += 1,
            RiskLevel::Orange => self.orange += 1,
            RiskLevel::Red => self.red += 1,
        }
    }

    pub fn get(&self, risk: RiskLevel) -> usize {
        match risk {
            RiskLevel::Green => self.green,
            RiskLevel::Yellow => self.yellow,
            RiskLevel::Orange => self.orange,
            RiskLevel::Red => self.red,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentScreening {
    pub screening: Screening,
    pub child_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_screenings: usize,
    pub screenings_today: usize,
    pub risk_distribution: RiskDistribution,
    pub pending_referrals: usize,
    pub pending_sync: usize,
    pub recent_screenings: Vec<RecentScreening>,
}
