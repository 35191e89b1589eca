//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod risk;

pub use entities::{
    AgeGroup, Answer, Category, CategoryRisks, Child, DashboardStats, Guidance, Language,
    LocalizedText, Question, RecentScreening, RecommendedAction, RiskDistribution, RiskLevel,
    RiskResult, Screening, SeverityChoices, Sex, Urgency,
};
pub use errors::DomainError;
pub use risk::{calculate_risk_result, has_emergency, recommended_action, risk_value, worst_risk};
