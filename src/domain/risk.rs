//! Risk classification: category-based severity rollup.
//!
//! Pure functions. Worst severity per category, then worst category is the overall result.

use crate::domain::entities::{
    Answer, Category, CategoryRisks, LocalizedText, RecommendedAction, RiskLevel, RiskResult,
    Urgency,
};

/// Highest severity present in `risks`. An empty set rolls up to green.
pub fn worst_risk<I>(risks: I) -> RiskLevel
where
    I: IntoIterator<Item = RiskLevel>,
{
    let present: Vec<RiskLevel> = risks.into_iter().collect();
    RiskLevel::PRIORITY
        .into_iter()
        .find(|level| present.contains(level))
        .unwrap_or(RiskLevel::Green)
}

fn category_risk(answers: &[Answer], category: Category) -> RiskLevel {
    worst_risk(
        answers
            .iter()
            .filter(|a| a.category == category)
            .map(|a| a.selected_risk),
    )
}

/// Classify a full answer set.
///
/// Unanswered categories count as green; nothing answered yields an all-green result.
pub fn calculate_risk_result(answers: &[Answer]) -> RiskResult {
    let categories = CategoryRisks {
        health: category_risk(answers, Category::Health),
        development: category_risk(answers, Category::Development),
        nutrition: category_risk(answers, Category::Nutrition),
    };
    let overall = worst_risk(categories.iter().map(|(_, risk)| risk));

    let red_flags = answers
        .iter()
        .filter(|a| a.selected_risk == RiskLevel::Red)
        .map(|a| a.question_id.clone())
        .collect();

    let areas_of_concern = answers
        .iter()
        .filter(|a| matches!(a.selected_risk, RiskLevel::Yellow | RiskLevel::Orange))
        .map(|a| a.question_id.clone())
        .collect();

    RiskResult {
        overall,
        categories,
        red_flags,
        areas_of_concern,
    }
}

/// Next step for a child at the given overall severity.
pub fn recommended_action(risk: RiskLevel) -> RecommendedAction {
    match risk {
        RiskLevel::Green => RecommendedAction {
            text: LocalizedText::new(
                "Continue routine care. Schedule next screening in 1 month.",
                "Endelea na huduma ya kawaida. Panga uchunguzi ujao baada ya mwezi 1.",
            ),
            urgency: Urgency::Routine,
        },
        RiskLevel::Yellow => RecommendedAction {
            text: LocalizedText::new(
                "Provide coaching. Follow up in 2 weeks.",
                "Toa ushauri. Fuatilia baada ya wiki 2.",
            ),
            urgency: Urgency::FollowUp,
        },
        RiskLevel::Orange => RecommendedAction {
            text: LocalizedText::new(
                "Refer to health facility within 24-48 hours.",
                "Peleka kituo cha afya ndani ya saa 24-48.",
            ),
            urgency: Urgency::Urgent,
        },
        RiskLevel::Red => RecommendedAction {
            text: LocalizedText::new(
                "EMERGENCY: Take to health facility immediately.",
                "DHARURA: Peleka kituo cha afya mara moja.",
            ),
            urgency: Urgency::Emergency,
        },
    }
}

/// True if any answer is red.
pub fn has_emergency(answers: &[Answer]) -> bool {
    answers.iter().any(|a| a.selected_risk == RiskLevel::Red)
}

/// Ordinal used by dashboards and filters.
pub fn risk_value(risk: RiskLevel) -> u8 {
    risk.value()
}
