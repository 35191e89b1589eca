//! Caregiver guidance for a finished screening, and the plain-text message shared with caregivers.

use crate::domain::{
    Category, Language, RiskLevel, RiskResult, Screening, calculate_risk_result,
    recommended_action,
};
use crate::ports::QuestionProvider;
use serde::Serialize;

/// Guidance lines per category, in discovery order, each text at most once overall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedGuidance {
    pub health: Vec<String>,
    pub development: Vec<String>,
    pub nutrition: Vec<String>,
}

impl GroupedGuidance {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Health => &self.health,
            Category::Development => &self.development,
            Category::Nutrition => &self.nutrition,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Health => &mut self.health,
            Category::Development => &mut self.development,
            Category::Nutrition => &mut self.nutrition,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    /// Non-empty categories in health, development, nutrition order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> + '_ {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, items)| !items.is_empty())
    }

    /// Append unless the same text is already present in any category.
    fn push(&mut self, category: Category, text: &str) {
        if text.is_empty() || Category::ALL.iter().any(|c| self.get(*c).iter().any(|t| t == text)) {
            return;
        }
        self.get_mut(category).push(text.to_string());
    }
}

/// Parent guidance for every red flag, then every area of concern.
///
/// With no concerns at all, falls back to the prevention advice of the green-answered questions.
/// Question ids the provider does not know are skipped.
pub fn guidance_for(
    screening: &Screening,
    questions: &dyn QuestionProvider,
    language: Language,
) -> GroupedGuidance {
    let result = screening
        .risk_result
        .clone()
        .unwrap_or_else(|| calculate_risk_result(&screening.answers));

    let mut guidance = GroupedGuidance::default();
    for id in result.red_flags.iter().chain(&result.areas_of_concern) {
        if let Ok(q) = questions.question_by_id(id) {
            guidance.push(q.category, q.guidance.parent.resolve(language));
        }
    }

    if guidance.is_empty() {
        for answer in screening
            .answers
            .iter()
            .filter(|a| a.selected_risk == RiskLevel::Green)
        {
            if let Ok(q) = questions.question_by_id(&answer.question_id) {
                guidance.push(q.category, q.guidance.prevention.resolve(language));
            }
        }
    }
    guidance
}

const ITEMS_PER_CATEGORY: usize = 2;

/// Summary suitable for SMS or WhatsApp.
pub fn share_message(
    child_name: &str,
    result: &RiskResult,
    guidance: &GroupedGuidance,
    language: Language,
) -> String {
    let sw = language == Language::Sw;
    let mut lines = vec![
        format!(
            "TOTO - {}",
            if sw {
                "Matokeo ya Uchunguzi wa Afya ya Mtoto"
            } else {
                "Child Health Screening Result"
            }
        ),
        String::new(),
        format!("{}: {}", if sw { "Mtoto" } else { "Child" }, child_name),
        format!(
            "{}: {}",
            if sw { "Kiwango cha Hatari" } else { "Risk Level" },
            result.overall.label(language)
        ),
        String::new(),
        format!("{}:", if sw { "Mapendekezo" } else { "Recommendations" }),
    ];

    for (category, items) in guidance.iter() {
        lines.push(String::new());
        lines.push(format!("{}:", category.label(language)));
        for item in items.iter().take(ITEMS_PER_CATEGORY) {
            lines.push(format!("• {}", item));
        }
    }

    let action = recommended_action(result.overall);
    lines.push(String::new());
    lines.push(format!(
        "{}: {}",
        if sw { "Hatua Zifuatazo" } else { "Next Steps" },
        action.text.resolve(language)
    ));
    lines.push(String::new());
    lines.push(
        if sw {
            "Wasiliana na Mhudumu wako wa Afya ya Jamii kwa maswali."
        } else {
            "Contact your Community Health Worker for questions."
        }
        .to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::QuestionBank;
    use crate::domain::{AgeGroup, Answer};

    fn screening(answers: Vec<Answer>) -> Screening {
        let mut s = Screening::new("s1", "c1", AgeGroup::Preschool);
        s.risk_result = Some(calculate_risk_result(&answers));
        s.answers = answers;
        s
    }

    #[test]
    fn test_concerns_use_parent_guidance_red_first() {
        let bank = QuestionBank::builtin().unwrap();
        let s = screening(vec![
            Answer::new("q-2-5y-nut-1", Category::Nutrition, RiskLevel::Yellow),
            Answer::new("q-2-5y-health-2", Category::Health, RiskLevel::Red),
            Answer::new("q-2-5y-dev-1", Category::Development, RiskLevel::Green),
        ]);
        let guidance = guidance_for(&s, &bank, Language::En);

        let health = bank.question_by_id("q-2-5y-health-2").unwrap();
        let nutrition = bank.question_by_id("q-2-5y-nut-1").unwrap();
        assert_eq!(guidance.health, vec![health.guidance.parent.en.clone()]);
        assert_eq!(guidance.nutrition, vec![nutrition.guidance.parent.en.clone()]);
        assert!(guidance.development.is_empty());
        assert_eq!(guidance.iter().next().unwrap().0, Category::Health);
    }

    #[test]
    fn test_all_green_falls_back_to_prevention() {
        let bank = QuestionBank::builtin().unwrap();
        let s = screening(vec![
            Answer::new("q-2-5y-health-1", Category::Health, RiskLevel::Green),
            Answer::new("q-2-5y-dev-2", Category::Development, RiskLevel::Green),
        ]);
        let guidance = guidance_for(&s, &bank, Language::Sw);
        let q = bank.question_by_id("q-2-5y-dev-2").unwrap();
        assert_eq!(guidance.development, vec![q.guidance.prevention.sw.clone()]);
        assert_eq!(guidance.len(), 2);
    }

    #[test]
    fn test_duplicate_texts_appear_once() {
        let mut guidance = GroupedGuidance::default();
        guidance.push(Category::Health, "Wash hands");
        guidance.push(Category::Nutrition, "Wash hands");
        guidance.push(Category::Nutrition, "");
        assert_eq!(guidance.len(), 1);
        assert!(guidance.nutrition.is_empty());
    }

    #[test]
    fn test_unknown_questions_are_skipped() {
        let bank = QuestionBank::builtin().unwrap();
        let s = screening(vec![Answer::new(
            "q-retired",
            Category::Health,
            RiskLevel::Orange,
        )]);
        assert!(guidance_for(&s, &bank, Language::En).is_empty());
    }

    #[test]
    fn test_share_message_layout() {
        let mut guidance = GroupedGuidance::default();
        for text in ["one", "two", "three"] {
            guidance.push(Category::Nutrition, text);
        }
        let result = calculate_risk_result(&[Answer::new(
            "q-2-5y-nut-1",
            Category::Nutrition,
            RiskLevel::Orange,
        )]);
        let message = share_message("Amina Hassan", &result, &guidance, Language::En);

        assert!(message.starts_with("TOTO - Child Health Screening Result\n"));
        assert!(message.contains("Child: Amina Hassan"));
        assert!(message.contains(&format!(
            "Risk Level: {}",
            RiskLevel::Orange.label(Language::En)
        )));
        assert!(message.contains("• one\n• two"));
        assert!(!message.contains("three"));
        assert!(message.contains("Next Steps: Refer to health facility within 24-48 hours."));
        assert!(message.ends_with("Contact your Community Health Worker for questions."));
    }

    #[test]
    fn test_share_message_in_swahili() {
        let result = calculate_risk_result(&[]);
        let message = share_message("Juma", &result, &GroupedGuidance::default(), Language::Sw);
        assert!(message.contains("Mtoto: Juma"));
        assert!(message.contains("Hatua Zifuatazo: Endelea na huduma ya kawaida."));
    }
}
