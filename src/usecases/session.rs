//! Screening session state machine: answer capture, navigation, completion.
//!
//! States: unbound -> in progress -> complete. No transition leaves complete.
//! Pure in-memory; persistence is the caller's concern (see `ScreeningService`).

use crate::domain::{Answer, Category, Child, DomainError, Question, RiskLevel, RiskResult, Screening};
use crate::ports::QuestionProvider;
use chrono::Utc;
use serde::Serialize;

/// Answer counters for the bound screening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent. 0 when there are no questions.
    pub percentage: u32,
}

impl Progress {
    fn new(answered: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (answered as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            answered,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered >= self.total
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    screening: Screening,
    child: Child,
    /// Category of each question position, in presentation order.
    layout: Vec<Category>,
    /// Questions to answer before completion.
    total: usize,
    cursor: usize,
    category: Category,
}

impl ActiveSession {
    fn move_to(&mut self, index: usize) {
        self.cursor = index;
        self.screening.current_question_index = index;
        if let Some(category) = self.layout.get(index) {
            self.category = *category;
        }
    }
}

/// One screening being worked on. Owned by the controller driving the flow.
#[derive(Debug, Clone, Default)]
pub struct ScreeningSession {
    active: Option<ActiveSession>,
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a screening and its child, replacing any previous state.
    ///
    /// The cursor resumes at the persisted index (clamped to the question range) and the
    /// active category starts at health.
    pub fn init(&mut self, screening: Screening, child: Child, questions: &dyn QuestionProvider) {
        let layout: Vec<Category> = questions
            .questions_for_age_group(screening.age_group)
            .iter()
            .map(|q| q.category)
            .collect();
        let total = questions.question_count(screening.age_group);
        let cursor = screening
            .current_question_index
            .min(layout.len().saturating_sub(1));
        self.active = Some(ActiveSession {
            screening,
            child,
            layout,
            total,
            cursor,
            category: Category::Health,
        });
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn screening(&self) -> Option<&Screening> {
        self.active.as_ref().map(|s| &s.screening)
    }

    pub fn child(&self) -> Option<&Child> {
        self.active.as_ref().map(|s| &s.child)
    }

    pub fn current_index(&self) -> usize {
        self.active.as_ref().map(|s| s.cursor).unwrap_or(0)
    }

    pub fn current_category(&self) -> Category {
        self.active
            .as_ref()
            .map(|s| s.category)
            .unwrap_or(Category::Health)
    }

    /// The question under the cursor.
    pub fn current_question<'a>(&self, questions: &'a dyn QuestionProvider) -> Option<&'a Question> {
        let active = self.active.as_ref()?;
        questions
            .questions_for_age_group(active.screening.age_group)
            .get(active.cursor)
            .copied()
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession, DomainError> {
        self.active.as_mut().ok_or(DomainError::NoActiveSession)
    }

    fn in_progress_mut(&mut self) -> Result<&mut ActiveSession, DomainError> {
        let active = self.active_mut()?;
        if active.screening.is_complete {
            return Err(DomainError::AlreadyComplete(active.screening.id.clone()));
        }
        Ok(active)
    }

    /// Record a severity for a question. Re-answering replaces in place; new answers append.
    pub fn set_answer(
        &mut self,
        question_id: &str,
        category: Category,
        risk: RiskLevel,
    ) -> Result<(), DomainError> {
        let active = self.in_progress_mut()?;
        let answer = Answer::new(question_id, category, risk);
        match active
            .screening
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        {
            Some(existing) => *existing = answer,
            None => active.screening.answers.push(answer),
        }
        Ok(())
    }

    pub fn get_answer(&self, question_id: &str) -> Option<&Answer> {
        self.active
            .as_ref()?
            .screening
            .answers
            .iter()
            .find(|a| a.question_id == question_id)
    }

    /// Advance one question. Stays put on the last question. Returns the cursor.
    pub fn go_to_next(&mut self) -> Result<usize, DomainError> {
        let active = self.active_mut()?;
        if active.cursor + 1 < active.layout.len() {
            let next = active.cursor + 1;
            active.move_to(next);
        }
        Ok(active.cursor)
    }

    /// Step back one question. Stays put on the first question. Returns the cursor.
    pub fn go_to_previous(&mut self) -> Result<usize, DomainError> {
        let active = self.active_mut()?;
        if active.cursor > 0 {
            let previous = active.cursor - 1;
            active.move_to(previous);
        }
        Ok(active.cursor)
    }

    /// Jump to the first question of a category. Returns the cursor.
    pub fn set_category(&mut self, category: Category) -> Result<usize, DomainError> {
        let active = self.active_mut()?;
        let index = active
            .layout
            .iter()
            .position(|c| *c == category)
            .ok_or(DomainError::EmptyCategory(category))?;
        active.move_to(index);
        active.category = category;
        Ok(index)
    }

    pub fn progress(&self) -> Progress {
        match &self.active {
            Some(active) => Progress::new(active.screening.answers.len(), active.total),
            None => Progress::default(),
        }
    }

    pub fn red_flag_count(&self) -> usize {
        self.screening()
            .map(|s| {
                s.answers
                    .iter()
                    .filter(|a| a.selected_risk == RiskLevel::Red)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Attach the final result and stamp completion. Irreversible.
    ///
    /// Rejects completion while any question is unanswered.
    pub fn complete(&mut self, risk_result: RiskResult) -> Result<&Screening, DomainError> {
        let progress = self.progress();
        let active = self.in_progress_mut()?;
        if !progress.is_complete() {
            return Err(DomainError::IncompleteScreening {
                answered: progress.answered,
                total: progress.total,
            });
        }
        active.screening.risk_result = Some(risk_result);
        active.screening.is_complete = true;
        active.screening.completed_at = Some(Utc::now());
        Ok(&active.screening)
    }

    /// Drop all session state.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::QuestionBank;
    use crate::domain::{AgeGroup, Sex, calculate_risk_result};

    fn child() -> Child {
        Child {
            id: "child-001".into(),
            name: "Amina Hassan".into(),
            date_of_birth: None,
            age_in_months: Some(8),
            sex: Sex::Female,
            village: "Kaloleni".into(),
            caregiver_phone: None,
            caregiver_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            synced: false,
        }
    }

    fn bound(bank: &QuestionBank) -> ScreeningSession {
        let mut session = ScreeningSession::new();
        let screening = Screening::new("s-1", "child-001", AgeGroup::Toddler);
        session.init(screening, child(), bank);
        session
    }

    fn answer_all(session: &mut ScreeningSession, bank: &QuestionBank) {
        for q in bank.questions_for_age_group(AgeGroup::Toddler) {
            session.set_answer(&q.id, q.category, RiskLevel::Green).unwrap();
        }
    }

    #[test]
    fn test_unbound_session_rejects_operations() {
        let mut session = ScreeningSession::new();
        assert!(matches!(
            session.set_answer("q", Category::Health, RiskLevel::Red),
            Err(DomainError::NoActiveSession)
        ));
        assert!(matches!(session.go_to_next(), Err(DomainError::NoActiveSession)));
        assert!(matches!(
            session.set_category(Category::Nutrition),
            Err(DomainError::NoActiveSession)
        ));
        assert_eq!(session.progress(), Progress::default());
        assert!(session.get_answer("q").is_none());
    }

    #[test]
    fn test_reanswer_replaces_in_place() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        session
            .set_answer("q-6-24m-health-1", Category::Health, RiskLevel::Yellow)
            .unwrap();
        session
            .set_answer("q-6-24m-health-2", Category::Health, RiskLevel::Green)
            .unwrap();
        session
            .set_answer("q-6-24m-health-1", Category::Health, RiskLevel::Red)
            .unwrap();

        let answers = &session.screening().unwrap().answers;
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_id, "q-6-24m-health-1");
        assert_eq!(answers[0].selected_risk, RiskLevel::Red);
        assert_eq!(session.progress().answered, 2);
        assert_eq!(session.red_flag_count(), 1);
    }

    #[test]
    fn test_progress_counts_distinct_questions() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        for risk in [RiskLevel::Green, RiskLevel::Orange, RiskLevel::Yellow] {
            session
                .set_answer("q-6-24m-dev-3", Category::Development, risk)
                .unwrap();
        }
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.total, 15);
        assert_eq!(progress.percentage, 7);
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        assert_eq!(session.go_to_previous().unwrap(), 0);
        assert_eq!(session.current_category(), Category::Health);

        for _ in 0..20 {
            session.go_to_next().unwrap();
        }
        assert_eq!(session.current_index(), 14);
        assert_eq!(session.go_to_next().unwrap(), 14);
        assert_eq!(session.current_category(), Category::Nutrition);
        assert_eq!(session.screening().unwrap().current_question_index, 14);
    }

    #[test]
    fn test_crossing_boundary_updates_category() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        for _ in 0..4 {
            session.go_to_next().unwrap();
        }
        assert_eq!(session.current_category(), Category::Health);
        session.go_to_next().unwrap();
        assert_eq!(session.current_index(), 5);
        assert_eq!(session.current_category(), Category::Development);
        session.go_to_previous().unwrap();
        assert_eq!(session.current_category(), Category::Health);
        assert_eq!(
            session.current_question(&bank).unwrap().id,
            "q-6-24m-health-5"
        );
    }

    #[test]
    fn test_set_category_jumps_to_first_question() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        assert_eq!(session.set_category(Category::Nutrition).unwrap(), 10);
        assert_eq!(session.current_category(), Category::Nutrition);
        assert_eq!(session.set_category(Category::Development).unwrap(), 5);
        assert_eq!(session.set_category(Category::Health).unwrap(), 0);
        assert_eq!(session.screening().unwrap().current_question_index, 0);
    }

    #[test]
    fn test_init_resumes_cursor_and_replaces_state() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        session
            .set_answer("q-6-24m-health-1", Category::Health, RiskLevel::Green)
            .unwrap();

        let mut resumed = Screening::new("s-2", "child-001", AgeGroup::Toddler);
        resumed.current_question_index = 7;
        session.init(resumed, child(), &bank);
        assert_eq!(session.screening().unwrap().id, "s-2");
        assert_eq!(session.current_index(), 7);
        assert_eq!(session.current_category(), Category::Health);
        assert_eq!(session.progress().answered, 0);

        let mut finished = Screening::new("s-3", "child-001", AgeGroup::Toddler);
        finished.current_question_index = 15;
        session.init(finished, child(), &bank);
        assert_eq!(session.current_index(), 14);
    }

    #[test]
    fn test_complete_requires_all_answers() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        session
            .set_answer("q-6-24m-health-1", Category::Health, RiskLevel::Green)
            .unwrap();
        let partial = calculate_risk_result(&session.screening().unwrap().answers);
        assert!(matches!(
            session.complete(partial),
            Err(DomainError::IncompleteScreening {
                answered: 1,
                total: 15
            })
        ));
        assert!(!session.screening().unwrap().is_complete);
    }

    #[test]
    fn test_complete_is_terminal() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        answer_all(&mut session, &bank);
        let result = calculate_risk_result(&session.screening().unwrap().answers);

        let screening = session.complete(result.clone()).unwrap();
        assert!(screening.is_complete);
        assert!(screening.completed_at.is_some());
        assert_eq!(screening.risk_result.as_ref(), Some(&result));

        assert!(matches!(
            session.complete(result),
            Err(DomainError::AlreadyComplete(_))
        ));
        assert!(matches!(
            session.set_answer("q-6-24m-health-1", Category::Health, RiskLevel::Red),
            Err(DomainError::AlreadyComplete(_))
        ));
    }

    #[test]
    fn test_reset_unbinds() {
        let bank = QuestionBank::builtin().unwrap();
        let mut session = bound(&bank);
        session.go_to_next().unwrap();
        session.reset();
        assert!(!session.is_active());
        assert_eq!(session.current_index(), 0);
        assert!(session.child().is_none());
    }
}
