//! Screening workflow: begin/resume -> answer + navigate (auto-saved) -> complete.
//!
//! - Owns the single `ScreeningSession` behind a mutex
//! - Every state change is written back with `update_screening`
//! - Auto-save failures are logged, never surfaced; in-memory state stays authoritative

use crate::domain::{
    Category, Child, DomainError, RiskLevel, RiskResult, Screening, calculate_risk_result,
};
use crate::ports::{ChildRepository, QuestionProvider, ScreeningRepository};
use crate::usecases::session::{Progress, ScreeningSession};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Read-only view of the bound session for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub screening: Screening,
    pub child: Child,
    pub index: usize,
    pub category: Category,
    pub progress: Progress,
    pub current_question_id: Option<String>,
    /// Severity already recorded for the current question.
    pub current_answer: Option<RiskLevel>,
    /// Answers recorded at red so far.
    pub red_flags: usize,
}

/// Screening use cases.
pub struct ScreeningService {
    questions: Arc<dyn QuestionProvider>,
    children: Arc<dyn ChildRepository>,
    screenings: Arc<dyn ScreeningRepository>,
    session: Mutex<ScreeningSession>,
}

impl ScreeningService {
    pub fn new(
        questions: Arc<dyn QuestionProvider>,
        children: Arc<dyn ChildRepository>,
        screenings: Arc<dyn ScreeningRepository>,
    ) -> Self {
        Self {
            questions,
            children,
            screenings,
            session: Mutex::new(ScreeningSession::new()),
        }
    }

    pub fn questions(&self) -> &dyn QuestionProvider {
        self.questions.as_ref()
    }

    /// Start or resume a screening for a child, using today's date for the age group.
    pub async fn begin_screening(&self, child_id: &str) -> Result<SessionSnapshot, DomainError> {
        self.begin_screening_on(child_id, Utc::now().date_naive())
            .await
    }

    /// Resumes the child's newest incomplete screening; otherwise creates and persists a new one
    /// for the age group the child is in on `today`.
    pub async fn begin_screening_on(
        &self,
        child_id: &str,
        today: NaiveDate,
    ) -> Result<SessionSnapshot, DomainError> {
        let child = self
            .children
            .get_child(child_id)
            .await?
            .ok_or_else(|| DomainError::child_not_found(child_id))?;

        let screening = match self.screenings.get_incomplete_screening(child_id).await? {
            Some(existing) => {
                info!(
                    screening_id = %existing.id,
                    child_id,
                    answered = existing.answers.len(),
                    "resuming screening"
                );
                existing
            }
            None => {
                let age_group = child.age_group(today);
                let fresh = Screening::new(Uuid::new_v4().to_string(), child_id, age_group);
                self.screenings.insert_screening(&fresh).await?;
                info!(
                    screening_id = %fresh.id,
                    child_id,
                    %age_group,
                    questions = self.questions.question_count(age_group),
                    "screening started"
                );
                fresh
            }
        };

        let mut session = self.session.lock().await;
        session.init(screening, child, self.questions.as_ref());
        self.snapshot_of(&session)
            .ok_or(DomainError::NoActiveSession)
    }

    /// Record an answer for a question of the bound screening.
    pub async fn answer(
        &self,
        question_id: &str,
        risk: RiskLevel,
    ) -> Result<SessionSnapshot, DomainError> {
        let question = self.questions.question_by_id(question_id)?;
        if !question.answers.offers(risk) {
            return Err(DomainError::ChoiceUnavailable {
                question_id: question_id.to_string(),
                risk,
            });
        }

        let mut session = self.session.lock().await;
        let age_group = session
            .screening()
            .map(|s| s.age_group)
            .ok_or(DomainError::NoActiveSession)?;
        if question.age_group != age_group {
            return Err(DomainError::InvalidValue {
                field: "question_id",
                value: question_id.to_string(),
            });
        }

        session.set_answer(question_id, question.category, risk)?;
        debug!(question_id, %risk, "answer recorded");
        if risk == RiskLevel::Red {
            warn!(question_id, "emergency answer recorded");
        }
        self.autosave(&session).await;
        self.snapshot_of(&session)
            .ok_or(DomainError::NoActiveSession)
    }

    pub async fn next(&self) -> Result<SessionSnapshot, DomainError> {
        let mut session = self.session.lock().await;
        session.go_to_next()?;
        self.autosave(&session).await;
        self.snapshot_of(&session)
            .ok_or(DomainError::NoActiveSession)
    }

    pub async fn previous(&self) -> Result<SessionSnapshot, DomainError> {
        let mut session = self.session.lock().await;
        session.go_to_previous()?;
        self.autosave(&session).await;
        self.snapshot_of(&session)
            .ok_or(DomainError::NoActiveSession)
    }

    pub async fn jump_to_category(
        &self,
        category: Category,
    ) -> Result<SessionSnapshot, DomainError> {
        let mut session = self.session.lock().await;
        session.set_category(category)?;
        self.autosave(&session).await;
        self.snapshot_of(&session)
            .ok_or(DomainError::NoActiveSession)
    }

    /// Finish the bound screening. Fails while any question is unanswered.
    pub async fn complete(&self) -> Result<RiskResult, DomainError> {
        let mut session = self.session.lock().await;
        let answers = session
            .screening()
            .map(|s| s.answers.clone())
            .ok_or(DomainError::NoActiveSession)?;
        let result = calculate_risk_result(&answers);
        let screening_id = session.complete(result.clone())?.id.clone();
        info!(
            screening_id = %screening_id,
            overall = %result.overall,
            red_flags = result.red_flags.len(),
            "screening completed"
        );
        self.autosave(&session).await;
        Ok(result)
    }

    /// Save and unbind. The screening can be resumed later with `begin_screening`.
    pub async fn exit(&self) {
        let mut session = self.session.lock().await;
        self.autosave(&session).await;
        if let Some(s) = session.screening() {
            debug!(screening_id = %s.id, "session closed");
        }
        session.reset();
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let session = self.session.lock().await;
        self.snapshot_of(&session)
    }

    fn snapshot_of(&self, session: &ScreeningSession) -> Option<SessionSnapshot> {
        let screening = session.screening()?.clone();
        let child = session.child()?.clone();
        let current_question_id = session
            .current_question(self.questions.as_ref())
            .map(|q| q.id.clone());
        let current_answer = current_question_id
            .as_deref()
            .and_then(|id| session.get_answer(id))
            .map(|a| a.selected_risk);
        Some(SessionSnapshot {
            screening,
            child,
            index: session.current_index(),
            category: session.current_category(),
            progress: session.progress(),
            current_question_id,
            current_answer,
            red_flags: session.red_flag_count(),
        })
    }

    async fn autosave(&self, session: &ScreeningSession) {
        let Some(screening) = session.screening() else {
            return;
        };
        if let Err(e) = self.screenings.update_screening(screening).await {
            warn!(screening_id = %screening.id, error = %e, "auto-save failed");
        }
    }
}
