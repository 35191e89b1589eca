//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Main menu: screen child, register child, history, dashboard, quit. The screening loop
//! answers one question per prompt; every change is auto-saved by `ScreeningService`.
//! Prompt text follows the configured language.

use crate::domain::{
    Category, Child, DomainError, Language, Question, RiskLevel, RiskResult, Screening, Sex,
    recommended_action,
};
use crate::ports::InputPort;
use crate::usecases::{
    ChildService, ChildStatus, DashboardService, HistoryEntry, HistoryFilter, HistoryService,
    NewChild, ScreeningService, SessionSnapshot, guidance_for, share_message,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use crossterm::style::{Color, Stylize};
use inquire::ui::{Color as PromptColor, RenderConfig, Styled};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Green/yellow/orange/red prompt markers and labels share these colors.
fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Green => Color::Green,
        RiskLevel::Yellow => Color::Yellow,
        RiskLevel::Orange => Color::Rgb {
            r: 0xff,
            g: 0x8c,
            b: 0x00,
        },
        RiskLevel::Red => Color::Red,
    }
}

/// Applies the prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(PromptColor::LightGreen))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(PromptColor::LightGreen));
    inquire::set_global_render_config(config);
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Esc or Ctrl-C on a prompt.
fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn optional(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Pick the English or Swahili form of a UI string.
fn tr(lang: Language, en: &'static str, sw: &'static str) -> &'static str {
    match lang {
        Language::En => en,
        Language::Sw => sw,
    }
}

/// A select option: the value handed back and the text shown.
#[derive(Debug, Clone)]
struct Choice<T> {
    value: T,
    label: String,
}

impl<T> Choice<T> {
    fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Register,
    Screen,
    History,
    Dashboard,
    Quit,
}

impl MenuItem {
    fn label(self, lang: Language) -> &'static str {
        match self {
            MenuItem::Register => tr(lang, "Register a child", "Sajili mtoto"),
            MenuItem::Screen => tr(lang, "Screen a child", "Mchunguze mtoto"),
            MenuItem::History => tr(lang, "Screening history", "Historia ya uchunguzi"),
            MenuItem::Dashboard => tr(lang, "Dashboard", "Dashibodi"),
            MenuItem::Quit => tr(lang, "Quit", "Ondoka"),
        }
    }
}

/// One line of the question prompt: an answer choice or a navigation command.
#[derive(Debug, Clone, Copy)]
enum Step {
    Answer(RiskLevel),
    Next,
    Previous,
    JumpToCategory,
    Finish,
    SaveAndExit,
}

impl Step {
    fn label(self, lang: Language) -> &'static str {
        match self {
            Step::Answer(_) => "",
            Step::Next => tr(lang, "  → Next question", "  → Swali linalofuata"),
            Step::Previous => tr(lang, "  ← Previous question", "  ← Swali lililopita"),
            Step::JumpToCategory => tr(lang, "  ⇥ Jump to category", "  ⇥ Ruka hadi kundi"),
            Step::Finish => tr(lang, "  ✓ Finish screening", "  ✓ Maliza uchunguzi"),
            Step::SaveAndExit => tr(lang, "  ⏏ Save and exit", "  ⏏ Hifadhi na uondoke"),
        }
    }
}

fn status_label(status: ChildStatus, lang: Language) -> String {
    match status {
        ChildStatus::NotScreened => tr(lang, "not screened", "hajachunguzwa").to_string(),
        ChildStatus::InProgress { answered } => match lang {
            Language::En => format!("in progress, {} answered", answered),
            Language::Sw => format!("inaendelea, majibu {}", answered),
        },
        ChildStatus::Screened { overall, on } => format!(
            "{} {}",
            overall.label(lang).with(risk_color(overall)),
            on.format("%Y-%m-%d")
        ),
    }
}

fn history_label(entry: &HistoryEntry, lang: Language) -> String {
    let name = entry
        .child_name
        .as_deref()
        .unwrap_or(tr(lang, "Unknown child", "Mtoto asiyejulikana"));
    let result = match entry.overall() {
        Some(overall) => overall.label(lang).with(risk_color(overall)).to_string(),
        None => tr(lang, "in progress", "inaendelea").to_string(),
    };
    format!(
        "{}  {:<24} {:<10} {}",
        entry.when().format("%Y-%m-%d"),
        name,
        entry.screening.age_group.label(lang),
        result
    )
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    children: Arc<ChildService>,
    screening: Arc<ScreeningService>,
    dashboard: Arc<DashboardService>,
    history: Arc<HistoryService>,
    language: Language,
    recent_limit: usize,
}

impl TuiInputPort {
    pub fn new(
        children: Arc<ChildService>,
        screening: Arc<ScreeningService>,
        dashboard: Arc<DashboardService>,
        history: Arc<HistoryService>,
        language: Language,
        recent_limit: usize,
    ) -> Self {
        Self {
            children,
            screening,
            dashboard,
            history,
            language,
            recent_limit,
        }
    }

    fn prompt_registration(&self) -> Result<NewChild, InquireError> {
        let lang = self.language;
        let name = Text::new(tr(lang, "Child's name:", "Jina la mtoto:")).prompt()?;
        let sex = Select::new(
            tr(lang, "Sex:", "Jinsia:"),
            vec![
                Choice::new(Sex::Female, tr(lang, "Female", "Kike")),
                Choice::new(Sex::Male, tr(lang, "Male", "Kiume")),
            ],
        )
        .prompt()?
        .value;

        let by_dob = Select::new(
            tr(lang, "Age from:", "Umri kutoka:"),
            vec![
                Choice::new(true, tr(lang, "Date of birth", "Tarehe ya kuzaliwa")),
                Choice::new(false, tr(lang, "Age in months", "Umri kwa miezi")),
            ],
        )
        .prompt()?
        .value;
        let (date_of_birth, age_in_months) = if by_dob {
            let dob = CustomType::<NaiveDate>::new(tr(
                lang,
                "Date of birth (YYYY-MM-DD):",
                "Tarehe ya kuzaliwa (YYYY-MM-DD):",
            ))
            .with_parser(&|s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ()))
            .with_error_message(tr(lang, "Use the format YYYY-MM-DD", "Tumia muundo YYYY-MM-DD"))
            .prompt()?;
            (Some(dob), None)
        } else {
            let months = CustomType::<u32>::new(tr(lang, "Age in months:", "Umri kwa miezi:"))
                .with_error_message(tr(
                    lang,
                    "Enter a whole number of months",
                    "Weka idadi kamili ya miezi",
                ))
                .prompt()?;
            (None, Some(months))
        };

        let village = Text::new(tr(lang, "Village:", "Kijiji:")).prompt()?;
        let caregiver_name = Text::new(tr(
            lang,
            "Caregiver name (optional):",
            "Jina la mlezi (si lazima):",
        ))
        .prompt()?;
        let caregiver_phone = Text::new(tr(
            lang,
            "Caregiver phone (optional):",
            "Simu ya mlezi (si lazima):",
        ))
        .prompt()?;

        Ok(NewChild {
            name,
            date_of_birth,
            age_in_months,
            sex,
            village,
            caregiver_phone: optional(caregiver_phone),
            caregiver_name: optional(caregiver_name),
        })
    }

    /// Search by name, or list the most recent children when the query is empty. Each option
    /// shows where the child stands.
    async fn pick_child(&self) -> Result<Option<String>, DomainError> {
        let lang = self.language;
        let query = match Text::new(tr(
            lang,
            "Search by name (empty for recent):",
            "Tafuta kwa jina (acha wazi kwa wa karibuni):",
        ))
        .prompt()
        {
            Ok(q) => q,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(ui_err(e)),
        };
        let found = if query.trim().is_empty() {
            self.children.recent(self.recent_limit.max(10)).await?
        } else {
            self.children.search(&query).await?
        };
        if found.is_empty() {
            println!("{}", tr(lang, "No children found.", "Hakuna mtoto aliyepatikana."));
            return Ok(None);
        }
        let mut options = Vec::with_capacity(found.len());
        for child in found {
            let status = self.history.status(&child.id).await?;
            let label = format!(
                "{} ({}) · {}",
                child.name,
                child.village,
                status_label(status, lang)
            );
            options.push(Choice::new(child, label));
        }
        match Select::new(tr(lang, "Child:", "Mtoto:"), options).prompt() {
            Ok(choice) => Ok(Some(choice.value.id)),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(ui_err(e)),
        }
    }

    fn print_header(&self, snap: &SessionSnapshot) {
        let lang = self.language;
        let child: &Child = &snap.child;
        println!();
        println!(
            "{} · {} · {}",
            child.name.as_str().bold(),
            snap.screening.age_group.label(lang),
            child.village
        );
        if snap.progress.answered > 0 {
            let line = match lang {
                Language::En => format!(
                    "Resuming: {} of {} answered",
                    snap.progress.answered, snap.progress.total
                ),
                Language::Sw => format!(
                    "Inaendelea: {} kati ya {} yamejibiwa",
                    snap.progress.answered, snap.progress.total
                ),
            };
            println!("{}", line);
        }
        if snap.red_flags > 0 {
            println!(
                "{}",
                format!(
                    "{} {}",
                    tr(lang, "Red flags so far:", "Dalili za hatari hadi sasa:"),
                    snap.red_flags
                )
                .red()
            );
        }
    }

    fn question_steps(&self, question: &Question, current: Option<RiskLevel>) -> Vec<Choice<Step>> {
        let lang = self.language;
        let mut steps: Vec<Choice<Step>> = question
            .answers
            .offered()
            .map(|(risk, text)| {
                let marker = if current == Some(risk) { "*" } else { " " };
                let label = format!(
                    "{} {} {}",
                    marker,
                    "●".with(risk_color(risk)),
                    text.resolve(lang)
                );
                Choice::new(Step::Answer(risk), label)
            })
            .collect();
        steps.extend(
            [
                Step::Next,
                Step::Previous,
                Step::JumpToCategory,
                Step::Finish,
                Step::SaveAndExit,
            ]
            .into_iter()
            .map(|step| Choice::new(step, step.label(lang))),
        );
        steps
    }

    fn print_emergency(&self, question: &Question) {
        let lang = self.language;
        let action = recommended_action(RiskLevel::Red);
        println!();
        println!(
            "{}",
            tr(lang, "!! EMERGENCY SIGN !!", "!! DALILI YA DHARURA !!")
                .red()
                .bold()
        );
        println!("{}", action.text.resolve(lang).red());
        println!(
            "{} {}",
            tr(lang, "When to refer:", "Wakati wa kupeleka:"),
            question.guidance.when_to_refer.resolve(lang)
        );
        if !question.guidance.chw.is_empty() {
            println!("CHW: {}", question.guidance.chw);
        }
        println!();
    }

    fn print_result(&self, child_name: &str, result: &RiskResult, screening: &Screening) {
        let lang = self.language;
        let overall = result.overall;
        println!();
        println!(
            "{} {}",
            tr(lang, "Overall:", "Jumla:"),
            overall.label(lang).with(risk_color(overall)).bold()
        );
        for (category, risk) in result.categories.iter() {
            println!(
                "  {:<12} {}",
                category.label(lang),
                risk.label(lang).with(risk_color(risk))
            );
        }
        if !result.red_flags.is_empty() {
            println!(
                "{}",
                format!(
                    "{} {}",
                    tr(lang, "Red flags:", "Dalili za hatari:"),
                    result.red_flags.len()
                )
                .red()
            );
        }
        println!(
            "{} {}",
            tr(lang, "Next step:", "Hatua inayofuata:"),
            recommended_action(overall).text.resolve(lang)
        );

        let guidance = guidance_for(screening, self.screening.questions(), lang);
        for (category, items) in guidance.iter() {
            println!();
            println!("{}", category.label(lang).bold());
            for item in items {
                println!("  • {}", item);
            }
        }

        let share = Confirm::new(tr(
            lang,
            "Show the message to share with the caregiver?",
            "Onyesha ujumbe wa kumtumia mlezi?",
        ))
        .with_default(false)
        .prompt()
        .unwrap_or(false);
        if share {
            println!();
            println!("{}", share_message(child_name, result, &guidance, lang));
        }
    }

    async fn run_dashboard(&self) -> Result<(), DomainError> {
        let lang = self.language;
        let stats = self.dashboard.stats().await?;
        println!();
        let totals = match lang {
            Language::En => format!(
                "Screenings: {} total, {} today",
                stats.total_screenings, stats.screenings_today
            ),
            Language::Sw => format!(
                "Uchunguzi: {} jumla, {} leo",
                stats.total_screenings, stats.screenings_today
            ),
        };
        println!("{}", totals);
        for risk in RiskLevel::PRIORITY {
            println!(
                "  {:<8} {}",
                risk.label(lang).with(risk_color(risk)),
                stats.risk_distribution.get(risk)
            );
        }
        println!(
            "{} {}",
            tr(lang, "Pending referrals:", "Rufaa zinazosubiri:"),
            stats.pending_referrals
        );
        println!(
            "{} {}",
            tr(lang, "Waiting to sync:  ", "Zinasubiri kusawazishwa:"),
            stats.pending_sync
        );
        if !stats.recent_screenings.is_empty() {
            println!();
            println!("{}", tr(lang, "Recent:", "Za karibuni:"));
            for recent in &stats.recent_screenings {
                let overall = recent
                    .screening
                    .risk_result
                    .as_ref()
                    .map(|r| r.overall)
                    .unwrap_or(RiskLevel::Green);
                println!(
                    "  {}  {:<24} {}",
                    recent.screening.created_at.format("%Y-%m-%d"),
                    recent.child_name,
                    overall.label(lang).with(risk_color(overall))
                );
            }
        }
        println!();
        Ok(())
    }

    /// Filter, list and open past screenings. Completed ones show their result; unfinished ones
    /// can be resumed.
    async fn run_history(&self) -> Result<(), DomainError> {
        let lang = self.language;
        let mut risks = vec![Choice::new(None, tr(lang, "All", "Zote"))];
        risks.extend(
            RiskLevel::PRIORITY
                .into_iter()
                .map(|risk| Choice::new(Some(risk), risk.label(lang))),
        );
        let risk = match Select::new(tr(lang, "Show:", "Onyesha:"), risks).prompt() {
            Ok(choice) => choice.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        let name = match Text::new(tr(
            lang,
            "Filter by name (empty for all):",
            "Chuja kwa jina (acha wazi kwa wote):",
        ))
        .prompt()
        {
            Ok(name) => name,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };

        let entries = self.history.list(&HistoryFilter { name, risk }).await?;
        if entries.is_empty() {
            println!(
                "{}",
                tr(lang, "No screenings found.", "Hakuna uchunguzi uliopatikana.")
            );
            return Ok(());
        }
        let heading = match lang {
            Language::En => format!("{} screenings:", entries.len()),
            Language::Sw => format!("Uchunguzi {}:", entries.len()),
        };
        let options: Vec<Choice<HistoryEntry>> = entries
            .into_iter()
            .map(|entry| {
                let label = history_label(&entry, lang);
                Choice::new(entry, label)
            })
            .collect();
        let entry = match Select::new(&heading, options).with_page_size(12).prompt() {
            Ok(choice) => choice.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };

        match &entry.screening.risk_result {
            Some(result) => {
                let name = entry.child_name.as_deref().unwrap_or("");
                self.print_result(name, result, &entry.screening);
                Ok(())
            }
            None if entry.child_name.is_some() => {
                let resume = Confirm::new(tr(
                    lang,
                    "Resume this screening?",
                    "Endelea na uchunguzi huu?",
                ))
                .with_default(true)
                .prompt()
                .unwrap_or(false);
                if resume {
                    self.run_screening(&entry.screening.child_id).await?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn jump(&self) -> Result<(), DomainError> {
        let lang = self.language;
        let options: Vec<Choice<Category>> = Category::ALL
            .iter()
            .map(|c| Choice::new(*c, c.label(lang)))
            .collect();
        let chosen = match Select::new(tr(lang, "Category:", "Kundi:"), options).prompt() {
            Ok(choice) => choice.value,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_err(e)),
        };
        match self.screening.jump_to_category(chosen).await {
            Ok(_) => Ok(()),
            Err(DomainError::EmptyCategory(c)) => {
                let msg = match lang {
                    Language::En => format!("No questions in {} for this age group.", c.label(lang)),
                    Language::Sw => {
                        format!("Hakuna maswali ya {} kwa kundi hili la umri.", c.label(lang))
                    }
                };
                println!("{}", msg);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Complete the bound screening and show the result. False when questions remain.
    async fn finish(&self, child_name: &str) -> Result<bool, DomainError> {
        match self.screening.complete().await {
            Ok(result) => {
                if let Some(snap) = self.screening.snapshot().await {
                    self.print_result(child_name, &result, &snap.screening);
                }
                self.screening.exit().await;
                Ok(true)
            }
            Err(DomainError::IncompleteScreening { answered, total }) => {
                let msg = match self.language {
                    Language::En => format!(
                        "{} of {} questions answered. Answer all before finishing.",
                        answered, total
                    ),
                    Language::Sw => format!(
                        "Maswali {} kati ya {} yamejibiwa. Jibu yote kabla ya kumaliza.",
                        answered, total
                    ),
                };
                println!("{}", msg.yellow());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let lang = self.language;
        let items: Vec<Choice<MenuItem>> = [
            MenuItem::Screen,
            MenuItem::Register,
            MenuItem::History,
            MenuItem::Dashboard,
            MenuItem::Quit,
        ]
        .into_iter()
        .map(|item| Choice::new(item, item.label(lang)))
        .collect();
        let prompt = tr(lang, "What would you like to do?", "Ungependa kufanya nini?");
        loop {
            let choice = match Select::new(prompt, items.clone()).prompt() {
                Ok(choice) => choice.value,
                Err(e) if is_cancel(&e) => MenuItem::Quit,
                Err(e) => return Err(ui_err(e)),
            };
            let outcome = match choice {
                MenuItem::Register => self.run_registration().await.map(|_| ()),
                MenuItem::Screen => match self.pick_child().await {
                    Ok(Some(child_id)) => self.run_screening(&child_id).await,
                    Ok(None) => Ok(()),
                    Err(e) => Err(e),
                },
                MenuItem::History => self.run_history().await,
                MenuItem::Dashboard => self.run_dashboard().await,
                MenuItem::Quit => return Ok(()),
            };
            match outcome {
                Ok(()) => {}
                Err(DomainError::Ui(msg)) => return Err(DomainError::Ui(msg)),
                Err(e) => {
                    warn!(error = %e, "menu action failed");
                    println!("{}", e.to_string().red());
                }
            }
        }
    }

    async fn run_registration(&self) -> Result<Option<String>, DomainError> {
        let lang = self.language;
        let form = match self.prompt_registration() {
            Ok(form) => form,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(ui_err(e)),
        };
        let child = self.children.register(form).await?;
        let registered = match lang {
            Language::En => format!("Registered {}.", child.name.as_str().bold()),
            Language::Sw => format!("{} amesajiliwa.", child.name.as_str().bold()),
        };
        println!("{}", registered);

        let screen_now = Confirm::new(tr(lang, "Start screening now?", "Anza uchunguzi sasa?"))
            .with_default(true)
            .prompt()
            .unwrap_or(false);
        if screen_now {
            self.run_screening(&child.id).await?;
        }
        Ok(Some(child.id))
    }

    async fn run_screening(&self, child_id: &str) -> Result<(), DomainError> {
        let lang = self.language;
        let mut snap = self.screening.begin_screening(child_id).await?;
        self.print_header(&snap);

        loop {
            let Some(question_id) = snap.current_question_id.clone() else {
                println!(
                    "{}",
                    tr(
                        lang,
                        "No questions for this age group.",
                        "Hakuna maswali kwa kundi hili la umri."
                    )
                );
                self.screening.exit().await;
                return Ok(());
            };
            let question = self.screening.questions().question_by_id(&question_id)?;

            let heading = format!(
                "[{}/{} · {}%] {} · {}",
                snap.index + 1,
                snap.progress.total,
                snap.progress.percentage,
                question.category.label(lang),
                question.text.resolve(lang)
            );
            let steps = self.question_steps(question, snap.current_answer);
            let step = match Select::new(&heading, steps).with_page_size(10).prompt() {
                Ok(choice) => choice.value,
                Err(e) if is_cancel(&e) => Step::SaveAndExit,
                Err(e) => {
                    self.screening.exit().await;
                    return Err(ui_err(e));
                }
            };

            match step {
                Step::Answer(risk) => {
                    snap = self.screening.answer(&question_id, risk).await?;
                    if risk == RiskLevel::Red {
                        self.print_emergency(question);
                    }
                    if snap.index + 1 < snap.progress.total {
                        snap = self.screening.next().await?;
                    } else if snap.progress.is_complete() {
                        let finish = Confirm::new(tr(
                            lang,
                            "All questions answered. Finish now?",
                            "Maswali yote yamejibiwa. Maliza sasa?",
                        ))
                        .with_default(true)
                        .prompt()
                        .unwrap_or(false);
                        if finish && self.finish(&snap.child.name.clone()).await? {
                            return Ok(());
                        }
                    }
                }
                Step::Next => snap = self.screening.next().await?,
                Step::Previous => snap = self.screening.previous().await?,
                Step::JumpToCategory => {
                    self.jump().await?;
                    if let Some(s) = self.screening.snapshot().await {
                        snap = s;
                    }
                }
                Step::Finish => {
                    if self.finish(&snap.child.name.clone()).await? {
                        return Ok(());
                    }
                }
                Step::SaveAndExit => {
                    self.screening.exit().await;
                    let saved = match lang {
                        Language::En => format!(
                            "Saved. Resume any time from \"{}\".",
                            MenuItem::Screen.label(lang)
                        ),
                        Language::Sw => format!(
                            "Imehifadhiwa. Endelea wakati wowote kupitia \"{}\".",
                            MenuItem::Screen.label(lang)
                        ),
                    };
                    println!("{}", saved);
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_menu_labels_follow_language() {
        assert_eq!(MenuItem::History.label(Language::En), "Screening history");
        assert_eq!(MenuItem::History.label(Language::Sw), "Historia ya uchunguzi");
        assert_eq!(Step::Finish.label(Language::Sw), "  ✓ Maliza uchunguzi");
    }

    #[test]
    fn test_status_label() {
        assert_eq!(
            status_label(ChildStatus::NotScreened, Language::Sw),
            "hajachunguzwa"
        );
        assert_eq!(
            status_label(ChildStatus::InProgress { answered: 4 }, Language::En),
            "in progress, 4 answered"
        );
        let on = Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap();
        let screened = status_label(
            ChildStatus::Screened {
                overall: RiskLevel::Red,
                on,
            },
            Language::En,
        );
        assert!(screened.contains("Red - high risk"));
        assert!(screened.ends_with("2025-03-09"));
    }

    #[test]
    fn test_history_label_for_missing_child() {
        let entry = HistoryEntry {
            screening: Screening::new("s1", "gone", crate::domain::AgeGroup::Toddler),
            child_name: None,
        };
        let label = history_label(&entry, Language::En);
        assert!(label.contains("Unknown child"));
        assert!(label.contains("in progress"));
    }
}
