//! Application use cases. Orchestrate domain logic via ports.

pub mod child_service;
pub mod dashboard_service;
pub mod guidance;
pub mod history_service;
pub mod screening_service;
pub mod session;

pub use child_service::{ChildService, NewChild};
pub use dashboard_service::DashboardService;
pub use guidance::{GroupedGuidance, guidance_for, share_message};
pub use history_service::{ChildStatus, HistoryEntry, HistoryFilter, HistoryService};
pub use screening_service::{ScreeningService, SessionSnapshot};
pub use session::{Progress, ScreeningSession};
