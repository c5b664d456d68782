//! Gated quest progression: six ordered improvement quests seeded from the
//! health index, unlocked one at a time by oracle-evaluated checklists.

pub mod domain;
pub mod oracle;
pub mod repository;
pub mod router;
pub mod sequencer;
pub mod service;

pub use domain::{
    Checklist, ChecklistSubmission, Evaluation, Quest, QuestId, QuestStatus, QuestView,
};
pub use oracle::{
    ChecklistRequest, CoachingOracle, EvaluationRequest, HttpCoachingOracle, OracleError,
    DEFAULT_MIN_CHECKS,
};
pub use repository::{
    NotificationAudience, NotificationError, NotificationSink, QuestNotification, QuestRepository,
    RepositoryError,
};
pub use router::quest_router;
pub use service::{QuestService, QuestServiceError, SequenceOutcome, StatusFilter};
