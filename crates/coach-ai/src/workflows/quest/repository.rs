use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Checklist, ChecklistSubmission, Evaluation, Quest, QuestId};
use crate::workflows::clients::{AgentId, ClientId};

/// Storage abstraction for quest records.
///
/// Mutations are deliberately field-scoped: there is no whole-record update,
/// so nothing outside `complete_if_pending`/`unlock_at_order` can touch the
/// `locked` flag or the status. Two contracts carry the progression
/// invariants so no caller can race past them:
/// - `insert_sequence` must reject the batch with `Conflict` when the client
///   already has any quest (uniqueness of client+axis enforced at the storage
///   layer, not by a read-then-write check);
/// - `complete_if_pending` must be an atomic conditional transition, so two
///   concurrent completion attempts admit exactly one winner.
pub trait QuestRepository: Send + Sync {
    fn insert_sequence(&self, quests: Vec<Quest>) -> Result<usize, RepositoryError>;
    fn fetch(&self, id: &QuestId) -> Result<Option<Quest>, RepositoryError>;
    /// All quests for the client, ascending by order index.
    fn list_for_client(&self, client: &ClientId) -> Result<Vec<Quest>, RepositoryError>;
    /// Replace the quest's generated checklist.
    fn store_checklist(&self, id: &QuestId, checklist: Checklist) -> Result<(), RepositoryError>;
    /// Replace the quest's submitted answers and evaluation (kept on failed
    /// attempts too; most-recent-wins).
    fn store_evaluation(
        &self,
        id: &QuestId,
        submission: ChecklistSubmission,
        evaluation: Evaluation,
    ) -> Result<(), RepositoryError>;
    /// Flip the quest to completed only if it is currently unlocked and
    /// pending; returns the completed record, or `Stale` when another caller
    /// won the transition (or the quest is locked).
    fn complete_if_pending(
        &self,
        id: &QuestId,
        completed_at: DateTime<Utc>,
    ) -> Result<Quest, RepositoryError>;
    /// Unlock the client's quest at the given order index. `None` when no
    /// quest holds that index (the sequence is terminal).
    fn unlock_at_order(
        &self,
        client: &ClientId,
        order: u8,
    ) -> Result<Option<Quest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("quest records already exist for this client")]
    Conflict,
    #[error("quest record not found")]
    NotFound,
    #[error("quest is not awaiting completion")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook announcing quest milestones to the notification/inbox
/// collaborator. Delivery and read-state are that collaborator's concern.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: QuestNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAudience {
    Client,
    Agent,
}

impl NotificationAudience {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationAudience::Client => "client",
            NotificationAudience::Agent => "agent",
        }
    }
}

/// Payload emitted when a quest completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestNotification {
    pub title: String,
    pub body: String,
    pub audience: NotificationAudience,
    pub origin: AgentId,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
