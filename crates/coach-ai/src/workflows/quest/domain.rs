use crate::workflows::clients::{AgentId, ClientId};
use crate::workflows::diagnosis::Axis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for quest records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub String);

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a quest. Together with `locked`, this yields the three
/// progression states: locked, unlocked-pending, completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Pending,
    Completed,
}

impl QuestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            QuestStatus::Pending => "pending",
            QuestStatus::Completed => "completed",
        }
    }
}

/// Oracle-generated self-assessment checklist. Immutable once stored, apart
/// from wholesale regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub intro: String,
    pub subtitle: String,
    pub items: Vec<String>,
    pub min_checks: u32,
}

/// The subject's latest submitted answer set, kept even on failed attempts so
/// retries show history. Most-recent-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSubmission {
    pub checked_indices: Vec<usize>,
    pub checked_count: usize,
}

/// Oracle evaluation of a submission. The numeric score and the verdict are
/// independent: the oracle may fail a submission that clears the numeric bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub passed: bool,
    pub score: u32,
    pub total: u32,
    pub message: String,
    pub next_step: String,
}

/// One gated improvement task tied to a health axis. Six are created together
/// per client, ordered weakest axis first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub client_id: ClientId,
    pub agent_id: AgentId,
    pub title: String,
    pub axis: Axis,
    pub order: u8,
    pub locked: bool,
    pub status: QuestStatus,
    pub checklist: Option<Checklist>,
    pub submission: Option<ChecklistSubmission>,
    pub evaluation: Option<Evaluation>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// The quest the client is actively working: unlocked but not completed.
    pub fn is_current(&self) -> bool {
        !self.locked && self.status != QuestStatus::Completed
    }

    pub fn view(&self) -> QuestView {
        QuestView {
            id: self.id.clone(),
            title: self.title.clone(),
            axis: self.axis,
            status: self.status.label(),
            is_locked: self.locked,
            quest_order: self.order,
            checklist: self.checklist.clone(),
            evaluation: self.evaluation.clone(),
            completed_at: self.completed_at,
        }
    }
}

/// Sanitized representation of a quest for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct QuestView {
    pub id: QuestId,
    pub title: String,
    pub axis: Axis,
    pub status: &'static str,
    pub is_locked: bool,
    pub quest_order: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Checklist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
