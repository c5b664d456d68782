use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{Checklist, ChecklistSubmission, Evaluation, Quest, QuestId, QuestStatus};
use super::oracle::{ChecklistRequest, CoachingOracle, EvaluationRequest, OracleError};
use super::repository::{
    NotificationAudience, NotificationError, NotificationSink, QuestNotification, QuestRepository,
    RepositoryError,
};
use super::sequencer;
use crate::workflows::clients::{ClientDirectory, ClientId, ClientProfile, DirectoryError};
use crate::workflows::health::{HealthIndexStore, HealthSnapshot, NEUTRAL_AXIS_SCORE};

/// Service composing the sequencer, the oracle boundary, and the unlock
/// controller. Every quest mutation in the system flows through here.
pub struct QuestService {
    repository: Arc<dyn QuestRepository>,
    directory: Arc<dyn ClientDirectory>,
    health: Arc<dyn HealthIndexStore>,
    notifications: Arc<dyn NotificationSink>,
    oracle: Arc<dyn CoachingOracle>,
}

/// Result of a sequence initialization attempt. Re-running initialization is
/// a safe no-op, not an error: diagnosis-completion retries must not
/// duplicate quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Created(usize),
    AlreadyInitialized,
}

/// Optional status filter for quest listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn from_query(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(StatusFilter::Pending),
            "completed" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    fn matches(self, quest: &Quest) -> bool {
        match self {
            StatusFilter::Pending => quest.status != QuestStatus::Completed,
            StatusFilter::Completed => quest.status == QuestStatus::Completed,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestServiceError {
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),
    #[error("quest not found: {0}")]
    QuestNotFound(QuestId),
    #[error("quest {0} is locked")]
    Locked(QuestId),
    #[error("quest {0} has no generated checklist yet")]
    NotReady(QuestId),
    #[error("oracle unavailable: {0}")]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl QuestService {
    pub fn new(
        repository: Arc<dyn QuestRepository>,
        directory: Arc<dyn ClientDirectory>,
        health: Arc<dyn HealthIndexStore>,
        notifications: Arc<dyn NotificationSink>,
        oracle: Arc<dyn CoachingOracle>,
    ) -> Self {
        Self {
            repository,
            directory,
            health,
            notifications,
            oracle,
        }
    }

    fn require_client(&self, id: &ClientId) -> Result<ClientProfile, QuestServiceError> {
        self.directory
            .lookup(id)?
            .ok_or_else(|| QuestServiceError::ClientNotFound(id.clone()))
    }

    /// Latest health snapshot, degrading to all-neutral when the store has no
    /// row or is unreachable: sequencing must always have a valid input.
    fn snapshot_or_neutral(&self, client: &ClientId) -> HealthSnapshot {
        match self.health.latest(client) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => HealthSnapshot::neutral(),
            Err(err) => {
                warn!(%client, %err, "health index unavailable, sequencing from neutral scores");
                HealthSnapshot::neutral()
            }
        }
    }

    /// Seed the client's six-quest sequence from their current health
    /// snapshot, weakest axis first.
    pub fn initialize(&self, client: &ClientId) -> Result<SequenceOutcome, QuestServiceError> {
        let profile = self.require_client(client)?;
        let snapshot = self.snapshot_or_neutral(client);
        let quests = sequencer::build_sequence(client, &profile.agent_id, &snapshot);

        match self.repository.insert_sequence(quests) {
            Ok(count) => {
                info!(%client, count, "quest sequence initialized");
                Ok(SequenceOutcome::Created(count))
            }
            Err(RepositoryError::Conflict) => Ok(SequenceOutcome::AlreadyInitialized),
            Err(err) => Err(err.into()),
        }
    }

    /// Quests for the client, ascending by order, optionally filtered by
    /// status. A client with no sequence yet gets one initialized on the fly.
    pub fn list(
        &self,
        client: &ClientId,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Quest>, QuestServiceError> {
        self.require_client(client)?;

        let mut quests = self.repository.list_for_client(client)?;
        if quests.is_empty() {
            self.initialize(client)?;
            quests = self.repository.list_for_client(client)?;
        }

        if let Some(filter) = filter {
            quests.retain(|quest| filter.matches(quest));
        }
        Ok(quests)
    }

    /// The quest the client is actively working on: unlocked, not completed.
    pub fn current(&self, client: &ClientId) -> Result<Option<Quest>, QuestServiceError> {
        self.require_client(client)?;
        let quests = self.repository.list_for_client(client)?;
        Ok(quests.into_iter().find(Quest::is_current))
    }

    /// Ask the oracle for a fresh checklist and persist it on the quest.
    /// Regeneration replaces any prior checklist; a locked quest is rejected
    /// untouched.
    pub fn generate_checklist(&self, id: &QuestId) -> Result<Checklist, QuestServiceError> {
        let quest = self
            .repository
            .fetch(id)?
            .ok_or_else(|| QuestServiceError::QuestNotFound(id.clone()))?;
        if quest.locked {
            return Err(QuestServiceError::Locked(id.clone()));
        }

        let profile = self.require_client(&quest.client_id)?;
        let current_score = match self.health.latest(&quest.client_id) {
            Ok(Some(snapshot)) => snapshot.score(quest.axis),
            Ok(None) => NEUTRAL_AXIS_SCORE,
            Err(err) => {
                warn!(client = %quest.client_id, %err, "health index unavailable, prompting with neutral score");
                NEUTRAL_AXIS_SCORE
            }
        };

        let checklist = self.oracle.generate_checklist(&ChecklistRequest {
            client_name: profile.name,
            axis: quest.axis,
            current_score,
        })?;

        self.repository.store_checklist(id, checklist.clone())?;
        info!(quest = %id, axis = %quest.axis, "checklist generated");
        Ok(checklist)
    }

    /// Evaluate the subject's checked items. The submission and the oracle's
    /// evaluation are persisted even on a fail so retries show history; a
    /// pass hands over to the unlock controller.
    pub fn evaluate(
        &self,
        id: &QuestId,
        checked_indices: Vec<usize>,
    ) -> Result<Evaluation, QuestServiceError> {
        let quest = self
            .repository
            .fetch(id)?
            .ok_or_else(|| QuestServiceError::QuestNotFound(id.clone()))?;
        if quest.locked {
            return Err(QuestServiceError::Locked(id.clone()));
        }
        let checklist = quest
            .checklist
            .clone()
            .ok_or_else(|| QuestServiceError::NotReady(id.clone()))?;

        let profile = self.require_client(&quest.client_id)?;
        let request = EvaluationRequest {
            client_name: profile.name,
            axis: quest.axis,
            items: checklist.items,
            checked_indices,
            min_checks: checklist.min_checks,
        };

        let evaluation = self.oracle.evaluate_checklist(&request)?;

        let submission = ChecklistSubmission {
            checked_indices: request.normalized_indices().into_iter().collect(),
            checked_count: request.checked_count(),
        };
        self.repository
            .store_evaluation(id, submission, evaluation.clone())?;

        if evaluation.passed {
            self.advance(id, &evaluation.message)?;
        }

        Ok(evaluation)
    }

    /// Administrative override: complete the quest without an oracle verdict,
    /// with the same side effects as a pass.
    pub fn complete_manual(&self, id: &QuestId) -> Result<Quest, QuestServiceError> {
        let quest = self
            .repository
            .fetch(id)?
            .ok_or_else(|| QuestServiceError::QuestNotFound(id.clone()))?;
        if quest.locked {
            return Err(QuestServiceError::Locked(id.clone()));
        }

        match self.advance(id, "Marked complete by your coach.")? {
            Some(completed) => Ok(completed),
            // Already completed earlier; return the record as it stands.
            None => Ok(quest),
        }
    }

    /// Unlock controller. The storage-layer conditional transition admits one
    /// winner; the loser sees `Stale` and skips both the unlock and the
    /// notification, so the "at most one unlocked-incomplete quest" invariant
    /// holds under concurrent completion attempts.
    fn advance(
        &self,
        id: &QuestId,
        notification_body: &str,
    ) -> Result<Option<Quest>, QuestServiceError> {
        let completed = match self.repository.complete_if_pending(id, Utc::now()) {
            Ok(quest) => quest,
            Err(RepositoryError::Stale) => {
                debug!(quest = %id, "completion already recorded, skipping advance");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        match self
            .repository
            .unlock_at_order(&completed.client_id, completed.order + 1)?
        {
            Some(next) => {
                info!(quest = %completed.id, next = %next.id, "quest completed, next quest unlocked")
            }
            None => info!(quest = %completed.id, "quest completed, sequence fully resolved"),
        }

        self.notifications.publish(QuestNotification {
            title: format!("🎉 '{}' mission complete!", completed.title),
            body: notification_body.to_string(),
            audience: NotificationAudience::Client,
            origin: completed.agent_id.clone(),
        })?;

        Ok(Some(completed))
    }
}
