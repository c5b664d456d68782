use chrono::{DateTime, Utc};
use coach_ai::workflows::clients::{
    AgentId, ClientDirectory, ClientId, ClientProfile, DirectoryError,
};
use coach_ai::workflows::diagnosis::{Axis, DiagnosisBattery, DiagnosisService};
use coach_ai::workflows::health::{
    FailoverHealthStore, HealthIndexStore, HealthSnapshot, HealthStoreError,
};
use coach_ai::workflows::quest::{
    Checklist, ChecklistRequest, ChecklistSubmission, CoachingOracle, Evaluation,
    EvaluationRequest, NotificationError, NotificationSink, OracleError, Quest, QuestId,
    QuestNotification, QuestRepository, QuestService, QuestStatus, RepositoryError,
    DEFAULT_MIN_CHECKS,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryQuestRepository {
    records: Mutex<HashMap<QuestId, Quest>>,
}

impl QuestRepository for InMemoryQuestRepository {
    fn insert_sequence(&self, quests: Vec<Quest>) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(first) = quests.first() {
            let exists = guard
                .values()
                .any(|quest| quest.client_id == first.client_id);
            if exists {
                return Err(RepositoryError::Conflict);
            }
        }
        let count = quests.len();
        for quest in quests {
            guard.insert(quest.id.clone(), quest);
        }
        Ok(count)
    }

    fn fetch(&self, id: &QuestId) -> Result<Option<Quest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_for_client(&self, client: &ClientId) -> Result<Vec<Quest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut quests: Vec<Quest> = guard
            .values()
            .filter(|quest| &quest.client_id == client)
            .cloned()
            .collect();
        quests.sort_by_key(|quest| quest.order);
        Ok(quests)
    }

    fn store_checklist(&self, id: &QuestId, checklist: Checklist) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let quest = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        quest.checklist = Some(checklist);
        Ok(())
    }

    fn store_evaluation(
        &self,
        id: &QuestId,
        submission: ChecklistSubmission,
        evaluation: Evaluation,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let quest = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        quest.submission = Some(submission);
        quest.evaluation = Some(evaluation);
        Ok(())
    }

    fn complete_if_pending(
        &self,
        id: &QuestId,
        completed_at: DateTime<Utc>,
    ) -> Result<Quest, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let quest = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if quest.locked || quest.status == QuestStatus::Completed {
            return Err(RepositoryError::Stale);
        }
        quest.status = QuestStatus::Completed;
        quest.completed_at = Some(completed_at);
        Ok(quest.clone())
    }

    fn unlock_at_order(
        &self,
        client: &ClientId,
        order: u8,
    ) -> Result<Option<Quest>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let quest = guard
            .values_mut()
            .find(|quest| &quest.client_id == client && quest.order == order);
        Ok(quest.map(|quest| {
            quest.locked = false;
            quest.clone()
        }))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryHealthIndexStore {
    rows: Mutex<HashMap<ClientId, HealthSnapshot>>,
}

impl HealthIndexStore for InMemoryHealthIndexStore {
    fn upsert(&self, client: &ClientId, snapshot: &HealthSnapshot) -> Result<(), HealthStoreError> {
        let mut guard = self.rows.lock().expect("health mutex poisoned");
        guard.insert(client.clone(), snapshot.clone());
        Ok(())
    }

    fn latest(&self, client: &ClientId) -> Result<Option<HealthSnapshot>, HealthStoreError> {
        let guard = self.rows.lock().expect("health mutex poisoned");
        Ok(guard.get(client).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryClientDirectory {
    profiles: Mutex<HashMap<ClientId, ClientProfile>>,
}

impl InMemoryClientDirectory {
    pub(crate) fn register(&self, profile: ClientProfile) {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.insert(profile.id.clone(), profile);
    }
}

impl ClientDirectory for InMemoryClientDirectory {
    fn lookup(&self, id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNotificationSink {
    events: Mutex<Vec<QuestNotification>>,
}

impl InMemoryNotificationSink {
    pub(crate) fn events(&self) -> Vec<QuestNotification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn publish(&self, notification: QuestNotification) -> Result<(), NotificationError> {
        tracing::info!(
            title = %notification.title,
            audience = notification.audience.label(),
            "quest notification"
        );
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

/// Deterministic stand-in for the text-generation oracle, used by the CLI
/// demo and whenever the service runs without oracle credentials.
#[derive(Default)]
pub(crate) struct ScriptedOracle;

impl CoachingOracle for ScriptedOracle {
    fn generate_checklist(&self, request: &ChecklistRequest) -> Result<Checklist, OracleError> {
        let topic = request.axis.label().to_lowercase();
        Ok(Checklist {
            intro: format!("{} Focus Sprint", request.axis.label()),
            subtitle: format!(
                "{}, you are closer than you think. Small steps count.",
                request.client_name
            ),
            items: vec![
                format!("Have you looked at where your {topic} stands today?"),
                format!("Have you written down one concrete {topic} goal for this month?"),
                format!("Have you blocked time this week to work on {topic}?"),
                format!("Have you told someone you trust about your {topic} plan?"),
                format!("Are you tracking one simple number that reflects your {topic}?"),
            ],
            min_checks: DEFAULT_MIN_CHECKS,
        })
    }

    fn evaluate_checklist(&self, request: &EvaluationRequest) -> Result<Evaluation, OracleError> {
        let checked = request.checked_count() as u32;
        let total = request.items.len() as u32;
        let passed = checked >= request.min_checks;
        let message = if passed {
            format!(
                "{} checked {checked} of {total} items on {}. That is real momentum worth keeping.",
                request.client_name,
                request.axis.label()
            )
        } else {
            format!(
                "{} checked {checked} of {total} items on {}. A little more groundwork will make the next attempt land.",
                request.client_name,
                request.axis.label()
            )
        };
        let next_step = if passed {
            "The next area is unlocked. Carry this pace into it.".to_string()
        } else {
            String::new()
        };
        Ok(Evaluation {
            passed,
            score: checked,
            total,
            message,
            next_step,
        })
    }
}

pub(crate) struct ServiceStack {
    pub(crate) diagnosis: Arc<DiagnosisService>,
    pub(crate) quests: Arc<QuestService>,
    pub(crate) directory: Arc<InMemoryClientDirectory>,
    pub(crate) notifications: Arc<InMemoryNotificationSink>,
}

/// Wire the in-memory infrastructure behind the two core services. The
/// health index goes through the failover composite so this deployment runs
/// the same write path as one with a real primary and fallback tier.
pub(crate) fn build_service_stack(
    oracle: Arc<dyn CoachingOracle>,
    session_ttl: Duration,
) -> ServiceStack {
    let directory = Arc::new(InMemoryClientDirectory::default());
    let health: Arc<dyn HealthIndexStore> = Arc::new(FailoverHealthStore::new(
        Arc::new(InMemoryHealthIndexStore::default()),
        Arc::new(InMemoryHealthIndexStore::default()),
    ));
    let repository = Arc::new(InMemoryQuestRepository::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());

    let diagnosis = Arc::new(DiagnosisService::new(
        DiagnosisBattery::standard(),
        session_ttl,
        directory.clone(),
        health.clone(),
    ));
    let quests = Arc::new(QuestService::new(
        repository,
        directory.clone(),
        health,
        notifications.clone(),
        oracle,
    ));

    ServiceStack {
        diagnosis,
        quests,
        directory,
        notifications,
    }
}

pub(crate) fn seed_demo_client(directory: &InMemoryClientDirectory) -> ClientId {
    let client = ClientId("vip-demo-001".to_string());
    directory.register(ClientProfile {
        id: client.clone(),
        name: "Alex Morgan".to_string(),
        agent_id: AgentId("agent-demo-001".to_string()),
    });
    client
}

/// Scripted survey answers for the demo: a weak asset axis, a strong network
/// axis, everything else second tier.
pub(crate) fn demo_choice_for(axis: Axis, choices: &[String]) -> Option<String> {
    let tier = match axis {
        Axis::AssetStability => 0,
        Axis::NetworkPower => 3,
        _ => 1,
    };
    choices.get(tier).cloned()
}
