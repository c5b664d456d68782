//! Integration specifications for the quest progression engine: sequencing,
//! gating, oracle-driven evaluation, the unlock state machine, and the HTTP
//! surface. Scenarios drive everything through the public service facade so
//! the progression invariants are validated end to end.

mod common {
    use chrono::{DateTime, Utc};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use coach_ai::workflows::clients::{
        AgentId, ClientDirectory, ClientId, ClientProfile, DirectoryError,
    };
    use coach_ai::workflows::diagnosis::Axis;
    use coach_ai::workflows::health::{HealthIndexStore, HealthSnapshot, HealthStoreError};
    use coach_ai::workflows::quest::{
        Checklist, ChecklistRequest, ChecklistSubmission, CoachingOracle, Evaluation,
        EvaluationRequest, NotificationError, NotificationSink, OracleError, Quest, QuestId,
        QuestNotification, QuestRepository, QuestService, QuestStatus, RepositoryError,
    };

    #[derive(Default)]
    pub(super) struct MemoryQuestRepository {
        records: Mutex<HashMap<QuestId, Quest>>,
    }

    impl QuestRepository for MemoryQuestRepository {
        fn insert_sequence(&self, quests: Vec<Quest>) -> Result<usize, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if let Some(first) = quests.first() {
                if guard.values().any(|quest| quest.client_id == first.client_id) {
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
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn list_for_client(&self, client: &ClientId) -> Result<Vec<Quest>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            let mut quests: Vec<Quest> = guard
                .values()
                .filter(|quest| &quest.client_id == client)
                .cloned()
                .collect();
            quests.sort_by_key(|quest| quest.order);
            Ok(quests)
        }

        fn store_checklist(
            &self,
            id: &QuestId,
            checklist: Checklist,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
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
            let mut guard = self.records.lock().expect("lock");
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
            let mut guard = self.records.lock().expect("lock");
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
            let mut guard = self.records.lock().expect("lock");
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
    pub(super) struct MemoryDirectory {
        profiles: Mutex<HashMap<ClientId, ClientProfile>>,
    }

    impl MemoryDirectory {
        pub(super) fn register(&self, profile: ClientProfile) {
            self.profiles
                .lock()
                .expect("lock")
                .insert(profile.id.clone(), profile);
        }
    }

    impl ClientDirectory for MemoryDirectory {
        fn lookup(&self, id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError> {
            Ok(self.profiles.lock().expect("lock").get(id).cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryHealthStore {
        rows: Mutex<HashMap<ClientId, HealthSnapshot>>,
    }

    impl HealthIndexStore for MemoryHealthStore {
        fn upsert(
            &self,
            client: &ClientId,
            snapshot: &HealthSnapshot,
        ) -> Result<(), HealthStoreError> {
            self.rows
                .lock()
                .expect("lock")
                .insert(client.clone(), snapshot.clone());
            Ok(())
        }

        fn latest(&self, client: &ClientId) -> Result<Option<HealthSnapshot>, HealthStoreError> {
            Ok(self.rows.lock().expect("lock").get(client).cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct MemorySink {
        events: Mutex<Vec<QuestNotification>>,
    }

    impl MemorySink {
        pub(super) fn events(&self) -> Vec<QuestNotification> {
            self.events.lock().expect("lock").clone()
        }
    }

    impl NotificationSink for MemorySink {
        fn publish(&self, notification: QuestNotification) -> Result<(), NotificationError> {
            self.events.lock().expect("lock").push(notification);
            Ok(())
        }
    }

    fn canned_checklist(request: &ChecklistRequest) -> Checklist {
        Checklist {
            intro: format!("{} Focus", request.axis.label()),
            subtitle: "One honest look at where you stand.".to_string(),
            items: (1..=5)
                .map(|index| format!("Item {index} for {}", request.axis.label()))
                .collect(),
            min_checks: 3,
        }
    }

    fn counted_evaluation(request: &EvaluationRequest, passed: bool) -> Evaluation {
        Evaluation {
            passed,
            score: request.checked_count() as u32,
            total: request.items.len() as u32,
            message: "Good reflection on this area.".to_string(),
            next_step: if passed {
                "On to the next area.".to_string()
            } else {
                String::new()
            },
        }
    }

    /// Passes whenever the numeric bar is met.
    pub(super) struct PassingOracle;

    impl CoachingOracle for PassingOracle {
        fn generate_checklist(
            &self,
            request: &ChecklistRequest,
        ) -> Result<Checklist, OracleError> {
            Ok(canned_checklist(request))
        }

        fn evaluate_checklist(
            &self,
            request: &EvaluationRequest,
        ) -> Result<Evaluation, OracleError> {
            let passed = request.checked_count() as u32 >= request.min_checks;
            Ok(counted_evaluation(request, passed))
        }
    }

    /// Fails every submission even when the numeric bar is met: the oracle's
    /// verdict is authoritative, not derived from the score.
    pub(super) struct RefusingOracle;

    impl CoachingOracle for RefusingOracle {
        fn generate_checklist(
            &self,
            request: &ChecklistRequest,
        ) -> Result<Checklist, OracleError> {
            Ok(canned_checklist(request))
        }

        fn evaluate_checklist(
            &self,
            request: &EvaluationRequest,
        ) -> Result<Evaluation, OracleError> {
            Ok(counted_evaluation(request, false))
        }
    }

    /// Times out on every call.
    pub(super) struct BrokenOracle;

    impl CoachingOracle for BrokenOracle {
        fn generate_checklist(&self, _: &ChecklistRequest) -> Result<Checklist, OracleError> {
            Err(OracleError::Timeout)
        }

        fn evaluate_checklist(&self, _: &EvaluationRequest) -> Result<Evaluation, OracleError> {
            Err(OracleError::Timeout)
        }
    }

    pub(super) fn client() -> ClientId {
        ClientId("vip-1".to_string())
    }

    pub(super) struct Fixture {
        pub(super) service: Arc<QuestService>,
        pub(super) repository: Arc<MemoryQuestRepository>,
        pub(super) health: Arc<MemoryHealthStore>,
        pub(super) notifications: Arc<MemorySink>,
    }

    pub(super) fn build_fixture(oracle: Arc<dyn CoachingOracle>) -> Fixture {
        let repository = Arc::new(MemoryQuestRepository::default());
        let directory = Arc::new(MemoryDirectory::default());
        directory.register(ClientProfile {
            id: client(),
            name: "Taylor Reed".to_string(),
            agent_id: AgentId("agent-9".to_string()),
        });
        let health = Arc::new(MemoryHealthStore::default());
        let notifications = Arc::new(MemorySink::default());
        let service = Arc::new(QuestService::new(
            repository.clone(),
            directory,
            health.clone(),
            notifications.clone(),
            oracle,
        ));
        Fixture {
            service,
            repository,
            health,
            notifications,
        }
    }

    pub(super) fn seed_health(fixture: &Fixture, scores: &[(Axis, i32)]) {
        let snapshot = HealthSnapshot::from_axes(scores.iter().copied().collect::<BTreeMap<_, _>>());
        fixture
            .health
            .upsert(&client(), &snapshot)
            .expect("seed health");
    }

    /// Initialize the sequence (idempotently) and return the quest the
    /// client is currently working on.
    pub(super) fn current_quest(fixture: &Fixture) -> Quest {
        fixture.service.initialize(&client()).expect("initialize");
        fixture
            .service
            .current(&client())
            .expect("current")
            .expect("present")
    }

    /// The canonical-flow invariant: never more than one unlocked, incomplete
    /// quest per client.
    pub(super) fn assert_at_most_one_current(quests: &[Quest]) {
        let current = quests.iter().filter(|quest| quest.is_current()).count();
        assert!(current <= 1, "found {current} unlocked incomplete quests");
    }
}

mod sequencing {
    use super::common::*;
    use coach_ai::workflows::diagnosis::Axis;
    use coach_ai::workflows::quest::{QuestStatus, SequenceOutcome};
    use std::sync::Arc;

    #[test]
    fn weakest_axis_comes_first_and_is_the_only_unlocked_quest() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        seed_health(
            &fixture,
            &[
                (Axis::AssetStability, 20),
                (Axis::TimeIndependence, 90),
                (Axis::PhysicalCondition, 50),
                (Axis::EmotionalBalance, 50),
                (Axis::NetworkPower, 50),
                (Axis::SystemLeverage, 50),
            ],
        );

        let outcome = fixture.service.initialize(&client()).expect("initialize");
        assert_eq!(outcome, SequenceOutcome::Created(6));

        let quests = fixture.service.list(&client(), None).expect("list");
        assert_eq!(quests.len(), 6);

        assert_eq!(quests[0].axis, Axis::AssetStability);
        assert_eq!(quests[0].order, 1);
        assert!(!quests[0].locked);
        assert!(quests[1..].iter().all(|quest| quest.locked));

        // Highest score sequences last.
        assert_eq!(quests[5].axis, Axis::TimeIndependence);
        assert!(quests
            .iter()
            .all(|quest| quest.status == QuestStatus::Pending));
    }

    #[test]
    fn initialization_is_idempotent() {
        let fixture = build_fixture(Arc::new(PassingOracle));

        assert_eq!(
            fixture.service.initialize(&client()).expect("first"),
            SequenceOutcome::Created(6)
        );
        assert_eq!(
            fixture.service.initialize(&client()).expect("second"),
            SequenceOutcome::AlreadyInitialized
        );

        let quests = fixture.service.list(&client(), None).expect("list");
        assert_eq!(quests.len(), 6, "re-initialization must not duplicate quests");
    }

    #[test]
    fn missing_health_row_sequences_from_neutral_scores() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        fixture.service.initialize(&client()).expect("initialize");

        let quests = fixture.service.list(&client(), None).expect("list");
        let axes: Vec<Axis> = quests.iter().map(|quest| quest.axis).collect();
        assert_eq!(axes, Axis::ALL.to_vec(), "ties resolve in declaration order");
    }

    #[test]
    fn listing_auto_initializes_an_empty_sequence() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let quests = fixture.service.list(&client(), None).expect("list");
        assert_eq!(quests.len(), 6);
    }
}

mod gating {
    use super::common::*;
    use coach_ai::workflows::quest::{QuestRepository, QuestServiceError};
    use std::sync::Arc;

    #[test]
    fn generating_a_checklist_for_a_locked_quest_is_rejected_untouched() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let quests = fixture.service.list(&client(), None).expect("list");
        let locked = quests.iter().find(|quest| quest.locked).expect("locked quest");

        match fixture.service.generate_checklist(&locked.id) {
            Err(QuestServiceError::Locked(id)) => assert_eq!(id, locked.id),
            other => panic!("expected locked error, got {other:?}"),
        }

        let unchanged = fixture
            .repository
            .fetch(&locked.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(&unchanged, locked);
    }

    #[test]
    fn evaluating_a_locked_quest_is_rejected() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let quests = fixture.service.list(&client(), None).expect("list");
        let locked = quests.iter().find(|quest| quest.locked).expect("locked quest");

        assert!(matches!(
            fixture.service.evaluate(&locked.id, vec![0, 1, 2]),
            Err(QuestServiceError::Locked(_))
        ));
    }

    #[test]
    fn evaluating_before_generation_is_not_ready() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);

        match fixture.service.evaluate(&current.id, vec![0]) {
            Err(QuestServiceError::NotReady(id)) => assert_eq!(id, current.id),
            other => panic!("expected not-ready error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_quest_ids_are_not_found() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let ghost = coach_ai::workflows::quest::QuestId("quest-999999".to_string());
        assert!(matches!(
            fixture.service.generate_checklist(&ghost),
            Err(QuestServiceError::QuestNotFound(_))
        ));
    }

    #[test]
    fn oracle_outage_fails_cleanly_with_no_quest_mutation() {
        let fixture = build_fixture(Arc::new(BrokenOracle));
        let current = current_quest(&fixture);

        assert!(matches!(
            fixture.service.generate_checklist(&current.id),
            Err(QuestServiceError::Oracle(_))
        ));

        let unchanged = fixture
            .repository
            .fetch(&current.id)
            .expect("fetch")
            .expect("present");
        assert!(unchanged.checklist.is_none());
        assert!(unchanged.submission.is_none());
    }
}

mod progression {
    use super::common::*;
    use coach_ai::workflows::quest::{QuestRepository, QuestStatus};
    use std::sync::Arc;

    #[test]
    fn passing_the_first_quest_unlocks_exactly_the_second() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);

        fixture
            .service
            .generate_checklist(&current.id)
            .expect("generate");
        let evaluation = fixture
            .service
            .evaluate(&current.id, vec![0, 1, 2])
            .expect("evaluate");
        assert!(evaluation.passed);
        assert_eq!(evaluation.score, 3);

        let quests = fixture.service.list(&client(), None).expect("list");
        assert_eq!(quests[0].status, QuestStatus::Completed);
        assert!(quests[0].completed_at.is_some());
        assert!(!quests[1].locked);
        assert_eq!(quests[1].status, QuestStatus::Pending);
        assert!(quests[2..].iter().all(|quest| quest.locked));
        assert_at_most_one_current(&quests);

        let events = fixture.notifications.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].title.contains(&quests[0].title));
        assert_eq!(events[0].origin.0, "agent-9");
    }

    #[test]
    fn failed_evaluations_keep_history_but_do_not_unlock() {
        let fixture = build_fixture(Arc::new(RefusingOracle));
        let current = current_quest(&fixture);

        fixture
            .service
            .generate_checklist(&current.id)
            .expect("generate");
        // Meets the numeric bar, but the oracle's verdict is authoritative.
        let evaluation = fixture
            .service
            .evaluate(&current.id, vec![0, 1, 2, 3])
            .expect("evaluate");
        assert!(!evaluation.passed);
        assert_eq!(evaluation.score, 4);

        let stored = fixture
            .repository
            .fetch(&current.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.status, QuestStatus::Pending);
        assert_eq!(
            stored.submission.as_ref().map(|s| s.checked_count),
            Some(4)
        );
        assert!(stored.evaluation.is_some());

        let quests = fixture.service.list(&client(), None).expect("list");
        assert!(quests[1].locked);
        assert!(fixture.notifications.events().is_empty());
    }

    #[test]
    fn out_of_range_checks_are_ignored() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);

        fixture
            .service
            .generate_checklist(&current.id)
            .expect("generate");
        let evaluation = fixture
            .service
            .evaluate(&current.id, vec![0, 1, 2, 99, 2])
            .expect("evaluate");
        assert_eq!(evaluation.score, 3);

        let stored = fixture
            .repository
            .fetch(&current.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(
            stored.submission.as_ref().map(|s| s.checked_indices.clone()),
            Some(vec![0, 1, 2])
        );
    }

    #[test]
    fn completing_the_whole_sequence_is_terminal_without_error() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        fixture.service.initialize(&client()).expect("initialize");

        for expected_order in 1..=6u8 {
            let current = fixture
                .service
                .current(&client())
                .expect("current")
                .expect("a quest is always available until the sequence resolves");
            assert_eq!(current.order, expected_order);

            fixture
                .service
                .generate_checklist(&current.id)
                .expect("generate");
            let evaluation = fixture
                .service
                .evaluate(&current.id, vec![0, 1, 2])
                .expect("evaluate");
            assert!(evaluation.passed);

            let quests = fixture.service.list(&client(), None).expect("list");
            assert_at_most_one_current(&quests);
        }

        let quests = fixture.service.list(&client(), None).expect("list");
        assert!(quests
            .iter()
            .all(|quest| quest.status == QuestStatus::Completed));
        assert!(fixture
            .service
            .current(&client())
            .expect("current")
            .is_none());
        assert_eq!(fixture.notifications.events().len(), 6);
    }

    #[test]
    fn regeneration_replaces_the_stored_checklist() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);

        let first = fixture
            .service
            .generate_checklist(&current.id)
            .expect("generate");
        let second = fixture
            .service
            .generate_checklist(&current.id)
            .expect("regenerate");
        assert_eq!(first, second, "the stub oracle is deterministic");

        let stored = fixture
            .repository
            .fetch(&current.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.checklist, Some(second));
    }

    #[test]
    fn manual_completion_follows_the_same_unlock_path() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);

        let completed = fixture
            .service
            .complete_manual(&current.id)
            .expect("manual completion");
        assert_eq!(completed.status, QuestStatus::Completed);

        let quests = fixture.service.list(&client(), None).expect("list");
        assert!(!quests[1].locked);
        assert_eq!(fixture.notifications.events().len(), 1);

        // Repeating the override is a no-op, not a second notification.
        let again = fixture
            .service
            .complete_manual(&current.id)
            .expect("repeat completion");
        assert_eq!(again.status, QuestStatus::Completed);
        assert_eq!(fixture.notifications.events().len(), 1);
    }

    #[test]
    fn concurrent_evaluations_admit_exactly_one_completion() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);
        fixture
            .service
            .generate_checklist(&current.id)
            .expect("generate");

        let mut handles = Vec::new();
        for _ in 0..2 {
            let service = fixture.service.clone();
            let id = current.id.clone();
            handles.push(std::thread::spawn(move || {
                service.evaluate(&id, vec![0, 1, 2]).expect("evaluate")
            }));
        }
        for handle in handles {
            let evaluation = handle.join().expect("thread");
            assert!(evaluation.passed);
        }

        let quests = fixture.service.list(&client(), None).expect("list");
        assert_eq!(quests[0].status, QuestStatus::Completed);
        assert!(!quests[1].locked);
        assert!(quests[2..].iter().all(|quest| quest.locked));
        assert_at_most_one_current(&quests);
        assert_eq!(
            fixture.notifications.events().len(),
            1,
            "the completion notification must not double-fire"
        );
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use coach_ai::workflows::quest::quest_router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn listing_over_http_auto_initializes() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let router = quest_router(fixture.service.clone());

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/clients/vip-1/quests")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        let quests = payload.as_array().expect("array");
        assert_eq!(quests.len(), 6);
        assert_eq!(quests[0].get("quest_order"), Some(&json!(1)));
        assert_eq!(quests[0].get("is_locked"), Some(&json!(false)));
        assert_eq!(quests[1].get("is_locked"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn repeated_init_reports_already_initialized() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let router = quest_router(fixture.service.clone());

        let first = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/clients/vip-1/quests/init")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/clients/vip-1/quests/init")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(second.status(), StatusCode::OK);
        let payload = read_json(second).await;
        assert_eq!(
            payload.get("message"),
            Some(&json!("Quests already initialized"))
        );
    }

    #[tokio::test]
    async fn generating_for_a_locked_quest_returns_forbidden() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let quests = fixture.service.list(&client(), None).expect("list");
        let locked = quests.iter().find(|quest| quest.locked).expect("locked");
        let router = quest_router(fixture.service.clone());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/quests/{}/checklist", locked.id.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn evaluating_without_a_checklist_returns_bad_request() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);
        let router = quest_router(fixture.service.clone());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/quests/{}/evaluate", current.id.0))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "checked_indices": [0, 1, 2] }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluation_over_http_completes_and_unlocks() {
        let fixture = build_fixture(Arc::new(PassingOracle));
        let current = current_quest(&fixture);
        let router = quest_router(fixture.service.clone());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/quests/{}/checklist", current.id.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let checklist = read_json(response).await;
        assert!(checklist.get("items").and_then(Value::as_array).is_some());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/quests/{}/evaluate", current.id.0))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "checked_indices": [0, 1, 2] }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let evaluation = read_json(response).await;
        assert_eq!(evaluation.get("passed"), Some(&json!(true)));

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/clients/vip-1/quests/current")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload.get("quest_order"), Some(&json!(2)));
    }
}
