use super::aggregate::aggregate;
use super::battery::DiagnosisBattery;
use super::scoring::AnswerValue;
use super::session::SessionStore;
use crate::workflows::clients::{ClientDirectory, ClientId, ClientProfile, DirectoryError};
use crate::workflows::health::{HealthIndexStore, HealthSnapshot, HealthStoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Orchestrates the survey flow: session capture, aggregation, and the health
/// index upsert. Scoring anomalies never surface from here; only missing
/// clients and exhausted persistence do.
pub struct DiagnosisService {
    battery: DiagnosisBattery,
    sessions: SessionStore,
    directory: Arc<dyn ClientDirectory>,
    health: Arc<dyn HealthIndexStore>,
}

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Health(#[from] HealthStoreError),
}

impl DiagnosisService {
    pub fn new(
        battery: DiagnosisBattery,
        session_ttl: Duration,
        directory: Arc<dyn ClientDirectory>,
        health: Arc<dyn HealthIndexStore>,
    ) -> Self {
        Self {
            battery,
            sessions: SessionStore::new(session_ttl),
            directory,
            health,
        }
    }

    fn require_client(&self, id: &ClientId) -> Result<ClientProfile, DiagnosisError> {
        self.directory
            .lookup(id)?
            .ok_or_else(|| DiagnosisError::ClientNotFound(id.clone()))
    }

    /// Open a diagnosis for the client. The diagnosis id is the client id;
    /// the handle exists so the API layer never invents its own convention.
    pub fn start(&self, client: &ClientId) -> Result<ClientId, DiagnosisError> {
        self.require_client(client)?;
        Ok(client.clone())
    }

    pub fn battery(&self) -> &DiagnosisBattery {
        &self.battery
    }

    /// Stash one answer in the client's session. Unknown question ids are
    /// accepted and simply never scored.
    pub fn record_answer(&self, client: &ClientId, question_id: String, value: AnswerValue) {
        self.sessions.record(client, question_id, value);
    }

    /// Close the survey: aggregate whatever answers the session holds and
    /// overwrite the client's health index. The session is consumed either
    /// way; a lost write means the client redoes the survey.
    pub fn complete(&self, client: &ClientId) -> Result<HealthSnapshot, DiagnosisError> {
        self.require_client(client)?;

        let answers = self.sessions.take(client);
        let answered = answers.len();
        let snapshot = aggregate(&self.battery, &answers);
        self.health.upsert(client, &snapshot)?;

        info!(
            %client,
            answered,
            overall = snapshot.overall,
            "diagnosis completed and health index updated"
        );

        Ok(snapshot)
    }

    /// Latest snapshot for dashboards; clients with no diagnosis yet read as
    /// all-neutral rather than missing.
    pub fn dashboard(&self, client: &ClientId) -> Result<HealthSnapshot, DiagnosisError> {
        Ok(self.health.latest(client)?.unwrap_or_else(HealthSnapshot::neutral))
    }
}
