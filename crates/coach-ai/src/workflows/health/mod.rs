//! The persisted six-axis health index: one current snapshot per client,
//! upsert semantics, with a primary/fallback write path so a flaky primary
//! store degrades the diagnosis flow instead of failing it.

use crate::workflows::clients::ClientId;
use crate::workflows::diagnosis::axis::Axis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

/// Default axis value when a client has no stored snapshot.
pub const NEUTRAL_AXIS_SCORE: i32 = 50;

/// Point-in-time six-axis score set plus the overall mean. Overwritten on
/// every diagnosis completion; not a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub axes: BTreeMap<Axis, i32>,
    pub overall: i32,
}

impl HealthSnapshot {
    /// Snapshot with every axis at the neutral midpoint.
    pub fn neutral() -> Self {
        Self::from_axes(Axis::ALL.iter().map(|axis| (*axis, NEUTRAL_AXIS_SCORE)).collect())
    }

    /// Build a snapshot from per-axis scores, deriving the overall mean.
    pub fn from_axes(axes: BTreeMap<Axis, i32>) -> Self {
        let overall = if axes.is_empty() {
            NEUTRAL_AXIS_SCORE
        } else {
            let sum: f64 = axes.values().map(|value| f64::from(*value)).sum();
            (sum / axes.len() as f64).round() as i32
        };
        Self { axes, overall }
    }

    pub fn score(&self, axis: Axis) -> i32 {
        self.axes.get(&axis).copied().unwrap_or(NEUTRAL_AXIS_SCORE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HealthStoreError {
    #[error("health index store unavailable: {0}")]
    Unavailable(String),
    #[error("health index write lost for client {0}")]
    WriteLost(ClientId),
}

/// Storage abstraction for the current-snapshot table.
pub trait HealthIndexStore: Send + Sync {
    fn upsert(&self, client: &ClientId, snapshot: &HealthSnapshot) -> Result<(), HealthStoreError>;
    fn latest(&self, client: &ClientId) -> Result<Option<HealthSnapshot>, HealthStoreError>;
}

/// Composite store: writes go to the primary, falling back to the secondary
/// tier when the primary is unavailable. A fallback-tier write is reported as
/// success; losing both tiers is a logged data-loss event and an error.
pub struct FailoverHealthStore {
    primary: Arc<dyn HealthIndexStore>,
    fallback: Arc<dyn HealthIndexStore>,
}

impl FailoverHealthStore {
    pub fn new(primary: Arc<dyn HealthIndexStore>, fallback: Arc<dyn HealthIndexStore>) -> Self {
        Self { primary, fallback }
    }
}

impl HealthIndexStore for FailoverHealthStore {
    fn upsert(&self, client: &ClientId, snapshot: &HealthSnapshot) -> Result<(), HealthStoreError> {
        let primary_err = match self.primary.upsert(client, snapshot) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        warn!(%client, %primary_err, "primary health index write failed, using fallback tier");

        match self.fallback.upsert(client, snapshot) {
            Ok(()) => Ok(()),
            Err(fallback_err) => {
                error!(
                    %client,
                    %primary_err,
                    %fallback_err,
                    "health index write lost: primary and fallback both failed"
                );
                Err(HealthStoreError::WriteLost(client.clone()))
            }
        }
    }

    fn latest(&self, client: &ClientId) -> Result<Option<HealthSnapshot>, HealthStoreError> {
        match self.primary.latest(client) {
            Ok(Some(snapshot)) => Ok(Some(snapshot)),
            // The snapshot may live only in the fallback tier after a
            // degraded write.
            primary_result => match self.fallback.latest(client) {
                Ok(Some(snapshot)) => Ok(Some(snapshot)),
                Ok(None) => primary_result,
                Err(fallback_err) => match primary_result {
                    Ok(None) => Ok(None),
                    _ => Err(fallback_err),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<ClientId, HealthSnapshot>>,
        broken: AtomicBool,
    }

    impl MemoryStore {
        fn break_store(&self) {
            self.broken.store(true, Ordering::SeqCst);
        }
    }

    impl HealthIndexStore for MemoryStore {
        fn upsert(
            &self,
            client: &ClientId,
            snapshot: &HealthSnapshot,
        ) -> Result<(), HealthStoreError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(HealthStoreError::Unavailable("down for test".to_string()));
            }
            self.rows
                .lock()
                .expect("store mutex poisoned")
                .insert(client.clone(), snapshot.clone());
            Ok(())
        }

        fn latest(&self, client: &ClientId) -> Result<Option<HealthSnapshot>, HealthStoreError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(HealthStoreError::Unavailable("down for test".to_string()));
            }
            Ok(self
                .rows
                .lock()
                .expect("store mutex poisoned")
                .get(client)
                .cloned())
        }
    }

    fn snapshot_with_overall(overall: i32) -> HealthSnapshot {
        let mut snapshot = HealthSnapshot::neutral();
        snapshot.overall = overall;
        snapshot
    }

    #[test]
    fn neutral_snapshot_scores_fifty_everywhere() {
        let snapshot = HealthSnapshot::neutral();
        for axis in Axis::ALL {
            assert_eq!(snapshot.score(axis), 50);
        }
        assert_eq!(snapshot.overall, 50);
    }

    #[test]
    fn upsert_prefers_primary() {
        let primary = Arc::new(MemoryStore::default());
        let fallback = Arc::new(MemoryStore::default());
        let store = FailoverHealthStore::new(primary.clone(), fallback.clone());
        let client = ClientId("vip-1".to_string());

        store
            .upsert(&client, &HealthSnapshot::neutral())
            .expect("write succeeds");

        assert!(primary.latest(&client).expect("read").is_some());
        assert!(fallback.latest(&client).expect("read").is_none());
    }

    #[test]
    fn degraded_write_lands_in_fallback_and_reads_back() {
        let primary = Arc::new(MemoryStore::default());
        let fallback = Arc::new(MemoryStore::default());
        let store = FailoverHealthStore::new(primary.clone(), fallback.clone());
        let client = ClientId("vip-1".to_string());

        primary.break_store();
        store
            .upsert(&client, &snapshot_with_overall(72))
            .expect("degraded write still succeeds");

        assert_eq!(
            store.latest(&client).expect("read").map(|s| s.overall),
            Some(72)
        );
    }

    #[test]
    fn losing_both_tiers_is_an_error() {
        let primary = Arc::new(MemoryStore::default());
        let fallback = Arc::new(MemoryStore::default());
        let store = FailoverHealthStore::new(primary.clone(), fallback.clone());
        let client = ClientId("vip-1".to_string());

        primary.break_store();
        fallback.break_store();

        assert!(matches!(
            store.upsert(&client, &HealthSnapshot::neutral()),
            Err(HealthStoreError::WriteLost(_))
        ));
    }

    #[test]
    fn missing_row_reads_as_none() {
        let store = FailoverHealthStore::new(
            Arc::new(MemoryStore::default()),
            Arc::new(MemoryStore::default()),
        );
        assert!(store
            .latest(&ClientId("nobody".to_string()))
            .expect("read")
            .is_none());
    }
}
