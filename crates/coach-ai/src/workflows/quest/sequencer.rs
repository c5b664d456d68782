use std::sync::atomic::{AtomicU64, Ordering};

use super::domain::{Quest, QuestId, QuestStatus};
use crate::workflows::clients::{AgentId, ClientId};
use crate::workflows::diagnosis::Axis;
use crate::workflows::health::HealthSnapshot;

static QUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_quest_id() -> QuestId {
    let id = QUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QuestId(format!("quest-{id:06}"))
}

/// Order the six axes weakest score first. The sort is stable and the input
/// follows `Axis::ALL`, so equal scores fall back to declaration order and
/// the plan is fully deterministic.
pub fn plan_order(snapshot: &HealthSnapshot) -> Vec<(Axis, i32)> {
    let mut pairs: Vec<(Axis, i32)> = Axis::ALL
        .iter()
        .map(|axis| (*axis, snapshot.score(*axis)))
        .collect();
    pairs.sort_by_key(|(_, score)| *score);
    pairs
}

/// Materialize the client's six quest records from a snapshot: order indices
/// 1..=6 ascending by score, only the first unlocked, all pending.
pub fn build_sequence(client: &ClientId, agent: &AgentId, snapshot: &HealthSnapshot) -> Vec<Quest> {
    plan_order(snapshot)
        .into_iter()
        .enumerate()
        .map(|(index, (axis, _))| {
            let order = index as u8 + 1;
            Quest {
                id: next_quest_id(),
                client_id: client.clone(),
                agent_id: agent.clone(),
                title: axis.quest_title().to_string(),
                axis,
                order,
                locked: order != 1,
                status: QuestStatus::Pending,
                checklist: None,
                submission: None,
                evaluation: None,
                completed_at: None,
            }
        })
        .collect()
}
