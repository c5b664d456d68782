use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for VIP clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the coaching agent managing a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The slice of a client account the core workflows need: a display name for
/// oracle prompts and the owning agent for quest attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: ClientId,
    pub name: String,
    pub agent_id: AgentId,
}

/// Lookup abstraction over the account store, so the engine never touches the
/// multi-tenant admin data model directly.
pub trait ClientDirectory: Send + Sync {
    fn lookup(&self, id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("client directory unavailable: {0}")]
    Unavailable(String),
}
