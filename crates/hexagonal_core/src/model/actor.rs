//! Acting identity passed through runners to policies and mediators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier of an acting user or service.
pub type ActorId = Uuid;

/// Role name granting policy bypass in `OwnerPolicy`.
pub const ADMIN_ROLE: &str = "admin";

/// Identity on whose behalf one pipeline invocation runs.
///
/// The pipeline itself never inspects roles; only policies do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub roles: BTreeSet<String>,
}

impl Actor {
    /// Creates an actor with a generated id and no roles.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates an actor with a caller-provided id and no roles.
    pub fn with_id(id: ActorId) -> Self {
        Self {
            id,
            roles: BTreeSet::new(),
        }
    }

    /// Adds one role and returns the actor.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}
