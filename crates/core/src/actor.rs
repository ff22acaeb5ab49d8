//! Who is invoking an operation, reduced to what they are allowed to do.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::queue::QueueError;

/// A single permission an actor may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create and remove waiting rooms.
    ManageRoom,
    /// Add and remove counters inside a room.
    ManageCounter,
    /// Dispatch, reposition and remove tickets on behalf of customers.
    ManageTicket,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ManageRoom => "manage-room",
            Capability::ManageCounter => "manage-counter",
            Capability::ManageTicket => "manage-ticket",
        };
        f.write_str(name)
    }
}

/// Authenticated caller as seen by the queue core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub capabilities: BTreeSet<Capability>,
}

impl Actor {
    pub fn new(
        user_id: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// Front-desk staff: works the queue but does not administer rooms.
    pub fn staff(user_id: impl Into<String>) -> Self {
        Self::new(user_id, [Capability::ManageTicket])
    }

    /// Holds every capability.
    pub fn superuser(user_id: impl Into<String>) -> Self {
        Self::new(
            user_id,
            [
                Capability::ManageRoom,
                Capability::ManageCounter,
                Capability::ManageTicket,
            ],
        )
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fails with `QueueError::Forbidden` unless the actor holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), QueueError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(QueueError::Forbidden {
                actor: self.user_id.clone(),
                capability,
            })
        }
    }
}
