//! Errors surfaced by queue operations.

use std::fmt;

use thiserror::Error;

use super::{CounterId, RoomId, TicketId};
use crate::actor::Capability;

/// Kind of entity an id failed to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Room,
    Counter,
    Ticket,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Room => "Waiting room",
            EntityKind::Counter => "Counter",
            EntityKind::Ticket => "Ticket",
        };
        f.write_str(name)
    }
}

/// Error type for queue operations. Every variant is recoverable.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Cannot {operation} ticket {ticket_id}: current state is {current_state}")]
    InvalidState {
        ticket_id: TicketId,
        current_state: String,
        operation: String,
    },

    #[error("Counter {counter} does not belong to waiting room {room}")]
    CounterNotInRoom { counter: CounterId, room: RoomId },

    #[error("Counter {counter} is already serving ticket {ticket_id}")]
    CounterBusy {
        counter: CounterId,
        ticket_id: TicketId,
    },

    #[error("Ticket already exists: {0}")]
    DuplicateTicket(TicketId),

    #[error("{actor} is not assigned to waiting room {room}")]
    NotAssigned { actor: String, room: RoomId },

    #[error("{actor} is missing the {capability} capability")]
    Forbidden {
        actor: String,
        capability: Capability,
    },

    #[error("Could not generate a unique ticket id after {0} attempts")]
    IdExhausted(u32),

    #[error("Store error: {0}")]
    Store(String),
}

impl QueueError {
    pub fn room_not_found(id: RoomId) -> Self {
        QueueError::NotFound {
            kind: EntityKind::Room,
            id: id.to_string(),
        }
    }

    pub fn counter_not_found(id: CounterId) -> Self {
        QueueError::NotFound {
            kind: EntityKind::Counter,
            id: id.to_string(),
        }
    }

    pub fn ticket_not_found(id: &TicketId) -> Self {
        QueueError::NotFound {
            kind: EntityKind::Ticket,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QueueError::NotFound { .. })
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::NotFound { .. } => "not_found",
            QueueError::InvalidState { .. } => "invalid_state",
            QueueError::CounterNotInRoom { .. } => "counter_not_in_room",
            QueueError::CounterBusy { .. } => "counter_busy",
            QueueError::DuplicateTicket(_) => "duplicate_ticket",
            QueueError::NotAssigned { .. } => "not_assigned",
            QueueError::Forbidden { .. } => "forbidden",
            QueueError::IdExhausted(_) => "id_exhausted",
            QueueError::Store(_) => "store",
        }
    }
}
