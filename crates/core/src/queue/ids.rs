//! Ticket identifier generation.

use tracing::warn;
use uuid::Uuid;

use super::{QueueError, QueueStore, TicketId};

/// Source of candidate ticket IDs. Candidates are checked for uniqueness by the caller.
pub trait TicketIdSource: Send + Sync {
    fn candidate(&self) -> TicketId;
}

/// Random UUID v4 ticket IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTicketIds;

impl TicketIdSource for UuidTicketIds {
    fn candidate(&self) -> TicketId {
        TicketId::new(Uuid::new_v4().to_string())
    }
}

/// Draw candidates from `source` and hand the first unused one to `insert`.
///
/// A candidate counts as a collision when it is already in `store`, or when
/// `insert` fails with `DuplicateTicket` because another room claimed it after
/// the lookup. Gives up with `IdExhausted` after `max_attempts` collisions.
pub fn with_unique_id<S, T>(
    store: &S,
    source: &dyn TicketIdSource,
    max_attempts: u32,
    mut insert: impl FnMut(TicketId) -> Result<T, QueueError>,
) -> Result<T, QueueError>
where
    S: QueueStore + ?Sized,
{
    for attempt in 1..=max_attempts {
        let candidate = source.candidate();
        if store.ticket_exists(&candidate)? {
            warn!(attempt, ticket = %candidate, "Ticket id collision, regenerating");
            continue;
        }
        match insert(candidate) {
            Err(QueueError::DuplicateTicket(id)) => {
                warn!(attempt, ticket = %id, "Ticket id claimed concurrently, regenerating");
            }
            result => return result,
        }
    }
    Err(QueueError::IdExhausted(max_attempts))
}
