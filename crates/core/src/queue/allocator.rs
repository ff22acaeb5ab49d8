//! First-fit position allocation.
//!
//! Positions are dense: the allocator hands out the smallest positive integer
//! no waiting ticket holds, so a slot freed by a cancellation or a dispatch is
//! reused by the next ticket that enters the queue.

use std::collections::HashSet;

use tracing::debug;

use super::{QueueError, QueueStore, RoomId, Ticket};

/// Smallest position >= 1 not held by any waiting ticket in `tickets`.
///
/// In-service tickets are ignored; their positions are frozen and no longer
/// part of the queue.
pub fn first_free_position<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> u32 {
    let taken: HashSet<u32> = tickets
        .into_iter()
        .filter(|ticket| ticket.is_waiting())
        .map(|ticket| ticket.position)
        .collect();

    // With n positions taken, one of 1..=n+1 is always free.
    let upper = taken.len() as u32 + 1;
    (1..=upper)
        .find(|position| !taken.contains(position))
        .unwrap_or(upper)
}

/// Compute the position a new or re-queued ticket in `room` would receive.
///
/// Pure read. Callers must hold the room lock until the ticket carrying the
/// returned position is saved.
pub fn allocate<S: QueueStore + ?Sized>(store: &S, room: RoomId) -> Result<u32, QueueError> {
    store.require_room(room)?;
    let waiting = store.waiting_tickets(room)?;
    let position = first_free_position(&waiting);
    debug!(
        room = %room,
        waiting = waiting.len(),
        position,
        "Allocated queue position"
    );
    Ok(position)
}
