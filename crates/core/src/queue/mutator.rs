//! Ticket state transitions.
//!
//! ```text
//!   create ──▶ WAITING(position) ──dispatch──▶ IN_SERVICE(counter, frozen position)
//!                 │    ▲                           │
//!                 │    └──────── move back ────────┘
//!                 │
//!                 └── cancel ──▶ removed ◀── cancel ──
//! ```
//!
//! The `begin_service`/`flag_in_service`/`requeue` functions only rewrite the
//! ticket value; the store-level functions read, transition and save, and must
//! run under the room lock.

use chrono::Utc;
use tracing::info;

use super::{allocator, CounterId, QueueError, QueueStore, RoomId, Ticket, TicketId};

fn invalid_state(ticket: &Ticket, operation: &str) -> QueueError {
    QueueError::InvalidState {
        ticket_id: ticket.id.clone(),
        current_state: ticket.status().state_type().to_string(),
        operation: operation.to_string(),
    }
}

/// WAITING -> IN_SERVICE at `counter`. The position is frozen as-is.
pub fn begin_service(ticket: &mut Ticket, counter: CounterId) -> Result<(), QueueError> {
    if !ticket.is_waiting() {
        return Err(invalid_state(ticket, "dispatch"));
    }
    ticket.in_service = true;
    ticket.counter = Some(counter);
    ticket.updated_at = Utc::now();
    Ok(())
}

/// WAITING -> in service with no counter attached.
///
/// Move-forward does not reorder the queue: the ticket leaves the waiting set
/// and its position is frozen, same as a dispatch with no counter.
pub fn flag_in_service(ticket: &mut Ticket) -> Result<(), QueueError> {
    if !ticket.is_waiting() {
        return Err(invalid_state(ticket, "move forward"));
    }
    ticket.in_service = true;
    ticket.counter = None;
    ticket.updated_at = Utc::now();
    Ok(())
}

/// IN_SERVICE -> WAITING at `position`.
pub fn requeue(ticket: &mut Ticket, position: u32) -> Result<(), QueueError> {
    if ticket.is_waiting() {
        return Err(invalid_state(ticket, "move back"));
    }
    ticket.in_service = false;
    ticket.counter = None;
    ticket.position = position;
    ticket.updated_at = Utc::now();
    Ok(())
}

/// Issue a new waiting ticket with id `id` at the first free position of `room`.
pub fn create<S: QueueStore + ?Sized>(
    store: &S,
    room: RoomId,
    id: TicketId,
) -> Result<Ticket, QueueError> {
    let position = allocator::allocate(store, room)?;
    let ticket = Ticket::new(id, room, position);
    store.insert_ticket(&ticket)?;
    info!(room = %room, ticket = %ticket.id, position, "Ticket issued");
    Ok(ticket)
}

/// Remove a ticket in any state, releasing its position.
///
/// An in-service ticket has its counter reference cleared before removal.
pub fn cancel<S: QueueStore + ?Sized>(store: &S, id: &TicketId) -> Result<Ticket, QueueError> {
    let mut ticket = store.require_ticket(id)?;
    if ticket.counter.is_some() {
        ticket.counter = None;
        ticket.updated_at = Utc::now();
        store.save_ticket(&ticket)?;
    }
    let removed = store.delete_ticket(id)?;
    info!(
        room = %removed.room_id,
        ticket = %removed.id,
        state = removed.status().state_type(),
        position = removed.position,
        "Ticket cancelled"
    );
    Ok(removed)
}

/// Put an in-service ticket back into the queue at the lowest free position.
pub fn move_back<S: QueueStore + ?Sized>(store: &S, id: &TicketId) -> Result<Ticket, QueueError> {
    let mut ticket = store.require_ticket(id)?;
    if ticket.is_waiting() {
        return Err(invalid_state(&ticket, "move back"));
    }
    let previous = ticket.position;
    let position = allocator::allocate(store, ticket.room_id)?;
    requeue(&mut ticket, position)?;
    store.save_ticket(&ticket)?;
    info!(
        room = %ticket.room_id,
        ticket = %ticket.id,
        previous,
        position,
        "Ticket moved back into the queue"
    );
    Ok(ticket)
}

/// Take a waiting ticket out of the queue without assigning a counter.
pub fn move_forward<S: QueueStore + ?Sized>(
    store: &S,
    id: &TicketId,
) -> Result<Ticket, QueueError> {
    let mut ticket = store.require_ticket(id)?;
    flag_in_service(&mut ticket)?;
    store.save_ticket(&ticket)?;
    info!(
        room = %ticket.room_id,
        ticket = %ticket.id,
        position = ticket.position,
        "Ticket moved forward"
    );
    Ok(ticket)
}
