//! Repository trait the queue core reads and writes through.

use std::collections::BTreeSet;

use super::{Counter, CounterId, QueueError, RoomId, Ticket, TicketId, WaitingRoom};

/// Filter for listing a room's tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// `Some(false)` for waiting tickets only, `Some(true)` for in-service only.
    pub in_service: Option<bool>,
    /// Only tickets served by this counter.
    pub counter: Option<CounterId>,
}

impl TicketFilter {
    /// Create a filter matching every ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets still waiting in the queue.
    pub fn waiting() -> Self {
        Self::new().with_in_service(false)
    }

    /// Filter by in-service flag.
    pub fn with_in_service(mut self, in_service: bool) -> Self {
        self.in_service = Some(in_service);
        self
    }

    /// Filter by serving counter.
    pub fn with_counter(mut self, counter: CounterId) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(in_service) = self.in_service {
            if ticket.in_service != in_service {
                return false;
            }
        }
        if let Some(counter) = self.counter {
            if ticket.counter != Some(counter) {
                return false;
            }
        }
        true
    }
}

/// Trait for queue storage backends.
///
/// Implementations must be internally synchronized. They are not expected to
/// enforce queue invariants; the allocator and mutator do that under a room lock.
pub trait QueueStore: Send + Sync {
    /// Create a new waiting room.
    fn create_room(&self, name: &str) -> Result<WaitingRoom, QueueError>;

    /// Get a waiting room by ID.
    fn get_room(&self, id: RoomId) -> Result<Option<WaitingRoom>, QueueError>;

    /// List all waiting rooms.
    fn list_rooms(&self) -> Result<Vec<WaitingRoom>, QueueError>;

    /// Rename a waiting room.
    fn rename_room(&self, id: RoomId, name: &str) -> Result<WaitingRoom, QueueError>;

    /// Remove a waiting room together with its counters, tickets and staff assignments.
    fn remove_room(&self, id: RoomId) -> Result<WaitingRoom, QueueError>;

    /// Replace the set of staff user IDs assigned to a room.
    fn set_room_staff(&self, room: RoomId, staff: BTreeSet<String>) -> Result<(), QueueError>;

    /// Staff user IDs assigned to a room.
    fn room_staff(&self, room: RoomId) -> Result<BTreeSet<String>, QueueError>;

    /// Create a counter in an existing room.
    fn create_counter(&self, room: RoomId, name: &str) -> Result<Counter, QueueError>;

    /// Get a counter by ID.
    fn get_counter(&self, id: CounterId) -> Result<Option<Counter>, QueueError>;

    /// List counters of a room.
    fn list_counters(&self, room: RoomId) -> Result<Vec<Counter>, QueueError>;

    /// Rename a counter.
    fn rename_counter(&self, id: CounterId, name: &str) -> Result<Counter, QueueError>;

    /// Remove a counter. Tickets it was serving keep existing with no counter.
    fn remove_counter(&self, id: CounterId) -> Result<Counter, QueueError>;

    /// List a room's tickets matching the filter, ordered by position.
    fn list_tickets(&self, room: RoomId, filter: &TicketFilter) -> Result<Vec<Ticket>, QueueError>;

    /// Get a ticket by ID.
    fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>, QueueError>;

    /// Insert a new ticket. Fails with `DuplicateTicket` if the ID is taken in any room.
    fn insert_ticket(&self, ticket: &Ticket) -> Result<(), QueueError>;

    /// Insert or replace a ticket.
    fn save_ticket(&self, ticket: &Ticket) -> Result<(), QueueError>;

    /// Permanently delete a ticket. Returns the deleted ticket.
    fn delete_ticket(&self, id: &TicketId) -> Result<Ticket, QueueError>;

    /// Waiting tickets of a room.
    fn waiting_tickets(&self, room: RoomId) -> Result<Vec<Ticket>, QueueError> {
        self.list_tickets(room, &TicketFilter::waiting())
    }

    /// Whether a ticket with this ID exists in any room.
    fn ticket_exists(&self, id: &TicketId) -> Result<bool, QueueError> {
        Ok(self.get_ticket(id)?.is_some())
    }

    /// Get a room or fail with `NotFound`.
    fn require_room(&self, id: RoomId) -> Result<WaitingRoom, QueueError> {
        self.get_room(id)?
            .ok_or_else(|| QueueError::room_not_found(id))
    }

    /// Get a counter or fail with `NotFound`.
    fn require_counter(&self, id: CounterId) -> Result<Counter, QueueError> {
        self.get_counter(id)?
            .ok_or_else(|| QueueError::counter_not_found(id))
    }

    /// Get a ticket or fail with `NotFound`.
    fn require_ticket(&self, id: &TicketId) -> Result<Ticket, QueueError> {
        self.get_ticket(id)?
            .ok_or_else(|| QueueError::ticket_not_found(id))
    }
}
