//! Queue service: the entry point the request layer calls into.
//!
//! Wraps the allocator, dispatcher and mutator with authorization checks, the
//! per-room lock, ticket id generation, logging and metrics.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::dispatcher::{self, DispatchPolicy};
use super::ids::{with_unique_id, TicketIdSource, UuidTicketIds};
use super::{
    allocator, mutator, Counter, CounterId, QueueError, QueueStore, RoomId, RoomLocks, Ticket,
    TicketFilter, TicketId, WaitingRoom,
};
use crate::actor::{Actor, Capability};
use crate::config::QueueConfig;
use crate::metrics;

/// Queue operations over a store.
pub struct QueueService<S: QueueStore> {
    store: Arc<S>,
    locks: RoomLocks,
    ids: Box<dyn TicketIdSource>,
    config: QueueConfig,
}

impl<S: QueueStore> QueueService<S> {
    pub fn new(store: Arc<S>, config: QueueConfig) -> Self {
        Self {
            store,
            locks: RoomLocks::new(),
            ids: Box::new(UuidTicketIds),
            config,
        }
    }

    /// Replace the ticket id source.
    pub fn with_id_source(mut self, ids: impl TicketIdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            enforce_counter_busy: self.config.enforce_counter_busy,
        }
    }

    fn record<T>(
        operation: &'static str,
        f: impl FnOnce() -> Result<T, QueueError>,
    ) -> Result<T, QueueError> {
        let result = f();
        if let Err(ref e) = result {
            warn!(operation, error = %e, "Queue operation rejected");
            metrics::OPERATION_ERRORS
                .with_label_values(&[operation, e.kind()])
                .inc();
        }
        result
    }

    /// Room a ticket belongs to.
    ///
    /// Tickets never change rooms, so the value read outside the room lock stays
    /// valid. Operations re-read the ticket itself under the lock.
    fn ticket_room(&self, ticket: &TicketId) -> Result<RoomId, QueueError> {
        Ok(self.store.require_ticket(ticket)?.room_id)
    }

    /// Check that `actor` may work the queue of `room`.
    ///
    /// Holders of `manage-room` may work any room. Other staff must be assigned.
    fn authorize_room(&self, actor: &Actor, room: RoomId) -> Result<(), QueueError> {
        actor.require(Capability::ManageTicket)?;
        self.store.require_room(room)?;
        if actor.can(Capability::ManageRoom) {
            return Ok(());
        }
        if !self.store.room_staff(room)?.contains(&actor.user_id) {
            return Err(QueueError::NotAssigned {
                actor: actor.user_id.clone(),
                room,
            });
        }
        Ok(())
    }

    /// Like [`Self::authorize_room`] for the room `ticket` belongs to.
    fn authorize_ticket(&self, actor: &Actor, ticket: &TicketId) -> Result<RoomId, QueueError> {
        actor.require(Capability::ManageTicket)?;
        let room = self.ticket_room(ticket)?;
        self.authorize_room(actor, room)?;
        Ok(room)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    pub fn create_room(&self, actor: &Actor, name: &str) -> Result<WaitingRoom, QueueError> {
        Self::record("create_room", || {
            actor.require(Capability::ManageRoom)?;
            let room = self.store.create_room(name)?;
            info!(room = %room.id, name = %room.name, actor = %actor.user_id, "Waiting room created");
            Ok(room)
        })
    }

    pub fn rename_room(
        &self,
        actor: &Actor,
        room: RoomId,
        name: &str,
    ) -> Result<WaitingRoom, QueueError> {
        Self::record("rename_room", || {
            actor.require(Capability::ManageRoom)?;
            let renamed = self.store.rename_room(room, name)?;
            info!(room = %room, name = %renamed.name, actor = %actor.user_id, "Waiting room renamed");
            Ok(renamed)
        })
    }

    /// Remove a room with all of its counters and tickets.
    pub fn remove_room(&self, actor: &Actor, room: RoomId) -> Result<WaitingRoom, QueueError> {
        Self::record("remove_room", || {
            actor.require(Capability::ManageRoom)?;
            self.store.require_room(room)?;
            let removed = self
                .locks
                .with_room(room, || self.store.remove_room(room));
            self.locks.forget(room);
            let removed = removed?;
            info!(room = %room, actor = %actor.user_id, "Waiting room removed");
            Ok(removed)
        })
    }

    pub fn rooms(&self) -> Result<Vec<WaitingRoom>, QueueError> {
        self.store.list_rooms()
    }

    /// Replace the staff assigned to `room`.
    pub fn assign_staff<I>(&self, actor: &Actor, room: RoomId, staff: I) -> Result<(), QueueError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::record("assign_staff", || {
            actor.require(Capability::ManageRoom)?;
            let staff: BTreeSet<String> = staff.into_iter().map(Into::into).collect();
            let assigned = staff.len();
            self.store.set_room_staff(room, staff)?;
            info!(room = %room, assigned, actor = %actor.user_id, "Room staff assigned");
            Ok(())
        })
    }

    pub fn room_staff(&self, room: RoomId) -> Result<BTreeSet<String>, QueueError> {
        self.store.require_room(room)?;
        self.store.room_staff(room)
    }

    pub fn add_counter(
        &self,
        actor: &Actor,
        room: RoomId,
        name: &str,
    ) -> Result<Counter, QueueError> {
        Self::record("add_counter", || {
            actor.require(Capability::ManageCounter)?;
            let counter = self.store.create_counter(room, name)?;
            info!(room = %room, counter = %counter.id, name = %counter.name, "Counter added");
            Ok(counter)
        })
    }

    pub fn rename_counter(
        &self,
        actor: &Actor,
        counter: CounterId,
        name: &str,
    ) -> Result<Counter, QueueError> {
        Self::record("rename_counter", || {
            actor.require(Capability::ManageCounter)?;
            let renamed = self.store.rename_counter(counter, name)?;
            info!(room = %renamed.room_id, counter = %counter, name = %renamed.name, "Counter renamed");
            Ok(renamed)
        })
    }

    /// Remove a counter. A ticket it was serving stays in service with no counter.
    pub fn remove_counter(&self, actor: &Actor, counter: CounterId) -> Result<Counter, QueueError> {
        Self::record("remove_counter", || {
            actor.require(Capability::ManageCounter)?;
            let room = self.store.require_counter(counter)?.room_id;
            let removed = self
                .locks
                .with_room(room, || self.store.remove_counter(counter))?;
            info!(room = %room, counter = %counter, "Counter removed");
            Ok(removed)
        })
    }

    pub fn counters(&self, room: RoomId) -> Result<Vec<Counter>, QueueError> {
        self.store.require_room(room)?;
        self.store.list_counters(room)
    }

    // =========================================================================
    // Customer operations
    // =========================================================================

    /// The position the next ticket issued in `room` would receive.
    pub fn allocate(&self, room: RoomId) -> Result<u32, QueueError> {
        Self::record("allocate", || {
            self.store.require_room(room)?;
            self.locks
                .with_room(room, || allocator::allocate(self.store.as_ref(), room))
        })
    }

    /// Issue a new ticket at the first free position of `room`.
    pub fn issue_ticket(&self, room: RoomId) -> Result<Ticket, QueueError> {
        Self::record("issue_ticket", || {
            self.store.require_room(room)?;
            let store = self.store.as_ref();
            let ticket = self.locks.with_room(room, || {
                with_unique_id(
                    store,
                    self.ids.as_ref(),
                    self.config.max_id_attempts,
                    |id| mutator::create(store, room, id),
                )
            })?;
            metrics::TICKETS_ISSUED.inc();
            metrics::ALLOCATED_POSITION
                .with_label_values(&["issue"])
                .observe(ticket.position as f64);
            Ok(ticket)
        })
    }

    pub fn ticket(&self, id: &TicketId) -> Result<Ticket, QueueError> {
        self.store.require_ticket(id)
    }

    /// Customer cancellation. The ticket is removed whatever its state.
    pub fn cancel(&self, id: &TicketId) -> Result<Ticket, QueueError> {
        Self::record("cancel", || {
            let room = self.ticket_room(id)?;
            self.remove(room, id, "customer")
        })
    }

    fn remove(&self, room: RoomId, id: &TicketId, by: &'static str) -> Result<Ticket, QueueError> {
        let removed = self
            .locks
            .with_room(room, || mutator::cancel(self.store.as_ref(), id))?;
        metrics::CANCELLATIONS
            .with_label_values(&[removed.status().state_type(), by])
            .inc();
        Ok(removed)
    }

    // =========================================================================
    // Staff operations
    // =========================================================================

    /// All tickets of a room: waiting ones by position, then those in service.
    pub fn room_queue(&self, actor: &Actor, room: RoomId) -> Result<Vec<Ticket>, QueueError> {
        Self::record("room_queue", || {
            self.authorize_room(actor, room)?;
            self.store.list_tickets(room, &TicketFilter::new())
        })
    }

    /// Call the next waiting ticket of `room` to `counter`.
    pub fn dispatch_next(
        &self,
        actor: &Actor,
        room: RoomId,
        counter: CounterId,
    ) -> Result<Option<Ticket>, QueueError> {
        let result = self.authorize_room(actor, room).and_then(|()| {
            self.locks.with_room(room, || {
                dispatcher::dispatch_next(self.store.as_ref(), room, counter, self.dispatch_policy())
            })
        });

        let label = match &result {
            Ok(Some(_)) => "served",
            Ok(None) => "idle",
            Err(_) => "rejected",
        };
        metrics::DISPATCHES.with_label_values(&[label]).inc();
        Self::record("dispatch_next", || result)
    }

    /// Staff removal of a ticket in any state.
    pub fn remove_ticket(&self, actor: &Actor, id: &TicketId) -> Result<Ticket, QueueError> {
        Self::record("remove_ticket", || {
            let room = self.authorize_ticket(actor, id)?;
            self.remove(room, id, "staff")
        })
    }

    /// Return an in-service ticket to the queue at the lowest free position.
    pub fn move_back(&self, actor: &Actor, id: &TicketId) -> Result<Ticket, QueueError> {
        Self::record("move_back", || {
            let room = self.authorize_ticket(actor, id)?;
            let ticket = self
                .locks
                .with_room(room, || mutator::move_back(self.store.as_ref(), id))?;
            metrics::MOVED_BACK.inc();
            metrics::ALLOCATED_POSITION
                .with_label_values(&["move_back"])
                .observe(ticket.position as f64);
            Ok(ticket)
        })
    }

    /// Take a waiting ticket out of the queue without assigning a counter.
    pub fn move_forward(&self, actor: &Actor, id: &TicketId) -> Result<Ticket, QueueError> {
        Self::record("move_forward", || {
            let room = self.authorize_ticket(actor, id)?;
            let ticket = self
                .locks
                .with_room(room, || mutator::move_forward(self.store.as_ref(), id))?;
            metrics::MOVED_FORWARD.inc();
            Ok(ticket)
        })
    }
}
