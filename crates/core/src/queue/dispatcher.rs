//! Picks the next waiting ticket for a counter.

use tracing::{debug, info};

use super::{mutator, CounterId, QueueError, QueueStore, RoomId, Ticket, TicketFilter};

/// The waiting ticket with the lowest position, if any.
pub fn select_next(tickets: &[Ticket]) -> Option<&Ticket> {
    tickets
        .iter()
        .filter(|ticket| ticket.is_waiting())
        .min_by_key(|ticket| ticket.position)
}

/// Options that change how a dispatch is validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchPolicy {
    /// Reject the call when the counter already has a ticket in service.
    pub enforce_counter_busy: bool,
}

/// Call the next ticket of `room` to `counter`.
///
/// Returns `Ok(None)` and leaves the room untouched when nobody is waiting.
/// Callers must hold the room lock.
pub fn dispatch_next<S: QueueStore + ?Sized>(
    store: &S,
    room: RoomId,
    counter: CounterId,
    policy: DispatchPolicy,
) -> Result<Option<Ticket>, QueueError> {
    store.require_room(room)?;
    let counter = store.require_counter(counter)?;
    if counter.room_id != room {
        return Err(QueueError::CounterNotInRoom {
            counter: counter.id,
            room,
        });
    }

    if policy.enforce_counter_busy {
        let serving = store.list_tickets(
            room,
            &TicketFilter::new()
                .with_in_service(true)
                .with_counter(counter.id),
        )?;
        if let Some(current) = serving.into_iter().next() {
            return Err(QueueError::CounterBusy {
                counter: counter.id,
                ticket_id: current.id,
            });
        }
    }

    let waiting = store.waiting_tickets(room)?;
    let Some(next) = select_next(&waiting) else {
        debug!(room = %room, counter = %counter.id, "No waiting tickets to dispatch");
        return Ok(None);
    };

    let mut ticket = next.clone();
    mutator::begin_service(&mut ticket, counter.id)?;
    store.save_ticket(&ticket)?;

    info!(
        room = %room,
        counter = %counter.id,
        ticket = %ticket.id,
        position = ticket.position,
        "Ticket called to counter"
    );
    Ok(Some(ticket))
}
