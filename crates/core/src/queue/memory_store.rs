//! In-process queue store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{
    Counter, CounterId, QueueError, QueueStore, RoomId, Ticket, TicketFilter, TicketId,
    WaitingRoom,
};

#[derive(Default)]
struct Inner {
    last_room_id: u64,
    last_counter_id: u64,
    rooms: BTreeMap<RoomId, WaitingRoom>,
    counters: BTreeMap<CounterId, Counter>,
    tickets: HashMap<TicketId, Ticket>,
    staff: BTreeMap<RoomId, BTreeSet<String>>,
}

/// Memory-backed queue store. Room and counter IDs are assigned sequentially from 1.
#[derive(Default)]
pub struct MemoryQueueStore {
    inner: Mutex<Inner>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, QueueError> {
        self.inner
            .lock()
            .map_err(|_| QueueError::Store("memory store lock poisoned".to_string()))
    }
}

impl QueueStore for MemoryQueueStore {
    fn create_room(&self, name: &str) -> Result<WaitingRoom, QueueError> {
        let mut inner = self.lock()?;
        inner.last_room_id += 1;
        let room = WaitingRoom {
            id: RoomId(inner.last_room_id),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    fn get_room(&self, id: RoomId) -> Result<Option<WaitingRoom>, QueueError> {
        Ok(self.lock()?.rooms.get(&id).cloned())
    }

    fn list_rooms(&self) -> Result<Vec<WaitingRoom>, QueueError> {
        Ok(self.lock()?.rooms.values().cloned().collect())
    }

    fn rename_room(&self, id: RoomId, name: &str) -> Result<WaitingRoom, QueueError> {
        let mut inner = self.lock()?;
        let room = inner
            .rooms
            .get_mut(&id)
            .ok_or_else(|| QueueError::room_not_found(id))?;
        room.name = name.to_string();
        Ok(room.clone())
    }

    fn remove_room(&self, id: RoomId) -> Result<WaitingRoom, QueueError> {
        let mut inner = self.lock()?;
        let room = inner
            .rooms
            .remove(&id)
            .ok_or_else(|| QueueError::room_not_found(id))?;
        inner.counters.retain(|_, counter| counter.room_id != id);
        inner.tickets.retain(|_, ticket| ticket.room_id != id);
        inner.staff.remove(&id);
        Ok(room)
    }

    fn set_room_staff(&self, room: RoomId, staff: BTreeSet<String>) -> Result<(), QueueError> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains_key(&room) {
            return Err(QueueError::room_not_found(room));
        }
        if staff.is_empty() {
            inner.staff.remove(&room);
        } else {
            inner.staff.insert(room, staff);
        }
        Ok(())
    }

    fn room_staff(&self, room: RoomId) -> Result<BTreeSet<String>, QueueError> {
        Ok(self.lock()?.staff.get(&room).cloned().unwrap_or_default())
    }

    fn create_counter(&self, room: RoomId, name: &str) -> Result<Counter, QueueError> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains_key(&room) {
            return Err(QueueError::room_not_found(room));
        }
        inner.last_counter_id += 1;
        let counter = Counter {
            id: CounterId(inner.last_counter_id),
            room_id: room,
            name: name.to_string(),
        };
        inner.counters.insert(counter.id, counter.clone());
        Ok(counter)
    }

    fn get_counter(&self, id: CounterId) -> Result<Option<Counter>, QueueError> {
        Ok(self.lock()?.counters.get(&id).cloned())
    }

    fn list_counters(&self, room: RoomId) -> Result<Vec<Counter>, QueueError> {
        Ok(self
            .lock()?
            .counters
            .values()
            .filter(|counter| counter.room_id == room)
            .cloned()
            .collect())
    }

    fn rename_counter(&self, id: CounterId, name: &str) -> Result<Counter, QueueError> {
        let mut inner = self.lock()?;
        let counter = inner
            .counters
            .get_mut(&id)
            .ok_or_else(|| QueueError::counter_not_found(id))?;
        counter.name = name.to_string();
        Ok(counter.clone())
    }

    fn remove_counter(&self, id: CounterId) -> Result<Counter, QueueError> {
        let mut inner = self.lock()?;
        let counter = inner
            .counters
            .remove(&id)
            .ok_or_else(|| QueueError::counter_not_found(id))?;
        let now = Utc::now();
        for ticket in inner.tickets.values_mut() {
            if ticket.counter == Some(id) {
                ticket.counter = None;
                ticket.updated_at = now;
            }
        }
        Ok(counter)
    }

    fn list_tickets(&self, room: RoomId, filter: &TicketFilter) -> Result<Vec<Ticket>, QueueError> {
        let inner = self.lock()?;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|ticket| ticket.room_id == room && filter.matches(ticket))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| {
            (a.in_service, a.position, a.issued_at).cmp(&(b.in_service, b.position, b.issued_at))
        });
        Ok(tickets)
    }

    fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>, QueueError> {
        Ok(self.lock()?.tickets.get(id).cloned())
    }

    fn insert_ticket(&self, ticket: &Ticket) -> Result<(), QueueError> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains_key(&ticket.room_id) {
            return Err(QueueError::room_not_found(ticket.room_id));
        }
        if inner.tickets.contains_key(&ticket.id) {
            return Err(QueueError::DuplicateTicket(ticket.id.clone()));
        }
        inner.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    fn save_ticket(&self, ticket: &Ticket) -> Result<(), QueueError> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains_key(&ticket.room_id) {
            return Err(QueueError::room_not_found(ticket.room_id));
        }
        inner.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    fn delete_ticket(&self, id: &TicketId) -> Result<Ticket, QueueError> {
        self.lock()?
            .tickets
            .remove(id)
            .ok_or_else(|| QueueError::ticket_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> (MemoryQueueStore, WaitingRoom) {
        let store = MemoryQueueStore::new();
        let room = store.create_room("Town Hall").unwrap();
        (store, room)
    }

    #[test]
    fn test_room_ids_are_sequential() {
        let store = MemoryQueueStore::new();
        let first = store.create_room("A").unwrap();
        let second = store.create_room("B").unwrap();
        assert_eq!(first.id, RoomId(1));
        assert_eq!(second.id, RoomId(2));
        assert_eq!(store.list_rooms().unwrap().len(), 2);
    }

    #[test]
    fn test_get_nonexistent_room() {
        let store = MemoryQueueStore::new();
        assert!(store.get_room(RoomId(42)).unwrap().is_none());
        assert!(store.require_room(RoomId(42)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_counter_requires_room() {
        let store = MemoryQueueStore::new();
        let result = store.create_counter(RoomId(1), "Desk");
        assert!(matches!(result, Err(QueueError::NotFound { .. })));
    }

    #[test]
    fn test_list_counters_by_room() {
        let (store, room) = create_test_store();
        let other = store.create_room("Library").unwrap();
        store.create_counter(room.id, "Desk 1").unwrap();
        store.create_counter(room.id, "Desk 2").unwrap();
        store.create_counter(other.id, "Front").unwrap();

        let counters = store.list_counters(room.id).unwrap();
        assert_eq!(counters.len(), 2);
        assert!(counters.iter().all(|c| c.room_id == room.id));
    }

    #[test]
    fn test_save_and_get_ticket() {
        let (store, room) = create_test_store();
        let ticket = Ticket::new(TicketId::new("t-1"), room.id, 1);
        store.save_ticket(&ticket).unwrap();

        assert!(store.ticket_exists(&ticket.id).unwrap());
        assert_eq!(store.get_ticket(&ticket.id).unwrap(), Some(ticket));
    }

    #[test]
    fn test_save_ticket_for_missing_room_fails() {
        let store = MemoryQueueStore::new();
        let ticket = Ticket::new(TicketId::new("t-1"), RoomId(5), 1);
        assert!(store.save_ticket(&ticket).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_tickets_ordering_and_filter() {
        let (store, room) = create_test_store();
        let mut served = Ticket::new(TicketId::new("served"), room.id, 1);
        served.in_service = true;
        store.save_ticket(&served).unwrap();
        store
            .save_ticket(&Ticket::new(TicketId::new("third"), room.id, 3))
            .unwrap();
        store
            .save_ticket(&Ticket::new(TicketId::new("first"), room.id, 1))
            .unwrap();

        let all = store.list_tickets(room.id, &TicketFilter::new()).unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "third", "served"]);

        let waiting = store.waiting_tickets(room.id).unwrap();
        assert_eq!(waiting.len(), 2);
        assert!(waiting.iter().all(|t| !t.in_service));
    }

    #[test]
    fn test_insert_ticket_rejects_existing_id_from_any_room() {
        let (store, room) = create_test_store();
        let other = store.create_room("Library").unwrap();
        let ticket = Ticket::new(TicketId::new("SHORT-1"), room.id, 1);
        store.insert_ticket(&ticket).unwrap();

        let clash = Ticket::new(TicketId::new("SHORT-1"), other.id, 1);
        let result = store.insert_ticket(&clash);
        assert!(matches!(result, Err(QueueError::DuplicateTicket(_))));
        assert_eq!(store.require_ticket(&ticket.id).unwrap().room_id, room.id);
    }

    #[test]
    fn test_rename_room_and_counter() {
        let (store, room) = create_test_store();
        let counter = store.create_counter(room.id, "Desk").unwrap();

        let renamed = store.rename_room(room.id, "City Hall").unwrap();
        assert_eq!(renamed.name, "City Hall");
        assert_eq!(store.require_room(room.id).unwrap().name, "City Hall");

        let renamed = store.rename_counter(counter.id, "Desk 9").unwrap();
        assert_eq!(store.require_counter(counter.id).unwrap(), renamed);

        assert!(store.rename_room(RoomId(77), "x").unwrap_err().is_not_found());
        assert!(store
            .rename_counter(CounterId(77), "x")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_room_staff_assignment() {
        let (store, room) = create_test_store();
        assert!(store.room_staff(room.id).unwrap().is_empty());

        let staff: BTreeSet<String> = ["alice".to_string(), "bob".to_string()].into();
        store.set_room_staff(room.id, staff.clone()).unwrap();
        assert_eq!(store.room_staff(room.id).unwrap(), staff);

        store.remove_room(room.id).unwrap();
        assert!(store.room_staff(room.id).unwrap().is_empty());
        let result = store.set_room_staff(room.id, staff);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_ticket() {
        let (store, room) = create_test_store();
        let ticket = Ticket::new(TicketId::new("t-1"), room.id, 1);
        store.save_ticket(&ticket).unwrap();

        let deleted = store.delete_ticket(&ticket.id).unwrap();
        assert_eq!(deleted.id, ticket.id);
        assert!(!store.ticket_exists(&ticket.id).unwrap());

        let again = store.delete_ticket(&ticket.id);
        assert!(matches!(again, Err(QueueError::NotFound { .. })));
    }

    #[test]
    fn test_remove_room_cascades() {
        let (store, room) = create_test_store();
        let counter = store.create_counter(room.id, "Desk").unwrap();
        store
            .save_ticket(&Ticket::new(TicketId::new("t-1"), room.id, 1))
            .unwrap();

        store.remove_room(room.id).unwrap();

        assert!(store.get_room(room.id).unwrap().is_none());
        assert!(store.get_counter(counter.id).unwrap().is_none());
        assert!(store.get_ticket(&TicketId::new("t-1")).unwrap().is_none());
    }

    #[test]
    fn test_remove_counter_clears_ticket_reference() {
        let (store, room) = create_test_store();
        let counter = store.create_counter(room.id, "Desk").unwrap();
        let mut ticket = Ticket::new(TicketId::new("t-1"), room.id, 1);
        ticket.in_service = true;
        ticket.counter = Some(counter.id);
        store.save_ticket(&ticket).unwrap();

        store.remove_counter(counter.id).unwrap();

        let survivor = store.require_ticket(&ticket.id).unwrap();
        assert!(survivor.in_service);
        assert_eq!(survivor.counter, None);
    }
}
