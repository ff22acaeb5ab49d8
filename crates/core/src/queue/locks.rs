//! Per-room serialization of queue operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::RoomId;

/// One mutex per waiting room.
///
/// Everything that reads positions and then writes a ticket runs inside
/// [`RoomLocks::with_room`], so two operations on the same room never observe
/// the same gap. Different rooms do not contend.
#[derive(Default)]
pub struct RoomLocks {
    rooms: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, room: RoomId) -> Arc<Mutex<()>> {
        // The map and the per-room mutexes guard no data of their own, so a
        // poisoned lock is still safe to use.
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        rooms.entry(room).or_default().clone()
    }

    /// Run `f` while holding the lock for `room`.
    pub fn with_room<T>(&self, room: RoomId, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(room);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Drop the lock entry of a removed room.
    pub fn forget(&self, room: RoomId) {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&room);
    }

    /// Number of rooms with a lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_room_is_serialized() {
        let locks = RoomLocks::new();
        let inside = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    locks.with_room(RoomId(1), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_returns_closure_value() {
        let locks = RoomLocks::new();
        assert_eq!(locks.with_room(RoomId(3), || 42), 42);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_forget_removes_entry() {
        let locks = RoomLocks::new();
        locks.with_room(RoomId(1), || ());
        locks.with_room(RoomId(2), || ());
        locks.forget(RoomId(1));
        assert_eq!(locks.len(), 1);
        locks.forget(RoomId(2));
        assert!(locks.is_empty());
    }
}
