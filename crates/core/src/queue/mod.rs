//! Waiting room queues: position allocation, dispatch and ticket transitions.

pub mod allocator;
pub mod dispatcher;
mod error;
mod ids;
mod locks;
mod memory_store;
pub mod mutator;
mod service;
mod store;
mod types;

pub use dispatcher::DispatchPolicy;
pub use error::{EntityKind, QueueError};
pub use ids::{with_unique_id, TicketIdSource, UuidTicketIds};
pub use locks::RoomLocks;
pub use memory_store::MemoryQueueStore;
pub use service::QueueService;
pub use store::{QueueStore, TicketFilter};
pub use types::{Counter, CounterId, RoomId, Ticket, TicketId, TicketStatus, WaitingRoom};
