//! Ticket queues for waiting rooms with service counters.
//!
//! The crate decides where a ticket sits in its room's queue and which ticket a
//! counter calls next. Persistence, authentication and presentation belong to
//! the caller; they reach the core through [`QueueStore`] and [`Actor`].

pub mod actor;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod queue;

pub use actor::{Actor, Capability};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    LoggingConfig, QueueConfig,
};
pub use logging::init_logging;
pub use queue::{
    Counter, CounterId, DispatchPolicy, MemoryQueueStore, QueueError, QueueService, QueueStore,
    RoomId, Ticket, TicketFilter, TicketId, TicketIdSource, TicketStatus, UuidTicketIds,
    WaitingRoom,
};
