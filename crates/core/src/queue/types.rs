//! Rooms, counters and tickets as the queue core sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a waiting room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a service counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterId(pub u64);

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public ticket identifier handed to the customer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TicketId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A waiting room where tickets can be issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaitingRoom {
    pub id: RoomId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for WaitingRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A counter in a waiting room where tickets are serviced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Counter {
    pub id: CounterId,
    pub room_id: RoomId,
    pub name: String,
}

impl Counter {
    /// Human readable label, e.g. `"Town Hall - Desk 2"`.
    pub fn label(&self, room: &WaitingRoom) -> String {
        format!("{} - {}", room.name, self.name)
    }
}

/// Where a ticket currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketStatus {
    /// In the queue; `position` is live and unique among waiting tickets of the room.
    Waiting { position: u32 },
    /// Called out of the queue. `position` is the frozen value from the moment it left.
    /// `counter` is `None` after a move-forward or when the serving counter was removed.
    InService {
        counter: Option<CounterId>,
        position: u32,
    },
}

impl TicketStatus {
    /// Returns the status type as a string (for filtering and error messages).
    pub fn state_type(&self) -> &'static str {
        match self {
            TicketStatus::Waiting { .. } => "waiting",
            TicketStatus::InService { .. } => "in_service",
        }
    }
}

/// A ticket issued in a waiting room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: TicketId,
    pub room_id: RoomId,
    /// Place in queue, starting at 1.
    pub position: u32,
    pub in_service: bool,
    /// Counter currently serving the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<CounterId>,
    pub issued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// A freshly issued, waiting ticket.
    pub fn new(id: TicketId, room_id: RoomId, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            room_id,
            position,
            in_service: false,
            counter: None,
            issued_at: now,
            updated_at: now,
        }
    }

    pub fn is_waiting(&self) -> bool {
        !self.in_service
    }

    pub fn status(&self) -> TicketStatus {
        if self.in_service {
            TicketStatus::InService {
                counter: self.counter,
                position: self.position,
            }
        } else {
            TicketStatus::Waiting {
                position: self.position,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_is_waiting() {
        let ticket = Ticket::new(TicketId::new("abc"), RoomId(1), 4);
        assert!(ticket.is_waiting());
        assert_eq!(ticket.counter, None);
        assert_eq!(ticket.status(), TicketStatus::Waiting { position: 4 });
        assert_eq!(ticket.status().state_type(), "waiting");
    }

    #[test]
    fn test_in_service_status_keeps_position() {
        let mut ticket = Ticket::new(TicketId::new("abc"), RoomId(1), 2);
        ticket.in_service = true;
        ticket.counter = Some(CounterId(7));

        let status = ticket.status();
        assert_eq!(
            status,
            TicketStatus::InService {
                counter: Some(CounterId(7)),
                position: 2
            }
        );
        assert_eq!(status.state_type(), "in_service");
    }

    #[test]
    fn test_counter_label() {
        let room = WaitingRoom {
            id: RoomId(1),
            name: "Town Hall".to_string(),
            created_at: Utc::now(),
        };
        let counter = Counter {
            id: CounterId(3),
            room_id: room.id,
            name: "Desk 2".to_string(),
        };
        assert_eq!(counter.label(&room), "Town Hall - Desk 2");
        assert_eq!(room.to_string(), "Town Hall");
    }

    #[test]
    fn test_ticket_serialization_skips_empty_counter() {
        let ticket = Ticket::new(TicketId::new("t-1"), RoomId(9), 1);
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["id"], "t-1");
        assert_eq!(json["room_id"], 9);
        assert!(json.get("counter").is_none());

        let back: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn test_status_serialization_is_tagged() {
        let status = TicketStatus::InService {
            counter: None,
            position: 3,
        };
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["type"], "in_service");
        assert_eq!(json["position"], 3);
    }
}
