use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ticket::TicketKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "rsvp_status", rename_all = "lowercase")]
pub enum RsvpStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_id: Uuid,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rsvp {
    pub fn is_confirmed(&self) -> bool {
        self.status == RsvpStatus::Confirmed
    }
}

/// An RSVP joined with the attendee and ticket it refers to, as shown to the
/// organizer of the event.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventAttendee {
    pub rsvp_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub ticket_id: Uuid,
    #[serde(rename = "ticket_type")]
    pub ticket_kind: TicketKind,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
}
