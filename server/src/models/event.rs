use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ticket::TicketType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "event_date")]
    pub date: NaiveDate,
    #[sqlx(rename = "event_time")]
    pub time: Option<NaiveTime>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.organizer_id == user_id
    }
}

/// Start instant in UTC; an event without a time starts at midnight.
pub fn start_instant(date: NaiveDate, time: Option<NaiveTime>) -> DateTime<Utc> {
    date.and_time(time.unwrap_or_default()).and_utc()
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: String,
}

/// Full replacement values for an update; the service merges partial
/// requests onto the stored event before handing this to the store.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct EventWithTickets {
    #[serde(flatten)]
    pub event: Event,
    pub tickets: Vec<TicketType>,
}
