use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ticket::TicketKind;

/// Per-ticket RSVP counts as aggregated by the store.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TicketStats {
    pub ticket_id: Uuid,
    pub kind: TicketKind,
    pub price: Decimal,
    pub remaining: i32,
    pub confirmed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub ticket_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TicketKind,
    pub price: Decimal,
    pub remaining: i32,
    pub confirmed: i64,
    pub cancelled: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub event_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub confirmed_rsvps: i64,
    pub cancelled_rsvps: i64,
    pub remaining_tickets: i64,
    pub revenue: Decimal,
    pub tickets: Vec<TicketReport>,
}
