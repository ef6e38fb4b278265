use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ticket_kind", rename_all = "lowercase")]
pub enum TicketKind {
    Free,
    Paid,
}

impl TicketKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(TicketKind::Free),
            "paid" => Some(TicketKind::Paid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketKind::Free => "free",
            TicketKind::Paid => "paid",
        }
    }
}

/// Inventory record for one kind of ticket on one event. `quantity` is the
/// number of tickets still available.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TicketKind,
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicketType {
    pub event_id: Uuid,
    pub kind: TicketKind,
    pub price: Decimal,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_kind_parse() {
        assert_eq!(TicketKind::parse("FREE"), Some(TicketKind::Free));
        assert_eq!(TicketKind::parse("paid"), Some(TicketKind::Paid));
        assert_eq!(TicketKind::parse("vip"), None);
    }

    #[test]
    fn test_ticket_kind_serializes_as_type_field() {
        let ticket = TicketType {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            kind: TicketKind::Paid,
            price: Decimal::new(1250, 2),
            quantity: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["type"], "paid");
        assert!(json.get("kind").is_none());
    }
}
