use rust_decimal::Decimal;
use uuid::Uuid;

use super::events::owned_event;
use crate::auth::AuthUser;
use crate::models::{Event, EventReport, TicketReport, TicketStats};
use crate::store::Store;
use crate::utils::AppError;

pub fn build_report(event: &Event, stats: Vec<TicketStats>) -> EventReport {
    let tickets: Vec<TicketReport> = stats
        .into_iter()
        .map(|s| TicketReport {
            ticket_id: s.ticket_id,
            kind: s.kind,
            price: s.price,
            remaining: s.remaining,
            confirmed: s.confirmed,
            cancelled: s.cancelled,
            revenue: s.price * Decimal::from(s.confirmed),
        })
        .collect();

    EventReport {
        event_id: event.id,
        title: event.title.clone(),
        date: event.date,
        confirmed_rsvps: tickets.iter().map(|t| t.confirmed).sum(),
        cancelled_rsvps: tickets.iter().map(|t| t.cancelled).sum(),
        remaining_tickets: tickets.iter().map(|t| i64::from(t.remaining)).sum(),
        revenue: tickets.iter().map(|t| t.revenue).sum(),
        tickets,
    }
}

pub async fn event_report(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
) -> Result<EventReport, AppError> {
    let event = owned_event(store, event_id, organizer).await?;
    let stats = store.ticket_stats(event_id).await?;
    Ok(build_report(&event, stats))
}

/// One report per event the organizer owns, in event date order.
pub async fn organizer_reports(
    store: &dyn Store,
    organizer: &AuthUser,
) -> Result<Vec<EventReport>, AppError> {
    let events = store.list_events_by_organizer(organizer.user_id).await?;
    let mut reports = Vec::with_capacity(events.len());
    for event in &events {
        let stats = store.ticket_stats(event.id).await?;
        reports.push(build_report(event, stats));
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketKind;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_report_totals() {
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Gala".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2031, 3, 3).unwrap(),
            time: None,
            location: "Museum".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let stats = vec![
            TicketStats {
                ticket_id: Uuid::new_v4(),
                kind: TicketKind::Free,
                price: Decimal::ZERO,
                remaining: 40,
                confirmed: 10,
                cancelled: 2,
            },
            TicketStats {
                ticket_id: Uuid::new_v4(),
                kind: TicketKind::Paid,
                price: Decimal::new(1550, 2),
                remaining: 7,
                confirmed: 3,
                cancelled: 1,
            },
        ];

        let report = build_report(&event, stats);
        assert_eq!(report.confirmed_rsvps, 13);
        assert_eq!(report.cancelled_rsvps, 3);
        assert_eq!(report.remaining_tickets, 47);
        assert_eq!(report.revenue, Decimal::new(4650, 2));
        assert_eq!(report.tickets[0].revenue, Decimal::ZERO);
        assert_eq!(report.tickets[1].revenue, Decimal::new(4650, 2));
    }

    #[test]
    fn test_report_without_tickets() {
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Quiet night".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2031, 3, 3).unwrap(),
            time: None,
            location: "Home".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let report = build_report(&event, Vec::new());
        assert_eq!(report.confirmed_rsvps, 0);
        assert_eq!(report.revenue, Decimal::ZERO);
        assert!(report.tickets.is_empty());
    }
}
