use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::events::owned_event;
use crate::auth::AuthUser;
use crate::models::{NewTicketType, TicketKind, TicketType};
use crate::store::Store;
use crate::utils::{AppError, FieldError};

/// Prices are stored as NUMERIC(10, 2).
const PRICE_SCALE: u32 = 2;
const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
/// Keeps cancellations from overflowing the INTEGER counter.
const MAX_QUANTITY: i32 = 1_000_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTicketRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTicketRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

fn check_price(errors: &mut Vec<FieldError>, kind: TicketKind, price: Decimal) {
    match kind {
        TicketKind::Free if !price.is_zero() => {
            errors.push(FieldError::new("price", "Free tickets must have price 0"));
        }
        TicketKind::Paid if price <= Decimal::ZERO => {
            errors.push(FieldError::new("price", "Paid tickets must have price > 0"));
        }
        _ if price >= MAX_PRICE => {
            errors.push(FieldError::new("price", "Price must be below 100000000"));
        }
        _ if price.normalize().scale() > PRICE_SCALE => {
            errors.push(FieldError::new(
                "price",
                "Price must have at most 2 decimal places",
            ));
        }
        _ => {}
    }
}

pub fn validate_new_ticket(
    event_id: Uuid,
    req: &CreateTicketRequest,
) -> Result<NewTicketType, AppError> {
    let mut errors = Vec::new();

    let kind = TicketKind::parse(&req.kind);
    match kind {
        Some(kind) => check_price(&mut errors, kind, req.price),
        None => errors.push(FieldError::new("type", "Type must be 'free' or 'paid'")),
    }
    if req.quantity < 1 {
        errors.push(FieldError::new("quantity", "Quantity must be at least 1"));
    } else if req.quantity > MAX_QUANTITY {
        errors.push(FieldError::new("quantity", "Quantity must be at most 1000000"));
    }

    match kind {
        Some(kind) if errors.is_empty() => Ok(NewTicketType {
            event_id,
            kind,
            price: req.price,
            quantity: req.quantity,
        }),
        _ => Err(AppError::InvalidFields(errors)),
    }
}

/// Resolves the final price and quantity for an update. The kind of a ticket
/// never changes once created.
pub fn resolve_update(
    ticket: &TicketType,
    req: &UpdateTicketRequest,
) -> Result<(Decimal, i32), AppError> {
    let mut errors = Vec::new();

    if let Some(raw) = req.kind.as_deref() {
        if TicketKind::parse(raw) != Some(ticket.kind) {
            errors.push(FieldError::new("type", "Ticket type cannot be changed"));
        }
    }

    let price = req.price.unwrap_or(ticket.price);
    check_price(&mut errors, ticket.kind, price);

    let quantity = req.quantity.unwrap_or(ticket.quantity);
    if quantity < 0 {
        errors.push(FieldError::new("quantity", "Quantity cannot be negative"));
    } else if quantity > MAX_QUANTITY {
        errors.push(FieldError::new("quantity", "Quantity must be at most 1000000"));
    }

    if errors.is_empty() {
        Ok((price, quantity))
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

/// Loads a ticket under an event the organizer owns. A ticket that belongs
/// to a different event is reported as missing.
async fn owned_ticket(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
    ticket_id: Uuid,
) -> Result<TicketType, AppError> {
    owned_event(store, event_id, organizer).await?;
    store
        .get_ticket(ticket_id)
        .await?
        .filter(|t| t.event_id == event_id)
        .ok_or_else(|| AppError::not_found("Ticket"))
}

pub async fn list_tickets(store: &dyn Store, event_id: Uuid) -> Result<Vec<TicketType>, AppError> {
    store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    Ok(store.list_tickets(event_id).await?)
}

pub async fn create_ticket(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
    req: CreateTicketRequest,
) -> Result<TicketType, AppError> {
    owned_event(store, event_id, organizer).await?;
    let new_ticket = validate_new_ticket(event_id, &req)?;

    let ticket = store.create_ticket(new_ticket).await?;
    tracing::info!(
        event_id = %event_id,
        ticket_id = %ticket.id,
        kind = ticket.kind.as_str(),
        quantity = ticket.quantity,
        "Ticket type created"
    );
    Ok(ticket)
}

pub async fn update_ticket(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
    ticket_id: Uuid,
    req: UpdateTicketRequest,
) -> Result<TicketType, AppError> {
    let ticket = owned_ticket(store, organizer, event_id, ticket_id).await?;
    let (price, quantity) = resolve_update(&ticket, &req)?;

    let updated = store.update_ticket(ticket_id, price, quantity).await?;
    tracing::info!(ticket_id = %ticket_id, quantity, "Ticket type updated");
    Ok(updated)
}

pub async fn delete_ticket(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
    ticket_id: Uuid,
) -> Result<(), AppError> {
    owned_ticket(store, organizer, event_id, ticket_id).await?;
    store.delete_ticket(ticket_id).await?;
    tracing::info!(ticket_id = %ticket_id, "Ticket type deleted");
    Ok(())
}
