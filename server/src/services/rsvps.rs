use serde::Deserialize;
use uuid::Uuid;

use super::events::owned_event;
use crate::auth::AuthUser;
use crate::models::{EventAttendee, Rsvp};
use crate::store::{Store, StoreError};
use crate::utils::{AppError, Conflict};

#[derive(Debug, Deserialize)]
pub struct CreateRsvpRequest {
    pub event_id: Uuid,
    pub ticket_id: Uuid,
}

/// Reserves one ticket for the caller. The store performs the duplicate
/// check, the sold-out check and the decrement as one atomic unit.
pub async fn rsvp(
    store: &dyn Store,
    user: &AuthUser,
    req: CreateRsvpRequest,
) -> Result<Rsvp, AppError> {
    match store
        .create_rsvp(req.event_id, user.user_id, req.ticket_id)
        .await
    {
        Ok(rsvp) => {
            tracing::info!(
                rsvp_id = %rsvp.id,
                event_id = %rsvp.event_id,
                ticket_id = %rsvp.ticket_id,
                user_id = %rsvp.user_id,
                "RSVP confirmed"
            );
            Ok(rsvp)
        }
        Err(StoreError::Conflict(conflict @ (Conflict::SoldOut | Conflict::AlreadyRsvped))) => {
            tracing::debug!(
                event_id = %req.event_id,
                ticket_id = %req.ticket_id,
                user_id = %user.user_id,
                %conflict,
                "RSVP rejected"
            );
            Err(conflict.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Cancels the caller's own confirmed RSVP. Someone else's RSVP, an unknown
/// id and an already-cancelled RSVP all look the same: not found.
pub async fn cancel(store: &dyn Store, user: &AuthUser, rsvp_id: Uuid) -> Result<Rsvp, AppError> {
    let rsvp = store.cancel_rsvp(rsvp_id, user.user_id).await?;
    tracing::info!(
        rsvp_id = %rsvp.id,
        ticket_id = %rsvp.ticket_id,
        user_id = %user.user_id,
        "RSVP cancelled"
    );
    Ok(rsvp)
}

pub async fn my_rsvps(store: &dyn Store, user: &AuthUser) -> Result<Vec<Rsvp>, AppError> {
    Ok(store.list_user_rsvps(user.user_id).await?)
}

pub async fn event_rsvps(
    store: &dyn Store,
    organizer: &AuthUser,
    event_id: Uuid,
) -> Result<Vec<EventAttendee>, AppError> {
    owned_event(store, event_id, organizer).await?;
    Ok(store.list_event_attendees(event_id).await?)
}
