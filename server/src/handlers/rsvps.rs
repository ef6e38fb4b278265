use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::{AuthUser, OrganizerUser};
use crate::services::rsvps::{self, CreateRsvpRequest};
use crate::state::AppState;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{created, success};
use crate::utils::AppError;

pub async fn create_rsvp(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateRsvpRequest>,
) -> Result<Response, AppError> {
    let rsvp = rsvps::rsvp(state.store.as_ref(), &user, body).await?;
    Ok(created(rsvp, "RSVP confirmed"))
}

pub async fn cancel_rsvp(
    State(state): State<AppState>,
    user: AuthUser,
    Path(rsvp_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let rsvp = rsvps::cancel(state.store.as_ref(), &user, rsvp_id).await?;
    Ok(success(rsvp, "RSVP cancelled"))
}

pub async fn my_rsvps(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let rsvps = rsvps::my_rsvps(state.store.as_ref(), &user).await?;
    Ok(success(rsvps, "RSVPs retrieved"))
}

pub async fn event_rsvps(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let attendees = rsvps::event_rsvps(state.store.as_ref(), &organizer, event_id).await?;
    Ok(success(attendees, "Event RSVPs retrieved"))
}
