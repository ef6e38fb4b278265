use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::OrganizerUser;
use crate::services::events::{self, CreateEventRequest, UpdateEventRequest};
use crate::state::AppState;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppError;

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = events::list_events(state.store.as_ref()).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::get_event(state.store.as_ref(), event_id).await?;
    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event = events::create_event(state.store.as_ref(), &organizer, body).await?;
    Ok(created(event, "Event created"))
}

pub async fn update_event(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path(event_id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let event = events::update_event(state.store.as_ref(), &organizer, event_id, body).await?;
    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    events::delete_event(state.store.as_ref(), &organizer, event_id).await?;
    Ok(empty_success("Event deleted"))
}
