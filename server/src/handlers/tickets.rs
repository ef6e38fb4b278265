use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::OrganizerUser;
use crate::services::tickets::{self, CreateTicketRequest, UpdateTicketRequest};
use crate::state::AppState;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppError;

pub async fn list_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let tickets = tickets::list_tickets(state.store.as_ref(), event_id).await?;
    Ok(success(tickets, "Ticket types retrieved"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path(event_id): Path<Uuid>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<Response, AppError> {
    let ticket = tickets::create_ticket(state.store.as_ref(), &organizer, event_id, body).await?;
    Ok(created(ticket, "Ticket type created"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path((event_id, ticket_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTicketRequest>,
) -> Result<Response, AppError> {
    let ticket =
        tickets::update_ticket(state.store.as_ref(), &organizer, event_id, ticket_id, body)
            .await?;
    Ok(success(ticket, "Ticket type updated"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path((event_id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    tickets::delete_ticket(state.store.as_ref(), &organizer, event_id, ticket_id).await?;
    Ok(empty_success("Ticket type deleted"))
}
