use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::OrganizerUser;
use crate::services::reports;
use crate::state::AppState;
use crate::utils::extract::Path;
use crate::utils::response::success;
use crate::utils::AppError;

pub async fn organizer_reports(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
) -> Result<Response, AppError> {
    let reports = reports::organizer_reports(state.store.as_ref(), &organizer).await?;
    Ok(success(reports, "Reports retrieved"))
}

pub async fn event_report(
    State(state): State<AppState>,
    OrganizerUser(organizer): OrganizerUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = reports::event_report(state.store.as_ref(), &organizer, event_id).await?;
    Ok(success(report, "Event report retrieved"))
}
