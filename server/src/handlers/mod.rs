use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod auth;
pub mod events;
pub mod reports;
pub mod rsvps;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventhub-api",
    };

    success(payload, "Health check successful")
}
