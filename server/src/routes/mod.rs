use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{auth, events, health_check, reports, rsvps, tickets};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/events/:id/tickets/:ticket_id",
            put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
        .route("/events/:id/report", get(reports::event_report))
        .route("/reports", get(reports::organizer_reports))
        .route("/rsvps", post(rsvps::create_rsvp))
        .route("/rsvps/:id", delete(rsvps::cancel_rsvp))
        .route("/rsvps/my", get(rsvps::my_rsvps))
        .route("/rsvps/my/", get(rsvps::my_rsvps))
        .route("/rsvps/event/:id", get(rsvps::event_rsvps))
}

pub fn create_routes(state: AppState) -> Router {
    let security = create_security_headers_layer(state.config.production);
    let cors = create_cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(security)
        .layer(cors)
        .with_state(state)
}
