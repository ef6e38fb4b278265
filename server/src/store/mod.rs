//! Persistence seam.
//!
//! Every inventory decision (the ticket counter and the one-confirmed-RSVP
//! rule) is made inside a single store call, so each implementation can
//! apply it atomically: `PgStore` with a conditional update inside a
//! transaction, `MemoryStore` under one lock.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Event, EventAttendee, EventChanges, NewEvent, NewTicketType, NewUser, Rsvp, TicketStats,
    TicketType, User,
};
use crate::utils::Conflict;

#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict::EmailTaken` when the email is registered.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Emails are stored lowercase; callers normalize before looking up.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>>;

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event>;

    /// Applies the changes only if `organizer_id` still owns the event.
    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        changes: EventChanges,
    ) -> StoreResult<Option<Event>>;

    /// Removes the event together with its ticket types and RSVPs.
    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn list_tickets(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>>;

    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<TicketType>>;

    /// Fails with `Conflict::DuplicateTicketType` when the event already has
    /// a ticket of that kind.
    async fn create_ticket(&self, ticket: NewTicketType) -> StoreResult<TicketType>;

    /// Sets price and remaining quantity. Fails with
    /// `Conflict::QuantityBelowAttendees` if `quantity` is lower than the
    /// number of confirmed RSVPs holding this ticket, evaluated atomically
    /// with the write.
    async fn update_ticket(
        &self,
        id: Uuid,
        price: rust_decimal::Decimal,
        quantity: i32,
    ) -> StoreResult<TicketType>;

    /// Fails with `Conflict::TicketInUse` while confirmed RSVPs reference it.
    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// Reserves one unit of `ticket_id` for `user_id` on `event_id`.
    ///
    /// Errors, in the order they are checked:
    /// - `NotFound("Ticket")` if the ticket does not exist on that event
    /// - `Conflict::AlreadyRsvped` if the user holds a confirmed RSVP for
    ///   the event
    /// - `Conflict::SoldOut` if no units remain
    ///
    /// A failed call leaves the ticket quantity untouched.
    async fn create_rsvp(&self, event_id: Uuid, user_id: Uuid, ticket_id: Uuid)
        -> StoreResult<Rsvp>;

    /// Marks a confirmed RSVP owned by `user_id` as cancelled and returns its
    /// unit to the ticket. Anything else is `NotFound("RSVP")`.
    async fn cancel_rsvp(&self, id: Uuid, user_id: Uuid) -> StoreResult<Rsvp>;

    async fn list_user_rsvps(&self, user_id: Uuid) -> StoreResult<Vec<Rsvp>>;

    async fn list_event_attendees(&self, event_id: Uuid) -> StoreResult<Vec<EventAttendee>>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn ticket_stats(&self, event_id: Uuid) -> StoreResult<Vec<TicketStats>>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: UserStore + EventStore + TicketStore + RsvpStore + ReportStore {}

impl<T> Store for T where T: UserStore + EventStore + TicketStore + RsvpStore + ReportStore {}
