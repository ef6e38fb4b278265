use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{
    EventStore, ReportStore, RsvpStore, StoreError, StoreResult, TicketStore, UserStore,
};
use crate::models::{
    Event, EventAttendee, EventChanges, NewEvent, NewTicketType, NewUser, Rsvp, TicketStats,
    TicketType, User,
};
use crate::utils::Conflict;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "id, organizer_id, title, description, event_date, event_time, location, created_at, updated_at";
const TICKET_COLUMNS: &str = "id, event_id, kind, price, quantity, created_at, updated_at";
const RSVP_COLUMNS: &str = "id, event_id, user_id, ticket_id, status, created_at, updated_at";

const USERS_EMAIL_KEY: &str = "users_email_key";
const TICKET_TYPES_EVENT_KIND_KEY: &str = "ticket_types_event_id_kind_key";
const RSVPS_ONE_CONFIRMED: &str = "rsvps_one_confirmed_per_user";

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

/// Turns a unique violation on `constraint` into `conflict`; anything else
/// stays a database error.
fn unique_violation(err: sqlx::Error, constraint: &str, conflict: Conflict) -> StoreError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.constraint() == Some(constraint) =>
        {
            StoreError::Conflict(conflict)
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, USERS_EMAIL_KEY, Conflict::EmailTaken))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date, event_time NULLS FIRST, created_at"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE organizer_id = $1
             ORDER BY event_date, event_time NULLS FIRST, created_at"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let sql = format!(
            "INSERT INTO events (id, organizer_id, title, description, event_date, event_time, location)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(event.organizer_id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(event.time)
            .bind(&event.location)
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        changes: EventChanges,
    ) -> StoreResult<Option<Event>> {
        let sql = format!(
            "UPDATE events
             SET title = $3, description = $4, event_date = $5, event_time = $6,
                 location = $7, updated_at = now()
             WHERE id = $1 AND organizer_id = $2
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(organizer_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.date)
            .bind(changes.time)
            .bind(&changes.location)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> StoreResult<bool> {
        // ticket_types and rsvps cascade
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND organizer_id = $2")
            .bind(id)
            .bind(organizer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn list_tickets(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM ticket_types WHERE event_id = $1 ORDER BY created_at"
        );
        let tickets = sqlx::query_as::<_, TicketType>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<TicketType>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM ticket_types WHERE id = $1");
        let ticket = sqlx::query_as::<_, TicketType>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn create_ticket(&self, ticket: NewTicketType) -> StoreResult<TicketType> {
        let sql = format!(
            "INSERT INTO ticket_types (id, event_id, kind, price, quantity)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, TicketType>(&sql)
            .bind(Uuid::new_v4())
            .bind(ticket.event_id)
            .bind(ticket.kind)
            .bind(ticket.price)
            .bind(ticket.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                unique_violation(e, TICKET_TYPES_EVENT_KIND_KEY, Conflict::DuplicateTicketType)
            })
    }

    async fn update_ticket(
        &self,
        id: Uuid,
        price: Decimal,
        quantity: i32,
    ) -> StoreResult<TicketType> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes against concurrent RSVPs on this ticket
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM ticket_types WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("Ticket"));
        }

        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rsvps WHERE ticket_id = $1 AND status = 'confirmed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if i64::from(quantity) < confirmed {
            return Err(Conflict::QuantityBelowAttendees { confirmed }.into());
        }

        let sql = format!(
            "UPDATE ticket_types SET price = $2, quantity = $3, updated_at = now()
             WHERE id = $1
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, TicketType>(&sql)
            .bind(id)
            .bind(price)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM ticket_types WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("Ticket"));
        }

        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM rsvps WHERE ticket_id = $1 AND status = 'confirmed')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use {
            return Err(Conflict::TicketInUse.into());
        }

        sqlx::query("DELETE FROM ticket_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RsvpStore for PgStore {
    async fn create_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        ticket_id: Uuid,
    ) -> StoreResult<Rsvp> {
        let mut tx = self.pool.begin().await?;

        // KEY SHARE blocks a concurrent delete_ticket but not other RSVPs'
        // decrements on the same row
        let ticket: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM ticket_types WHERE id = $1 AND event_id = $2 FOR KEY SHARE",
        )
        .bind(ticket_id)
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;
        if ticket.is_none() {
            return Err(StoreError::NotFound("Ticket"));
        }

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM rsvps
                 WHERE event_id = $1 AND user_id = $2 AND status = 'confirmed'
             )",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Err(Conflict::AlreadyRsvped.into());
        }

        // Test-and-decrement in one statement; never read-then-write
        let decremented = sqlx::query(
            "UPDATE ticket_types SET quantity = quantity - 1, updated_at = now()
             WHERE id = $1 AND quantity > 0",
        )
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if decremented == 0 {
            return Err(Conflict::SoldOut.into());
        }

        // A concurrent RSVP by the same user on another ticket of this event
        // trips the partial unique index; dropping `tx` undoes the decrement.
        let sql = format!(
            "INSERT INTO rsvps (id, event_id, user_id, ticket_id, status)
             VALUES ($1, $2, $3, $4, 'confirmed')
             RETURNING {RSVP_COLUMNS}"
        );
        let rsvp = sqlx::query_as::<_, Rsvp>(&sql)
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(user_id)
            .bind(ticket_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, RSVPS_ONE_CONFIRMED, Conflict::AlreadyRsvped))?;

        tx.commit().await?;
        Ok(rsvp)
    }

    async fn cancel_rsvp(&self, id: Uuid, user_id: Uuid) -> StoreResult<Rsvp> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE rsvps SET status = 'cancelled', updated_at = now()
             WHERE id = $1 AND user_id = $2 AND status = 'confirmed'
             RETURNING {RSVP_COLUMNS}"
        );
        let rsvp = sqlx::query_as::<_, Rsvp>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("RSVP"))?;

        sqlx::query(
            "UPDATE ticket_types SET quantity = quantity + 1, updated_at = now() WHERE id = $1",
        )
        .bind(rsvp.ticket_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rsvp)
    }

    async fn list_user_rsvps(&self, user_id: Uuid) -> StoreResult<Vec<Rsvp>> {
        let sql = format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rsvps = sqlx::query_as::<_, Rsvp>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rsvps)
    }

    async fn list_event_attendees(&self, event_id: Uuid) -> StoreResult<Vec<EventAttendee>> {
        let attendees = sqlx::query_as::<_, EventAttendee>(
            "SELECT r.id AS rsvp_id, r.user_id, u.name, u.email, r.ticket_id,
                    t.kind AS ticket_kind, r.status, r.created_at
             FROM rsvps r
             JOIN users u ON u.id = r.user_id
             JOIN ticket_types t ON t.id = r.ticket_id
             WHERE r.event_id = $1
             ORDER BY r.created_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attendees)
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn ticket_stats(&self, event_id: Uuid) -> StoreResult<Vec<TicketStats>> {
        let stats = sqlx::query_as::<_, TicketStats>(
            "SELECT t.id AS ticket_id, t.kind, t.price, t.quantity AS remaining,
                    COUNT(r.id) FILTER (WHERE r.status = 'confirmed') AS confirmed,
                    COUNT(r.id) FILTER (WHERE r.status = 'cancelled') AS cancelled
             FROM ticket_types t
             LEFT JOIN rsvps r ON r.ticket_id = t.id
             WHERE t.event_id = $1
             GROUP BY t.id
             ORDER BY t.created_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }
}
