//! In-memory store for tests.
//!
//! All state sits behind one mutex and every trait call takes it exactly
//! once, so each check-and-mutate sequence is atomic just as the Postgres
//! transactions are.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    EventStore, ReportStore, RsvpStore, StoreError, StoreResult, TicketStore, UserStore,
};
use crate::models::{
    Event, EventAttendee, EventChanges, NewEvent, NewTicketType, NewUser, Rsvp, RsvpStatus,
    TicketStats, TicketType, User,
};
use crate::utils::Conflict;

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    tickets: HashMap<Uuid, TicketType>,
    rsvps: HashMap<Uuid, Rsvp>,
}

impl State {
    fn confirmed_for_ticket(&self, ticket_id: Uuid) -> i64 {
        self.rsvps
            .values()
            .filter(|r| r.ticket_id == ticket_id && r.is_confirmed())
            .count() as i64
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        (a.date, a.time, a.created_at).cmp(&(b.date, b.time, b.created_at))
    });
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(Conflict::EmailTaken.into());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self.lock()?.events.values().cloned().collect();
        sort_events(&mut events);
        Ok(events)
    }

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .lock()?
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .cloned()
            .collect();
        sort_events(&mut events);
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: event.organizer_id,
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        changes: EventChanges,
    ) -> StoreResult<Option<Event>> {
        let mut state = self.lock()?;
        let Some(event) = state
            .events
            .get_mut(&id)
            .filter(|e| e.organizer_id == organizer_id)
        else {
            return Ok(None);
        };

        event.title = changes.title;
        event.description = changes.description;
        event.date = changes.date;
        event.time = changes.time;
        event.location = changes.location;
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let owned = state
            .events
            .get(&id)
            .is_some_and(|e| e.organizer_id == organizer_id);
        if !owned {
            return Ok(false);
        }

        state.events.remove(&id);
        state.tickets.retain(|_, t| t.event_id != id);
        state.rsvps.retain(|_, r| r.event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn list_tickets(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>> {
        let mut tickets: Vec<TicketType> = self
            .lock()?
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.created_at);
        Ok(tickets)
    }

    async fn get_ticket(&self, id: Uuid) -> StoreResult<Option<TicketType>> {
        Ok(self.lock()?.tickets.get(&id).cloned())
    }

    async fn create_ticket(&self, ticket: NewTicketType) -> StoreResult<TicketType> {
        let mut state = self.lock()?;
        let duplicate = state
            .tickets
            .values()
            .any(|t| t.event_id == ticket.event_id && t.kind == ticket.kind);
        if duplicate {
            return Err(Conflict::DuplicateTicketType.into());
        }

        let now = Utc::now();
        let ticket = TicketType {
            id: Uuid::new_v4(),
            event_id: ticket.event_id,
            kind: ticket.kind,
            price: ticket.price,
            quantity: ticket.quantity,
            created_at: now,
            updated_at: now,
        };
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: Uuid,
        price: Decimal,
        quantity: i32,
    ) -> StoreResult<TicketType> {
        let mut state = self.lock()?;
        let confirmed = state.confirmed_for_ticket(id);
        let ticket = state
            .tickets
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Ticket"))?;
        if i64::from(quantity) < confirmed {
            return Err(Conflict::QuantityBelowAttendees { confirmed }.into());
        }

        ticket.price = price;
        ticket.quantity = quantity;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock()?;
        if !state.tickets.contains_key(&id) {
            return Err(StoreError::NotFound("Ticket"));
        }
        if state.confirmed_for_ticket(id) > 0 {
            return Err(Conflict::TicketInUse.into());
        }

        state.tickets.remove(&id);
        state.rsvps.retain(|_, r| r.ticket_id != id);
        Ok(())
    }
}

#[async_trait]
impl RsvpStore for MemoryStore {
    async fn create_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        ticket_id: Uuid,
    ) -> StoreResult<Rsvp> {
        let mut state = self.lock()?;

        let available = match state.tickets.get(&ticket_id) {
            Some(ticket) if ticket.event_id == event_id => ticket.quantity,
            _ => return Err(StoreError::NotFound("Ticket")),
        };

        let already = state
            .rsvps
            .values()
            .any(|r| r.event_id == event_id && r.user_id == user_id && r.is_confirmed());
        if already {
            return Err(Conflict::AlreadyRsvped.into());
        }
        if available <= 0 {
            return Err(Conflict::SoldOut.into());
        }

        let now = Utc::now();
        if let Some(ticket) = state.tickets.get_mut(&ticket_id) {
            ticket.quantity -= 1;
            ticket.updated_at = now;
        }

        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            ticket_id,
            status: RsvpStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        state.rsvps.insert(rsvp.id, rsvp.clone());
        Ok(rsvp)
    }

    async fn cancel_rsvp(&self, id: Uuid, user_id: Uuid) -> StoreResult<Rsvp> {
        let mut state = self.lock()?;
        let now = Utc::now();

        let rsvp = state
            .rsvps
            .get_mut(&id)
            .filter(|r| r.user_id == user_id && r.is_confirmed())
            .ok_or(StoreError::NotFound("RSVP"))?;
        rsvp.status = RsvpStatus::Cancelled;
        rsvp.updated_at = now;
        let rsvp = rsvp.clone();

        if let Some(ticket) = state.tickets.get_mut(&rsvp.ticket_id) {
            ticket.quantity += 1;
            ticket.updated_at = now;
        }
        Ok(rsvp)
    }

    async fn list_user_rsvps(&self, user_id: Uuid) -> StoreResult<Vec<Rsvp>> {
        let mut rsvps: Vec<Rsvp> = self
            .lock()?
            .rsvps
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rsvps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rsvps)
    }

    async fn list_event_attendees(&self, event_id: Uuid) -> StoreResult<Vec<EventAttendee>> {
        let state = self.lock()?;
        let mut attendees: Vec<EventAttendee> = state
            .rsvps
            .values()
            .filter(|r| r.event_id == event_id)
            .filter_map(|r| {
                let user = state.users.get(&r.user_id)?;
                let ticket = state.tickets.get(&r.ticket_id)?;
                Some(EventAttendee {
                    rsvp_id: r.id,
                    user_id: r.user_id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    ticket_id: r.ticket_id,
                    ticket_kind: ticket.kind,
                    status: r.status,
                    created_at: r.created_at,
                })
            })
            .collect();
        attendees.sort_by_key(|a| a.created_at);
        Ok(attendees)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn ticket_stats(&self, event_id: Uuid) -> StoreResult<Vec<TicketStats>> {
        let state = self.lock()?;
        let mut tickets: Vec<&TicketType> = state
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .collect();
        tickets.sort_by_key(|t| t.created_at);

        let stats = tickets
            .into_iter()
            .map(|t| {
                let count = |status: RsvpStatus| {
                    state
                        .rsvps
                        .values()
                        .filter(|r| r.ticket_id == t.id && r.status == status)
                        .count() as i64
                };
                TicketStats {
                    ticket_id: t.id,
                    kind: t.kind,
                    price: t.price,
                    remaining: t.quantity,
                    confirmed: count(RsvpStatus::Confirmed),
                    cancelled: count(RsvpStatus::Cancelled),
                }
            })
            .collect();
        Ok(stats)
    }
}
