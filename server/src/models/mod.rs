pub mod event;
pub mod report;
pub mod rsvp;
pub mod ticket;
pub mod user;

pub use event::{Event, EventChanges, EventWithTickets, NewEvent};
pub use report::{EventReport, TicketReport, TicketStats};
pub use rsvp::{EventAttendee, Rsvp, RsvpStatus};
pub use ticket::{NewTicketType, TicketKind, TicketType};
pub use user::{NewUser, Role, User, UserProfile};
