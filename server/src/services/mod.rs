//! Domain operations. Handlers parse the request and pick the acting user;
//! everything else, including ownership checks, happens here.

pub mod accounts;
pub mod events;
pub mod reports;
pub mod rsvps;
pub mod tickets;
