pub mod extract;
pub mod password;
pub mod session;

pub use extract::{AuthUser, OrganizerUser};
pub use password::{hash_password, verify_password};
pub use session::{Claims, SessionKeys, SESSION_COOKIE};
