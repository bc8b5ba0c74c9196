pub mod session;

pub use session::{SESSION_COOKIE, SessionUser};
