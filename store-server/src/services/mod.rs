//! External collaborators
//!
//! Constructed once in `ServerState::initialize` and injected where
//! needed.

pub mod mailer;

pub use mailer::{LogMailer, Mailer};
