//! Session management module
//!
//! One ephemeral session per phone number: current menu state, language
//! and last activity. Idle sessions are evicted after a TTL so a stale
//! flow never blocks a fresh conversation.

mod store;
mod types;

pub use store::SessionStore;
pub use types::{MenuState, Session};
