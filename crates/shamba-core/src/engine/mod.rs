//! Session engine
//!
//! Turns one inbound `(phone, text, channel)` triple into exactly one
//! outbound message, running the per-farmer state machine over the
//! directory, intel client, points ledger and session store.

mod intent;
#[allow(clippy::module_inception)]
mod engine;

pub use engine::{Channel, Engine};
pub use intent::{classify, parse_simulation, Intent};
