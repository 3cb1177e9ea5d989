//! Bilingual message rendering
//!
//! Fixed strings live in a resource table keyed by message id and
//! language ([`messages`]); the formatters in [`format`] are pure
//! functions from a domain payload and a language to the outbound text.
//! Channel adapters never touch either: they deliver the string as-is.

pub mod format;
pub mod messages;

pub use messages::{text, MsgId};
