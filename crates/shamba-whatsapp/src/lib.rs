//! shamba-whatsapp: WhatsApp channel adapter for ShambaBot via Twilio
//!
//! Receives farmer messages on a Twilio webhook, hands each one to the
//! shamba-core session engine and replies with TwiML. Also carries a
//! small Twilio REST client for proactive sends.

pub mod error;
pub mod twilio;
pub mod webhook;

pub use error::{Result, WhatsAppError};
pub use twilio::{IncomingMessage, TwilioClient};
pub use webhook::WebhookServer;
