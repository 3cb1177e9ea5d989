//! shamba-core: ShambaBot Core Library
//!
//! Channel-agnostic conversational engine for the ShambaBot farmer
//! assistant: farmer directory, farm-intelligence API client, bilingual
//! message formatting, points ledger, session store and the session
//! engine that ties them together. Channel adapters (WhatsApp webhook,
//! local chat REPL) depend on this crate and stay transport-only.

pub mod config;
pub mod engine;
pub mod error;
pub mod farmer;
pub mod i18n;
pub mod intel;
pub mod points;
pub mod session;

pub use config::{
    Config, FarmerServiceConfig, IntelConfig, LedgerConfig, SessionConfig, TwilioConfig,
    WebhookConfig,
};
pub use engine::{Channel, Engine, Intent};
pub use error::{Error, Result};
pub use farmer::{FarmerDirectory, FarmerProfile, Language};
pub use intel::{FarmIntel, IntelClient, IntelError};
pub use points::{PointsLedger, RedemptionOutcome, Reward};
pub use session::{MenuState, Session, SessionStore};
