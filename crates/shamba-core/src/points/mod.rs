//! Points ledger module
//!
//! Tracks each farmer's Shamba Points balance with a rolling daily earn
//! cap, and processes redemptions against the fixed reward catalog.
//! Balances are persisted in SQLite so a redemption debit survives a
//! restart.

mod catalog;
mod ledger;
mod store;

pub use catalog::{reward_catalog, Reward};
pub use ledger::{PointsLedger, RedemptionOutcome, RedemptionReceipt};
pub use store::LedgerStore;
