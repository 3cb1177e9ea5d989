//! Farmer directory module
//!
//! Resolves phone numbers to farmer profiles, with a demo roster and a
//! generic default so resolution never fails.

mod directory;
mod types;

pub use directory::FarmerDirectory;
pub use types::{level_for, FarmerProfile, Language};
