//! FxWidget Common Types
//!
//! This crate contains the value types shared by the FxWidget crates:
//! currency codes, rate tables, currency listings and the rate-service
//! error taxonomy.

pub mod monetary;
pub mod error;

pub use monetary::*;
pub use error::*;
