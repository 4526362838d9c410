//! # vesta-core
//! Foundation types and traits for the vesta vote-escrow.

pub mod constants;
pub mod error;
pub mod registry;
pub mod token;
pub mod traits;
pub mod types;
