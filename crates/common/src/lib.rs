//! Shared types for the listing orchestrator.
//!
//! Every layer reports through [`Outcome`], a uniform success/failure envelope
//! with an open payload and an additive diagnostic `meta` bag.

pub mod keys;
pub mod outcome;
pub mod types;

pub use outcome::{Fields, Outcome};
pub use types::RequestId;
