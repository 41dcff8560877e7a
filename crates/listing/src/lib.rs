//! Listing request layer.
//!
//! This crate provides:
//! - `RawListingParams`, the unvalidated shape received at the inbound boundary
//! - `ListingRequest`, the immutable value object consumed by provider clients
//! - the `Validator` seam and the default `ProductParamsValidator`

pub mod error;
pub mod request;
pub mod validator;

pub use error::{FieldError, ValidationFailure};
pub use request::{ListingRequest, RawListingParams};
pub use validator::{MAX_PRICE_CENTS, ProductParamsValidator, Validator};
