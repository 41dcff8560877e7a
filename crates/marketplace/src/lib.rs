//! Listing orchestration across independent third-party marketplaces.
//!
//! One listing request fans out to every configured provider:
//! 1. Provider A creates the listing in a single call
//! 2. Provider B creates an inventory item, then publishes it
//!
//! Each network call is wrapped in a bounded, fixed-delay [`RetryPolicy`].
//! Per-provider outcomes are aggregated into one [`common::Outcome`] that
//! distinguishes total success, partial success and total failure, and
//! flags failures that can be resumed with [`ListingOrchestrator::retry_failed_publish`].
//! A published listing on one provider is never rolled back because another
//! provider failed.

pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod results;
pub mod retry;
pub mod state;
pub mod transport;

pub use error::{AttemptError, ProviderFailure, Recoverability, RetryExhausted, TransportError};
pub use orchestrator::{DispatchMode, ListingOrchestrator};
pub use providers::{ListingCreated, Provider, ProviderA, ProviderB, ProviderId};
pub use results::ProviderResultSet;
pub use retry::RetryPolicy;
pub use state::OrchestrationState;
pub use transport::{
    HttpTransport, InMemoryTransport, Transport, TransportRequest, TransportResponse,
};
