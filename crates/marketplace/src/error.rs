//! Marketplace error types.

use common::{Outcome, keys};
use thiserror::Error;

use crate::providers::ProviderId;

/// A transport-level fault: no HTTP response was observed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client reported an error (connection refused, TLS, decode...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete within the transport's timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider could not be reached.
    #[error("provider unreachable: {0}")]
    Unreachable(String),
}

impl TransportError {
    /// Classifies a reqwest error, separating timeouts from other faults.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(err)
        }
    }
}

/// Why a single attempt of a provider call failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The provider answered with a status other than 200/201.
    #[error("{operation} failed with status {status}")]
    Status { operation: &'static str, status: u16 },

    /// The provider answered 200/201 but the body lacked the expected id.
    #[error("{operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// No response was observed.
    #[error("{operation} transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },
}

impl AttemptError {
    /// HTTP status of the failed attempt, if the provider answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Status { status, .. } => Some(*status),
            AttemptError::MissingField { .. } | AttemptError::Transport { .. } => None,
        }
    }

    /// What this failure says about side effects on the provider.
    ///
    /// A non-2xx answer means the provider rejected the call. A missing id or
    /// a transport fault leaves open whether the provider acted on it.
    pub fn recoverability(&self) -> Recoverability {
        match self {
            AttemptError::Status { .. } => Recoverability::Terminal,
            AttemptError::MissingField { .. } | AttemptError::Transport { .. } => {
                Recoverability::Unknown
            }
        }
    }
}

/// Terminal failure produced once a retry policy runs out of attempts.
#[derive(Debug, Error)]
#[error("max retries exceeded: {last_error}")]
pub struct RetryExhausted<E> {
    /// Name of the retried operation.
    pub operation: String,
    /// Number of attempts made (equals the policy's maximum).
    pub attempts: u32,
    /// Failure reported by the final attempt.
    pub last_error: E,
}

/// Whether a failed provider protocol can be resumed without starting over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recoverability {
    /// A partial artifact exists; retrying only the remaining step is safe.
    Recoverable,
    /// Nothing resumable was created; a retry must restart the protocol.
    Terminal,
    /// The final attempt saw no answer; the provider may or may not have acted.
    Unknown,
}

impl Recoverability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recoverability::Recoverable => "recoverable",
            Recoverability::Terminal => "terminal",
            Recoverability::Unknown => "unknown",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Recoverability::Recoverable)
    }
}

impl std::fmt::Display for Recoverability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final, exhausted failure of one provider's listing protocol.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub message: String,
    pub status_code: Option<u16>,
    /// Inventory item already created on the provider, if any.
    pub inventory_id: Option<String>,
    pub recoverability: Recoverability,
}

impl ProviderFailure {
    /// Builds a failure from an exhausted retry of a provider call.
    pub fn exhausted(provider: ProviderId, exhausted: RetryExhausted<AttemptError>) -> Self {
        Self {
            provider,
            message: exhausted.to_string(),
            status_code: exhausted.last_error.status_code(),
            inventory_id: None,
            recoverability: exhausted.last_error.recoverability(),
        }
    }

    /// Marks the failure as resumable from an already created inventory item.
    pub fn resumable_at(mut self, inventory_id: impl Into<String>) -> Self {
        self.inventory_id = Some(inventory_id.into());
        self.recoverability = Recoverability::Recoverable;
        self
    }
}

impl From<ProviderFailure> for Outcome {
    fn from(failure: ProviderFailure) -> Self {
        let mut outcome = Outcome::failure(failure.message)
            .with_meta(keys::MARKETPLACE, failure.provider.as_str())
            .with_meta(keys::RECOVERABILITY, failure.recoverability.as_str());

        if let Some(status) = failure.status_code {
            outcome = outcome.with_meta(keys::STATUS_CODE, status);
        }
        if let Some(inventory_id) = failure.inventory_id {
            outcome = outcome.with_meta(keys::INVENTORY_ID, inventory_id);
        }
        // Absence of the flag keeps meaning "restart from scratch".
        if failure.recoverability.is_recoverable() {
            outcome = outcome.with_meta(keys::RECOVERABLE, true);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted(last_error: AttemptError) -> RetryExhausted<AttemptError> {
        RetryExhausted {
            operation: "provider_b_publish".to_string(),
            attempts: 3,
            last_error,
        }
    }

    #[test]
    fn test_retry_exhausted_message() {
        let err = exhausted(AttemptError::Status {
            operation: "Provider B publish",
            status: 500,
        });
        assert_eq!(
            err.to_string(),
            "max retries exceeded: Provider B publish failed with status 500"
        );
    }

    #[test]
    fn test_attempt_error_classification() {
        let status = AttemptError::Status {
            operation: "op",
            status: 503,
        };
        assert_eq!(status.status_code(), Some(503));
        assert_eq!(status.recoverability(), Recoverability::Terminal);

        let transport = AttemptError::Transport {
            operation: "op",
            source: TransportError::Timeout,
        };
        assert_eq!(transport.status_code(), None);
        assert_eq!(transport.recoverability(), Recoverability::Unknown);
        assert_eq!(transport.to_string(), "op transport error: request timed out");
    }

    #[test]
    fn test_terminal_failure_has_no_recoverable_flag() {
        let failure = ProviderFailure::exhausted(
            ProviderId::ProviderB,
            exhausted(AttemptError::Status {
                operation: "Provider B inventory creation",
                status: 500,
            }),
        );
        let outcome: Outcome = failure.into();

        assert!(outcome.is_failure());
        assert!(outcome.meta().get(keys::RECOVERABLE).is_none());
        assert_eq!(outcome.meta_str(keys::RECOVERABILITY), Some("terminal"));
        assert_eq!(outcome.meta_str(keys::MARKETPLACE), Some("provider_b"));
        assert_eq!(outcome.meta()[keys::STATUS_CODE], 500);
    }

    #[test]
    fn test_resumable_failure_outcome() {
        let failure = ProviderFailure::exhausted(
            ProviderId::ProviderB,
            exhausted(AttemptError::Status {
                operation: "Provider B publish",
                status: 500,
            }),
        )
        .resumable_at("67890");
        let outcome: Outcome = failure.into();

        assert!(outcome.meta_flag(keys::RECOVERABLE));
        assert_eq!(outcome.meta_str(keys::INVENTORY_ID), Some("67890"));
        assert_eq!(outcome.meta_str(keys::RECOVERABILITY), Some("recoverable"));
    }
}
