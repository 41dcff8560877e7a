//! Per-request orchestration state machine.

/// Where one listing request is in its lifecycle.
///
/// State transitions:
/// ```text
/// Validating ──┬──► Dispatching ──► Aggregating ──► Done
///              └──► Done (validation failed)
/// ```
///
/// Dispatching has no failure exit: every provider is attempted before
/// aggregation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrchestrationState {
    /// Raw parameters are being validated.
    #[default]
    Validating,

    /// Provider clients are being invoked.
    Dispatching,

    /// Per-provider outcomes are being combined.
    Aggregating,

    /// A response outcome has been produced (terminal state).
    Done,
}

impl OrchestrationState {
    /// Returns true if moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: OrchestrationState) -> bool {
        use OrchestrationState::*;
        matches!(
            (self, next),
            (Validating, Dispatching)
                | (Validating, Done)
                | (Dispatching, Aggregating)
                | (Aggregating, Done)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestrationState::Done)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationState::Validating => "Validating",
            OrchestrationState::Dispatching => "Dispatching",
            OrchestrationState::Aggregating => "Aggregating",
            OrchestrationState::Done => "Done",
        }
    }
}

impl std::fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
