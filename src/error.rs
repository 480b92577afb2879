// Interception pipeline error types
use thiserror::Error;

use crate::traits::Phase;

/// Result alias used throughout the interception contract
pub type InterceptResult<T> = Result<T, InterceptError>;

/// Errors raised by interceptors or by chain dispatch.
///
/// Carries enough structure for callers to attribute a failure to a member
/// and a phase without parsing the rendered message. `Clone` and `PartialEq`
/// let dispatch tests assert that the error a member raised is the error the
/// caller received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterceptError {
    /// An interceptor rejected or aborted the command at the given phase
    #[error("interceptor '{interceptor}' failed during {phase}: {message}")]
    Failed {
        interceptor: String,
        phase: Phase,
        message: String,
    },

    /// An interceptor was asked to handle a phase it does not implement
    #[error("interceptor '{interceptor}' does not support {phase}")]
    PhaseNotSupported {
        interceptor: String,
        phase: Phase,
    },

    /// Cancellation was observed before or during an async dispatch
    #[error("execution cancelled during {phase}")]
    Cancelled { phase: Phase },
}

// Static constructor methods
impl InterceptError {
    pub fn failed(
        interceptor: impl Into<String>,
        phase: Phase,
        message: impl Into<String>,
    ) -> Self {
        InterceptError::Failed {
            interceptor: interceptor.into(),
            phase,
            message: message.into(),
        }
    }

    pub fn phase_not_supported(interceptor: impl Into<String>, phase: Phase) -> Self {
        InterceptError::PhaseNotSupported {
            interceptor: interceptor.into(),
            phase,
        }
    }

    pub fn cancelled(phase: Phase) -> Self {
        InterceptError::Cancelled { phase }
    }
}

impl InterceptError {
    /// Get the phase the error was raised in
    pub fn phase(&self) -> Phase {
        match self {
            InterceptError::Failed { phase, .. } => *phase,
            InterceptError::PhaseNotSupported { phase, .. } => *phase,
            InterceptError::Cancelled { phase } => *phase,
        }
    }

    /// Get the name of the interceptor that raised the error, if any.
    ///
    /// Cancellation has no owning member, so it reports `None`.
    pub fn interceptor(&self) -> Option<&str> {
        match self {
            InterceptError::Failed { interceptor, .. } => Some(interceptor),
            InterceptError::PhaseNotSupported { interceptor, .. } => Some(interceptor),
            InterceptError::Cancelled { .. } => None,
        }
    }

    /// Check whether the error reports a cancelled execution
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InterceptError::Cancelled { .. })
    }
}
