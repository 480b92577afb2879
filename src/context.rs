// Command and event carriers threaded through every interception call
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Scalar execution results travel as plain JSON values, the same currency
/// the surrounding access layer uses for parameters and rows.
pub type ScalarValue = Value;

/// The command under interception: statement text plus bound parameters.
///
/// Opaque to the pipeline. Every phase call borrows it unchanged; nothing is
/// retained past the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Statement text as the provider will receive it
    pub text: String,
    /// Positional bind parameters
    pub params: Vec<Value>,
}

impl CommandContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }
}

/// Event metadata handed to "executing" phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEventData {
    pub command_id: Uuid,
    pub connection_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl CommandEventData {
    /// Create event metadata stamped with the current time
    pub fn new(command_id: Uuid, connection_id: Uuid) -> Self {
        Self {
            command_id,
            connection_id,
            started_at: Utc::now(),
        }
    }

    /// Create event metadata with generated identifiers, for callers that do
    /// not track command or connection identity themselves
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4(), Uuid::new_v4())
    }

    /// Derive the matching "executed" metadata, measuring elapsed time from
    /// `started_at`
    pub fn completed(&self) -> CommandExecutedEventData {
        let elapsed = (Utc::now() - self.started_at).to_std().unwrap_or_default();
        self.completed_with(elapsed)
    }

    /// Derive the matching "executed" metadata with a known duration
    pub fn completed_with(&self, elapsed: Duration) -> CommandExecutedEventData {
        CommandExecutedEventData {
            command_id: self.command_id,
            connection_id: self.connection_id,
            started_at: self.started_at,
            elapsed,
        }
    }
}

/// Event metadata handed to "executed" phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandExecutedEventData {
    pub command_id: Uuid,
    pub connection_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}
