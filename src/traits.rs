use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::context::{CommandContext, CommandEventData, CommandExecutedEventData, ScalarValue};
use crate::error::InterceptResult;
use crate::result::{ExecutionResult, RowSet};

/// Lifecycle points a command passes through, one per interception operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    ReaderExecuting,   // before a row-producing query
    ReaderExecuted,    // after a row-producing query
    ScalarExecuting,   // before a single-value query
    ScalarExecuted,    // after a single-value query
    NonQueryExecuting, // before a row-count statement
    NonQueryExecuted,  // after a row-count statement
}

impl Phase {
    /// Check if the phase runs before the underlying provider call
    pub fn is_before(&self) -> bool {
        matches!(
            self,
            Phase::ReaderExecuting | Phase::ScalarExecuting | Phase::NonQueryExecuting
        )
    }

    /// Check if the phase runs after the underlying provider call
    pub fn is_after(&self) -> bool {
        !self.is_before()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::ReaderExecuting => "reader-executing",
            Phase::ReaderExecuted => "reader-executed",
            Phase::ScalarExecuting => "scalar-executing",
            Phase::ScalarExecuted => "scalar-executed",
            Phase::NonQueryExecuting => "nonquery-executing",
            Phase::NonQueryExecuted => "nonquery-executed",
        };
        f.write_str(label)
    }
}

/// Capability contract for command interceptors.
///
/// An interceptor hooks the lifecycle of reader, scalar, and non-query
/// executions, before and after the underlying provider call, in sync and
/// async form. Every operation defaults to a pass-through, so implementors
/// override only the phases they care about.
///
/// "Executing" phases thread an optional [`ExecutionResult`] slot: `None`
/// means the command is still headed for real execution, `Some` means an
/// earlier participant (or the caller) already holds a result. Returning a
/// `Some` with [`ExecutionResult::overridden`] tells the execution path to
/// skip the provider call and adopt the carried value. Interceptors must
/// return the slot unchanged when they have no opinion.
///
/// "Executed" phases run once a result exists. Scalar and non-query forms may
/// replace the value they are handed; the reader form only observes, since a
/// row stream cannot be rebuilt after the fact.
///
/// Async operations additionally receive a [`CancellationToken`]. An
/// implementation that observes cancellation mid-flight should stop and
/// return [`InterceptError::Cancelled`](crate::error::InterceptError).
#[async_trait]
pub trait CommandInterceptor: Send + Sync {
    /// Interceptor name for logging and error attribution
    fn name(&self) -> &'static str;

    // ========================================
    // Synchronous operations
    // ========================================

    /// Called before a reader execution
    fn reader_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        Ok(result)
    }

    /// Called after a reader execution; observation only
    fn reader_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        _reader: &RowSet,
    ) -> InterceptResult<()> {
        Ok(())
    }

    /// Called before a scalar execution
    fn scalar_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        Ok(result)
    }

    /// Called after a scalar execution; may replace the value
    fn scalar_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        result: ScalarValue,
    ) -> InterceptResult<ScalarValue> {
        Ok(result)
    }

    /// Called before a non-query execution
    fn nonquery_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        Ok(result)
    }

    /// Called after a non-query execution; may replace the affected-row count
    fn nonquery_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        rows_affected: u64,
    ) -> InterceptResult<u64> {
        Ok(rows_affected)
    }

    // ========================================
    // Asynchronous operations
    // ========================================

    /// Async counterpart of [`reader_executing`](Self::reader_executing)
    async fn reader_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
        _cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        Ok(result)
    }

    /// Async counterpart of [`reader_executed`](Self::reader_executed)
    async fn reader_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        _reader: &RowSet,
        _cancel: &CancellationToken,
    ) -> InterceptResult<()> {
        Ok(())
    }

    /// Async counterpart of [`scalar_executing`](Self::scalar_executing)
    async fn scalar_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
        _cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        Ok(result)
    }

    /// Async counterpart of [`scalar_executed`](Self::scalar_executed)
    async fn scalar_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        result: ScalarValue,
        _cancel: &CancellationToken,
    ) -> InterceptResult<ScalarValue> {
        Ok(result)
    }

    /// Async counterpart of [`nonquery_executing`](Self::nonquery_executing)
    async fn nonquery_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
        _cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        Ok(result)
    }

    /// Async counterpart of [`nonquery_executed`](Self::nonquery_executed)
    async fn nonquery_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        rows_affected: u64,
        _cancel: &CancellationToken,
    ) -> InterceptResult<u64> {
        Ok(rows_affected)
    }
}
