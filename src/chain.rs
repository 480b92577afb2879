// Ordered interceptor composition and dispatch
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::{CommandContext, CommandEventData, CommandExecutedEventData, ScalarValue};
use crate::error::{InterceptError, InterceptResult};
use crate::result::{ExecutionResult, RowSet};
use crate::traits::{CommandInterceptor, Phase};

/// An ordered set of interceptors composed into one logical interceptor.
///
/// Every phase call visits each member in registration order, threading the
/// in-flight result forward so later members see what earlier members left,
/// and may replace it. No member is skipped on override; dispatch stops early
/// only when a member returns an error or, in the async operations, when the
/// cancellation token fires between members.
///
/// The member list is immutable after construction and shared behind an
/// `Arc`, so cloning a chain is cheap and a clone dispatches identically.
/// Since the chain implements [`CommandInterceptor`] itself, chains nest:
/// a chain registered inside another runs its own members in place.
#[derive(Clone)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn CommandInterceptor>]>,
}

impl InterceptorChain {
    /// Compose a chain from interceptors in their final dispatch order
    pub fn new(interceptors: Vec<Arc<dyn CommandInterceptor>>) -> Self {
        tracing::debug!("Composed interceptor chain with {} members", interceptors.len());
        Self {
            interceptors: interceptors.into(),
        }
    }

    /// Start building a chain member by member
    pub fn builder() -> InterceptorChainBuilder {
        InterceptorChainBuilder::new()
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Member names in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    fn trace_dispatch(&self, phase: Phase) {
        tracing::trace!(
            "Dispatching {} through {} interceptors",
            phase,
            self.interceptors.len()
        );
    }

    /// Cancellation gate applied between members during async dispatch
    fn check_cancelled(phase: Phase, cancel: &CancellationToken) -> InterceptResult<()> {
        if cancel.is_cancelled() {
            tracing::debug!("Chain dispatch cancelled during {}", phase);
            return Err(InterceptError::cancelled(phase));
        }
        Ok(())
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.names())
            .finish()
    }
}

#[async_trait]
impl CommandInterceptor for InterceptorChain {
    fn name(&self) -> &'static str {
        "InterceptorChain"
    }

    // ========================================
    // Synchronous dispatch
    // ========================================

    fn reader_executing(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        self.trace_dispatch(Phase::ReaderExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            slot = interceptor.reader_executing(command, event, slot)?;
        }
        Ok(slot)
    }

    fn reader_executed(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        reader: &RowSet,
    ) -> InterceptResult<()> {
        self.trace_dispatch(Phase::ReaderExecuted);
        for interceptor in self.interceptors.iter() {
            interceptor.reader_executed(command, event, reader)?;
        }
        Ok(())
    }

    fn scalar_executing(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        self.trace_dispatch(Phase::ScalarExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            slot = interceptor.scalar_executing(command, event, slot)?;
        }
        Ok(slot)
    }

    fn scalar_executed(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        result: ScalarValue,
    ) -> InterceptResult<ScalarValue> {
        self.trace_dispatch(Phase::ScalarExecuted);
        let mut value = result;
        for interceptor in self.interceptors.iter() {
            value = interceptor.scalar_executed(command, event, value)?;
        }
        Ok(value)
    }

    fn nonquery_executing(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        self.trace_dispatch(Phase::NonQueryExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            slot = interceptor.nonquery_executing(command, event, slot)?;
        }
        Ok(slot)
    }

    fn nonquery_executed(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        rows_affected: u64,
    ) -> InterceptResult<u64> {
        self.trace_dispatch(Phase::NonQueryExecuted);
        let mut rows = rows_affected;
        for interceptor in self.interceptors.iter() {
            rows = interceptor.nonquery_executed(command, event, rows)?;
        }
        Ok(rows)
    }

    // ========================================
    // Asynchronous dispatch
    //
    // Members run strictly one at a time; each await completes before the
    // next member is called. The token is checked before every member, so a
    // cancellation observed during member k stops the fold even when k
    // itself returned Ok.
    // ========================================

    async fn reader_executing_async(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        self.trace_dispatch(Phase::ReaderExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::ReaderExecuting, cancel)?;
            slot = interceptor
                .reader_executing_async(command, event, slot, cancel)
                .await?;
        }
        Ok(slot)
    }

    async fn reader_executed_async(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        reader: &RowSet,
        cancel: &CancellationToken,
    ) -> InterceptResult<()> {
        self.trace_dispatch(Phase::ReaderExecuted);
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::ReaderExecuted, cancel)?;
            interceptor
                .reader_executed_async(command, event, reader, cancel)
                .await?;
        }
        Ok(())
    }

    async fn scalar_executing_async(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        self.trace_dispatch(Phase::ScalarExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::ScalarExecuting, cancel)?;
            slot = interceptor
                .scalar_executing_async(command, event, slot, cancel)
                .await?;
        }
        Ok(slot)
    }

    async fn scalar_executed_async(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        result: ScalarValue,
        cancel: &CancellationToken,
    ) -> InterceptResult<ScalarValue> {
        self.trace_dispatch(Phase::ScalarExecuted);
        let mut value = result;
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::ScalarExecuted, cancel)?;
            value = interceptor
                .scalar_executed_async(command, event, value, cancel)
                .await?;
        }
        Ok(value)
    }

    async fn nonquery_executing_async(
        &self,
        command: &CommandContext,
        event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        self.trace_dispatch(Phase::NonQueryExecuting);
        let mut slot = result;
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::NonQueryExecuting, cancel)?;
            slot = interceptor
                .nonquery_executing_async(command, event, slot, cancel)
                .await?;
        }
        Ok(slot)
    }

    async fn nonquery_executed_async(
        &self,
        command: &CommandContext,
        event: &CommandExecutedEventData,
        rows_affected: u64,
        cancel: &CancellationToken,
    ) -> InterceptResult<u64> {
        self.trace_dispatch(Phase::NonQueryExecuted);
        let mut rows = rows_affected;
        for interceptor in self.interceptors.iter() {
            Self::check_cancelled(Phase::NonQueryExecuted, cancel)?;
            rows = interceptor
                .nonquery_executed_async(command, event, rows, cancel)
                .await?;
        }
        Ok(rows)
    }
}

/// Builder that accretes interceptors in dispatch order
#[derive(Default)]
pub struct InterceptorChainBuilder {
    interceptors: Vec<Arc<dyn CommandInterceptor>>,
}

impl InterceptorChainBuilder {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Register an interceptor at the end of the chain
    pub fn register<I>(self, interceptor: I) -> Self
    where
        I: CommandInterceptor + 'static,
    {
        self.register_shared(Arc::new(interceptor))
    }

    /// Register an already-shared interceptor.
    ///
    /// The same instance may belong to any number of chains.
    pub fn register_shared(mut self, interceptor: Arc<dyn CommandInterceptor>) -> Self {
        tracing::debug!(
            "Registered interceptor '{}' at position {}",
            interceptor.name(),
            self.interceptors.len()
        );
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> InterceptorChain {
        InterceptorChain::new(self.interceptors)
    }
}
