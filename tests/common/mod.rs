#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use sql_intercept::{
    CancellationToken, CommandContext, CommandEventData, CommandExecutedEventData,
    CommandInterceptor, ExecutionResult, InterceptError, InterceptResult, Phase, RowSet,
    ScalarValue,
};

static TRACING: OnceLock<()> = OnceLock::new();

/// Install a tracing subscriber once per test binary; RUST_LOG controls verbosity
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Shared invocation journal; entries read "<member>:<phase>" with an
/// optional ":<detail>" suffix
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Describe the in-flight result slot as a member saw it
pub fn slot_state<T>(result: &Option<ExecutionResult<T>>) -> &'static str {
    match result {
        None => "absent",
        Some(r) if r.is_overridden() => "overridden",
        Some(_) => "completed",
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn row(pairs: Vec<(&str, Value)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn sample_rows() -> RowSet {
    vec![
        row(vec![("id", json!(1)), ("name", json!("alpha"))]),
        row(vec![("id", json!(2)), ("name", json!("beta"))]),
    ]
    .into()
}

pub fn command() -> CommandContext {
    CommandContext::new("SELECT * FROM accounts")
}

/// What a scripted member does at the phase it targets; everywhere else it
/// behaves as a recording pass-through
pub enum Action {
    Passthrough,
    OverrideReader(RowSet),
    OverrideScalar(ScalarValue),
    OverrideNonQuery(u64),
    FailAt(Phase),
    UnsupportedAt(Phase),
    /// Cancel the token mid-dispatch; `report` decides whether the member
    /// itself returns the cancellation error or quietly passes through
    CancelToken { report: bool },
    TagScalar(&'static str),
    ScaleRows(u64),
    AddRows(u64),
}

/// Scripted chain member: records every invocation in the shared journal and
/// performs one configured action
pub struct Probe {
    name: &'static str,
    journal: Journal,
    action: Action,
    delay: Option<Duration>,
}

impl Probe {
    fn new(name: &'static str, journal: &Journal, action: Action) -> Self {
        Self {
            name,
            journal: Arc::clone(journal),
            action,
            delay: None,
        }
    }

    pub fn passthrough(name: &'static str, journal: &Journal) -> Self {
        Self::new(name, journal, Action::Passthrough)
    }

    pub fn override_reader(name: &'static str, journal: &Journal, rows: RowSet) -> Self {
        Self::new(name, journal, Action::OverrideReader(rows))
    }

    pub fn override_scalar(name: &'static str, journal: &Journal, value: ScalarValue) -> Self {
        Self::new(name, journal, Action::OverrideScalar(value))
    }

    pub fn override_nonquery(name: &'static str, journal: &Journal, rows_affected: u64) -> Self {
        Self::new(name, journal, Action::OverrideNonQuery(rows_affected))
    }

    pub fn fail_at(name: &'static str, journal: &Journal, phase: Phase) -> Self {
        Self::new(name, journal, Action::FailAt(phase))
    }

    pub fn unsupported_at(name: &'static str, journal: &Journal, phase: Phase) -> Self {
        Self::new(name, journal, Action::UnsupportedAt(phase))
    }

    pub fn cancel_token(name: &'static str, journal: &Journal, report: bool) -> Self {
        Self::new(name, journal, Action::CancelToken { report })
    }

    pub fn tag_scalar(name: &'static str, journal: &Journal, tag: &'static str) -> Self {
        Self::new(name, journal, Action::TagScalar(tag))
    }

    pub fn scale_rows(name: &'static str, journal: &Journal, factor: u64) -> Self {
        Self::new(name, journal, Action::ScaleRows(factor))
    }

    pub fn add_rows(name: &'static str, journal: &Journal, amount: u64) -> Self {
        Self::new(name, journal, Action::AddRows(amount))
    }

    /// Sleep this long at the start of every async operation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn note(&self, phase: Phase, detail: &str) {
        let mut entries = self.journal.lock().unwrap();
        if detail.is_empty() {
            entries.push(format!("{}:{}", self.name, phase));
        } else {
            entries.push(format!("{}:{}:{}", self.name, phase, detail));
        }
    }

    /// Raise the scripted error when this phase is the configured target
    fn gate(&self, phase: Phase) -> InterceptResult<()> {
        match &self.action {
            Action::FailAt(p) if *p == phase => {
                Err(InterceptError::failed(self.name, phase, "injected failure"))
            }
            Action::UnsupportedAt(p) if *p == phase => {
                Err(InterceptError::phase_not_supported(self.name, phase))
            }
            _ => Ok(()),
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn cancel_action(
        &self,
        phase: Phase,
        cancel: &CancellationToken,
    ) -> Option<InterceptResult<()>> {
        if let Action::CancelToken { report } = &self.action {
            cancel.cancel();
            if *report {
                return Some(Err(InterceptError::cancelled(phase)));
            }
            return Some(Ok(()));
        }
        None
    }
}

#[async_trait]
impl CommandInterceptor for Probe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn reader_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        self.note(Phase::ReaderExecuting, slot_state(&result));
        self.gate(Phase::ReaderExecuting)?;
        match &self.action {
            Action::OverrideReader(rows) => Ok(Some(ExecutionResult::overridden(rows.clone()))),
            _ => Ok(result),
        }
    }

    fn reader_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        reader: &RowSet,
    ) -> InterceptResult<()> {
        self.note(Phase::ReaderExecuted, &format!("rows={}", reader.len()));
        self.gate(Phase::ReaderExecuted)
    }

    fn scalar_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        self.note(Phase::ScalarExecuting, slot_state(&result));
        self.gate(Phase::ScalarExecuting)?;
        match &self.action {
            Action::OverrideScalar(value) => Ok(Some(ExecutionResult::overridden(value.clone()))),
            _ => Ok(result),
        }
    }

    fn scalar_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        result: ScalarValue,
    ) -> InterceptResult<ScalarValue> {
        self.note(Phase::ScalarExecuted, "");
        self.gate(Phase::ScalarExecuted)?;
        match &self.action {
            Action::TagScalar(tag) => {
                Ok(ScalarValue::from(format!("{}|{}", value_text(&result), tag)))
            }
            _ => Ok(result),
        }
    }

    fn nonquery_executing(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        self.note(Phase::NonQueryExecuting, slot_state(&result));
        self.gate(Phase::NonQueryExecuting)?;
        match &self.action {
            Action::OverrideNonQuery(rows_affected) => {
                Ok(Some(ExecutionResult::overridden(*rows_affected)))
            }
            _ => Ok(result),
        }
    }

    fn nonquery_executed(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        rows_affected: u64,
    ) -> InterceptResult<u64> {
        self.note(Phase::NonQueryExecuted, "");
        self.gate(Phase::NonQueryExecuted)?;
        match &self.action {
            Action::ScaleRows(factor) => Ok(rows_affected * factor),
            Action::AddRows(amount) => Ok(rows_affected + amount),
            _ => Ok(rows_affected),
        }
    }

    async fn reader_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<RowSet>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<RowSet>>> {
        self.pause().await;
        self.note(Phase::ReaderExecuting, slot_state(&result));
        self.gate(Phase::ReaderExecuting)?;
        if let Some(outcome) = self.cancel_action(Phase::ReaderExecuting, cancel) {
            outcome?;
            return Ok(result);
        }
        match &self.action {
            Action::OverrideReader(rows) => Ok(Some(ExecutionResult::overridden(rows.clone()))),
            _ => Ok(result),
        }
    }

    async fn reader_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        reader: &RowSet,
        cancel: &CancellationToken,
    ) -> InterceptResult<()> {
        self.pause().await;
        self.note(Phase::ReaderExecuted, &format!("rows={}", reader.len()));
        self.gate(Phase::ReaderExecuted)?;
        if let Some(outcome) = self.cancel_action(Phase::ReaderExecuted, cancel) {
            return outcome;
        }
        Ok(())
    }

    async fn scalar_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<ScalarValue>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
        self.pause().await;
        self.note(Phase::ScalarExecuting, slot_state(&result));
        self.gate(Phase::ScalarExecuting)?;
        if let Some(outcome) = self.cancel_action(Phase::ScalarExecuting, cancel) {
            outcome?;
            return Ok(result);
        }
        match &self.action {
            Action::OverrideScalar(value) => Ok(Some(ExecutionResult::overridden(value.clone()))),
            _ => Ok(result),
        }
    }

    async fn scalar_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        result: ScalarValue,
        cancel: &CancellationToken,
    ) -> InterceptResult<ScalarValue> {
        self.pause().await;
        self.note(Phase::ScalarExecuted, "");
        self.gate(Phase::ScalarExecuted)?;
        if let Some(outcome) = self.cancel_action(Phase::ScalarExecuted, cancel) {
            outcome?;
            return Ok(result);
        }
        match &self.action {
            Action::TagScalar(tag) => {
                Ok(ScalarValue::from(format!("{}|{}", value_text(&result), tag)))
            }
            _ => Ok(result),
        }
    }

    async fn nonquery_executing_async(
        &self,
        _command: &CommandContext,
        _event: &CommandEventData,
        result: Option<ExecutionResult<u64>>,
        cancel: &CancellationToken,
    ) -> InterceptResult<Option<ExecutionResult<u64>>> {
        self.pause().await;
        self.note(Phase::NonQueryExecuting, slot_state(&result));
        self.gate(Phase::NonQueryExecuting)?;
        if let Some(outcome) = self.cancel_action(Phase::NonQueryExecuting, cancel) {
            outcome?;
            return Ok(result);
        }
        match &self.action {
            Action::OverrideNonQuery(rows_affected) => {
                Ok(Some(ExecutionResult::overridden(*rows_affected)))
            }
            _ => Ok(result),
        }
    }

    async fn nonquery_executed_async(
        &self,
        _command: &CommandContext,
        _event: &CommandExecutedEventData,
        rows_affected: u64,
        cancel: &CancellationToken,
    ) -> InterceptResult<u64> {
        self.pause().await;
        self.note(Phase::NonQueryExecuted, "");
        self.gate(Phase::NonQueryExecuted)?;
        if let Some(outcome) = self.cancel_action(Phase::NonQueryExecuted, cancel) {
            outcome?;
            return Ok(rows_affected);
        }
        match &self.action {
            Action::ScaleRows(factor) => Ok(rows_affected * factor),
            Action::AddRows(amount) => Ok(rows_affected + amount),
            _ => Ok(rows_affected),
        }
    }
}
