//! Command-execution interception for database access layers.
//!
//! Interceptors hook the lifecycle of a database command, reader, scalar, and
//! non-query alike, both before and after the underlying provider call. A
//! "before" interceptor may short-circuit the real execution by supplying a
//! substitute result; an "after" interceptor can observe or replace what the
//! execution produced. The [`InterceptorChain`] composes an ordered set of
//! interceptors into one logical [`CommandInterceptor`]: every phase call
//! visits each member in registration order and threads the in-flight result
//! forward, so later members see (and may replace) what earlier members left.
//!
//! ```
//! use sql_intercept::{
//!     CommandContext, CommandEventData, CommandInterceptor, ExecutionResult,
//!     InterceptResult, InterceptorChain, ScalarValue,
//! };
//!
//! // Answers COUNT queries from memory, skipping the provider call.
//! struct CountCache;
//!
//! impl CommandInterceptor for CountCache {
//!     fn name(&self) -> &'static str {
//!         "CountCache"
//!     }
//!
//!     fn scalar_executing(
//!         &self,
//!         command: &CommandContext,
//!         _event: &CommandEventData,
//!         result: Option<ExecutionResult<ScalarValue>>,
//!     ) -> InterceptResult<Option<ExecutionResult<ScalarValue>>> {
//!         if command.text.contains("COUNT") {
//!             return Ok(Some(ExecutionResult::overridden(ScalarValue::from(42))));
//!         }
//!         Ok(result)
//!     }
//! }
//!
//! let chain = InterceptorChain::builder().register(CountCache).build();
//! let command = CommandContext::new("SELECT COUNT(*) FROM users");
//! let event = CommandEventData::generate();
//!
//! let slot = chain.scalar_executing(&command, &event, None).unwrap();
//! let result = slot.expect("cache populated the slot");
//! assert!(result.is_overridden());
//! assert_eq!(result.value(), &ScalarValue::from(42));
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod result;
pub mod traits;

pub use chain::*;
pub use context::*;
pub use error::*;
pub use result::*;
pub use traits::*;

// Re-exported so implementors can name the contract's signature types without
// depending on the underlying crates directly.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
