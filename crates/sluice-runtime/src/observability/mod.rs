//! Observability module
//!
//! Execution counters for rules, stages and pipelines, plus the
//! interpreter listeners that report control flow as it happens.

pub mod listener;
pub mod metrics;

pub use listener::{InterpreterListener, NoopInterpreterListener, TracingInterpreterListener};
pub use metrics::{Counter, RuleMetrics, RuleMetricsSnapshot};
