//! Sluice Runtime - Pipeline interpreter for stream-routed messages
//!
//! This crate evaluates rule conditions and actions against messages, groups
//! pipeline stages by number and runs the fixed-point processing loop that
//! re-routes messages when their streams change.

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod interpreter;
pub mod journal;
pub mod observability;
pub mod pipeline;
pub mod rule;
pub mod scheduler;
pub mod state;

// Re-export main types
pub use context::{EvaluationContext, EvaluationError};
pub use engine::Evaluator;
pub use error::{Result, RuntimeError};
pub use functions::{BuiltinFunction, Function, FunctionRegistry};
pub use interpreter::{PipelineInterpreter, DEFAULT_MAX_PROCESSING_PASSES};
pub use journal::{Journal, NoopJournal};
pub use observability::{
    InterpreterListener, NoopInterpreterListener, RuleMetrics, RuleMetricsSnapshot,
    TracingInterpreterListener,
};
pub use pipeline::{Pipeline, Stage};
pub use rule::{CompiledRule, Rule, RuleExecutable};
pub use scheduler::{StageCache, StageLayout, StageRef};
pub use state::State;
