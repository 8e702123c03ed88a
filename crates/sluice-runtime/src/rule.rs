//! Resolved rules
//!
//! A [`Rule`] pairs a parsed rule with the strategy used to run it. Both
//! strategies expose the same two entry points: evaluate the condition and
//! execute the actions.

use crate::context::EvaluationContext;
use crate::engine::Evaluator;
use crate::error::Result;
use crate::functions::FunctionRegistry;
use crate::observability::RuleMetrics;
use sluice_core::ast::RuleAst;
use std::fmt;
use std::sync::Arc;

/// A rule translated into directly executable code
pub trait CompiledRule: Send + Sync {
    fn when(&self, ctx: &mut EvaluationContext<'_>) -> Result<bool>;

    fn then(&self, ctx: &mut EvaluationContext<'_>) -> Result<()>;
}

/// How a rule is run
#[derive(Clone)]
pub enum RuleExecutable {
    /// Walk the AST on every evaluation
    Interpreted,
    /// Call the compiled entry points
    Compiled(Arc<dyn CompiledRule>),
}

impl fmt::Debug for RuleExecutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleExecutable::Interpreted => f.write_str("Interpreted"),
            RuleExecutable::Compiled(_) => f.write_str("Compiled"),
        }
    }
}

/// A rule ready to run inside a stage
pub struct Rule {
    ast: Arc<RuleAst>,
    executable: RuleExecutable,
    functions: Arc<FunctionRegistry>,
    metrics: RuleMetrics,
}

impl Rule {
    /// A rule run by the tree-walking evaluator
    pub fn interpreted(ast: RuleAst, functions: Arc<FunctionRegistry>) -> Self {
        Self {
            ast: Arc::new(ast),
            executable: RuleExecutable::Interpreted,
            functions,
            metrics: RuleMetrics::default(),
        }
    }

    /// Switch to a compiled form of the same rule
    pub fn with_compiled(mut self, compiled: Arc<dyn CompiledRule>) -> Self {
        self.executable = RuleExecutable::Compiled(compiled);
        self
    }

    /// An inert rule that never matches and has no actions
    pub fn always_false(name: impl Into<String>) -> Self {
        Self::interpreted(
            RuleAst::always_false(name),
            Arc::new(FunctionRegistry::new()),
        )
    }

    /// Copy for use in one stage: shares the parsed rule and its executable
    /// form, starts with fresh counters
    pub fn invokable_copy(&self) -> Self {
        Self {
            ast: Arc::clone(&self.ast),
            executable: self.executable.clone(),
            functions: Arc::clone(&self.functions),
            metrics: RuleMetrics::default(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.ast.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.ast.name
    }

    pub fn ast(&self) -> &RuleAst {
        &self.ast
    }

    pub fn executable(&self) -> &RuleExecutable {
        &self.executable
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.executable, RuleExecutable::Compiled(_))
    }

    pub fn metrics(&self) -> &RuleMetrics {
        &self.metrics
    }

    pub fn evaluate_condition(&self, ctx: &mut EvaluationContext<'_>) -> Result<bool> {
        match &self.executable {
            RuleExecutable::Interpreted => {
                Evaluator::new(&self.functions).evaluate_condition(&self.ast.when, ctx)
            }
            RuleExecutable::Compiled(compiled) => compiled.when(ctx),
        }
    }

    pub fn execute(&self, ctx: &mut EvaluationContext<'_>) -> Result<()> {
        match &self.executable {
            RuleExecutable::Interpreted => {
                Evaluator::new(&self.functions).execute(&self.ast.then, ctx)
            }
            RuleExecutable::Compiled(compiled) => compiled.then(ctx),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("executable", &self.executable)
            .finish()
    }
}
