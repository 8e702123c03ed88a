//! Abstract Syntax Tree (AST) definitions for sluice
//!
//! This module contains the AST node definitions for:
//! - Expressions
//! - Statements (rule actions)
//! - Rules
//! - Pipelines and their stages

pub mod expression;
pub mod operator;
pub mod pipeline;
pub mod rule;
pub mod statement;

pub use expression::{Expression, UnaryOperator};
pub use operator::Operator;
pub use pipeline::{MatchPolicy, PipelineAst, StageAst};
pub use rule::RuleAst;
pub use statement::Statement;
