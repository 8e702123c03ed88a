//! sluice parser - YAML definitions to AST
//!
//! This crate turns stored rule and pipeline definitions into the AST types
//! of `sluice-core`. Rules carry a condition and action list written in a
//! small expression language; pipelines list numbered stages that reference
//! rules by name.

pub mod error;
pub mod expression_parser;
pub mod pipeline_parser;
pub mod rule_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use pipeline_parser::PipelineParser;
pub use rule_parser::RuleParser;

use sluice_core::ast::{PipelineAst, RuleAst};

/// Turns stored definition sources into ASTs.
///
/// The state resolver only talks to this trait, so alternative definition
/// formats can be plugged in without touching the engine.
pub trait DefinitionParser: Send + Sync {
    fn parse_rule(&self, id: &str, source: &str) -> Result<RuleAst>;

    fn parse_pipeline(&self, id: &str, source: &str) -> Result<PipelineAst>;
}

/// The default YAML definition format
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDefinitionParser;

impl DefinitionParser for YamlDefinitionParser {
    fn parse_rule(&self, id: &str, source: &str) -> Result<RuleAst> {
        RuleParser::parse(id, source)
    }

    fn parse_pipeline(&self, id: &str, source: &str) -> Result<PipelineAst> {
        PipelineParser::parse(id, source)
    }
}
