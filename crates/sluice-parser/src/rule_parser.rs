//! Rule parser
//!
//! Parses YAML rule definitions into Rule AST nodes.

use crate::error::{ParseError, Result};
use crate::expression_parser::ExpressionParser;
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use sluice_core::ast::{Expression, RuleAst, Statement};

/// Rule parser
pub struct RuleParser;

impl RuleParser {
    /// Parse a rule from a YAML string, tagging it with the definition id
    pub fn parse(id: &str, yaml_str: &str) -> Result<RuleAst> {
        let yaml = YamlParser::parse(yaml_str)?;
        Ok(Self::parse_from_yaml(&yaml)?.with_id(id))
    }

    /// Parse a rule from YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<RuleAst> {
        let rule_obj = YamlParser::get_section(yaml, "rule")?;

        let name = YamlParser::get_string(rule_obj, "name")?;
        if name.trim().is_empty() {
            return Err(ParseError::InvalidValue {
                field: "name".to_string(),
                message: "rule name must not be empty".to_string(),
            });
        }

        let when = Self::parse_condition(rule_obj)?;
        let then = Self::parse_actions(rule_obj)?;

        Ok(RuleAst::new(name, when, then))
    }

    fn parse_condition(rule_obj: &YamlValue) -> Result<Expression> {
        let when = rule_obj.get("when").ok_or_else(|| ParseError::MissingField {
            field: "when".to_string(),
        })?;

        let source = YamlParser::scalar_source(when).ok_or_else(|| ParseError::InvalidValue {
            field: "when".to_string(),
            message: "expected an expression".to_string(),
        })?;

        if source.trim().is_empty() {
            return Err(ParseError::InvalidValue {
                field: "when".to_string(),
                message: "condition must not be empty".to_string(),
            });
        }

        ExpressionParser::parse(&source)
    }

    fn parse_actions(rule_obj: &YamlValue) -> Result<Vec<Statement>> {
        let Some(items) = YamlParser::get_optional_array(rule_obj, "then")? else {
            return Ok(Vec::new());
        };

        items
            .iter()
            .map(|item| {
                let source =
                    YamlParser::scalar_source(item).ok_or_else(|| ParseError::InvalidValue {
                        field: "then".to_string(),
                        message: "each action must be a string".to_string(),
                    })?;
                ExpressionParser::parse_statement(&source)
            })
            .collect()
    }
}
