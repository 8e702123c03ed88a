//! Pipeline parser
//!
//! Parses YAML pipeline definitions into Pipeline AST nodes.
//!
//! ```yaml
//! pipeline:
//!   name: Alerting
//!   stages:
//!     - stage: 0
//!       match: all
//!       rules:
//!         - tag errors
//! ```

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use sluice_core::ast::{MatchPolicy, PipelineAst, StageAst};
use std::collections::HashSet;

/// Pipeline parser
pub struct PipelineParser;

impl PipelineParser {
    /// Parse a pipeline from a YAML string, tagging it with the definition id
    pub fn parse(id: &str, yaml_str: &str) -> Result<PipelineAst> {
        let yaml = YamlParser::parse(yaml_str)?;
        Ok(Self::parse_from_yaml(&yaml)?.with_id(id))
    }

    /// Parse a pipeline from YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<PipelineAst> {
        let pipeline_obj = YamlParser::get_section(yaml, "pipeline")?;
        let name = YamlParser::get_string(pipeline_obj, "name")?;

        let mut seen = HashSet::new();
        let mut stages = Vec::new();
        if let Some(items) = YamlParser::get_optional_array(pipeline_obj, "stages")? {
            for item in items {
                let stage = Self::parse_stage(item)?;
                if !seen.insert(stage.number) {
                    return Err(ParseError::DuplicateStage(stage.number));
                }
                stages.push(stage);
            }
        }

        Ok(PipelineAst::new(name, stages))
    }

    fn parse_stage(yaml: &YamlValue) -> Result<StageAst> {
        let number = YamlParser::get_i32(yaml, "stage")?;

        let policy = yaml.get("match").ok_or_else(|| ParseError::MissingField {
            field: "match".to_string(),
        })?;
        let match_policy: MatchPolicy =
            serde_yaml::from_value(policy.clone()).map_err(|e| ParseError::InvalidValue {
                field: "match".to_string(),
                message: e.to_string(),
            })?;

        let rule_references = match YamlParser::get_optional_array(yaml, "rules")? {
            Some(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ParseError::InvalidValue {
                            field: "rules".to_string(),
                            message: "rule references must be strings".to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(StageAst::new(number, match_policy, rule_references))
    }
}
