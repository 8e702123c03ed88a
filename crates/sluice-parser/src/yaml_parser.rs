//! YAML Parser
//!
//! Provides utilities for pulling typed fields out of YAML definitions.

use crate::error::{ParseError, Result};
use serde_yaml::Value as YamlValue;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Get the top-level section of a definition (e.g. `rule:` or `pipeline:`)
    pub fn get_section<'a>(doc: &'a YamlValue, section: &str) -> Result<&'a YamlValue> {
        doc.get(section).ok_or_else(|| ParseError::MissingField {
            field: section.to_string(),
        })
    }

    /// Get a required string field from YAML object
    pub fn get_string(obj: &YamlValue, field: &str) -> Result<String> {
        match obj.get(field) {
            Some(YamlValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a string".to_string(),
            }),
            None => Err(ParseError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get a required integer field from YAML object
    pub fn get_i32(obj: &YamlValue, field: &str) -> Result<i32> {
        let value = obj.get(field).ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })?;
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a 32-bit integer".to_string(),
            })
    }

    /// Get an optional array field from YAML object
    pub fn get_optional_array<'a>(obj: &'a YamlValue, field: &str) -> Result<Option<&'a Vec<YamlValue>>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(YamlValue::Sequence(items)) => Ok(Some(items)),
            Some(_) => Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a list".to_string(),
            }),
        }
    }

    /// Render a scalar YAML value as the source text of an expression.
    /// Lets `when: true` be written without quotes.
    pub fn scalar_source(value: &YamlValue) -> Option<String> {
        match value {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Bool(b) => Some(b.to_string()),
            YamlValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
