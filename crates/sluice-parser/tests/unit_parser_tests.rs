//! Unit tests for YAML parsers
//!
//! Tests rule, pipeline and expression parsing through the public API.

use sluice_core::ast::*;
use sluice_core::Value;
use sluice_parser::*;

// =============================================================================
// Rule Parser Tests
// =============================================================================

#[test]
fn test_parse_rule_with_all_action_kinds() {
    let yaml = r#"
rule:
  name: route errors
  when: $message.level == "error" and has_field("source")
  then:
    - let lvl = uppercase($message.level)
    - set_field("severity", lvl)
    - route_to_stream("alerts")
    - drop_message()
"#;

    let result = RuleParser::parse("rule-1", yaml);
    assert!(result.is_ok(), "Failed to parse rule: {:?}", result.err());

    let rule = result.unwrap();
    assert_eq!(rule.name, "route errors");
    assert_eq!(rule.then.len(), 4);
    assert_eq!(
        rule.then[0].to_string(),
        "let lvl = uppercase($message.level)"
    );
    assert_eq!(rule.then[3].to_string(), "drop_message()");
}

#[test]
fn test_rule_condition_display() {
    let yaml = r#"
rule:
  name: slow requests
  when: "$message.took_ms / 1000 >= 2 || not has_field('took_ms')"
"#;

    let rule = RuleParser::parse("rule-2", yaml).unwrap();
    assert_eq!(
        rule.when.to_string(),
        "((($message.took_ms / 1000) >= 2) || !has_field(\"took_ms\"))"
    );
}

#[test]
fn test_rule_name_must_be_string() {
    let yaml = "rule:\n  name: [a]\n  when: true\n";
    assert!(matches!(
        RuleParser::parse("rule-3", yaml),
        Err(ParseError::InvalidValue { .. })
    ));
}

#[test]
fn test_invalid_yaml() {
    let yaml = "rule: [unclosed\n";
    assert!(matches!(
        RuleParser::parse("rule-4", yaml),
        Err(ParseError::YamlError(_))
    ));
}

// =============================================================================
// Pipeline Parser Tests
// =============================================================================

#[test]
fn test_parse_pipeline_keeps_declaration_order() {
    let yaml = r#"
pipeline:
  name: Enrichment
  stages:
    - stage: 5
      match: all
      rules: [b]
    - stage: 0
      match: any
      rules: [a, c]
"#;

    let pipeline = PipelineParser::parse("pipe-1", yaml).unwrap();
    let numbers: Vec<i32> = pipeline.stages.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![5, 0]);
}

#[test]
fn test_stage_number_must_be_integer() {
    let yaml = "pipeline:\n  name: p\n  stages:\n    - stage: first\n      match: all\n";
    assert!(matches!(
        PipelineParser::parse("pipe-2", yaml),
        Err(ParseError::InvalidValue { ref field, .. }) if field == "stage"
    ));
}

// =============================================================================
// DefinitionParser Tests
// =============================================================================

#[test]
fn test_yaml_definition_parser_through_trait_object() {
    let parser: Box<dyn DefinitionParser> = Box::new(YamlDefinitionParser);

    let rule = parser
        .parse_rule("r", "rule:\n  name: always\n  when: true\n")
        .unwrap();
    assert_eq!(rule.id.as_deref(), Some("r"));

    let pipeline = parser
        .parse_pipeline("p", "pipeline:\n  name: empty\n")
        .unwrap();
    assert_eq!(pipeline.id.as_deref(), Some("p"));
}

// =============================================================================
// Expression Parser Tests
// =============================================================================

#[test]
fn test_nested_function_calls() {
    let expr = ExpressionParser::parse("concat(lowercase($message.a), \"-\", to_string(1))").unwrap();
    match expr {
        Expression::FunctionCall { name, args } => {
            assert_eq!(name, "concat");
            assert!(matches!(
                &args[0],
                Expression::FunctionCall { name, .. } if name == "lowercase"
            ));
            assert_eq!(args[1], Expression::Literal(Value::from("-")));
        }
        other => panic!("Expected FunctionCall, got {:?}", other),
    }
}

#[test]
fn test_negation_of_non_literal() {
    let expr = ExpressionParser::parse("-$message.n").unwrap();
    assert_eq!(
        expr,
        Expression::unary(UnaryOperator::Negate, Expression::message_field("n"))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = ExpressionParser::parse("(1 + 2) * 3").unwrap();
    assert_eq!(expr.to_string(), "((1 + 2) * 3)");
}

#[test]
fn test_unexpected_character() {
    assert!(matches!(
        ExpressionParser::parse("a # b"),
        Err(ParseError::InvalidExpression { offset: 2, .. })
    ));
}
