//! Turning stored definitions into a state snapshot
//!
//! Every fault here is local: a rule that does not parse becomes an inert
//! rule, a pipeline that does not parse becomes a pipeline without stages,
//! a stage reference to an unknown rule becomes an inert rule, and a
//! connection to an unknown pipeline is dropped. A reload never fails
//! because of the content of one definition.

use crate::config::ProcessorConfig;
use sluice_compiler::Compiler;
use sluice_core::ast::{PipelineAst, RuleAst};
use sluice_parser::{DefinitionParser, YamlDefinitionParser};
use sluice_repository::{PipelineConnections, PipelineDefinition, RuleDefinition};
use sluice_runtime::{FunctionRegistry, Pipeline, Rule, Stage, State};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds [`State`] snapshots from raw definitions
pub struct StateResolver {
    parser: Arc<dyn DefinitionParser>,
    functions: Arc<FunctionRegistry>,
    compiler: Option<Compiler>,
    cached_stage_layouts: bool,
}

impl StateResolver {
    pub fn new(functions: Arc<FunctionRegistry>, config: &ProcessorConfig) -> Self {
        Self::with_parser(Arc::new(YamlDefinitionParser), functions, config)
    }

    /// Use a different definition format
    pub fn with_parser(
        parser: Arc<dyn DefinitionParser>,
        functions: Arc<FunctionRegistry>,
        config: &ProcessorConfig,
    ) -> Self {
        let compiler = config
            .compile_rules
            .then(|| Compiler::new(Arc::clone(&functions)));
        Self {
            parser,
            functions,
            compiler,
            cached_stage_layouts: config.cached_stage_layouts,
        }
    }

    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Resolve one complete set of definitions into a snapshot
    pub fn resolve(
        &self,
        version: u64,
        rules: &[RuleDefinition],
        pipelines: &[PipelineDefinition],
        connections: &[PipelineConnections],
    ) -> State {
        let rules_by_name = self.resolve_rules(rules);

        let pipelines: HashMap<String, Arc<Pipeline>> = pipelines
            .iter()
            .map(|definition| {
                let pipeline = self.resolve_pipeline(definition, &rules_by_name);
                (definition.id.clone(), Arc::new(pipeline))
            })
            .collect();

        let mut connected: HashMap<String, Vec<Arc<Pipeline>>> = HashMap::new();
        for connection in connections {
            let entry = connected.entry(connection.stream_id.clone()).or_default();
            for pipeline_id in &connection.pipeline_ids {
                match pipelines.get(pipeline_id) {
                    Some(pipeline) => entry.push(Arc::clone(pipeline)),
                    None => debug!(
                        "dropping connection of stream {} to unknown pipeline {}",
                        connection.stream_id, pipeline_id
                    ),
                }
            }
        }

        debug!(
            "resolved state {}: {} rules, {} pipelines, {} connected streams",
            version,
            rules_by_name.len(),
            pipelines.len(),
            connected.len()
        );

        State::new(version, pipelines, connected).with_cached_layouts(self.cached_stage_layouts)
    }

    /// Parse and prepare every rule, keyed by rule name
    fn resolve_rules(&self, definitions: &[RuleDefinition]) -> HashMap<String, Rule> {
        let mut rules = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            let rule = match self.parser.parse_rule(&definition.id, &definition.source) {
                Ok(ast) => self.prepare_rule(ast),
                Err(e) => {
                    warn!("Failed to parse rule {}: {}", definition.id, e);
                    Rule::interpreted(
                        RuleAst::always_false(definition.title.clone()).with_id(&definition.id),
                        Arc::clone(&self.functions),
                    )
                }
            };

            let name = rule.name().to_string();
            if rules.insert(name.clone(), rule).is_some() {
                warn!(
                    "Rule name '{}' is defined more than once, using rule {}",
                    name, definition.id
                );
            }
        }
        rules
    }

    /// Pick the executable form of a parsed rule
    fn prepare_rule(&self, ast: RuleAst) -> Rule {
        let Some(compiler) = &self.compiler else {
            return Rule::interpreted(ast, Arc::clone(&self.functions));
        };

        match compiler.compile_rule(&ast) {
            Ok(compiled) => {
                Rule::interpreted(ast, Arc::clone(&self.functions)).with_compiled(Arc::new(compiled))
            }
            Err(e) => {
                warn!(
                    "Failed to compile rule '{}', falling back to interpretation: {}",
                    ast.name, e
                );
                Rule::interpreted(ast, Arc::clone(&self.functions))
            }
        }
    }

    fn resolve_pipeline(
        &self,
        definition: &PipelineDefinition,
        rules_by_name: &HashMap<String, Rule>,
    ) -> Pipeline {
        let ast = match self.parser.parse_pipeline(&definition.id, &definition.source) {
            Ok(ast) => ast,
            Err(e) => {
                warn!("Failed to parse pipeline {}: {}", definition.id, e);
                PipelineAst::empty(definition.title.clone())
            }
        };

        let stages = ast
            .stages
            .iter()
            .map(|stage| {
                let rules = stage
                    .rule_references
                    .iter()
                    .map(|reference| match rules_by_name.get(reference) {
                        Some(rule) => rule.invokable_copy(),
                        None => {
                            warn!(
                                "Pipeline {} stage {} references unknown rule '{}'",
                                definition.id, stage.number, reference
                            );
                            Rule::always_false(format!("Unresolved rule {}", reference))
                        }
                    })
                    .collect();
                Stage::new(stage.number, stage.match_policy, rules)
            })
            .collect();

        Pipeline::new(definition.id.clone(), ast.name, stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::ast::MatchPolicy;

    fn resolver(compile: bool) -> StateResolver {
        StateResolver::new(
            Arc::new(FunctionRegistry::with_builtins()),
            &ProcessorConfig::default().with_compile_rules(compile),
        )
    }

    fn rule(id: &str, name: &str) -> RuleDefinition {
        RuleDefinition::new(
            id,
            name,
            format!("rule:\n  name: {}\n  when: true\n  then:\n    - set_field(\"seen\", true)\n", name),
        )
    }

    fn pipeline(id: &str, rules: &[&str]) -> PipelineDefinition {
        let refs: Vec<String> = rules.iter().map(|r| format!("        - {}\n", r)).collect();
        PipelineDefinition::new(
            id,
            id,
            format!(
                "pipeline:\n  name: {}\n  stages:\n    - stage: 0\n      match: all\n      rules:\n{}",
                id,
                refs.concat()
            ),
        )
    }

    #[test]
    fn test_resolves_stage_references_by_name() {
        let state = resolver(false).resolve(
            1,
            &[rule("r1", "first"), rule("r2", "second")],
            &[pipeline("p1", &["second", "first"])],
            &[PipelineConnections::new("s1", ["p1"])],
        );

        let p1 = state.pipeline("p1").unwrap();
        let names: Vec<&str> = p1.stages()[0].rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(p1.stages()[0].match_policy(), MatchPolicy::All);
        assert_eq!(state.pipelines_for_stream("s1").len(), 1);
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_unparseable_rule_becomes_inert() {
        let broken = RuleDefinition::new("r2", "broken", "rule: [unclosed");
        let state = resolver(true).resolve(
            1,
            &[rule("r1", "good"), broken],
            &[pipeline("p1", &["good", "broken"])],
            &[],
        );

        let rules = state.pipeline("p1").unwrap().stages()[0].rules();
        assert!(rules[0].is_compiled());
        assert_eq!(rules[1].name(), "broken");
        assert_eq!(rules[1].id(), Some("r2"));
        assert!(!rules[1].is_compiled());
    }

    #[test]
    fn test_unknown_reference_becomes_inert() {
        let state = resolver(false).resolve(1, &[], &[pipeline("p1", &["missing"])], &[]);
        let rules = state.pipeline("p1").unwrap().stages()[0].rules();
        assert_eq!(rules[0].name(), "Unresolved rule missing");
    }

    #[test]
    fn test_unparseable_pipeline_has_no_stages() {
        let broken = PipelineDefinition::new("p1", "Broken", "pipeline: {stages: 3}");
        let state = resolver(false).resolve(1, &[], &[broken], &[]);
        let p1 = state.pipeline("p1").unwrap();
        assert!(!p1.has_stages());
        assert_eq!(p1.name(), "Broken");
    }

    #[test]
    fn test_connections_to_missing_pipelines_are_dropped() {
        let state = resolver(false).resolve(
            1,
            &[],
            &[pipeline("p1", &[])],
            &[
                PipelineConnections::new("s1", ["p1", "gone"]),
                PipelineConnections::new("s2", ["gone"]),
            ],
        );

        assert_eq!(state.pipelines_for_stream("s1").len(), 1);
        assert!(state.pipelines_for_stream("s2").is_empty());
    }

    #[test]
    fn test_uncompilable_rule_falls_back_to_interpretation() {
        let unknown_fn = RuleDefinition::new(
            "r1",
            "calls unknown",
            "rule:\n  name: calls unknown\n  when: no_such_function()\n",
        );
        let state = resolver(true).resolve(1, &[unknown_fn], &[pipeline("p1", &["calls unknown"])], &[]);
        let rules = state.pipeline("p1").unwrap().stages()[0].rules();
        assert_eq!(rules[0].name(), "calls unknown");
        assert!(!rules[0].is_compiled());
    }

    #[test]
    fn test_each_stage_gets_its_own_rule_copy() {
        let state = resolver(false).resolve(
            1,
            &[rule("r1", "shared")],
            &[pipeline("p1", &["shared"]), pipeline("p2", &["shared"])],
            &[],
        );

        let a = &state.pipeline("p1").unwrap().stages()[0].rules()[0];
        let b = &state.pipeline("p2").unwrap().stages()[0].rules()[0];
        a.metrics().matched.inc();
        assert_eq!(a.metrics().matched.get(), 1);
        assert_eq!(b.metrics().matched.get(), 0);
    }
}
