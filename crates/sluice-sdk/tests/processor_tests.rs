//! End-to-end processing through the SDK facade
//!
//! Definitions are stored in a repository, resolved by the processor's
//! updater and then exercised with message batches.

mod common;

use common::{connect, save_pipeline, save_rule, RecordingJournal};
use sluice_repository::{InMemoryRepository, RuleDefinition, WritableRepository};
use sluice_sdk::{Message, NoopInterpreterListener, PipelineProcessor, ProcessorConfig, Value};
use std::sync::Arc;
use tempfile::TempDir;

async fn processor(repo: Arc<InMemoryRepository>, config: ProcessorConfig) -> PipelineProcessor {
    PipelineProcessor::builder()
        .with_repository(repo)
        .with_config(config)
        .build()
        .await
        .unwrap()
}

// =============================================================================
// Resolution Faults
// =============================================================================

#[tokio::test]
async fn test_broken_rule_does_not_disable_the_others() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "first", "true", &["set_field(\"first\", true)"]).await;
    save_rule(&repo, "second", "true", &["set_field(\"second\", true)"]).await;
    repo.save_rule(RuleDefinition::new("broken", "broken", "rule: [unclosed"))
        .await
        .unwrap();
    save_pipeline(&repo, "p1", &[(0, "any", &["first", "broken", "second"])]).await;
    connect(&repo, "s1", &["p1"]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].field("first"), Some(&Value::Bool(true)));
    assert_eq!(out[0].field("second"), Some(&Value::Bool(true)));
    assert_eq!(out[0].processing_error(), None);
}

#[tokio::test]
async fn test_broken_rule_blocks_match_all_stage() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "good", "true", &[]).await;
    save_rule(&repo, "later", "true", &["set_field(\"later\", true)"]).await;
    repo.save_rule(RuleDefinition::new("broken", "broken", "rule:\n  name: broken\n"))
        .await
        .unwrap();
    save_pipeline(
        &repo,
        "p1",
        &[(0, "all", &["good", "broken"]), (1, "all", &["later"])],
    )
    .await;
    connect(&repo, "s1", &["p1"]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);

    assert!(!out[0].has_field("later"));
}

#[tokio::test]
async fn test_unresolved_reference_never_matches() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "later", "true", &["set_field(\"later\", true)"]).await;
    save_pipeline(&repo, "p1", &[(0, "any", &["missing"]), (1, "all", &["later"])]).await;
    connect(&repo, "s1", &["p1"]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);

    assert_eq!(out.len(), 1);
    assert!(!out[0].has_field("later"));
    assert_eq!(out[0].processing_error(), None);
}

#[tokio::test]
async fn test_connection_to_deleted_pipeline_is_ignored() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "tag", "true", &["set_field(\"tagged\", true)"]).await;
    save_pipeline(&repo, "p1", &[(0, "all", &["tag"])]).await;
    connect(&repo, "s1", &["p1", "p2"]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    assert_eq!(processor.latest_state().pipelines_for_stream("s1").len(), 1);

    let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);
    assert_eq!(out[0].field("tagged"), Some(&Value::Bool(true)));
}

// =============================================================================
// Processing
// =============================================================================

#[tokio::test]
async fn test_drop_commits_offset_once() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "drop debug", "$message.level == \"debug\"", &["drop_message()"]).await;
    save_pipeline(&repo, "p1", &[(0, "all", &["drop debug"])]).await;
    connect(&repo, "s1", &["p1"]).await;

    let journal = RecordingJournal::new();
    let processor = PipelineProcessor::builder()
        .with_repository(repo)
        .with_journal(journal.clone())
        .build()
        .await
        .unwrap();

    let out = processor.process(vec![
        Message::with_id("m1")
            .with_stream("s1")
            .with_field("level", "debug")
            .with_journal_offset(7),
        Message::with_id("m2")
            .with_stream("s1")
            .with_field("level", "info")
            .with_journal_offset(8),
    ]);

    let ids: Vec<&str> = out.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["m2"]);
    assert_eq!(journal.offsets(), vec![7]);
}

#[tokio::test]
async fn test_added_stream_reaches_its_pipelines() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(
        &repo,
        "route",
        "true",
        &["set_field(\"routed\", true)", "route_to_stream(\"s2\")"],
    )
    .await;
    save_rule(&repo, "alert", "true", &["set_field(\"alerted\", true)"]).await;
    save_pipeline(&repo, "p1", &[(0, "all", &["route"])]).await;
    save_pipeline(&repo, "p2", &[(0, "all", &["alert"])]).await;
    connect(&repo, "s1", &["p1"]).await;
    connect(&repo, "s2", &["p2"]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);

    assert_eq!(out.len(), 1);
    let streams: Vec<&str> = out[0].streams().iter().map(String::as_str).collect();
    assert_eq!(streams, vec!["s1", "s2"]);
    assert_eq!(out[0].field("routed"), Some(&Value::Bool(true)));
    assert_eq!(out[0].field("alerted"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn test_process_for_explicit_pipelines() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(&repo, "tag", "true", &["set_field(\"tagged\", true)"]).await;
    save_pipeline(&repo, "p1", &[(0, "all", &["tag"])]).await;

    let processor = processor(repo, ProcessorConfig::default()).await;
    let out = processor.process_for_pipelines(
        Message::with_id("m1"),
        &["p1".to_string(), "unknown".to_string()],
        &NoopInterpreterListener,
    );

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].field("tagged"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn test_compiled_and_interpreted_processors_agree() {
    let repo = Arc::new(InMemoryRepository::new());
    save_rule(
        &repo,
        "classify",
        "$message.level == \"error\" && contains($message.text, \"disk\")",
        &[
            "let label = concat(\"disk-\", lowercase($message.host))",
            "set_field(\"label\", label)",
            "set_field(\"score\", to_number($message.score) * 2 + 1)",
            "route_to_stream(\"alerts\")",
        ],
    )
    .await;
    save_rule(&repo, "fail", "$message.score > 10", &["set_field(\"\", 1)"]).await;
    save_rule(&repo, "folded false", "to_number(\"x\") > 1", &[]).await;
    save_rule(&repo, "tag alerts", "true", &["set_field(\"alerted\", true)"]).await;
    save_pipeline(
        &repo,
        "p1",
        &[(0, "any", &["classify", "folded false"]), (5, "all", &["fail"])],
    )
    .await;
    save_pipeline(&repo, "p2", &[(0, "all", &["tag alerts"])]).await;
    connect(&repo, "s1", &["p1"]).await;
    connect(&repo, "alerts", &["p2"]).await;

    let compiled = processor(Arc::clone(&repo), ProcessorConfig::default()).await;
    let interpreted = processor(repo, ProcessorConfig::default().with_compile_rules(false)).await;

    let rules = compiled.latest_state().pipeline("p1").unwrap().stages()[0]
        .rules()
        .iter()
        .map(|r| r.is_compiled())
        .collect::<Vec<_>>();
    assert_eq!(rules, vec![true, true]);

    let batch = || {
        vec![
            Message::with_id("m1")
                .with_stream("s1")
                .with_field("level", "error")
                .with_field("text", "disk full")
                .with_field("host", "DB1")
                .with_field("score", 6.0),
            Message::with_id("m2")
                .with_stream("s1")
                .with_field("level", "info")
                .with_field("text", "disk ok"),
            Message::with_id("m3").with_stream("s1"),
        ]
    };

    let from_compiled = compiled.process(batch());
    let from_interpreted = interpreted.process(batch());
    assert_eq!(from_compiled, from_interpreted);

    let m1 = &from_compiled[0];
    assert_eq!(m1.field("label"), Some(&Value::from("disk-db1")));
    assert_eq!(m1.field("score"), Some(&Value::Number(13.0)));
    assert_eq!(m1.field("alerted"), Some(&Value::Bool(true)));
    assert!(m1.processing_error().is_some());
}

// =============================================================================
// File System Backend
// =============================================================================

#[tokio::test]
async fn test_processor_over_file_system_repository() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    std::fs::create_dir_all(root.join("rules")).unwrap();
    std::fs::create_dir_all(root.join("pipelines")).unwrap();
    std::fs::write(
        root.join("rules/severity.yaml"),
        common::rule_yaml(
            "severity",
            "$message.level == \"error\"",
            &["set_field(\"severity\", \"high\")"],
        ),
    )
    .unwrap();
    std::fs::write(
        root.join("pipelines/triage.yaml"),
        common::pipeline_yaml("Triage", &[(0, "all", &["severity"])]),
    )
    .unwrap();
    std::fs::write(
        root.join("connections.yaml"),
        "connections:\n  - stream: web\n    pipelines: [triage]\n",
    )
    .unwrap();

    let repository = Arc::new(sluice_repository::FileSystemRepository::new(root).unwrap());
    let processor = PipelineProcessor::builder()
        .with_repository(repository)
        .build()
        .await
        .unwrap();

    assert_eq!(processor.latest_state().pipeline("triage").unwrap().name(), "Triage");

    let out = processor.process(vec![Message::with_id("m1")
        .with_stream("web")
        .with_field("level", "error")]);
    assert_eq!(out[0].field("severity"), Some(&Value::from("high")));
}
