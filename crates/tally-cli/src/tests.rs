//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Cursor;
use std::sync::Arc;

use tally_core::test_utils::PipelineFixture;
use tally_core::{AuditSinkKind, MockClassifier, Predictor};

use crate::commands::{self, format_result, run_batch, truncate, BatchSummary};

/// The fixture is returned alongside the predictor so its temp dir outlives
/// the lazily loaded entity recognizer.
fn fixture_predictor() -> (Predictor, PipelineFixture) {
    let fixture = PipelineFixture::new(AuditSinkKind::Memory);
    let predictor = Predictor::from_config(&fixture.config).unwrap();
    (predictor, fixture)
}

fn batch_output(predictor: &Predictor, input: &str, json: bool) -> (BatchSummary, String) {
    let mut out = Vec::new();
    let summary = run_batch(predictor, Cursor::new(input), &mut out, json).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

// ========== Predict Command Tests ==========

#[test]
fn test_format_result() {
    let (predictor, _fixture) = fixture_predictor();
    let result = predictor.predict("Lunch at canteen – Rs. 500").unwrap();

    assert_eq!(
        format_result(&result),
        "type      Expense\ncategory  Food\namount    Rs. 500 (regex)\n"
    );
}

#[test]
fn test_format_result_without_classifiers() {
    let predictor = Predictor::builder().build().unwrap();
    let result = predictor.predict("Coffee").unwrap();

    assert_eq!(format_result(&result), "amount  Unknown (none)\n");
}

#[test]
fn test_cmd_predict_with_config_file() {
    let fixture = PipelineFixture::new(AuditSinkKind::Jsonl);
    let result = commands::cmd_predict(Some(&fixture.config_path()), "Taxi Rs. 300", false);
    assert!(result.is_ok());

    let audit = std::fs::read_to_string(fixture.dir.path().join("tally_audit.jsonl")).unwrap();
    assert_eq!(audit.lines().count(), 1);
    assert!(audit.contains("Rs. 300"));
}

#[test]
fn test_cmd_predict_json() {
    let fixture = PipelineFixture::new(AuditSinkKind::Memory);
    let result = commands::cmd_predict(Some(&fixture.config_path()), "Diesel 20L", true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_predict_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::cmd_predict(Some(&dir.path().join("missing.toml")), "Lunch", false);
    assert!(result.is_err());
}

// ========== Batch Command Tests ==========

#[test]
fn test_run_batch_text_output() {
    let (predictor, _fixture) = fixture_predictor();
    let input = "Lunch at canteen – Rs. 500\n\n   \nDiesel 20L – LKR 8,000\n";

    let (summary, out) = batch_output(&predictor, input, false);

    assert_eq!(
        summary,
        BatchSummary {
            processed: 2,
            failed: 0,
            skipped: 2
        }
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Lunch at canteen – Rs. 500\tExpense\tFood\tRs. 500");
    assert_eq!(lines[1], "Diesel 20L – LKR 8,000\tExpense\tTransport\tLKR 8,000");
}

#[test]
fn test_run_batch_json_output() {
    let (predictor, _fixture) = fixture_predictor();

    let (_, out) = batch_output(&predictor, "Salary credited\nTaxi €12\n", true);

    let rows: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["line"], 1);
    assert_eq!(rows[0]["type"], "Income");
    assert_eq!(rows[0]["amount"], "Unknown");
    assert_eq!(rows[1]["line"], 2);
    assert_eq!(rows[1]["category"], "Transport");
    assert_eq!(rows[1]["amount"], "€12");
    assert!(rows[1].get("error").is_none());
}

#[test]
fn test_run_batch_continues_after_failure() {
    let predictor = Predictor::builder()
        .with_classifier(
            "category",
            Arc::new(MockClassifier::failing("broken", &["Food"], "boom")),
        )
        .build()
        .unwrap();

    let (summary, out) = batch_output(&predictor, "one\ntwo\n", true);

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.processed, 0);
    let rows: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["text"], "two");
    assert!(rows[1]["error"].as_str().unwrap().contains("Prediction failed"));
}

#[test]
fn test_cmd_batch_reads_file() {
    let fixture = PipelineFixture::new(AuditSinkKind::Memory);
    let input = fixture.dir.path().join("expenses.txt");
    std::fs::write(&input, "Lunch Rs. 250\nRefund Rs. 99\n").unwrap();

    assert!(commands::cmd_batch(Some(&fixture.config_path()), &input, false).is_ok());
    assert!(commands::cmd_batch(
        Some(&fixture.config_path()),
        &fixture.dir.path().join("missing.txt"),
        false
    )
    .is_err());
}

// ========== Check / Audit Command Tests ==========

#[test]
fn test_cmd_check() {
    let fixture = PipelineFixture::new(AuditSinkKind::Jsonl);
    assert!(commands::cmd_check(Some(&fixture.config_path())).is_ok());
}

#[test]
fn test_cmd_check_reports_broken_model() {
    let fixture = PipelineFixture::new(AuditSinkKind::Memory);
    std::fs::write(
        fixture.dir.path().join("models/category/model.json"),
        "{ not json",
    )
    .unwrap();
    assert!(commands::cmd_check(Some(&fixture.config_path())).is_err());
}

#[test]
fn test_cmd_audit_lists_sqlite_records() {
    let fixture = PipelineFixture::new(AuditSinkKind::Sqlite);
    commands::cmd_predict(Some(&fixture.config_path()), "Lunch Rs. 500", false).unwrap();

    assert!(commands::cmd_audit(Some(&fixture.config_path()), 10).is_ok());
}

#[test]
fn test_cmd_audit_requires_sqlite_sink() {
    let fixture = PipelineFixture::new(AuditSinkKind::Jsonl);
    let err = commands::cmd_audit(Some(&fixture.config_path()), 10).unwrap_err();
    assert!(err.to_string().contains("sqlite"));
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long description", 10), "this is...");
    assert_eq!(truncate("Diesel – LKR", 8), "Diese...");
}
