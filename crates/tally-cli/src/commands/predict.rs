//! Prediction commands (single description and batch)

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tally_core::{PredictionResult, Predictor};
use tracing::warn;

use super::open_pipeline;

pub fn cmd_predict(config_path: Option<&Path>, text: &str, json: bool) -> Result<()> {
    let predictor = open_pipeline(config_path)?;
    let result = predictor.predict(text).context("Prediction failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_result(&result));
    }

    predictor.flush().context("Failed to flush audit log")?;
    Ok(())
}

/// Human-readable rendering: one `role: label` line per classifier, then the amount
pub fn format_result(result: &PredictionResult) -> String {
    let width = result
        .labels()
        .iter()
        .map(|(role, _)| role.len())
        .chain(std::iter::once("amount".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (role, label) in result.labels() {
        out.push_str(&format!("{:<width$}  {}\n", role, label, width = width));
    }
    out.push_str(&format!(
        "{:<width$}  {} ({})\n",
        "amount",
        result.amount(),
        result.extraction_method(),
        width = width
    ));
    out
}

/// Outcome counts for a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
struct BatchRow<'a> {
    line: usize,
    text: &'a str,
    #[serde(flatten)]
    result: Option<&'a PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn cmd_batch(config_path: Option<&Path>, file: &Path, json: bool) -> Result<()> {
    let predictor = open_pipeline(config_path)?;

    let reader: Box<dyn BufRead> = if file == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let f = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
        Box::new(BufReader::new(f))
    };

    let stdout = io::stdout();
    let summary = run_batch(&predictor, reader, &mut stdout.lock(), json)?;

    predictor.flush().context("Failed to flush audit log")?;

    eprintln!(
        "Processed {} line(s): {} ok, {} failed, {} blank",
        summary.processed + summary.failed,
        summary.processed,
        summary.failed,
        summary.skipped
    );
    Ok(())
}

/// Classify every non-blank line; a failed line is reported and skipped
pub fn run_batch<R: BufRead, W: Write>(
    predictor: &Predictor,
    reader: R,
    out: &mut W,
    json: bool,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        let text = line.trim();
        if text.is_empty() {
            summary.skipped += 1;
            continue;
        }

        match predictor.predict(text) {
            Ok(result) => {
                summary.processed += 1;
                if json {
                    let row = BatchRow {
                        line: line_no,
                        text,
                        result: Some(&result),
                        error: None,
                    };
                    writeln!(out, "{}", serde_json::to_string(&row)?)?;
                } else {
                    writeln!(out, "{}", summary_line(text, &result))?;
                }
            }
            Err(e) => {
                summary.failed += 1;
                warn!(line = line_no, error = %e, "Prediction failed");
                if json {
                    let row = BatchRow {
                        line: line_no,
                        text,
                        result: None,
                        error: Some(e.to_string()),
                    };
                    writeln!(out, "{}", serde_json::to_string(&row)?)?;
                } else {
                    writeln!(out, "{}\tERROR: {}", text, e)?;
                }
            }
        }
    }

    Ok(summary)
}

fn summary_line(text: &str, result: &PredictionResult) -> String {
    let mut fields: Vec<&str> = vec![text];
    fields.extend(result.labels().iter().map(|(_, label)| label.as_str()));
    fields.push(result.amount().as_str());
    fields.join("\t")
}
