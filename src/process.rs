// ABOUTME: Deterministic data transform run inside a fresh clone before committing

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Input file read relative to the processing root.
pub const INPUT_FILE: &str = "data/input.txt";
/// Output file written relative to the processing root.
pub const OUTPUT_FILE: &str = "data/output.txt";

/// Result of one processing run.
#[derive(Debug, serde::Serialize)]
pub struct ProcessSummary {
    pub lines_in: usize,
    pub lines_out: usize,
    pub output_path: PathBuf,
}

/// Uppercase every non-empty line, preserving order. Blank lines are
/// dropped so the output is stable regardless of trailing whitespace.
fn transform(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_uppercase())
        .collect()
}

/// Read `data/input.txt` under `root` (a missing file means empty input)
/// and write `data/output.txt` with a generated-at header. Empty input
/// writes the `NO_INPUT` sentinel so the output file always exists and
/// downstream diffs stay deterministic.
pub fn run(root: &Path) -> Result<ProcessSummary> {
    let input_path = root.join(INPUT_FILE);
    let output_path = root.join(OUTPUT_FILE);

    let lines: Vec<String> = if input_path.exists() {
        fs::read_to_string(&input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let transformed = transform(&lines);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut content = format!(
        "# Generated at {}\n",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    if transformed.is_empty() {
        content.push_str("NO_INPUT\n");
    } else {
        content.push_str(&transformed.join("\n"));
        content.push('\n');
    }

    fs::write(&output_path, content)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    info!(
        "wrote {} ({} lines)",
        output_path.display(),
        transformed.len()
    );

    Ok(ProcessSummary {
        lines_in: lines.len(),
        lines_out: transformed.len(),
        output_path,
    })
}
