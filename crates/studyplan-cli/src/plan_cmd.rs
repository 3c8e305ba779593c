//! `studyplan plan` command: generate a study plan from a request file.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use studyplan_core::models::StudyPlanRequest;
use studyplan_core::plan::{ValidationPolicy, generate_validated};

/// Read a `StudyPlanRequest` JSON document from `path` (`-` reads stdin).
pub fn read_request(path: &str) -> Result<StudyPlanRequest> {
    let contents = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file: {path}"))?
    };

    serde_json::from_str(&contents).with_context(|| format!("invalid study plan request in {path}"))
}

/// Run the plan command, writing pretty-printed JSON to `output` or stdout.
pub fn run_plan(
    file: &str,
    today: NaiveDate,
    policy: ValidationPolicy,
    output: Option<&str>,
) -> Result<()> {
    let request = read_request(file)?;
    let response = generate_validated(&request, today, policy)?;
    tracing::debug!(tasks = response.plan.len(), %today, "plan generated from {file}");

    let json = serde_json::to_string_pretty(&response).context("failed to serialize plan")?;

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {path}"))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };
    writeln!(writer, "{json}")?;

    if let Some(path) = output {
        println!("Wrote {} tasks to {path}", response.plan.len());
    }

    Ok(())
}
