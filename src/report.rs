//! Plain-text report for non-interactive use.
//!
//! Used when stdout is not a terminal (pipes, CI logs) or with `--once`, and
//! printed after the interactive view exits so the result stays on screen.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use crate::data::layout::{
    check_name, duration_text, header_columns, pad_columns, queue_text, status_icon,
};
use crate::data::timing::format_duration;
use crate::data::ColumnWidths;
use crate::model::Observation;
use crate::scheduler::{Event, Phase, Scheduler};
use crate::source::CheckSource;

/// Fetch metadata and a single snapshot into the observation.
///
/// Both fetches are fatal here: there is no next poll to recover on.
pub async fn fetch_once(
    source: &dyn CheckSource,
    scheduler: &Scheduler,
    observation: &mut Observation,
) -> Result<()> {
    let pr = observation.pull_request().clone();

    let metadata = source.fetch_metadata(&pr).await.map_err(|e| format!("{:#}", e));
    scheduler.handle(observation, Event::Metadata(metadata), Utc::now());
    if observation.phase() == Phase::Failed {
        bail!(
            "Failed to fetch PR info: {}",
            observation.error().unwrap_or("unknown error")
        );
    }

    match source.fetch_snapshot(&pr).await {
        Ok(snapshot) => {
            scheduler.handle(observation, Event::Checks(Ok(snapshot)), Utc::now());
            Ok(())
        }
        Err(e) => bail!("Failed to fetch check runs: {:#}", e),
    }
}

/// Exit code for a report: 1 if any check failed, even if others still run.
pub fn exit_code(observation: &Observation) -> i32 {
    if observation.phase() == Phase::Failed {
        return 1;
    }
    let failing = observation
        .snapshot()
        .is_some_and(|s| s.iter().any(|c| c.is_failing()));
    i32::from(failing)
}

/// Render the report as aligned plain text.
pub fn render(observation: &Observation, now: DateTime<Utc>) -> String {
    let number = observation.pull_request().number;
    let mut out = match observation.metadata() {
        Some(metadata) => format!("PR #{}: {}\n\n", number, metadata.title),
        None => format!("PR #{}\n\n", number),
    };

    let checks = observation.snapshot().map(|s| s.checks.as_slice()).unwrap_or_default();
    let reference = observation.reference_time();

    if checks.is_empty() {
        match reference {
            Some(reference) => out.push_str(&format!(
                "No checks found (commit pushed {} ago)\n",
                format_duration(now - reference)
            )),
            None => out.push_str("No checks found\n"),
        }
        out.push_str("Checks may still be starting up or not configured for this PR\n");
        return out;
    }

    let widths = ColumnWidths::from_checks(checks, reference, now);
    let (queue, name, duration) = header_columns(&widths);
    out.push_str(&format!("{}   {}  {}\n\n", queue, name, duration));

    for check in checks {
        let (queue, name, duration) = pad_columns(
            &widths,
            &queue_text(check, reference, now),
            &check_name(check),
            &duration_text(check, now),
        );
        out.push_str(&format!(
            "{} {} {}  {}\n",
            queue,
            status_icon(check),
            name,
            duration
        ));
    }

    out
}
