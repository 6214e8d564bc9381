//! Column layout for the check table.
//!
//! Widths are recomputed from scratch on every render so the table stays
//! aligned as durations grow. All widths count chars, not bytes.

use chrono::{DateTime, Utc};

use checkwatch_types::{CheckRun, CheckStatus, Conclusion};

use super::timing::{final_duration, format_duration, queue_latency, runtime};

pub const MIN_NAME_WIDTH: usize = 20;
pub const MAX_NAME_WIDTH: usize = 60;
pub const MIN_TIME_WIDTH: usize = 5;

const QUEUE_HEADER: &str = "Startup";
const NAME_HEADER: &str = "Workflow/Job";
const DURATION_HEADER: &str = "Duration";

/// Widths of the queue, name and duration columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub queue: usize,
    pub name: usize,
    pub duration: usize,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            queue: MIN_TIME_WIDTH,
            name: MIN_NAME_WIDTH,
            duration: MIN_TIME_WIDTH,
        }
    }
}

impl ColumnWidths {
    /// Fit every column to its widest cell, within the column bounds.
    pub fn from_checks<'a>(
        checks: impl IntoIterator<Item = &'a CheckRun>,
        reference: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut widths = Self::default();

        for check in checks {
            widths.queue = widths.queue.max(char_len(&queue_text(check, reference, now)));
            widths.name = widths
                .name
                .max(char_len(&check.display_name()).min(MAX_NAME_WIDTH));
            widths.duration = widths.duration.max(char_len(&duration_text(check, now)));
        }

        widths
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Shorten a name to at most `max` chars, marking the cut with `…`.
pub fn truncate_name(name: &str, max: usize) -> String {
    if char_len(name) <= max {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Display name of a check, truncated to the name column bound.
pub fn check_name(check: &CheckRun) -> String {
    truncate_name(&check.display_name(), MAX_NAME_WIDTH)
}

/// Queue column text.
///
/// A queued check shows how long it has waited since the reference time.
/// A started check shows its queue latency. `-` when there is nothing to show.
pub fn queue_text(check: &CheckRun, reference: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    if check.status == CheckStatus::Queued {
        return match reference {
            Some(reference) => format_duration(now - reference),
            None => "-".to_string(),
        };
    }

    let latency = queue_latency(reference, check);
    if latency > chrono::TimeDelta::zero() {
        format_duration(latency)
    } else {
        "-".to_string()
    }
}

/// Duration column text: final duration when completed, runtime when running.
pub fn duration_text(check: &CheckRun, now: DateTime<Utc>) -> String {
    let elapsed = match check.status {
        CheckStatus::Completed => final_duration(check, now),
        CheckStatus::InProgress => runtime(check, now),
        _ => return "-".to_string(),
    };

    if elapsed > chrono::TimeDelta::zero() {
        format_duration(elapsed)
    } else {
        "-".to_string()
    }
}

/// Single-glyph status marker.
pub fn status_icon(check: &CheckRun) -> &'static str {
    match (&check.status, &check.conclusion) {
        (CheckStatus::Completed, Some(conclusion)) => match conclusion {
            Conclusion::Success => "✓",
            Conclusion::Failure => "✗",
            Conclusion::Cancelled => "⊗",
            Conclusion::Skipped => "⊘",
            Conclusion::TimedOut => "⏱",
            Conclusion::ActionRequired => "!",
            _ => "?",
        },
        (CheckStatus::InProgress, _) => "◐",
        (CheckStatus::Queued, _) => "⏸",
        _ => "?",
    }
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(char_len(text))), text)
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(char_len(text))))
}

/// Pad cells to the column widths: queue right-aligned, name left-aligned,
/// duration right-aligned. Cells wider than their column are left as is.
pub fn pad_columns(
    widths: &ColumnWidths,
    queue: &str,
    name: &str,
    duration: &str,
) -> (String, String, String) {
    (
        pad_left(queue, widths.queue),
        pad_right(name, widths.name),
        pad_left(duration, widths.duration),
    )
}

/// Header cells aligned the same way as [`pad_columns`].
pub fn header_columns(widths: &ColumnWidths) -> (String, String, String) {
    pad_columns(widths, QUEUE_HEADER, NAME_HEADER, DURATION_HEADER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_truncate_long_name_to_sixty_chars() {
        let name = "a".repeat(75);
        let truncated = truncate_name(&name, MAX_NAME_WIDTH);
        assert_eq!(truncated.chars().count(), 60);
        assert!(truncated.ends_with('…'));
        assert_eq!(&truncated[..59], &name[..59]);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let name = "é".repeat(60);
        assert_eq!(truncate_name(&name, MAX_NAME_WIDTH), name);

        let longer = "é".repeat(61);
        assert_eq!(truncate_name(&longer, MAX_NAME_WIDTH).chars().count(), 60);
    }

    #[test]
    fn test_check_name_uses_workflow() {
        let check = CheckRun::builder("lint").workflow("CI").build();
        assert_eq!(check_name(&check), "CI / lint");

        let long = CheckRun::builder("x".repeat(70)).workflow("CI").build();
        assert_eq!(check_name(&long).chars().count(), MAX_NAME_WIDTH);
    }

    #[test]
    fn test_widths_have_minimums() {
        let widths = ColumnWidths::from_checks(std::iter::empty(), None, t0());
        assert_eq!(widths, ColumnWidths::default());
    }

    #[test]
    fn test_name_width_is_capped() {
        let checks = vec![
            CheckRun::builder("short").build(),
            CheckRun::builder("n".repeat(90)).build(),
        ];
        let widths = ColumnWidths::from_checks(&checks, None, t0());
        assert_eq!(widths.name, MAX_NAME_WIDTH);

        let checks = vec![CheckRun::builder("n".repeat(33)).build()];
        assert_eq!(ColumnWidths::from_checks(&checks, None, t0()).name, 33);
    }

    #[test]
    fn test_widths_follow_cell_text() {
        let checks = vec![CheckRun::builder("build")
            .status(CheckStatus::InProgress)
            .started_at(t0() + TimeDelta::seconds(30))
            .build()];
        let now = t0() + TimeDelta::seconds(30 + 3723);

        let widths = ColumnWidths::from_checks(&checks, Some(t0()), now);
        // "1h 2m 3s"
        assert_eq!(widths.duration, 8);
        // "30s" fits in the minimum
        assert_eq!(widths.queue, MIN_TIME_WIDTH);
    }

    #[test]
    fn test_queue_text() {
        let now = t0() + TimeDelta::seconds(100);

        let queued = CheckRun::builder("a").build();
        assert_eq!(queue_text(&queued, Some(t0()), now), "1m 40s");
        assert_eq!(queue_text(&queued, None, now), "-");

        let started = CheckRun::builder("b")
            .status(CheckStatus::InProgress)
            .started_at(t0() + TimeDelta::seconds(45))
            .build();
        assert_eq!(queue_text(&started, Some(t0()), now), "45s");
        assert_eq!(queue_text(&started, None, now), "-");
    }

    #[test]
    fn test_duration_text() {
        let now = t0() + TimeDelta::seconds(90);

        let running = CheckRun::builder("a")
            .status(CheckStatus::InProgress)
            .started_at(t0())
            .build();
        assert_eq!(duration_text(&running, now), "1m 30s");

        let done = CheckRun::builder("b")
            .completed(Conclusion::Success)
            .started_at(t0())
            .completed_at(t0() + TimeDelta::seconds(20))
            .build();
        assert_eq!(duration_text(&done, now), "20s");

        assert_eq!(duration_text(&CheckRun::builder("c").build(), now), "-");
    }

    #[test]
    fn test_status_icons() {
        let icon = |conclusion| status_icon(&CheckRun::builder("x").completed(conclusion).build());
        assert_eq!(icon(Conclusion::Success), "✓");
        assert_eq!(icon(Conclusion::Failure), "✗");
        assert_eq!(icon(Conclusion::Cancelled), "⊗");
        assert_eq!(icon(Conclusion::Skipped), "⊘");
        assert_eq!(icon(Conclusion::TimedOut), "⏱");
        assert_eq!(icon(Conclusion::ActionRequired), "!");
        assert_eq!(icon(Conclusion::Neutral), "?");

        let running = CheckRun::builder("x").status(CheckStatus::InProgress).build();
        assert_eq!(status_icon(&running), "◐");
        assert_eq!(status_icon(&CheckRun::builder("x").build()), "⏸");
    }

    #[test]
    fn test_pad_columns() {
        let widths = ColumnWidths {
            queue: 6,
            name: 10,
            duration: 7,
        };
        let (queue, name, duration) = pad_columns(&widths, "45s", "CI / lint", "1m 2s");
        assert_eq!(queue, "   45s");
        assert_eq!(name, "CI / lint ");
        assert_eq!(duration, "  1m 2s");
    }

    #[test]
    fn test_header_columns() {
        let (queue, name, duration) = header_columns(&ColumnWidths::default());
        assert_eq!(queue, "Startup");
        assert_eq!(name, format!("Workflow/Job{}", " ".repeat(8)));
        assert_eq!(duration, "Duration");
    }
}
