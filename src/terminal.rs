use std::{
    io::{self, Write},
    time::Duration,
};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dialoguer::console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub enum OutputColor {
    Green,
    Cyan,
    Yellow,
    Red,
}

/// Right-aligned, colored status label in the style of cargo's output.
pub fn get_formatted_left_output(text: &str, color: &OutputColor) -> String {
    let padded = style(format!("{text:>12}")).bold();
    match color {
        OutputColor::Green => padded.green(),
        OutputColor::Cyan => padded.cyan(),
        OutputColor::Yellow => padded.yellow(),
        OutputColor::Red => padded.red(),
    }
    .to_string()
}

pub fn create_new_pb(len: u64, prefix: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{prefix:>12.cyan.bold} {spinner} {pos}/{len}{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix(prefix);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Writes result lines to `out` with the bar cleared. Unlike
/// `ProgressBar::println`, this still prints when the bar is hidden.
pub fn write_lines<W: Write>(pb: &ProgressBar, out: &mut W, lines: &[String]) -> io::Result<()> {
    pb.suspend(|| lines.iter().try_for_each(|line| writeln!(out, "{line}")))
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>, tz: Tz) -> String {
    timestamp.map_or_else(
        || "unknown".to_string(),
        |timestamp| {
            timestamp
                .with_timezone(&tz)
                .format("%Y-%m-%d %I:%M %p %Z")
                .to_string()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_in_the_requested_zone() {
        let timestamp = DateTime::from_timestamp_millis(1_469_922_850_259);
        assert_eq!(
            format_timestamp(timestamp, chrono_tz::Europe::Berlin),
            "2016-07-31 01:54 AM CEST"
        );
        assert_eq!(format_timestamp(None, Tz::UTC), "unknown");
    }

    #[test]
    fn lines_are_written_while_the_bar_is_hidden() {
        let pb = ProgressBar::hidden();
        let mut out = Vec::new();

        write_lines(&pb, &mut out, &["first".to_string(), "second".to_string()]).unwrap();

        assert!(pb.is_hidden());
        assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\n");
    }
}
