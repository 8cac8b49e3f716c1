//! CSV report for benchmark results.
//!
//! Appends one row per benchmark invocation with columns:
//! numLines,runtimeSorted,runtimeShuffled,runtimeReversed

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use log::info;

use crate::error::ReportError;
use crate::harness::{InputOrder, OrderingRun};

pub const REPORT_HEADER: &str = "numLines,runtimeSorted,runtimeShuffled,runtimeReversed";

/// Format the row for one invocation. Orderings missing from `runs` are left blank.
pub fn format_row(line_count: usize, runs: &[OrderingRun]) -> String {
    let mut row = line_count.to_string();
    for order in InputOrder::ALL {
        row.push(',');
        if let Some(run) = runs.iter().find(|run| run.order == order) {
            row.push_str(&run.timings.total().as_secs_f64().to_string());
        }
    }
    row
}

/// Append a row to the report at `path`, writing the header first if the file is new or empty.
pub fn append_report(
    path: &Path,
    line_count: usize,
    runs: &[OrderingRun],
) -> Result<(), ReportError> {
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ReportError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if needs_header {
        writeln!(file, "{}", REPORT_HEADER).map_err(write_err)?;
    }
    writeln!(file, "{}", format_row(line_count, runs)).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    info!("Report row appended to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::harness::PhaseTimings;

    fn run(order: InputOrder, millis: u64) -> OrderingRun {
        OrderingRun {
            order,
            timings: PhaseTimings {
                insert: Duration::from_millis(millis),
                ..PhaseTimings::default()
            },
        }
    }

    #[test]
    fn row_lists_totals_in_run_order() {
        let runs = [
            run(InputOrder::Reversed, 3000),
            run(InputOrder::Sorted, 500),
            run(InputOrder::Shuffled, 1250),
        ];
        assert_eq!(format_row(1000, &runs), "1000,0.5,1.25,3");
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");
        let runs = [run(InputOrder::Sorted, 1000)];

        append_report(&path, 10, &runs).unwrap();
        append_report(&path, 20, &runs).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![REPORT_HEADER, "10,1,,", "20,1,,"]);
    }

    #[test]
    fn unwritable_path_reports_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("analysis.csv");
        let err = append_report(&path, 1, &[]).unwrap_err();
        assert!(matches!(err, ReportError::Open { .. }));
    }
}
