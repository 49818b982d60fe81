use std::path::PathBuf;
use std::time::Duration;

use crate::cellmerge::tools::model::FileFailure;

/// Snapshot of a running merge emitted after every input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub file_name: String,
    pub processed: usize,
    pub total: usize,
    /// Extrapolated time left, based on the average time per file so far.
    pub remaining: Duration,
}

/// Events emitted by the merge engine while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// Discovery finished; `total` files will be processed.
    Started { total: usize },
    /// Integer percentage of files processed.
    Progress { percent: u8 },
    Status(FileStatus),
    /// A file was skipped; the batch continues.
    FileFailed(FileFailure),
    /// The merged workbook has been written.
    Finished {
        output_path: PathBuf,
        row_count: usize,
    },
}

/// Receives [`MergeEvent`]s inline, on the thread running the merge.
pub trait MergeObserver {
    fn on_event(&mut self, event: &MergeEvent);
}

impl<F> MergeObserver for F
where
    F: FnMut(&MergeEvent),
{
    fn on_event(&mut self, event: &MergeEvent) {
        self(event)
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MergeObserver for NoopObserver {
    fn on_event(&mut self, _event: &MergeEvent) {}
}

/// `round(processed / total * 100)`, clamped to 100.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Average time per processed file multiplied by the files still to go.
pub fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Duration {
    if processed == 0 {
        return Duration::ZERO;
    }
    let left = total.saturating_sub(processed);
    Duration::from_secs_f64(elapsed.as_secs_f64() / processed as f64 * left as f64)
}

/// Formats a duration as `HH:MM:SS` for status lines.
pub fn format_hms(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_rounded() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(3, 3), 100);
    }

    #[test]
    fn remaining_time_extrapolates_average() {
        let remaining = estimate_remaining(Duration::from_secs(6), 2, 5);
        assert_eq!(remaining, Duration::from_secs(9));
        assert_eq!(estimate_remaining(Duration::from_secs(6), 5, 5), Duration::ZERO);
        assert_eq!(estimate_remaining(Duration::from_secs(6), 0, 5), Duration::ZERO);
    }

    #[test]
    fn hms_format_pads_fields() {
        assert_eq!(format_hms(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_hms(Duration::from_secs(3_723)), "01:02:03");
        assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
    }

    #[test]
    fn closures_observe_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &MergeEvent| seen.push(event.clone());
            observer.on_event(&MergeEvent::Progress { percent: 50 });
        }
        assert_eq!(seen, vec![MergeEvent::Progress { percent: 50 }]);
    }
}
