use crate::extractor::ExtractionProgress;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const SCAN_TEMPLATE: &str = "{spinner} {pos}/{len} logs [{bar:30}] {wide_msg}";

/// Owns the log-scan progress bar and keeps echoed values from tearing it.
pub struct ProgressManager {
    bars: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: MultiProgress::new(),
            enabled,
        }
    }

    /// One tick per input log; hidden when progress display is off.
    pub fn scan_bar(&self, total_logs: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(SCAN_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        let pb = self.bars.add(ProgressBar::new(total_logs));
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.bars.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.bars.clear().ok();
        }
    }
}

pub fn update_scan(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.set_position(progress.files_processed as u64);
    if let Some(ref current) = progress.current_file {
        pb.set_message(format!("{}, {} values", current, progress.records.len()));
    }
}

pub fn finish_scan(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.finish_with_message(format!(
        "{} values from {} logs in {}",
        progress.records.len(),
        progress.files_processed,
        format_duration(progress.elapsed())
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_manager_hides_bar() {
        let manager = ProgressManager::new(false);
        let pb = manager.scan_bar(8);
        assert!(pb.is_hidden());
        assert_eq!(manager.suspend(|| 7), 7);
    }

    #[test]
    fn test_update_and_finish_scan() {
        let pb = ProgressManager::new(false).scan_bar(4);

        let mut progress = ExtractionProgress::new(4);
        progress.start_file("nell2 m0".to_string());
        progress.finish_file();
        update_scan(&pb, &progress);

        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "nell2 m0, 0 values");

        finish_scan(&pb, &progress);
        assert!(pb.is_finished());
        assert!(pb.message().starts_with("0 values from 1 logs in "));
    }
}
