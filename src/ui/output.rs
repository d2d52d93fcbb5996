use crate::error::{TimingError, UserFriendlyError};
use crate::extractor::{ExtractionProgress, ExtractionReport, TimingRecord};
use console::{style, Term};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

/// Console side of a run.
///
/// stdout always carries the `output file: "<name>"` line and the echoed
/// values. Notes and the summary appear from verbosity 1, the report from
/// verbosity 2. Errors go to stderr.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors =
            mode == OutputMode::Human && !quiet && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
        }
    }

    pub fn note(&self, message: &str) {
        if self.verbose_level < 1 {
            return;
        }

        match self.mode {
            OutputMode::Json => emit_json(&json!({ "type": "note", "message": message })),
            OutputMode::Human if self.use_colors => println!("{}", style(message).dim()),
            _ => println!("{}", message),
        }
    }

    pub fn print_output_file(&self, filename: &str) {
        match self.mode {
            OutputMode::Json => emit_json(&json!({ "type": "output_file", "path": filename })),
            _ => println!("output file: \"{}\"", filename),
        }
    }

    /// Echoes one extracted value; human and plain modes print the bare token.
    pub fn print_value(&self, record: &TimingRecord) {
        match self.mode {
            OutputMode::Json => emit_json(&json!({
                "type": "value",
                "dataset": record.dataset,
                "mode": record.mode,
                "line": record.line,
                "value": record.value
            })),
            _ => println!("{}", record.value),
        }
    }

    pub fn print_user_friendly_error(&self, error: &TimingError) {
        let message = error.user_message();
        let suggestion = error.suggestion();

        if self.mode == OutputMode::Json {
            eprintln!(
                "{}",
                json!({ "type": "error", "message": message, "suggestion": suggestion })
            );
            return;
        }

        if self.use_colors {
            eprintln!("{} {}", style("error:").red().bold(), message);
            if let Some(hint) = suggestion {
                eprintln!("{} {}", style("hint:").cyan(), hint);
            }
        } else {
            eprintln!("error: {}", message);
            if let Some(hint) = suggestion {
                eprintln!("hint: {}", hint);
            }
        }
    }

    pub fn print_extraction_summary(&self, progress: &ExtractionProgress, output_path: &Path) {
        if self.verbose_level < 1 {
            return;
        }

        if self.mode == OutputMode::Json {
            emit_json(&json!({
                "type": "summary",
                "files_processed": progress.files_processed,
                "lines_scanned": progress.lines_scanned,
                "lines_skipped": progress.lines_skipped,
                "values_written": progress.records.len(),
                "output_file": output_path.display().to_string(),
                "duration_ms": progress.elapsed().as_millis() as u64
            }));
            return;
        }

        let rows = [
            ("logs", progress.files_processed.to_string()),
            ("lines", progress.lines_scanned.to_string()),
            ("skipped", progress.lines_skipped.to_string()),
            ("values", progress.records.len().to_string()),
            ("output", output_path.display().to_string()),
            ("time", format_duration(progress.elapsed())),
        ];

        for (label, value) in rows {
            let label = format!("{:>8}", label);
            if self.use_colors {
                println!("{} {}", style(label).dim(), style(value).bold());
            } else {
                println!("{} {}", label, value);
            }
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        if self.verbose_level < 2 {
            return;
        }

        if self.mode == OutputMode::Json {
            match serde_json::to_string_pretty(report) {
                Ok(body) => println!("{}", body),
                Err(e) => tracing::warn!("Cannot render report as JSON: {}", e),
            }
            return;
        }

        let params = &report.parameters;
        println!(
            "run sb={} sk={} tk={}, {} logs from {}",
            params.block_size,
            params.partition_count,
            params.thread_count,
            report.summary.files_processed,
            report.config_used.input_directory.display()
        );
        println!(
            "extracted at {}",
            report.extraction_time.format("%Y-%m-%d %H:%M:%S UTC")
        );
        for (dataset, count) in &report.summary.records_by_dataset {
            println!("  {:<20} {}", dataset, count);
        }
    }
}

fn emit_json(value: &serde_json::Value) {
    println!("{}", value);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}
