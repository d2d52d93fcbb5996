use crate::config::Config;
use crate::error::{Result, TimingError};
use crate::extractor::layout::PlannedInput;
use crate::extractor::matcher::LineMatcher;
use crate::ui::GracefulShutdown;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A value pulled out of one benchmark log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub dataset: String,
    pub mode: String,
    pub source: PathBuf,
    /// 1-based line number within `source`.
    pub line: usize,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub lines_scanned: u64,
    pub lines_skipped: u64,
    pub current_file: Option<String>,
    pub records: Vec<TimingRecord>,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            lines_scanned: 0,
            lines_skipped: 0,
            current_file: None,
            records: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn start_file(&mut self, name: String) {
        self.current_file = Some(name);
    }

    pub fn finish_file(&mut self) {
        self.files_processed += 1;
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Callbacks fired while a run is in flight.
#[derive(Default)]
pub struct ExtractionHooks<'a> {
    pub on_record: Option<&'a dyn Fn(&TimingRecord)>,
    pub on_progress: Option<&'a dyn Fn(&ExtractionProgress)>,
    pub shutdown: Option<&'a GracefulShutdown>,
}

pub struct TimingExtractor {
    matcher: LineMatcher,
    buffer_size: usize,
}

impl TimingExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            matcher: LineMatcher::new(&config.matching),
            buffer_size: 64 * 1024,
        }
    }

    /// Scans every planned input in order and writes one value per line to
    /// `output_path`, which is truncated first.
    ///
    /// The first input that cannot be opened or read ends the run. Records
    /// found before that point are flushed to the output file before the
    /// error is returned.
    pub fn extract(
        &self,
        plan: &[PlannedInput],
        output_path: &Path,
        hooks: &ExtractionHooks<'_>,
    ) -> Result<ExtractionProgress> {
        let output_error = |source| TimingError::OutputWrite {
            path: output_path.to_path_buf(),
            source,
        };

        let file = File::create(output_path).map_err(output_error)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);
        let mut progress = ExtractionProgress::new(plan.len());

        tracing::info!(
            "Extracting '{}' timings from {} inputs into {}",
            self.matcher.marker(),
            plan.len(),
            output_path.display()
        );

        let outcome = self.process_inputs(plan, &mut writer, &mut progress, hooks, output_path);
        let flushed = writer.flush().map_err(output_error);

        outcome?;
        flushed?;

        if let Some(callback) = hooks.on_progress {
            callback(&progress);
        }

        tracing::info!(
            "Extracted {} records from {} files in {:?}",
            progress.records.len(),
            progress.files_processed,
            progress.elapsed()
        );

        Ok(progress)
    }

    fn process_inputs<W: Write>(
        &self,
        plan: &[PlannedInput],
        writer: &mut W,
        progress: &mut ExtractionProgress,
        hooks: &ExtractionHooks<'_>,
        output_path: &Path,
    ) -> Result<()> {
        for input in plan {
            if let Some(shutdown) = hooks.shutdown {
                shutdown.check_shutdown()?;
            }

            if let Some(callback) = hooks.on_progress {
                callback(progress);
            }

            self.scan_input(input, writer, progress, hooks, output_path)?;
        }

        Ok(())
    }

    fn scan_input<W: Write>(
        &self,
        input: &PlannedInput,
        writer: &mut W,
        progress: &mut ExtractionProgress,
        hooks: &ExtractionHooks<'_>,
        output_path: &Path,
    ) -> Result<()> {
        let file = File::open(&input.path).map_err(|source| TimingError::InputOpen {
            path: input.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Scanning {} (dataset {}, mode {})",
            input.path.display(),
            input.dataset,
            input.mode
        );
        progress.start_file(format!("{} m{}", input.dataset, input.mode));

        let reader = BufReader::with_capacity(self.buffer_size, file);
        let mut found = 0usize;

        for (index, raw) in reader.split(b'\n').enumerate() {
            let raw = raw.map_err(|source| TimingError::InputRead {
                path: input.path.clone(),
                source,
            })?;
            let line = String::from_utf8_lossy(&raw);
            progress.lines_scanned += 1;

            let Some(value) = self.matcher.extract_value(&line) else {
                progress.lines_skipped += 1;
                tracing::trace!("{}:{}: no match", input.path.display(), index + 1);
                continue;
            };

            writeln!(writer, "{}", value).map_err(|source| TimingError::OutputWrite {
                path: output_path.to_path_buf(),
                source,
            })?;

            let record = TimingRecord {
                dataset: input.dataset.clone(),
                mode: input.mode.clone(),
                source: input.path.clone(),
                line: index + 1,
                value: value.to_string(),
            };

            if let Some(callback) = hooks.on_record {
                callback(&record);
            }

            progress.records.push(record);
            found += 1;
        }

        tracing::debug!("{} records in {}", found, input.path.display());
        progress.finish_file();

        Ok(())
    }
}
