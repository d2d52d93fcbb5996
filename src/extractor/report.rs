use crate::error::{Result, TimingError};
use crate::extractor::layout::RunParameters;
use crate::extractor::timing::{ExtractionProgress, TimingRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub parameters: RunParameters,
    pub output_file: PathBuf,
    pub summary: ExtractionSummary,
    pub records: Vec<TimingRecord>,
    pub extraction_time: DateTime<Utc>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub files_processed: usize,
    pub lines_scanned: u64,
    pub lines_skipped: u64,
    pub records_extracted: usize,
    pub records_by_dataset: BTreeMap<String, usize>,
    pub extraction_duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub input_directory: PathBuf,
    pub datasets: Vec<String>,
    pub modes: Vec<String>,
    pub rank: u32,
    pub superblock_bits: u32,
    pub tile_block: u32,
    pub variant: String,
    pub marker: String,
}

impl ExtractionReport {
    pub fn new(
        parameters: RunParameters,
        output_file: PathBuf,
        progress: &ExtractionProgress,
        config_used: ConfigSnapshot,
    ) -> Self {
        let mut records_by_dataset = BTreeMap::new();
        for record in &progress.records {
            *records_by_dataset.entry(record.dataset.clone()).or_insert(0) += 1;
        }

        Self {
            parameters,
            output_file,
            summary: ExtractionSummary {
                files_processed: progress.files_processed,
                lines_scanned: progress.lines_scanned,
                lines_skipped: progress.lines_skipped,
                records_extracted: progress.records.len(),
                records_by_dataset,
                extraction_duration: progress.elapsed(),
            },
            records: progress.records.clone(),
            extraction_time: Utc::now(),
            config_used,
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| TimingError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(path, json_content).map_err(|source| TimingError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Wrote extraction report to {}", path.display());
        Ok(())
    }

    /// Extracted values in output-file order.
    pub fn values(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.value.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(dataset: &str, mode: &str, value: &str) -> TimingRecord {
        TimingRecord {
            dataset: dataset.to_string(),
            mode: mode.to_string(),
            source: PathBuf::from(format!("/logs/{}-m{}.txt", dataset, mode)),
            line: 12,
            value: value.to_string(),
        }
    }

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot {
            input_directory: PathBuf::from("/logs"),
            datasets: vec!["nell2".to_string(), "nell1".to_string()],
            modes: vec!["0".to_string(), "1".to_string()],
            rank: 16,
            superblock_bits: 14,
            tile_block: 1,
            variant: "omp".to_string(),
            marker: "MTTKRP]:".to_string(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut progress = ExtractionProgress::new(4);
        progress.files_processed = 4;
        progress.lines_scanned = 40;
        progress.lines_skipped = 37;
        progress.records = vec![
            record("nell2", "0", "0.1"),
            record("nell2", "1", "0.2"),
            record("nell1", "0", "0.3"),
        ];

        let report = ExtractionReport::new(
            RunParameters::new("7", "7", "8"),
            PathBuf::from("out.out"),
            &progress,
            snapshot(),
        );

        assert_eq!(report.summary.records_extracted, 3);
        assert_eq!(report.summary.records_by_dataset["nell2"], 2);
        assert_eq!(report.summary.records_by_dataset["nell1"], 1);
        assert_eq!(report.values(), vec!["0.1", "0.2", "0.3"]);
    }

    #[test]
    fn test_save_json() {
        let temp_dir = TempDir::new().unwrap();
        let mut progress = ExtractionProgress::new(1);
        progress.records.push(record("nell2", "0", "0.5"));

        let report = ExtractionReport::new(
            RunParameters::new("7", "7", "8"),
            PathBuf::from("out.out"),
            &progress,
            snapshot(),
        );

        let path = temp_dir.path().join("report.json");
        report.save_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["parameters"]["block_size"], "7");
        assert_eq!(value["records"][0]["value"], "0.5");
        assert_eq!(value["config_used"]["marker"], "MTTKRP]:");
    }
}
