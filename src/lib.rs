pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{BenchmarkVariant, CliOverrides, Config};
pub use error::{Result, TimingError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    ConfigSnapshot, ExtractionHooks, ExtractionProgress, ExtractionReport, LineMatcher,
    PathLayout, PlannedInput, RunParameters, TimingExtractor, TimingRecord,
};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};

/// Main library interface: ties configuration, console output and the
/// extraction loop together for one run.
pub struct HicooTiming {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl HicooTiming {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance for testing (no signal handler, no progress bars)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, 0, true),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::unregistered(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Inputs a run with `params` would read, in visit order.
    pub fn plan(&self, params: &RunParameters) -> Result<Vec<PlannedInput>> {
        let datasets = self.config.active_datasets()?;
        let layout = PathLayout::new(&self.config);
        Ok(layout.plan(&datasets, &self.config.input.modes, params))
    }

    pub fn output_path(&self, params: &RunParameters) -> PathBuf {
        PathLayout::new(&self.config).output_path(params)
    }

    /// Extract every timing value for one run configuration.
    pub fn extract_timings(&self, params: &RunParameters) -> Result<ExtractionReport> {
        self.shutdown.check_shutdown()?;

        let layout = PathLayout::new(&self.config);
        let plan = self.plan(params)?;
        let output_path = layout.output_path(params);

        self.output_formatter
            .print_output_file(&layout.output_filename(params));
        self.output_formatter.note(&format!(
            "Scanning {} logs in {}",
            plan.len(),
            layout.input_dir().display()
        ));

        let file_progress = self.progress_manager.scan_bar(plan.len() as u64);
        let on_progress = {
            let pb = file_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_scan(&pb, progress);
            }
        };
        let on_record = |record: &TimingRecord| {
            if self.config.output.echo_values {
                self.progress_manager
                    .suspend(|| self.output_formatter.print_value(record));
            }
        };

        let hooks = ExtractionHooks {
            on_record: Some(&on_record),
            on_progress: Some(&on_progress),
            shutdown: Some(&self.shutdown),
        };

        let extractor = TimingExtractor::new(&self.config);
        let progress = match extractor.extract(&plan, &output_path, &hooks) {
            Ok(progress) => progress,
            Err(e) => {
                file_progress.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_scan(&file_progress, &progress);
        self.progress_manager.clear();

        self.output_formatter
            .print_extraction_summary(&progress, &output_path);

        Ok(ExtractionReport::new(
            params.clone(),
            output_path,
            &progress,
            self.create_config_snapshot()?,
        ))
    }

    fn create_config_snapshot(&self) -> Result<ConfigSnapshot> {
        let variant = match self.config.benchmark.variant {
            BenchmarkVariant::Omp => "omp",
            BenchmarkVariant::Sequential => "sequential",
        };

        Ok(ConfigSnapshot {
            input_directory: self.config.input.directory.clone(),
            datasets: self.config.active_datasets()?,
            modes: self.config.input.modes.clone(),
            rank: self.config.benchmark.rank,
            superblock_bits: self.config.benchmark.superblock_bits,
            tile_block: self.config.benchmark.tile_block,
            variant: variant.to_string(),
            marker: self.config.matching.marker.clone(),
        })
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let path = output_path.as_ref();
        let sample_config = Config::create_sample_config();
        std::fs::write(path, sample_config).map_err(|e| TimingError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &TimingError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &Path, datasets: &[&str]) -> Config {
        let mut config = Config::default();
        config.input.directory = dir.join("logs");
        config.input.datasets = Some(datasets.iter().map(|s| s.to_string()).collect());
        config.input.modes = vec!["0".to_string(), "1".to_string(), "2".to_string()];
        config.output.directory = dir.to_path_buf();
        config.output.echo_values = false;
        config
    }

    #[test]
    fn test_extract_timings_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path(), &["flickr-4d"]);
        fs::create_dir_all(&config.input.directory).unwrap();

        let params = RunParameters::new("7", "7", "16");
        let app = HicooTiming::new_for_test(config, OutputMode::Plain);

        for (i, input) in app.plan(&params).unwrap().iter().enumerate() {
            fs::write(
                &input.path,
                format!("warmup line\n[CPU  SpTns MTTKRP]: 0.{} s\n", i + 1),
            )
            .unwrap();
        }

        let report = app.extract_timings(&params).unwrap();

        assert_eq!(report.values(), vec!["0.1", "0.2", "0.3"]);
        assert_eq!(report.summary.files_processed, 3);
        assert_eq!(report.config_used.datasets, vec!["flickr-4d"]);
        assert_eq!(
            report.output_file,
            temp_dir
                .path()
                .join("parti-hicoo-uint-fast8-simd-sb7-sk7-tk16.out")
        );
        assert_eq!(
            fs::read_to_string(&report.output_file).unwrap(),
            "0.1\n0.2\n0.3\n"
        );
    }

    #[test]
    fn test_second_dataset_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path(), &["nell2", "nell1"]);
        fs::create_dir_all(&config.input.directory).unwrap();

        let params = RunParameters::new("7", "7", "16");
        let app = HicooTiming::new_for_test(config, OutputMode::Plain);

        for input in app.plan(&params).unwrap().iter().filter(|p| p.dataset == "nell2") {
            fs::write(&input.path, format!("a b c MTTKRP]: {}\n", input.mode)).unwrap();
        }

        let result = app.extract_timings(&params);
        assert!(matches!(result, Err(TimingError::InputOpen { .. })));

        let output = fs::read_to_string(app.output_path(&params)).unwrap();
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let app = HicooTiming::new_for_test(
            config_for(temp_dir.path(), &["nell2"]),
            OutputMode::Plain,
        );

        app.request_shutdown();
        assert!(!app.is_running());

        let result = app.extract_timings(&RunParameters::new("7", "7", "16"));
        assert!(matches!(result, Err(TimingError::Cancelled)));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        HicooTiming::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
        assert!(content.contains("[benchmark]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

    #[test]
    fn test_sample_config_unwritable_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing").join("sample.toml");

        match HicooTiming::generate_sample_config(&config_path) {
            Err(TimingError::Config { message }) => {
                assert!(message.contains(&config_path.display().to_string()));
            }
            other => panic!("expected Config error, got {:?}", other),
        }
        assert!(!config_path.exists());
    }
}
