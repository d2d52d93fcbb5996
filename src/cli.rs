use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::extractor::RunParameters;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hicoo-timing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract MTTKRP timings from ParTI HiCOO benchmark logs")]
#[command(
    long_about = "hicoo-timing scans the benchmark logs of one (block size, partition count, \
                  thread count) configuration across a set of datasets and tensor modes, and \
                  collects every MTTKRP timing into a single .out file, one value per line."
)]
#[command(after_help = "EXAMPLES:\n  \
    hicoo-timing 7 7 16\n  \
    hicoo-timing 7 9 32 --group s3 --input-dir ./timing_parti/hicoo\n  \
    hicoo-timing 8 8 1 --sequential --datasets nell2,delicious --modes 0,1,2\n  \
    hicoo-timing 7 7 16 --dry-run")]
pub struct Cli {
    /// Block size (sb), used verbatim in file names
    #[arg(required_unless_present_any = ["generate_config", "list_groups"])]
    pub block_size: Option<String>,

    /// Partition count (sk), used verbatim in file names
    #[arg(required_unless_present_any = ["generate_config", "list_groups"])]
    pub partition_count: Option<String>,

    /// Thread count (tk), used verbatim in file names
    #[arg(required_unless_present_any = ["generate_config", "list_groups"])]
    pub thread_count: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directory holding the benchmark logs
    #[arg(short, long, env = "HICOO_TIMING_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Named dataset group from the configuration
    #[arg(short, long, conflicts_with = "datasets")]
    pub group: Option<String>,

    /// Explicit datasets to scan (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub datasets: Option<Vec<String>>,

    /// Tensor modes to scan (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub modes: Option<Vec<String>>,

    /// CPD rank embedded in log names (-r)
    #[arg(long)]
    pub rank: Option<u32>,

    /// Superblock bits embedded in log names (-c)
    #[arg(long)]
    pub superblock: Option<u32>,

    /// Tile block embedded in log names (-tb)
    #[arg(long)]
    pub tile_block: Option<u32>,

    /// Read logs of sequential runs (`-seq.txt`)
    #[arg(long)]
    pub sequential: bool,

    /// Output file prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Directory to write the .out file into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Marker token that identifies timing lines
    #[arg(long)]
    pub marker: Option<String>,

    /// Write a JSON extraction report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list the logs that would be read)
    #[arg(long, help = "Show the output file and every input log without reading them")]
    pub dry_run: bool,

    /// List configured dataset groups
    #[arg(long)]
    pub list_groups: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON lines output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input_dir.clone())
            .with_group(self.group.clone())
            .with_datasets(self.datasets.clone())
            .with_modes(self.modes.clone())
            .with_rank(self.rank)
            .with_superblock_bits(self.superblock)
            .with_tile_block(self.tile_block)
            .with_sequential(self.sequential)
            .with_prefix(self.prefix.clone())
            .with_output_dir(self.output_dir.clone())
            .with_marker(self.marker.clone())
    }

    /// The positional run parameters, if all three were given.
    pub fn run_parameters(&self) -> Option<RunParameters> {
        match (&self.block_size, &self.partition_count, &self.thread_count) {
            (Some(block), Some(part), Some(thread)) => {
                Some(RunParameters::new(block.clone(), part.clone(), thread.clone()))
            }
            _ => None,
        }
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_parameters() {
        let cli = Cli::try_parse_from(["hicoo-timing", "7", "9", "16"]).unwrap();
        assert_eq!(cli.run_parameters(), Some(RunParameters::new("7", "9", "16")));
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_parameters_required_for_runs() {
        assert!(Cli::try_parse_from(["hicoo-timing", "7", "9"]).is_err());
        assert!(Cli::try_parse_from(["hicoo-timing"]).is_err());
    }

    #[test]
    fn test_special_commands_skip_parameters() {
        let cli = Cli::try_parse_from(["hicoo-timing", "--generate-config"]).unwrap();
        assert!(cli.generate_config);
        assert_eq!(cli.run_parameters(), None);

        let cli = Cli::try_parse_from(["hicoo-timing", "--list-groups"]).unwrap();
        assert!(cli.list_groups);
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from([
            "hicoo-timing",
            "7",
            "7",
            "8",
            "--datasets",
            "nell2,nell1",
            "--modes",
            "0,2",
            "--rank",
            "32",
            "--sequential",
        ])
        .unwrap();

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        assert_eq!(config.active_datasets().unwrap(), vec!["nell2", "nell1"]);
        assert_eq!(config.input.modes, vec!["0", "2"]);
        assert_eq!(config.benchmark.rank, 32);
        assert_eq!(
            config.benchmark.variant,
            crate::config::BenchmarkVariant::Sequential
        );
    }

    #[test]
    fn test_group_conflicts_with_datasets() {
        let result = Cli::try_parse_from([
            "hicoo-timing", "7", "7", "8", "--group", "s3", "--datasets", "nell2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_verbosity() {
        let cli = Cli::try_parse_from(["hicoo-timing", "7", "7", "8", "-q"]).unwrap();
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::try_parse_from(["hicoo-timing", "7", "7", "8", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
    }
}
