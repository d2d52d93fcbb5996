use crate::error::{Result, TimingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "hicoo-timing.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub benchmark: BenchmarkConfig,
    pub output: OutputConfig,
    pub matching: MatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub active_group: String,
    pub modes: Vec<String>,
    /// Explicit dataset list; takes precedence over `active_group` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<String>>,
    pub dataset_groups: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub rank: u32,
    pub superblock_bits: u32,
    pub tile_block: u32,
    pub variant: BenchmarkVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkVariant {
    /// OpenMP runs, logged per thread count and tile block.
    Omp,
    /// Single-threaded runs, logged with a `-seq` suffix.
    Sequential,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub prefix: String,
    pub directory: PathBuf,
    pub echo_values: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchConfig {
    pub marker: String,
    pub marker_index: usize,
    pub value_index: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for InputConfig {
    fn default() -> Self {
        let mut dataset_groups = BTreeMap::new();
        dataset_groups.insert(
            "s3".to_string(),
            strings(&[
                "choa700k",
                "1998DARPA",
                "nell2",
                "freebase_music",
                "freebase_sampled",
                "delicious",
                "nell1",
            ]),
        );
        dataset_groups.insert(
            "l3".to_string(),
            strings(&["amazon-reviews", "patents", "reddit-2015"]),
        );
        dataset_groups.insert(
            "s4".to_string(),
            strings(&["chicago-crime-comm-4d", "uber-4d", "nips-4d", "enron-4d"]),
        );
        dataset_groups.insert("l4".to_string(), strings(&["flickr-4d", "delicious-4d"]));
        dataset_groups.insert("test".to_string(), strings(&["flickr-4d"]));

        Self {
            directory: PathBuf::from(
                "/nethome/jli458/Work/ParTI-dev/timing_parti/hicoo/uint-fast8-simd-fulltest/",
            ),
            active_group: "test".to_string(),
            modes: strings(&["0", "1", "2", "3"]),
            datasets: None,
            dataset_groups,
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            rank: 16,
            superblock_bits: 14,
            tile_block: 1,
            variant: BenchmarkVariant::Omp,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "parti-hicoo-uint-fast8-simd".to_string(),
            directory: PathBuf::from("."),
            echo_values: true,
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            marker: "MTTKRP]:".to_string(),
            marker_index: 3,
            value_index: 4,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TimingError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TimingError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TimingError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = [DEFAULT_CONFIG_FILE, ".hicoo-timing.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, overrides: &CliOverrides) {
        if let Some(ref dir) = overrides.input_dir {
            self.input.directory = dir.clone();
        }

        if let Some(ref group) = overrides.group {
            self.input.active_group = group.clone();
            // a group picked on the command line beats a dataset list from the file
            self.input.datasets = None;
        }

        if let Some(ref datasets) = overrides.datasets {
            self.input.datasets = Some(datasets.clone());
        }

        if let Some(ref modes) = overrides.modes {
            self.input.modes = modes.clone();
        }

        if let Some(rank) = overrides.rank {
            self.benchmark.rank = rank;
        }

        if let Some(bits) = overrides.superblock_bits {
            self.benchmark.superblock_bits = bits;
        }

        if let Some(tb) = overrides.tile_block {
            self.benchmark.tile_block = tb;
        }

        if overrides.sequential {
            self.benchmark.variant = BenchmarkVariant::Sequential;
        }

        if let Some(ref prefix) = overrides.prefix {
            self.output.prefix = prefix.clone();
        }

        if let Some(ref dir) = overrides.output_dir {
            self.output.directory = dir.clone();
        }

        if let Some(ref marker) = overrides.marker {
            self.matching.marker = marker.clone();
        }
    }

    /// Datasets visited by a run, in iteration order.
    pub fn active_datasets(&self) -> Result<Vec<String>> {
        if let Some(ref datasets) = self.input.datasets {
            return Ok(datasets.clone());
        }

        self.input
            .dataset_groups
            .get(&self.input.active_group)
            .cloned()
            .ok_or_else(|| TimingError::UnknownDatasetGroup {
                name: self.input.active_group.clone(),
                available: self.input.dataset_groups.keys().cloned().collect(),
            })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| TimingError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| TimingError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.active_datasets()?.is_empty() {
            return Err(TimingError::Config {
                message: "At least one dataset must be selected".to_string(),
            });
        }

        if self.input.modes.is_empty() {
            return Err(TimingError::Config {
                message: "At least one mode must be specified".to_string(),
            });
        }

        if self.matching.marker.is_empty() {
            return Err(TimingError::Config {
                message: "Marker token must not be empty".to_string(),
            });
        }

        if self.matching.marker_index == self.matching.value_index {
            return Err(TimingError::Config {
                message: format!(
                    "Marker and value cannot share token position {}",
                    self.matching.marker_index
                ),
            });
        }

        if self.output.prefix.is_empty() {
            return Err(TimingError::Config {
                message: "Output file prefix must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub group: Option<String>,
    pub datasets: Option<Vec<String>>,
    pub modes: Option<Vec<String>>,
    pub rank: Option<u32>,
    pub superblock_bits: Option<u32>,
    pub tile_block: Option<u32>,
    pub sequential: bool,
    pub prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub marker: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.input_dir = dir;
        self
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn with_datasets(mut self, datasets: Option<Vec<String>>) -> Self {
        self.datasets = datasets;
        self
    }

    pub fn with_modes(mut self, modes: Option<Vec<String>>) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_rank(mut self, rank: Option<u32>) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_superblock_bits(mut self, bits: Option<u32>) -> Self {
        self.superblock_bits = bits;
        self
    }

    pub fn with_tile_block(mut self, tile_block: Option<u32>) -> Self {
        self.tile_block = tile_block;
        self
    }

    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }
}
