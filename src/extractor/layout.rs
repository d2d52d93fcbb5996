use crate::config::{BenchmarkConfig, BenchmarkVariant, Config};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The three values a run is keyed on. They are used verbatim in file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    pub block_size: String,
    pub partition_count: String,
    pub thread_count: String,
}

impl RunParameters {
    pub fn new<S: Into<String>>(block_size: S, partition_count: S, thread_count: S) -> Self {
        Self {
            block_size: block_size.into(),
            partition_count: partition_count.into(),
            thread_count: thread_count.into(),
        }
    }
}

/// One (dataset, mode) input visited by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInput {
    pub dataset: String,
    pub mode: String,
    pub path: PathBuf,
}

/// Naming scheme for benchmark logs and the timing output file.
pub struct PathLayout {
    input_dir: PathBuf,
    output_dir: PathBuf,
    prefix: String,
    benchmark: BenchmarkConfig,
}

impl PathLayout {
    pub fn new(config: &Config) -> Self {
        Self {
            input_dir: config.input.directory.clone(),
            output_dir: config.output.directory.clone(),
            prefix: config.output.prefix.clone(),
            benchmark: config.benchmark.clone(),
        }
    }

    /// `<prefix>-sb<block>-sk<part>-tk<thread>.out`
    pub fn output_filename(&self, params: &RunParameters) -> String {
        format!(
            "{}-sb{}-sk{}-tk{}.out",
            self.prefix, params.block_size, params.partition_count, params.thread_count
        )
    }

    pub fn output_path(&self, params: &RunParameters) -> PathBuf {
        self.output_dir.join(self.output_filename(params))
    }

    pub fn input_filename(&self, dataset: &str, mode: &str, params: &RunParameters) -> String {
        let stem = format!(
            "{}-b{}-k{}-c{}-m{}-r{}",
            dataset,
            params.block_size,
            params.partition_count,
            self.benchmark.superblock_bits,
            mode,
            self.benchmark.rank
        );

        match self.benchmark.variant {
            BenchmarkVariant::Omp => format!(
                "{}-tk{}-tb{}.txt",
                stem, params.thread_count, self.benchmark.tile_block
            ),
            BenchmarkVariant::Sequential => format!("{}-seq.txt", stem),
        }
    }

    pub fn input_path(&self, dataset: &str, mode: &str, params: &RunParameters) -> PathBuf {
        self.input_dir.join(self.input_filename(dataset, mode, params))
    }

    /// Every input in visit order: datasets outer, modes inner.
    pub fn plan(
        &self,
        datasets: &[String],
        modes: &[String],
        params: &RunParameters,
    ) -> Vec<PlannedInput> {
        datasets
            .iter()
            .flat_map(|dataset| {
                modes.iter().map(move |mode| PlannedInput {
                    dataset: dataset.clone(),
                    mode: mode.clone(),
                    path: self.input_path(dataset, mode, params),
                })
            })
            .collect()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RunParameters {
        RunParameters::new("7", "9", "16")
    }

    #[test]
    fn test_output_filename() {
        let layout = PathLayout::new(&Config::default());
        assert_eq!(
            layout.output_filename(&params()),
            "parti-hicoo-uint-fast8-simd-sb7-sk9-tk16.out"
        );
    }

    #[test]
    fn test_parameters_used_verbatim() {
        let layout = PathLayout::new(&Config::default());
        let odd = RunParameters::new("07", "x", " 4");
        assert_eq!(
            layout.output_filename(&odd),
            "parti-hicoo-uint-fast8-simd-sb07-skx-tk 4.out"
        );
    }

    #[test]
    fn test_omp_input_path() {
        let mut config = Config::default();
        config.input.directory = PathBuf::from("/data/logs");
        let layout = PathLayout::new(&config);

        assert_eq!(
            layout.input_path("nell2", "1", &params()),
            PathBuf::from("/data/logs/nell2-b7-k9-c14-m1-r16-tk16-tb1.txt")
        );
    }

    #[test]
    fn test_sequential_input_path() {
        let mut config = Config::default();
        config.benchmark.variant = BenchmarkVariant::Sequential;
        let layout = PathLayout::new(&config);

        assert_eq!(
            layout.input_filename("uber-4d", "3", &params()),
            "uber-4d-b7-k9-c14-m3-r16-seq.txt"
        );
    }

    #[test]
    fn test_plan_order() {
        let layout = PathLayout::new(&Config::default());
        let datasets = vec!["a".to_string(), "b".to_string()];
        let modes = vec!["0".to_string(), "1".to_string(), "2".to_string()];

        let plan = layout.plan(&datasets, &modes, &params());
        let order: Vec<(&str, &str)> = plan
            .iter()
            .map(|p| (p.dataset.as_str(), p.mode.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![("a", "0"), ("a", "1"), ("a", "2"), ("b", "0"), ("b", "1"), ("b", "2")]
        );
    }

    #[test]
    fn test_output_path_uses_output_directory() {
        let mut config = Config::default();
        config.output.directory = PathBuf::from("/tmp/results");
        let layout = PathLayout::new(&config);

        assert_eq!(
            layout.output_path(&params()),
            PathBuf::from("/tmp/results/parti-hicoo-uint-fast8-simd-sb7-sk9-tk16.out")
        );
    }
}
