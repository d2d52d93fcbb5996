pub mod layout;
pub mod matcher;
pub mod report;
pub mod timing;

pub use layout::{PathLayout, PlannedInput, RunParameters};
pub use matcher::LineMatcher;
pub use report::{ConfigSnapshot, ExtractionReport, ExtractionSummary};
pub use timing::{ExtractionHooks, ExtractionProgress, TimingExtractor, TimingRecord};
