use std::path::PathBuf;

use crate::composite::YearlyComposites;
use crate::series::Raster;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum PipelineStage {
    Loading,
    Masking,
    Indexing,
    Merging,
    Compositing,
    Differencing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading scenes"),
            Self::Masking => write!(f, "Applying quality masks"),
            Self::Indexing => write!(f, "Computing index"),
            Self::Merging => write!(f, "Merging sensors"),
            Self::Compositing => write!(f, "Building composites"),
            Self::Differencing => write!(f, "Differencing years"),
            Self::Writing => write!(f, "Writing rasters"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub composites: YearlyComposites,
    /// Per-year differences against the baseline, ascending, baseline
    /// year excluded.
    pub diffs: Vec<(i32, Raster)>,
    /// Paths written, in write order.
    pub written: Vec<PathBuf>,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., sensor or file count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
