use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::composite::{Season, Statistic};
use crate::grid::Extent;
use crate::index::SpectralIndex;
use crate::mask::predicate::PredicateSet;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub primary: SceneConfig,
    /// Optional second sensor, merged underneath the primary.
    #[serde(default)]
    pub secondary: Option<SceneConfig>,
    pub index: SpectralIndex,
    #[serde(default)]
    pub season: Season,
    #[serde(default)]
    pub statistic: Statistic,
    /// Reference year every other composite is differenced against.
    pub baseline_year: i32,
    pub extent: Extent,
    pub output_dir: PathBuf,
    /// Also write the per-year composites next to the differences.
    #[serde(default)]
    pub write_composites: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Product name understood by the scene source.
    pub product: String,
    /// Quality screen; `None` for products without quality flags.
    #[serde(default)]
    pub predicates: Option<PredicateSet>,
}
