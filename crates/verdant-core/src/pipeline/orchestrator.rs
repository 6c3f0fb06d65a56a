use std::fs;
use std::sync::Arc;

use tracing::info;

use crate::bands::BandStack;
use crate::composite::seasonal_composites;
use crate::diff::diff_from_baseline;
use crate::error::{Result, VerdantError};
use crate::index::compute_index;
use crate::io::{RasterSink, Scene, SceneSource};
use crate::mask;
use crate::merge::merge_series;

use super::config::{PipelineConfig, SceneConfig};
use super::types::{NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};

/// Apply a sensor's quality screen to its freshly loaded scene.
///
/// A configured screen requires the product to carry quality flags;
/// without a screen the scene's own validity passes through untouched.
fn screened(scene: Scene, config: &SceneConfig) -> Result<BandStack> {
    match &config.predicates {
        Some(predicates) => {
            let quality = scene
                .quality
                .as_ref()
                .ok_or_else(|| VerdantError::MissingQuality(config.product.clone()))?;
            let mask = mask::apply_mask(quality, predicates)?;
            scene.bands.apply_mask(&mask)
        }
        None => Ok(scene.bands),
    }
}

/// Run the full compositing pipeline with a thread-safe progress reporter.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    source: &dyn SceneSource,
    sink: &dyn RasterSink,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput> {
    let (band_a, band_b) = config.index.bands();
    let bands = [band_a, band_b];
    let sensor_count = 1 + usize::from(config.secondary.is_some());

    reporter.begin_stage(PipelineStage::Loading, Some(sensor_count));
    let primary_scene = source.load(&config.primary.product, &config.extent, &bands)?;
    info!(
        product = config.primary.product.as_str(),
        acquisitions = primary_scene.bands.len(),
        "Scenes loaded"
    );
    reporter.advance(1);
    let secondary_scene = match &config.secondary {
        Some(sensor) => {
            let scene = source.load(&sensor.product, &config.extent, &bands)?;
            info!(
                product = sensor.product.as_str(),
                acquisitions = scene.bands.len(),
                "Scenes loaded"
            );
            reporter.advance(2);
            Some(scene)
        }
        None => None,
    };
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Masking, Some(sensor_count));
    let primary_stack = screened(primary_scene, &config.primary)?;
    reporter.advance(1);
    let secondary_stack = match (&config.secondary, secondary_scene) {
        (Some(sensor), Some(scene)) => {
            let stack = screened(scene, sensor)?;
            reporter.advance(2);
            Some(stack)
        }
        _ => None,
    };
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Indexing, Some(sensor_count));
    let primary_series = compute_index(&primary_stack, config.index)?;
    reporter.advance(1);
    let secondary_series = match &secondary_stack {
        Some(stack) => {
            let series = compute_index(stack, config.index)?;
            reporter.advance(2);
            Some(series)
        }
        None => None,
    };
    reporter.finish_stage();
    info!(index = %config.index, "Index series computed");

    let merged = match secondary_series {
        Some(secondary) => {
            reporter.begin_stage(PipelineStage::Merging, None);
            let merged = merge_series(&primary_series, &secondary)?;
            info!(
                primary = primary_series.len(),
                secondary = secondary.len(),
                merged = merged.len(),
                "Sensor series merged"
            );
            reporter.finish_stage();
            merged
        }
        None => primary_series,
    };

    reporter.begin_stage(PipelineStage::Compositing, None);
    let composites = seasonal_composites(&merged, config.season, config.statistic)?;
    info!(
        season = %config.season,
        statistic = %config.statistic,
        years = composites.len(),
        "Composites built"
    );
    reporter.finish_stage();

    let baseline_index = composites
        .index_of_year(config.baseline_year)
        .ok_or(VerdantError::YearNotCovered {
            year: config.baseline_year,
            first: composites.first_year(),
            last: composites.last_year(),
        })?;
    reporter.begin_stage(PipelineStage::Differencing, Some(composites.len() - 1));
    let diffs = diff_from_baseline(&composites, baseline_index)?;
    reporter.finish_stage();

    let file_count = diffs.len()
        + if config.write_composites {
            composites.len()
        } else {
            0
        };
    reporter.begin_stage(PipelineStage::Writing, Some(file_count));
    fs::create_dir_all(&config.output_dir)?;
    let mut written = Vec::with_capacity(file_count);
    if config.write_composites {
        for (year, raster) in composites.iter() {
            let path = config
                .output_dir
                .join(format!("{}_{}_{}.tif", config.index, config.season, year));
            sink.write(raster, &path)?;
            written.push(path);
            reporter.advance(written.len());
        }
    }
    for (year, raster) in &diffs {
        let path = config.output_dir.join(format!(
            "{}_{}_{}_minus_{}.tif",
            config.index, config.season, year, config.baseline_year
        ));
        sink.write(raster, &path)?;
        written.push(path);
        reporter.advance(written.len());
    }
    reporter.finish_stage();
    info!(
        files = written.len(),
        dir = %config.output_dir.display(),
        "Rasters written"
    );

    Ok(PipelineOutput {
        composites,
        diffs,
        written,
    })
}

/// Run the full compositing pipeline without progress reporting.
pub fn run_pipeline(
    config: &PipelineConfig,
    source: &dyn SceneSource,
    sink: &dyn RasterSink,
) -> Result<PipelineOutput> {
    run_pipeline_reported(config, source, sink, Arc::new(NoOpReporter))
}
