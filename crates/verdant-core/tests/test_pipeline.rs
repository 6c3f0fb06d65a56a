mod common;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Utc};
use ndarray::Array3;

use verdant_core::bands::{Band, BandStack};
use verdant_core::composite::{Season, Statistic};
use verdant_core::error::{Result, VerdantError};
use verdant_core::grid::Extent;
use verdant_core::index::SpectralIndex;
use verdant_core::io::geotiff::GeoTiffSink;
use verdant_core::io::{AoiResolver, Scene, SceneSource};
use verdant_core::mask::flags::{FlagSeries, FlagVocabulary};
use verdant_core::mask::predicate::PredicateSet;
use verdant_core::pipeline::config::{PipelineConfig, SceneConfig};
use verdant_core::pipeline::{
    run_pipeline, run_pipeline_reported, PipelineStage, ProgressReporter,
};
use verdant_core::synthetic::{SyntheticConfig, SyntheticSource};

use common::{test_profile, ts};

const CONFIDENT_CLOUD: u16 = 2 << 1;

// ---------------------------------------------------------------------------
// Scripted scenes with hand-computable medians
// ---------------------------------------------------------------------------

/// In-memory source serving pre-built scenes keyed by product name.
struct ScriptedSource {
    scenes: HashMap<String, Scene>,
}

impl SceneSource for ScriptedSource {
    fn load(&self, product: &str, _extent: &Extent, _bands: &[Band]) -> Result<Scene> {
        self.scenes
            .get(product)
            .cloned()
            .ok_or_else(|| VerdantError::Upstream(format!("no scenes for product `{product}`")))
    }
}

/// 2x2 optical scene whose NDVI at (row, col) is base + 0.01 * (2*row + col).
/// Slices listed in `cloudy` carry confident-cloud words at every pixel.
fn optical_scene(bases: &[(DateTime<Utc>, f32)], cloudy: &[usize]) -> Scene {
    let t = bases.len();
    let mut red = Array3::<f32>::zeros((t, 2, 2));
    let mut nir = Array3::<f32>::zeros((t, 2, 2));
    for (k, &(_, base)) in bases.iter().enumerate() {
        for row in 0..2 {
            for col in 0..2 {
                let v = base + 0.01 * (2 * row + col) as f32;
                red[[k, row, col]] = 1000.0 * (1.0 - v);
                nir[[k, row, col]] = 1000.0 * (1.0 + v);
            }
        }
    }
    let mut words = Array3::<u16>::zeros((t, 2, 2));
    for &k in cloudy {
        for row in 0..2 {
            for col in 0..2 {
                words[[k, row, col]] = CONFIDENT_CLOUD;
            }
        }
    }

    let timestamps: Vec<DateTime<Utc>> = bases.iter().map(|&(at, _)| at).collect();
    let profile = test_profile(2, 2);
    let mut bands = BTreeMap::new();
    bands.insert(Band::Red, red);
    bands.insert(Band::Nir, nir);
    let stack =
        BandStack::from_bands(bands, -9999.0, timestamps.clone(), profile.clone()).unwrap();
    let quality =
        FlagSeries::new(words, timestamps, profile, FlagVocabulary::force_qai()).unwrap();
    Scene {
        bands: stack,
        quality: Some(quality),
    }
}

fn alpha_scene() -> Scene {
    optical_scene(
        &[
            (ts(2017, 6, 10), 0.20),
            (ts(2017, 7, 10), 0.30),
            (ts(2017, 8, 10), 0.40),
            (ts(2018, 5, 10), 0.90), // outside the jja window
            (ts(2018, 6, 10), 0.25),
            (ts(2018, 7, 10), 0.35),
            (ts(2018, 8, 10), 0.45),
            (ts(2019, 6, 10), 0.30),
            (ts(2019, 7, 10), 0.40),
            (ts(2019, 8, 10), 0.50),
        ],
        &[5], // 2018-07-10 is fully overcast
    )
}

fn beta_scene() -> Scene {
    optical_scene(
        &[
            (ts(2017, 6, 20), 0.22),
            (ts(2017, 7, 20), 0.32),
            (ts(2017, 8, 20), 0.42),
            (ts(2018, 6, 20), 0.27),
            (ts(2018, 7, 20), 0.35),
            (ts(2018, 8, 20), 0.47),
            (ts(2019, 6, 20), 0.32),
            (ts(2019, 7, 20), 0.42),
            (ts(2019, 8, 20), 0.52),
        ],
        &[],
    )
}

fn scripted_source() -> ScriptedSource {
    ScriptedSource {
        scenes: HashMap::from([
            ("alpha".to_string(), alpha_scene()),
            ("beta".to_string(), beta_scene()),
        ]),
    }
}

fn scripted_config(output_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        primary: SceneConfig {
            product: "alpha".to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        },
        secondary: Some(SceneConfig {
            product: "beta".to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        }),
        index: SpectralIndex::Ndvi,
        season: Season::default(),
        statistic: Statistic::Median,
        baseline_year: 2017,
        extent: Extent::new(600_000.0, 600_020.0, 5_649_980.0, 5_650_000.0),
        output_dir,
        write_composites: false,
    }
}

// ---------------------------------------------------------------------------
// End-to-end value checks
// ---------------------------------------------------------------------------

#[test]
fn test_two_sensor_composites_match_hand_computed_medians() {
    let dir = tempfile::tempdir().unwrap();
    let config = scripted_config(dir.path().join("out"));
    let output = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap();

    assert_eq!(
        output.composites.years().collect::<Vec<_>>(),
        vec![2017, 2018, 2019]
    );
    // 2017: median of [.20 .22 .30 .32 .40 .42] = .31
    // 2018: the overcast 2018-07-10 and the May slice drop out, leaving
    //       [.25 .27 .35 .45 .47] = .35
    // 2019: median of [.30 .32 .40 .42 .50 .52] = .41
    let expected = [0.31f32, 0.35, 0.41];
    for (i, &want) in expected.iter().enumerate() {
        let (_, raster) = output.composites.get(i).unwrap();
        assert_abs_diff_eq!(raster.values[[0, 0]], want, epsilon = 1e-6);
        assert_abs_diff_eq!(raster.values[[1, 1]], want + 0.03, epsilon = 1e-6);
    }
}

#[test]
fn test_diff_rasters_match_hand_computed_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = scripted_config(dir.path().join("out"));
    let output = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap();

    assert_eq!(output.diffs.len(), 2);
    assert_eq!(output.diffs[0].0, 2018);
    assert_eq!(output.diffs[1].0, 2019);
    // The per-pixel gradient cancels in the difference
    for row in 0..2 {
        for col in 0..2 {
            assert_abs_diff_eq!(output.diffs[0].1.values[[row, col]], 0.04, epsilon = 1e-6);
            assert_abs_diff_eq!(output.diffs[1].1.values[[row, col]], 0.10, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_single_sensor_run_skips_the_merge() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = scripted_config(dir.path().join("out"));
    config.secondary = None;
    let output = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap();

    // 2017: median of alpha alone [.20 .30 .40] = .30
    let (_, y2017) = output.composites.get(0).unwrap();
    assert_abs_diff_eq!(y2017.values[[0, 0]], 0.30, epsilon = 1e-6);
    // 2018: the overcast slice leaves [.25 .45], median .35
    let (_, y2018) = output.composites.get(1).unwrap();
    assert_abs_diff_eq!(y2018.values[[0, 0]], 0.35, epsilon = 1e-6);
}

// ---------------------------------------------------------------------------
// Output files
// ---------------------------------------------------------------------------

#[test]
fn test_written_files_and_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = scripted_config(dir.path().join("out"));
    config.write_composites = true;
    let output = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap();

    let names: Vec<String> = output
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "ndvi_jja_2017.tif",
            "ndvi_jja_2018.tif",
            "ndvi_jja_2019.tif",
            "ndvi_jja_2018_minus_2017.tif",
            "ndvi_jja_2019_minus_2017.tif",
        ]
    );
    for path in &output.written {
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[0..2], b"II");
    }
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn test_baseline_year_not_covered() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = scripted_config(dir.path().join("out"));
    config.baseline_year = 2016;
    let err = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap_err();
    assert!(matches!(
        err,
        VerdantError::YearNotCovered {
            year: 2016,
            first: 2017,
            last: 2019
        }
    ));
}

#[test]
fn test_predicates_require_quality_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = scripted_config(dir.path().join("out"));

    let mut flagless = alpha_scene();
    flagless.quality = None;
    let source = ScriptedSource {
        scenes: HashMap::from([
            ("alpha".to_string(), flagless),
            ("beta".to_string(), beta_scene()),
        ]),
    };

    let err = run_pipeline(&config, &source, &GeoTiffSink).unwrap_err();
    assert!(matches!(err, VerdantError::MissingQuality(product) if product == "alpha"));
}

#[test]
fn test_source_errors_surface_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = scripted_config(dir.path().join("out"));
    config.primary.product = "gamma".to_string();
    let err = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap_err();
    assert!(matches!(err, VerdantError::Upstream(msg) if msg.contains("gamma")));
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage.to_string());
    }
}

#[test]
fn test_progress_stages_reported_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = scripted_config(dir.path().join("out"));
    let reporter = Arc::new(RecordingReporter::default());
    run_pipeline_reported(&config, &scripted_source(), &GeoTiffSink, reporter.clone()).unwrap();

    let stages = reporter.stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            "Loading scenes",
            "Applying quality masks",
            "Computing index",
            "Merging sensors",
            "Building composites",
            "Differencing years",
            "Writing rasters",
        ]
    );
}

#[test]
fn test_merge_stage_skipped_for_single_sensor() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = scripted_config(dir.path().join("out"));
    config.secondary = None;
    let reporter = Arc::new(RecordingReporter::default());
    run_pipeline_reported(&config, &scripted_source(), &GeoTiffSink, reporter.clone()).unwrap();

    let stages = reporter.stages.lock().unwrap().clone();
    assert!(!stages.iter().any(|s| s == "Merging sensors"));
    assert_eq!(stages.len(), 6);
}

// ---------------------------------------------------------------------------
// AOI resolution
// ---------------------------------------------------------------------------

/// Resolves a boundary file holding a TOML extent table.
struct TomlAoi;

impl AoiResolver for TomlAoi {
    fn resolve(&self, path: &Path) -> Result<Extent> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| VerdantError::Upstream(e.to_string()))
    }
}

#[test]
fn test_aoi_resolver_feeds_the_extent() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = dir.path().join("aoi.toml");
    fs::write(
        &boundary,
        "x_min = 0.0\nx_max = 20.0\ny_min = 0.0\ny_max = 20.0\n",
    )
    .unwrap();

    let extent = TomlAoi.resolve(&boundary).unwrap();
    assert_eq!(extent, Extent::new(0.0, 20.0, 0.0, 20.0));

    let mut config = scripted_config(dir.path().join("out"));
    config.extent = extent;
    let output = run_pipeline(&config, &scripted_source(), &GeoTiffSink).unwrap();
    assert_eq!(output.diffs.len(), 2);
}

// ---------------------------------------------------------------------------
// Synthetic archive end to end
// ---------------------------------------------------------------------------

#[test]
fn test_synthetic_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = SyntheticSource::new(SyntheticConfig {
        width: 24,
        height: 24,
        start_year: 2017,
        end_year: 2018,
        cloudy_days: vec![],
    });
    let config = PipelineConfig {
        primary: SceneConfig {
            product: "sentinel2".to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        },
        secondary: Some(SceneConfig {
            product: "landsat8".to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        }),
        index: SpectralIndex::Ndvi,
        season: Season::default(),
        statistic: Statistic::Median,
        baseline_year: 2017,
        extent: Extent::new(600_000.0, 600_240.0, 5_649_760.0, 5_650_000.0),
        output_dir: dir.path().join("out"),
        write_composites: false,
    };

    let output = run_pipeline(&config, &source, &GeoTiffSink).unwrap();
    assert_eq!(output.composites.years().collect::<Vec<_>>(), vec![2017, 2018]);
    assert_eq!(output.written.len(), 1);
    assert!(output.written[0].ends_with("ndvi_jja_2018_minus_2017.tif"));
    assert!(output.written[0].exists());

    // The synthetic model greens up by 0.02 NDVI per year at every pixel
    let (year, diff) = &output.diffs[0];
    assert_eq!(*year, 2018);
    for row in 0..24 {
        for col in 0..24 {
            assert!(diff.valid[[row, col]]);
            assert_abs_diff_eq!(diff.values[[row, col]], 0.02, epsilon = 1e-6);
        }
    }
}
