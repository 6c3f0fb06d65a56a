use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use verdant_core::composite::{Season, Statistic};
use verdant_core::grid::Extent;
use verdant_core::index::SpectralIndex;
use verdant_core::io::geotiff::GeoTiffSink;
use verdant_core::mask::predicate::PredicateSet;
use verdant_core::pipeline::config::{PipelineConfig, SceneConfig};
use verdant_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};
use verdant_core::synthetic::{
    SyntheticConfig, SyntheticSource, PRODUCT_LANDSAT8, PRODUCT_SENTINEL1, PRODUCT_SENTINEL2,
};

use crate::summary;

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Spectral index to compute
    #[arg(long, default_value = "ndvi")]
    pub index: String,

    /// Season window as a month-initial triplet (e.g. jja, mam, djf)
    #[arg(long, default_value = "jja")]
    pub season: String,

    /// Compositing statistic (median or mean)
    #[arg(long, default_value = "median")]
    pub statistic: String,

    /// Baseline year for differencing (defaults to the first year)
    #[arg(long)]
    pub baseline_year: Option<i32>,

    /// First year of the synthetic archive
    #[arg(long, default_value = "2017")]
    pub from: i32,

    /// Last year of the synthetic archive
    #[arg(long, default_value = "2019")]
    pub to: i32,

    /// Synthetic grid edge length in pixels
    #[arg(long, default_value = "96")]
    pub size: usize,

    /// Date on which optical scenes are fully overcast (repeatable)
    #[arg(long = "cloudy-day", value_name = "YYYY-MM-DD")]
    pub cloudy_days: Vec<NaiveDate>,

    /// Use only the primary sensor, skipping the merge
    #[arg(long)]
    pub single_sensor: bool,

    /// Write per-year composites alongside the differences
    #[arg(long)]
    pub write_composites: bool,

    /// Output directory
    #[arg(short, long, default_value = "verdant_out")]
    pub output: PathBuf,
}

/// Drives one shared bar through the pipeline's stages.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        self.bar.set_position(self.bar.length().unwrap_or(1));
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        debug!(path = %config_path.display(), "Pipeline config loaded");
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)?
    };

    summary::print_run_summary(&config);

    let source = SyntheticSource::new(SyntheticConfig {
        width: args.size,
        height: args.size,
        start_year: args.from,
        end_year: args.to,
        cloudy_days: args.cloudy_days.clone(),
    });

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:24} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter { bar: pb.clone() });

    let output = run_pipeline_reported(&config, &source, &GeoTiffSink, reporter)?;

    pb.finish_with_message("Done");
    println!();
    for path in &output.written {
        println!("  wrote {}", path.display());
    }
    println!(
        "\n{} composite year(s), {} difference raster(s) against {}",
        output.composites.len(),
        output.diffs.len(),
        config.baseline_year
    );

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> Result<PipelineConfig> {
    let index: SpectralIndex = args.index.parse()?;
    let season: Season = args.season.parse()?;
    let statistic: Statistic = args.statistic.parse()?;
    let baseline_year = args.baseline_year.unwrap_or(args.from);

    // Radar indices run off Sentinel-1 alone; optical indices get the
    // harmonized Sentinel-2 + Landsat-8 pair under a clear-sky screen.
    let (primary, secondary) = if index.is_sar() {
        (
            SceneConfig {
                product: PRODUCT_SENTINEL1.to_string(),
                predicates: None,
            },
            None,
        )
    } else {
        (
            SceneConfig {
                product: PRODUCT_SENTINEL2.to_string(),
                predicates: Some(PredicateSet::clear_sky()),
            },
            (!args.single_sensor).then(|| SceneConfig {
                product: PRODUCT_LANDSAT8.to_string(),
                predicates: Some(PredicateSet::clear_sky()),
            }),
        )
    };

    Ok(PipelineConfig {
        primary,
        secondary,
        index,
        season,
        statistic,
        baseline_year,
        extent: Extent::new(600_000.0, 609_600.0, 5_630_000.0, 5_639_600.0),
        output_dir: args.output.clone(),
        write_composites: args.write_composites,
    })
}
