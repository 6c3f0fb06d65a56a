use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use verdant_core::composite::{Season, Statistic};
use verdant_core::grid::Extent;
use verdant_core::index::SpectralIndex;
use verdant_core::mask::predicate::PredicateSet;
use verdant_core::pipeline::config::{PipelineConfig, SceneConfig};
use verdant_core::synthetic::{PRODUCT_LANDSAT8, PRODUCT_SENTINEL2};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default PipelineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = PipelineConfig {
        primary: SceneConfig {
            product: PRODUCT_SENTINEL2.to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        },
        secondary: Some(SceneConfig {
            product: PRODUCT_LANDSAT8.to_string(),
            predicates: Some(PredicateSet::clear_sky()),
        }),
        index: SpectralIndex::Ndvi,
        season: Season::default(),
        statistic: Statistic::default(),
        baseline_year: 2017,
        extent: Extent::new(600_000.0, 609_600.0, 5_630_000.0, 5_639_600.0),
        output_dir: PathBuf::from("verdant_out"),
        write_composites: false,
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
