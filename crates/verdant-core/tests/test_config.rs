use std::path::PathBuf;

use verdant_core::composite::{Season, Statistic};
use verdant_core::error::VerdantError;
use verdant_core::grid::Extent;
use verdant_core::index::SpectralIndex;
use verdant_core::mask::predicate::{FlagRequirement, PredicateSet, RequiredValue};
use verdant_core::pipeline::config::{PipelineConfig, SceneConfig};

fn demo_config() -> PipelineConfig {
    PipelineConfig {
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
        extent: Extent::new(600_000.0, 609_600.0, 5_630_000.0, 5_639_600.0),
        output_dir: PathBuf::from("verdant_out"),
        write_composites: true,
    }
}

// ---------------------------------------------------------------------------
// Enum wire names
// ---------------------------------------------------------------------------

#[test]
fn test_index_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&SpectralIndex::Ndvi).unwrap(),
        "\"ndvi\""
    );
    let parsed: SpectralIndex = serde_json::from_str("\"vhvv\"").unwrap();
    assert_eq!(parsed, SpectralIndex::VhVv);
}

#[test]
fn test_season_serializes_as_label() {
    assert_eq!(serde_json::to_string(&Season::default()).unwrap(), "\"jja\"");
    let parsed: Season = serde_json::from_str("\"djf\"").unwrap();
    assert_eq!(parsed.start_month(), 12);
    assert!(serde_json::from_str::<Season>("\"xyz\"").is_err());
}

#[test]
fn test_statistic_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Statistic::Median).unwrap(), "\"median\"");
    let parsed: Statistic = serde_json::from_str("\"mean\"").unwrap();
    assert_eq!(parsed, Statistic::Mean);
    let err = "p90".parse::<Statistic>().unwrap_err();
    assert!(matches!(err, VerdantError::UnknownStatistic(s) if s == "p90"));
}

// ---------------------------------------------------------------------------
// Predicate serialization
// ---------------------------------------------------------------------------

#[test]
fn test_predicate_values_distinguish_bool_and_label() {
    let json = r#"[
        {"flag": "snow", "value": false},
        {"flag": "cloud_state", "value": "clear"}
    ]"#;
    let set: PredicateSet = serde_json::from_str(json).unwrap();
    assert_eq!(set.requirements.len(), 2);
    assert_eq!(set.requirements[0].value, RequiredValue::Flag(false));
    assert_eq!(
        set.requirements[1].value,
        RequiredValue::Label("clear".to_string())
    );

    let round_tripped: PredicateSet =
        serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
    assert_eq!(round_tripped, set);
}

#[test]
fn test_clear_sky_screen_contents() {
    let screen = PredicateSet::clear_sky();
    assert_eq!(screen.requirements.len(), 5);
    assert_eq!(screen.requirements[0], FlagRequirement::label("valid", "valid"));
    assert!(screen
        .requirements
        .contains(&FlagRequirement::boolean("snow", false)));
    assert!(screen
        .requirements
        .contains(&FlagRequirement::label("cloud_state", "clear")));
}

// ---------------------------------------------------------------------------
// Pipeline config TOML
// ---------------------------------------------------------------------------

#[test]
fn test_config_toml_round_trip() {
    let config = demo_config();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: PipelineConfig = toml::from_str(&text).unwrap();

    assert_eq!(parsed.primary.product, "sentinel2");
    assert_eq!(parsed.primary.predicates, Some(PredicateSet::clear_sky()));
    assert_eq!(
        parsed.secondary.as_ref().map(|s| s.product.as_str()),
        Some("landsat8")
    );
    assert_eq!(parsed.index, SpectralIndex::Ndvi);
    assert_eq!(parsed.season, Season::default());
    assert_eq!(parsed.statistic, Statistic::Median);
    assert_eq!(parsed.baseline_year, 2017);
    assert_eq!(parsed.extent, config.extent);
    assert_eq!(parsed.output_dir, PathBuf::from("verdant_out"));
    assert!(parsed.write_composites);
}

#[test]
fn test_minimal_config_fills_defaults() {
    let text = r#"
        index = "ndvi"
        baseline_year = 2018
        output_dir = "out"

        [primary]
        product = "sentinel2"

        [extent]
        x_min = 0.0
        x_max = 960.0
        y_min = 0.0
        y_max = 960.0
    "#;
    let parsed: PipelineConfig = toml::from_str(text).unwrap();

    assert_eq!(parsed.season, Season::default());
    assert_eq!(parsed.statistic, Statistic::Median);
    assert!(parsed.secondary.is_none());
    assert!(parsed.primary.predicates.is_none());
    assert!(!parsed.write_composites);
}

#[test]
fn test_config_predicates_from_toml() {
    let text = r#"
        index = "ndmi"
        season = "son"
        baseline_year = 2018
        output_dir = "out"

        [primary]
        product = "sentinel2"
        predicates = [
            { flag = "valid", value = "valid" },
            { flag = "snow", value = false },
        ]

        [extent]
        x_min = 0.0
        x_max = 960.0
        y_min = 0.0
        y_max = 960.0
    "#;
    let parsed: PipelineConfig = toml::from_str(text).unwrap();

    let predicates = parsed.primary.predicates.unwrap();
    assert_eq!(predicates.requirements.len(), 2);
    assert_eq!(predicates.requirements[1].value, RequiredValue::Flag(false));
    assert_eq!(parsed.season.label(), "son");
}

#[test]
fn test_unknown_index_in_config_rejected() {
    let text = r#"
        index = "evi"
        baseline_year = 2018
        output_dir = "out"

        [primary]
        product = "sentinel2"

        [extent]
        x_min = 0.0
        x_max = 960.0
        y_min = 0.0
        y_max = 960.0
    "#;
    assert!(toml::from_str::<PipelineConfig>(text).is_err());
}
