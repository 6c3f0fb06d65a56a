pub mod season;

mod reduce;

pub use season::Season;

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdantError};
use crate::series::{Raster, RasterSeries};

/// Per-pixel statistic used to reduce a season's observations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Robust against residual clouds and outliers; the default.
    #[default]
    Median,
    Mean,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Statistic::Median => "median",
            Statistic::Mean => "mean",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Statistic {
    type Err = VerdantError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(Statistic::Median),
            "mean" => Ok(Statistic::Mean),
            other => Err(VerdantError::UnknownStatistic(other.to_string())),
        }
    }
}

/// One seasonal composite per calendar year, in ascending year order.
///
/// Every year between the first and last acquisition is present even when
/// nothing fell inside its window; such composites are all-missing rather
/// than silently absent, so consumers see gap years.
#[derive(Clone, Debug)]
pub struct YearlyComposites {
    pub season: Season,
    pub statistic: Statistic,
    entries: Vec<(i32, Raster)>,
}

impl YearlyComposites {
    pub fn new(season: Season, statistic: Statistic, entries: Vec<(i32, Raster)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(VerdantError::EmptySeries);
        }
        Ok(Self {
            season,
            statistic,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&(i32, Raster)> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(i32, Raster)> {
        self.entries.iter()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|(year, _)| *year)
    }

    pub fn index_of_year(&self, year: i32) -> Option<usize> {
        self.entries.iter().position(|(y, _)| *y == year)
    }

    pub fn first_year(&self) -> i32 {
        self.entries[0].0
    }

    pub fn last_year(&self) -> i32 {
        self.entries[self.entries.len() - 1].0
    }
}

/// Build one composite per calendar year from an index series.
///
/// Acquisitions outside the season window are discarded. Each emitted
/// year reduces its surviving observations per pixel with the chosen
/// statistic; pixels nothing observed stay missing.
pub fn seasonal_composites(
    series: &RasterSeries,
    season: Season,
    statistic: Statistic,
) -> Result<YearlyComposites> {
    if series.is_empty() {
        return Err(VerdantError::EmptySeries);
    }
    let first_year = series.timestamps[0].year();
    let last_year = series.timestamps[series.len() - 1].year();

    let mut entries = Vec::with_capacity((last_year - first_year + 1) as usize);
    for year in first_year..=last_year {
        let indices: Vec<usize> = series
            .timestamps
            .iter()
            .enumerate()
            .filter(|(_, ts)| ts.year() == year && season.contains(ts.month()))
            .map(|(i, _)| i)
            .collect();
        let raster = if indices.is_empty() {
            Raster::all_missing(series.profile.clone())
        } else {
            let (values, valid) = reduce::reduce_group(series, &indices, statistic);
            Raster::new(values, valid, series.profile.clone())?
        };
        entries.push((year, raster));
    }
    YearlyComposites::new(season, statistic, entries)
}
