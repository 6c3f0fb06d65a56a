use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::bands::{Band, BandStack};
use crate::error::{Result, VerdantError};
use crate::grid::{Crs, Extent, GeoTransform, GridProfile};
use crate::io::{Scene, SceneSource};
use crate::mask::flags::{FlagSeries, FlagVocabulary};

pub const PRODUCT_SENTINEL2: &str = "sentinel2";
pub const PRODUCT_LANDSAT8: &str = "landsat8";
pub const PRODUCT_SENTINEL1: &str = "sentinel1";

const NODATA: f32 = -9999.0;

/// Shape of the synthetic archive: grid size and covered years.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub width: usize,
    pub height: usize,
    pub start_year: i32,
    pub end_year: i32,
    /// Dates on which optical acquisitions are fully overcast.
    #[serde(default)]
    pub cloudy_days: Vec<NaiveDate>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 96,
            start_year: 2017,
            end_year: 2019,
            cloudy_days: Vec::new(),
        }
    }
}

/// Deterministic in-memory scene source for demos and pipeline tests.
///
/// Serves three products on staggered monthly cadences over one seasonal
/// reflectance model: `sentinel2` and `landsat8` (optical, with
/// FORCE-style quality words) and `sentinel1` (radar, no quality flags).
/// Reflectance peaks in July, rises toward the lower-right of the grid
/// and greens up slightly year over year, so composites and differences
/// have visible structure.
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    fn profile_for(&self, extent: &Extent) -> GridProfile {
        let transform = GeoTransform {
            origin_x: extent.x_min,
            origin_y: extent.y_max,
            pixel_width: extent.width() / self.config.width as f64,
            pixel_height: -(extent.height() / self.config.height as f64),
        };
        GridProfile::new(
            self.config.width,
            self.config.height,
            transform,
            Crs::Projected(32632),
        )
    }

    fn acquisitions(&self, product: &str) -> Result<Vec<DateTime<Utc>>> {
        let (days, hour): (&[u32], u32) = match product {
            PRODUCT_SENTINEL2 => (&[5, 15, 25], 10),
            PRODUCT_LANDSAT8 => (&[9, 19], 11),
            PRODUCT_SENTINEL1 => (&[3, 9, 15, 21, 27], 5),
            other => {
                return Err(VerdantError::Upstream(format!(
                    "unknown product `{other}`"
                )));
            }
        };
        let mut out = Vec::new();
        for year in self.config.start_year..=self.config.end_year {
            for month in 1..=12 {
                for &day in days {
                    if let Some(ts) = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single() {
                        out.push(ts);
                    }
                }
            }
        }
        Ok(out)
    }

    fn quality_for(&self, timestamps: &[DateTime<Utc>], profile: &GridProfile) -> Result<FlagSeries> {
        let (h, w) = profile.shape();
        let t = timestamps.len();
        let mut words = Array3::<u16>::zeros((t, h, w));
        for (k, ts) in timestamps.iter().enumerate() {
            if self.config.cloudy_days.contains(&ts.date_naive()) {
                // Full overcast: confident cloud everywhere
                for row in 0..h {
                    for col in 0..w {
                        words[[k, row, col]] = 2 << 1;
                    }
                }
                continue;
            }
            // Scattered clouds with trailing shadows, drifting per slice
            for row in 0..h {
                for col in 0..w {
                    match (row + col + 3 * k) % 31 {
                        0 => words[[k, row, col]] = 2 << 1,
                        1 => words[[k, row, col]] = 1 << 3,
                        _ => {}
                    }
                }
            }
        }
        FlagSeries::new(
            words,
            timestamps.to_vec(),
            profile.clone(),
            FlagVocabulary::force_qai(),
        )
    }
}

impl SceneSource for SyntheticSource {
    fn load(&self, product: &str, extent: &Extent, bands: &[Band]) -> Result<Scene> {
        let optical = match product {
            PRODUCT_SENTINEL2 | PRODUCT_LANDSAT8 => true,
            PRODUCT_SENTINEL1 => false,
            other => {
                return Err(VerdantError::Upstream(format!(
                    "unknown product `{other}`"
                )));
            }
        };
        for &band in bands {
            let radar_band = matches!(band, Band::Vv | Band::Vh);
            if optical == radar_band {
                return Err(VerdantError::Upstream(format!(
                    "product `{product}` has no band `{band}`"
                )));
            }
        }

        let profile = self.profile_for(extent);
        let timestamps = self.acquisitions(product)?;
        let (h, w) = profile.shape();
        let t = timestamps.len();

        let mut band_data = BTreeMap::new();
        for &band in bands {
            let mut data = Array3::<f32>::zeros((t, h, w));
            for (k, ts) in timestamps.iter().enumerate() {
                let s = seasonality(ts.month());
                let yo = (ts.year() - self.config.start_year) as f32;
                for row in 0..h {
                    for col in 0..w {
                        let g = gradient(row, col, h, w);
                        data[[k, row, col]] = sample(optical, band, s, g, yo);
                    }
                }
                // Radar swath edge: column 0 drops out on odd acquisitions
                if !optical && k % 2 == 1 {
                    for row in 0..h {
                        data[[k, row, 0]] = NODATA;
                    }
                }
            }
            band_data.insert(band, data);
        }

        let stack = BandStack::from_bands(band_data, NODATA, timestamps.clone(), profile.clone())?;
        let quality = if optical {
            Some(self.quality_for(&timestamps, &profile)?)
        } else {
            None
        };
        Ok(Scene {
            bands: stack,
            quality,
        })
    }
}

/// 0 in deep winter, 1 at the July peak.
fn seasonality(month: u32) -> f32 {
    1.0 - (month as f32 - 7.0).abs() / 6.0
}

/// 0 at the top-left pixel, 1 at the bottom-right.
fn gradient(row: usize, col: usize, h: usize, w: usize) -> f32 {
    let span = (h + w).saturating_sub(2);
    if span == 0 {
        0.0
    } else {
        (row + col) as f32 / span as f32
    }
}

fn sample(optical: bool, band: Band, s: f32, g: f32, yo: f32) -> f32 {
    if optical {
        // Reflectances scaled by 1e4; red and nir bracket an NDVI of v
        let v = (0.15 + 0.55 * s + 0.15 * g + 0.02 * yo).min(0.95);
        match band {
            Band::Red => 2500.0 * (1.0 - v),
            Band::Nir => 2500.0 * (1.0 + v),
            Band::Green => 800.0 + 600.0 * s + 200.0 * g,
            Band::Blue => 600.0 + 300.0 * s + 150.0 * g,
            Band::Swir1 => 2600.0 - 900.0 * s + 250.0 * g,
            Band::Swir2 => 2100.0 - 800.0 * s + 220.0 * g,
            Band::Vv | Band::Vh => NODATA,
        }
    } else {
        // Linear backscatter; VH sits well below VV
        let vv = 0.055 + 0.045 * s + 0.02 * g + 0.004 * yo;
        match band {
            Band::Vv => vv,
            Band::Vh => vv * (0.20 + 0.08 * s),
            _ => NODATA,
        }
    }
}
