use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdantError};
use crate::grid::GridProfile;
use crate::series::{check_ascending, MaskSeries};

/// Spectral and radar bands the engine can ingest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
    Vv,
    Vh,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
            Band::Swir1 => "swir1",
            Band::Swir2 => "swir2",
            Band::Vv => "vv",
            Band::Vh => "vh",
        };
        write!(f, "{name}")
    }
}

/// A co-registered stack of band series sharing one time axis, one grid
/// and one validity bitmap.
///
/// Validity is per cell, not per band: a cell carrying the nodata sentinel
/// in any ingested band is treated as unobserved everywhere.
#[derive(Clone, Debug)]
pub struct BandStack {
    bands: BTreeMap<Band, Array3<f32>>,
    pub valid: Array3<bool>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub profile: GridProfile,
}

impl BandStack {
    /// Builds a stack from raw band arrays, turning `nodata` sentinel cells
    /// into validity-bitmap misses.
    pub fn from_bands(
        bands: BTreeMap<Band, Array3<f32>>,
        nodata: f32,
        timestamps: Vec<DateTime<Utc>>,
        profile: GridProfile,
    ) -> Result<Self> {
        let mut dims: Option<(usize, usize, usize)> = None;
        for (band, data) in &bands {
            match dims {
                None => dims = Some(data.dim()),
                Some(d) if d != data.dim() => {
                    return Err(VerdantError::DimensionMismatch(format!(
                        "band {} is {:?} but other bands are {:?}",
                        band,
                        data.dim(),
                        d
                    )));
                }
                Some(_) => {}
            }
        }
        let (t, h, w) = dims.unwrap_or((timestamps.len(), profile.height, profile.width));
        if (h, w) != profile.shape() {
            return Err(VerdantError::DimensionMismatch(format!(
                "band slices are {}x{} px but the profile is {}",
                w, h, profile
            )));
        }
        if timestamps.len() != t {
            return Err(VerdantError::TimeAxisMismatch(format!(
                "{} timestamps for {} time slices",
                timestamps.len(),
                t
            )));
        }
        check_ascending(&timestamps)?;

        let mut valid = Array3::from_elem((t, h, w), true);
        for data in bands.values() {
            Zip::from(&mut valid).and(data).for_each(|v, &x| {
                if x == nodata {
                    *v = false;
                }
            });
        }
        Ok(Self {
            bands,
            valid,
            timestamps,
            profile,
        })
    }

    /// Number of time slices.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn band(&self, band: Band) -> Option<&Array3<f32>> {
        self.bands.get(&band)
    }

    pub fn has_band(&self, band: Band) -> bool {
        self.bands.contains_key(&band)
    }

    /// Intersects the stack's validity with a quality mask.
    ///
    /// The mask must cover the same grid and the exact same time axis; a
    /// cell survives only where both the stack and the mask say it does.
    pub fn apply_mask(&self, mask: &MaskSeries) -> Result<BandStack> {
        if mask.data.dim() != self.valid.dim() {
            return Err(VerdantError::DimensionMismatch(format!(
                "mask is {:?} but the band stack is {:?}",
                mask.data.dim(),
                self.valid.dim()
            )));
        }
        if mask.timestamps != self.timestamps {
            return Err(VerdantError::TimeAxisMismatch(
                "quality mask timestamps do not match band timestamps".into(),
            ));
        }
        let valid = Zip::from(&self.valid)
            .and(&mask.data)
            .map_collect(|&a, &b| a && b);
        Ok(Self {
            bands: self.bands.clone(),
            valid,
            timestamps: self.timestamps.clone(),
            profile: self.profile.clone(),
        })
    }
}
