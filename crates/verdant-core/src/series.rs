use chrono::{DateTime, Utc};
use ndarray::{Array2, Array3};

use crate::error::{Result, VerdantError};
use crate::grid::GridProfile;

/// A raster time series: per-pixel values over (time, row, col) with a
/// parallel validity bitmap.
///
/// Invalid cells are "no observation": the value slot is meaningless there
/// and must never feed a statistic. Missing data is tracked in the bitmap,
/// never as a NaN convention inside the engine.
#[derive(Clone, Debug)]
pub struct RasterSeries {
    /// Cell values, shape = (time, height, width).
    pub values: Array3<f32>,
    /// Per-cell validity; `false` = no observation.
    pub valid: Array3<bool>,
    /// Acquisition timestamps, strictly ascending, one per time slice.
    pub timestamps: Vec<DateTime<Utc>>,
    pub profile: GridProfile,
}

impl RasterSeries {
    pub fn new(
        values: Array3<f32>,
        valid: Array3<bool>,
        timestamps: Vec<DateTime<Utc>>,
        profile: GridProfile,
    ) -> Result<Self> {
        if values.dim() != valid.dim() {
            return Err(VerdantError::DimensionMismatch(format!(
                "values {:?} vs validity {:?}",
                values.dim(),
                valid.dim()
            )));
        }
        let (t, h, w) = values.dim();
        if (h, w) != profile.shape() {
            return Err(VerdantError::DimensionMismatch(format!(
                "series slices are {}x{} px but the profile is {}",
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
        Ok(Self {
            values,
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

    /// Value at a cell, or `None` when the cell holds no observation.
    pub fn get(&self, t: usize, row: usize, col: usize) -> Option<f32> {
        if self.valid[[t, row, col]] {
            Some(self.values[[t, row, col]])
        } else {
            None
        }
    }
}

/// One 2-D masked raster: a seasonal composite or a difference raster.
#[derive(Clone, Debug)]
pub struct Raster {
    pub values: Array2<f32>,
    pub valid: Array2<bool>,
    pub profile: GridProfile,
}

impl Raster {
    pub fn new(values: Array2<f32>, valid: Array2<bool>, profile: GridProfile) -> Result<Self> {
        if values.dim() != valid.dim() {
            return Err(VerdantError::DimensionMismatch(format!(
                "values {:?} vs validity {:?}",
                values.dim(),
                valid.dim()
            )));
        }
        if values.dim() != profile.shape() {
            return Err(VerdantError::DimensionMismatch(format!(
                "raster is {:?} but the profile is {}",
                values.dim(),
                profile
            )));
        }
        Ok(Self {
            values,
            valid,
            profile,
        })
    }

    /// Raster with no observation at any pixel.
    pub fn all_missing(profile: GridProfile) -> Self {
        let shape = profile.shape();
        Self {
            values: Array2::zeros(shape),
            valid: Array2::from_elem(shape, false),
            profile,
        }
    }

    pub fn width(&self) -> usize {
        self.profile.width
    }

    pub fn height(&self) -> usize {
        self.profile.height
    }

    /// Value at a pixel, or `None` when it holds no observation.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if self.valid[[row, col]] {
            Some(self.values[[row, col]])
        } else {
            None
        }
    }
}

/// Boolean validity series produced by evaluating quality predicates
/// against a flag stack. Same shape as the stack it was derived from.
#[derive(Clone, Debug)]
pub struct MaskSeries {
    /// `true` = the cell passed every predicate.
    pub data: Array3<bool>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub profile: GridProfile,
}

impl MaskSeries {
    pub fn new(
        data: Array3<bool>,
        timestamps: Vec<DateTime<Utc>>,
        profile: GridProfile,
    ) -> Result<Self> {
        let (t, h, w) = data.dim();
        if (h, w) != profile.shape() {
            return Err(VerdantError::DimensionMismatch(format!(
                "mask slices are {}x{} px but the profile is {}",
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
        Ok(Self {
            data,
            timestamps,
            profile,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Duplicate timestamps are rejected along with out-of-order ones so that
/// exact-equality timestamp matching stays single-valued downstream.
pub(crate) fn check_ascending(timestamps: &[DateTime<Utc>]) -> Result<()> {
    for i in 1..timestamps.len() {
        if timestamps[i] <= timestamps[i - 1] {
            return Err(VerdantError::UnorderedTimestamps(i));
        }
    }
    Ok(())
}
