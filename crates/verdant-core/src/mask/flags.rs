use chrono::{DateTime, Utc};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdantError};
use crate::grid::GridProfile;
use crate::series::check_ascending;

/// How a flag's raw bits are interpreted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlagKind {
    /// A single bit read as set / unset.
    Boolean,
    /// A bit group read as an index into named labels, value order.
    Categorical(Vec<String>),
}

/// One named bit field inside a per-pixel quality word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagDef {
    pub name: String,
    /// Bit offset of the field's least significant bit.
    pub offset: u8,
    /// Field width in bits.
    pub width: u8,
    pub kind: FlagKind,
}

impl FlagDef {
    pub fn boolean(name: &str, offset: u8) -> Self {
        Self {
            name: name.to_string(),
            offset,
            width: 1,
            kind: FlagKind::Boolean,
        }
    }

    pub fn categorical(name: &str, offset: u8, width: u8, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            offset,
            width,
            kind: FlagKind::Categorical(labels.iter().map(|l| l.to_string()).collect()),
        }
    }

    /// Raw field value extracted from a quality word.
    pub fn extract(&self, word: u16) -> u16 {
        (word >> self.offset) & ((1 << self.width) - 1)
    }
}

/// The named bit fields of one sensor family's quality words.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagVocabulary {
    defs: Vec<FlagDef>,
}

impl FlagVocabulary {
    pub fn new(defs: Vec<FlagDef>) -> Self {
        Self { defs }
    }

    pub fn get(&self, name: &str) -> Option<&FlagDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    pub fn defs(&self) -> &[FlagDef] {
        &self.defs
    }

    /// The FORCE QAI word layout used by harmonized Sentinel-2 / Landsat
    /// products.
    ///
    /// Bit 0 valid, bits 1-2 cloud state, bit 3 cloud shadow, bit 4 snow,
    /// bit 5 water, bits 6-7 aerosol, bit 8 subzero reflectance, bit 9
    /// saturation, bit 10 high sun zenith, bits 11-12 illumination, bit 13
    /// slope correction, bit 14 water vapor fill.
    pub fn force_qai() -> Self {
        Self::new(vec![
            FlagDef::categorical("valid", 0, 1, &["valid", "nodata"]),
            FlagDef::categorical(
                "cloud_state",
                1,
                2,
                &["clear", "less_confident_cloud", "confident_cloud", "cirrus"],
            ),
            FlagDef::boolean("cloud_shadow", 3),
            FlagDef::boolean("snow", 4),
            FlagDef::boolean("water", 5),
            FlagDef::categorical("aerosol", 6, 2, &["estimated", "interpolated", "high", "fill"]),
            FlagDef::boolean("subzero", 8),
            FlagDef::boolean("saturation", 9),
            FlagDef::boolean("high_sun_zenith", 10),
            FlagDef::categorical("illumination", 11, 2, &["good", "low", "poor", "shadow"]),
            FlagDef::boolean("slope", 13),
            FlagDef::boolean("water_vapor_fill", 14),
        ])
    }
}

/// A time series of per-pixel quality words plus the vocabulary that
/// decodes them.
#[derive(Clone, Debug)]
pub struct FlagSeries {
    /// Quality words, shape = (time, height, width).
    pub words: Array3<u16>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub profile: GridProfile,
    pub vocabulary: FlagVocabulary,
}

impl FlagSeries {
    pub fn new(
        words: Array3<u16>,
        timestamps: Vec<DateTime<Utc>>,
        profile: GridProfile,
        vocabulary: FlagVocabulary,
    ) -> Result<Self> {
        let (t, h, w) = words.dim();
        if (h, w) != profile.shape() {
            return Err(VerdantError::DimensionMismatch(format!(
                "quality slices are {}x{} px but the profile is {}",
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
            words,
            timestamps,
            profile,
            vocabulary,
        })
    }

    /// Number of time slices.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
