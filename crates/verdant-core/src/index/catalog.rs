use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bands::Band;
use crate::error::VerdantError;

/// Formula families an index can follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormulaStyle {
    /// (a - b) / (a + b)
    NormalizedDifference,
    /// a / b
    Ratio,
    /// tanh(((a - b) / (a + b))^2)
    KernelizedNormalizedDifference,
}

impl fmt::Display for FormulaStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormulaStyle::NormalizedDifference => "normalized difference",
            FormulaStyle::Ratio => "band ratio",
            FormulaStyle::KernelizedNormalizedDifference => "kernelized normalized difference",
        };
        write!(f, "{name}")
    }
}

/// The spectral and radar indices the engine can compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralIndex {
    /// Normalized difference vegetation index.
    Ndvi,
    /// Kernelized NDVI after Camps-Valls et al. 2021.
    Kndvi,
    /// Normalized difference moisture index.
    Ndmi,
    /// Normalized difference water index (McFeeters).
    Ndwi,
    /// Modified NDWI (Xu).
    Mndwi,
    /// Normalized difference snow index.
    Ndsi,
    /// Normalized burn ratio.
    Nbr,
    /// Normalized difference tillage index (Van Deventer).
    Ndti,
    /// Normalized difference built-up index (Zha).
    Ndbi,
    /// Clay minerals ratio.
    Cmr,
    /// Ferrous minerals ratio.
    Fmr,
    /// Iron oxide ratio.
    Ior,
    /// VH / VV backscatter ratio.
    VhVv,
    /// VV / VH backscatter ratio.
    VvVh,
}

impl SpectralIndex {
    pub fn all() -> [SpectralIndex; 14] {
        [
            SpectralIndex::Ndvi,
            SpectralIndex::Kndvi,
            SpectralIndex::Ndmi,
            SpectralIndex::Ndwi,
            SpectralIndex::Mndwi,
            SpectralIndex::Ndsi,
            SpectralIndex::Nbr,
            SpectralIndex::Ndti,
            SpectralIndex::Ndbi,
            SpectralIndex::Cmr,
            SpectralIndex::Fmr,
            SpectralIndex::Ior,
            SpectralIndex::VhVv,
            SpectralIndex::VvVh,
        ]
    }

    pub fn style(&self) -> FormulaStyle {
        match self {
            SpectralIndex::Kndvi => FormulaStyle::KernelizedNormalizedDifference,
            SpectralIndex::Cmr
            | SpectralIndex::Fmr
            | SpectralIndex::Ior
            | SpectralIndex::VhVv
            | SpectralIndex::VvVh => FormulaStyle::Ratio,
            _ => FormulaStyle::NormalizedDifference,
        }
    }

    /// The `(a, b)` band pair the index formula operates on.
    pub fn bands(&self) -> (Band, Band) {
        match self {
            SpectralIndex::Ndvi | SpectralIndex::Kndvi => (Band::Nir, Band::Red),
            SpectralIndex::Ndmi => (Band::Nir, Band::Swir1),
            SpectralIndex::Ndwi => (Band::Green, Band::Nir),
            SpectralIndex::Mndwi | SpectralIndex::Ndsi => (Band::Green, Band::Swir1),
            SpectralIndex::Nbr => (Band::Nir, Band::Swir2),
            SpectralIndex::Ndti | SpectralIndex::Cmr => (Band::Swir1, Band::Swir2),
            SpectralIndex::Ndbi | SpectralIndex::Fmr => (Band::Swir1, Band::Nir),
            SpectralIndex::Ior => (Band::Red, Band::Blue),
            SpectralIndex::VhVv => (Band::Vh, Band::Vv),
            SpectralIndex::VvVh => (Band::Vv, Band::Vh),
        }
    }

    /// True for indices computed from radar backscatter rather than
    /// optical reflectance.
    pub fn is_sar(&self) -> bool {
        matches!(self, SpectralIndex::VhVv | SpectralIndex::VvVh)
    }

    /// Human-readable formula, for listings.
    pub fn formula(&self) -> String {
        let (a, b) = self.bands();
        match self.style() {
            FormulaStyle::NormalizedDifference => format!("({a} - {b}) / ({a} + {b})"),
            FormulaStyle::Ratio => format!("{a} / {b}"),
            FormulaStyle::KernelizedNormalizedDifference => {
                format!("tanh((({a} - {b}) / ({a} + {b}))^2)")
            }
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpectralIndex::Ndvi => "ndvi",
            SpectralIndex::Kndvi => "kndvi",
            SpectralIndex::Ndmi => "ndmi",
            SpectralIndex::Ndwi => "ndwi",
            SpectralIndex::Mndwi => "mndwi",
            SpectralIndex::Ndsi => "ndsi",
            SpectralIndex::Nbr => "nbr",
            SpectralIndex::Ndti => "ndti",
            SpectralIndex::Ndbi => "ndbi",
            SpectralIndex::Cmr => "cmr",
            SpectralIndex::Fmr => "fmr",
            SpectralIndex::Ior => "ior",
            SpectralIndex::VhVv => "vhvv",
            SpectralIndex::VvVh => "vvvh",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SpectralIndex {
    type Err = VerdantError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ndvi" => Ok(SpectralIndex::Ndvi),
            "kndvi" => Ok(SpectralIndex::Kndvi),
            "ndmi" => Ok(SpectralIndex::Ndmi),
            "ndwi" => Ok(SpectralIndex::Ndwi),
            "mndwi" => Ok(SpectralIndex::Mndwi),
            "ndsi" => Ok(SpectralIndex::Ndsi),
            "nbr" => Ok(SpectralIndex::Nbr),
            "ndti" => Ok(SpectralIndex::Ndti),
            "ndbi" => Ok(SpectralIndex::Ndbi),
            "cmr" => Ok(SpectralIndex::Cmr),
            "fmr" => Ok(SpectralIndex::Fmr),
            "ior" => Ok(SpectralIndex::Ior),
            "vhvv" => Ok(SpectralIndex::VhVv),
            "vvvh" => Ok(SpectralIndex::VvVh),
            other => Err(VerdantError::UnsupportedIndex(other.to_string())),
        }
    }
}
