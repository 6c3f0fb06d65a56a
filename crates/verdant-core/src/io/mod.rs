pub mod geotiff;

use std::path::Path;

use crate::bands::{Band, BandStack};
use crate::error::Result;
use crate::grid::Extent;
use crate::mask::flags::FlagSeries;
use crate::series::Raster;

/// Everything one product delivers for an area: band series plus the
/// quality words that screen them.
///
/// Radar products carry no per-pixel quality flags, so `quality` is
/// `None` there.
#[derive(Clone, Debug)]
pub struct Scene {
    pub bands: BandStack,
    pub quality: Option<FlagSeries>,
}

/// Source of scenes for an area of interest.
pub trait SceneSource {
    /// Load every acquisition of `product` over `extent`, restricted to
    /// the requested bands.
    fn load(&self, product: &str, extent: &Extent, bands: &[Band]) -> Result<Scene>;
}

/// Destination for finished rasters.
pub trait RasterSink {
    fn write(&self, raster: &Raster, path: &Path) -> Result<()>;
}

/// Resolves an area-of-interest file (a vector outline on disk) to the
/// bounding extent the pipeline actually processes.
pub trait AoiResolver {
    fn resolve(&self, path: &Path) -> Result<Extent>;
}
