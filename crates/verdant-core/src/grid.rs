use serde::{Deserialize, Serialize};

/// Affine georeferencing of a north-up raster grid.
///
/// `pixel_height` is negative for north-up grids: row indices increase
/// southward while map y decreases.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// Map x of the top-left corner of the top-left pixel.
    pub origin_x: f64,
    /// Map y of the top-left corner of the top-left pixel.
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Square-pixel north-up transform.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width: pixel_size,
            pixel_height: -pixel_size,
        }
    }
}

/// Coordinate reference system, identified by its EPSG code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    Projected(u16),
    Geographic(u16),
}

impl Crs {
    pub fn epsg(&self) -> u16 {
        match self {
            Self::Projected(code) | Self::Geographic(code) => *code,
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, Self::Projected(_))
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Spatial metadata shared by every raster of a pipeline run.
///
/// Profile equality is the "common spatial grid" precondition checked by
/// merge and diff operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridProfile {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: Crs,
}

impl GridProfile {
    pub fn new(width: usize, height: usize, transform: GeoTransform, crs: Crs) -> Self {
        Self {
            width,
            height,
            transform,
            crs,
        }
    }

    /// Row-major array shape: (height, width).
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl std::fmt::Display for GridProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} px ({})", self.width, self.height, self.crs)
    }
}

/// Axis-aligned area of interest: an x range and a y range in the target
/// coordinate system, used to bound raster source queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}
