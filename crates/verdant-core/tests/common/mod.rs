use chrono::{DateTime, TimeZone, Utc};
use ndarray::{s, Array3};

use verdant_core::grid::{Crs, GeoTransform, GridProfile};
use verdant_core::series::RasterSeries;

/// 10 m UTM 32N grid anchored north of the test extent.
pub fn test_profile(width: usize, height: usize) -> GridProfile {
    GridProfile::new(
        width,
        height,
        GeoTransform::north_up(600_000.0, 5_650_000.0, 10.0),
        Crs::Projected(32632),
    )
}

/// Shorthand UTC timestamp at 10:00.
pub fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

/// Fully observed series where every slice holds one constant value.
pub fn constant_series(
    values: &[f32],
    timestamps: Vec<DateTime<Utc>>,
    width: usize,
    height: usize,
) -> RasterSeries {
    let t = values.len();
    let mut data = Array3::<f32>::zeros((t, height, width));
    for (k, &v) in values.iter().enumerate() {
        data.slice_mut(s![k, .., ..]).fill(v);
    }
    RasterSeries::new(
        data,
        Array3::from_elem((t, height, width), true),
        timestamps,
        test_profile(width, height),
    )
    .unwrap()
}
