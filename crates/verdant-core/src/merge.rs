use std::cmp::Ordering;

use ndarray::{s, Array3};

use crate::error::{Result, VerdantError};
use crate::series::RasterSeries;

/// Merge two index series over the same grid, preferring the primary
/// sensor.
///
/// The output time axis is the sorted union of both axes. An acquisition
/// present in only one series is copied through unchanged. Where both
/// sensors acquired at the same instant, each pixel takes the primary
/// value when the primary observed it and falls back to the secondary
/// otherwise; a pixel neither observed stays missing.
///
/// Timestamps match by exact equality. Acquisitions minutes apart are
/// kept as separate slices, not snapped together.
pub fn merge_series(primary: &RasterSeries, secondary: &RasterSeries) -> Result<RasterSeries> {
    if primary.profile != secondary.profile {
        return Err(VerdantError::GridMismatch {
            left: primary.profile.to_string(),
            right: secondary.profile.to_string(),
        });
    }

    let (h, w) = primary.profile.shape();
    let total = {
        let (mut i, mut j, mut n) = (0usize, 0usize, 0usize);
        while i < primary.len() && j < secondary.len() {
            match primary.timestamps[i].cmp(&secondary.timestamps[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
            n += 1;
        }
        n + (primary.len() - i) + (secondary.len() - j)
    };

    let mut values = Array3::<f32>::zeros((total, h, w));
    let mut valid = Array3::from_elem((total, h, w), false);
    let mut timestamps = Vec::with_capacity(total);

    let (mut i, mut j, mut out) = (0usize, 0usize, 0usize);
    while i < primary.len() || j < secondary.len() {
        let take_primary = j >= secondary.len()
            || (i < primary.len() && primary.timestamps[i] < secondary.timestamps[j]);
        let take_secondary = i >= primary.len()
            || (j < secondary.len() && secondary.timestamps[j] < primary.timestamps[i]);

        if take_primary {
            values
                .slice_mut(s![out, .., ..])
                .assign(&primary.values.slice(s![i, .., ..]));
            valid
                .slice_mut(s![out, .., ..])
                .assign(&primary.valid.slice(s![i, .., ..]));
            timestamps.push(primary.timestamps[i]);
            i += 1;
        } else if take_secondary {
            values
                .slice_mut(s![out, .., ..])
                .assign(&secondary.values.slice(s![j, .., ..]));
            valid
                .slice_mut(s![out, .., ..])
                .assign(&secondary.valid.slice(s![j, .., ..]));
            timestamps.push(secondary.timestamps[j]);
            j += 1;
        } else {
            // Same instant: per-pixel primary-first fusion.
            for row in 0..h {
                for col in 0..w {
                    if primary.valid[[i, row, col]] {
                        values[[out, row, col]] = primary.values[[i, row, col]];
                        valid[[out, row, col]] = true;
                    } else if secondary.valid[[j, row, col]] {
                        values[[out, row, col]] = secondary.values[[j, row, col]];
                        valid[[out, row, col]] = true;
                    }
                }
            }
            timestamps.push(primary.timestamps[i]);
            i += 1;
            j += 1;
        }
        out += 1;
    }
    debug_assert_eq!(out, total);

    RasterSeries::new(values, valid, timestamps, primary.profile.clone())
}
