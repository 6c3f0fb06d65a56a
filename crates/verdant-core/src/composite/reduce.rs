use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::series::RasterSeries;

use super::Statistic;

/// Reduce the selected time slices of a series to one 2-D layer.
///
/// Missing cells are skipped per pixel, so each pixel's statistic runs
/// over however many of the selected slices actually observed it. A pixel
/// no selected slice observed comes out missing.
///
/// Parallelizes at the row level for grids >= 256x256.
pub(super) fn reduce_group(
    series: &RasterSeries,
    indices: &[usize],
    statistic: Statistic,
) -> (Array2<f32>, Array2<bool>) {
    let (h, w) = series.profile.shape();
    let n = indices.len();

    let mut values = Array2::<f32>::zeros((h, w));
    let mut valid = Array2::from_elem((h, w), false);

    if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        // Row-parallel: each row allocates its own gather buffer.
        let rows: Vec<(Vec<f32>, Vec<bool>)> = (0..h)
            .into_par_iter()
            .map(|row| reduce_row(series, indices, statistic, row, w))
            .collect();

        for (row, (row_values, row_valid)) in rows.into_iter().enumerate() {
            for col in 0..w {
                values[[row, col]] = row_values[col];
                valid[[row, col]] = row_valid[col];
            }
        }
    } else {
        for row in 0..h {
            let (row_values, row_valid) = reduce_row(series, indices, statistic, row, w);
            for col in 0..w {
                values[[row, col]] = row_values[col];
                valid[[row, col]] = row_valid[col];
            }
        }
    }
    (values, valid)
}

fn reduce_row(
    series: &RasterSeries,
    indices: &[usize],
    statistic: Statistic,
    row: usize,
    w: usize,
) -> (Vec<f32>, Vec<bool>) {
    let mut gathered = Vec::with_capacity(indices.len());
    let mut row_values = vec![0.0f32; w];
    let mut row_valid = vec![false; w];
    for col in 0..w {
        gathered.clear();
        for &t in indices {
            if series.valid[[t, row, col]] {
                gathered.push(series.values[[t, row, col]]);
            }
        }
        if gathered.is_empty() {
            continue;
        }
        row_values[col] = match statistic {
            Statistic::Median => median_in_place(&mut gathered),
            Statistic::Mean => gathered.iter().sum::<f32>() / gathered.len() as f32,
        };
        row_valid[col] = true;
    }
    (row_values, row_valid)
}

/// O(n) median via `select_nth_unstable` instead of a full sort; even
/// counts take the midpoint of the two middle values.
fn median_in_place(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}
