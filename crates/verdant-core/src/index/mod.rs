pub mod catalog;

pub use catalog::{FormulaStyle, SpectralIndex};

use ndarray::{s, Array2, Array3};
use rayon::prelude::*;

use crate::bands::BandStack;
use crate::consts::PARALLEL_SLICE_THRESHOLD;
use crate::error::{Result, VerdantError};
use crate::series::RasterSeries;

/// Compute a spectral index for every cell of a band stack.
///
/// Validity only shrinks: a cell that is invalid in the stack, or whose
/// formula is undefined there (zero denominator), comes out missing rather
/// than carrying an infinity or NaN.
///
/// Parallelizes over time slices for stacks of 4 or more acquisitions.
pub fn compute_index(stack: &BandStack, index: SpectralIndex) -> Result<RasterSeries> {
    let (band_a, band_b) = index.bands();
    let a = stack
        .band(band_a)
        .ok_or_else(|| VerdantError::MissingBand {
            index: index.to_string(),
            band: band_a.to_string(),
        })?;
    let b = stack
        .band(band_b)
        .ok_or_else(|| VerdantError::MissingBand {
            index: index.to_string(),
            band: band_b.to_string(),
        })?;

    let (t, h, w) = stack.valid.dim();
    let style = index.style();

    let eval_slice = |ti: usize| -> (Array2<f32>, Array2<bool>) {
        let mut values = Array2::<f32>::zeros((h, w));
        let mut valid = Array2::from_elem((h, w), false);
        for row in 0..h {
            for col in 0..w {
                if !stack.valid[[ti, row, col]] {
                    continue;
                }
                if let Some(v) = evaluate(style, a[[ti, row, col]], b[[ti, row, col]]) {
                    values[[row, col]] = v;
                    valid[[row, col]] = true;
                }
            }
        }
        (values, valid)
    };

    let slices: Vec<(Array2<f32>, Array2<bool>)> = if t >= PARALLEL_SLICE_THRESHOLD {
        (0..t).into_par_iter().map(eval_slice).collect()
    } else {
        (0..t).map(eval_slice).collect()
    };

    let mut values = Array3::<f32>::zeros((t, h, w));
    let mut valid = Array3::from_elem((t, h, w), false);
    for (ti, (slice_values, slice_valid)) in slices.into_iter().enumerate() {
        values.slice_mut(s![ti, .., ..]).assign(&slice_values);
        valid.slice_mut(s![ti, .., ..]).assign(&slice_valid);
    }

    RasterSeries::new(
        values,
        valid,
        stack.timestamps.clone(),
        stack.profile.clone(),
    )
}

/// One-cell formula evaluation; `None` when the formula is undefined.
fn evaluate(style: FormulaStyle, a: f32, b: f32) -> Option<f32> {
    match style {
        FormulaStyle::NormalizedDifference => {
            let den = a + b;
            if den == 0.0 {
                None
            } else {
                Some((a - b) / den)
            }
        }
        FormulaStyle::Ratio => {
            if b == 0.0 {
                None
            } else {
                Some(a / b)
            }
        }
        FormulaStyle::KernelizedNormalizedDifference => {
            let den = a + b;
            if den == 0.0 {
                None
            } else {
                let nd = (a - b) / den;
                Some((nd * nd).tanh())
            }
        }
    }
}
