use ndarray::{Array2, Zip};

use crate::composite::YearlyComposites;
use crate::error::{Result, VerdantError};
use crate::series::Raster;

/// Difference every composite against the baseline year's composite.
///
/// Returns `(year, composite - baseline)` for every year except the
/// baseline itself, in ascending year order. A pixel missing in either
/// operand is missing in the difference.
pub fn diff_from_baseline(
    composites: &YearlyComposites,
    baseline_index: usize,
) -> Result<Vec<(i32, Raster)>> {
    let (_, baseline) =
        composites
            .get(baseline_index)
            .ok_or(VerdantError::CompositeIndexOutOfRange {
                index: baseline_index,
                total: composites.len(),
            })?;

    let mut diffs = Vec::with_capacity(composites.len().saturating_sub(1));
    for (i, (year, raster)) in composites.iter().enumerate() {
        if i == baseline_index {
            continue;
        }
        diffs.push((*year, subtract(raster, baseline)));
    }
    Ok(diffs)
}

/// Mean of the selected composites minus the baseline composite.
///
/// A pixel missing in the baseline or in any selected composite is
/// missing in the result. The selection may include the baseline index;
/// it then contributes to the mean like any other member.
pub fn average_diff(
    composites: &YearlyComposites,
    indices: &[usize],
    baseline_index: usize,
) -> Result<Raster> {
    if indices.is_empty() {
        return Err(VerdantError::EmptySelection);
    }
    let (_, baseline) =
        composites
            .get(baseline_index)
            .ok_or(VerdantError::CompositeIndexOutOfRange {
                index: baseline_index,
                total: composites.len(),
            })?;
    let mut selected = Vec::with_capacity(indices.len());
    for &i in indices {
        let (_, raster) = composites
            .get(i)
            .ok_or(VerdantError::CompositeIndexOutOfRange {
                index: i,
                total: composites.len(),
            })?;
        selected.push(raster);
    }

    let (h, w) = baseline.profile.shape();
    let mut values = Array2::<f32>::zeros((h, w));
    let mut valid = Array2::from_elem((h, w), false);
    for row in 0..h {
        for col in 0..w {
            if !baseline.valid[[row, col]] {
                continue;
            }
            let mut sum = 0.0f32;
            let mut complete = true;
            for raster in &selected {
                if raster.valid[[row, col]] {
                    sum += raster.values[[row, col]];
                } else {
                    complete = false;
                    break;
                }
            }
            if complete {
                values[[row, col]] = sum / selected.len() as f32 - baseline.values[[row, col]];
                valid[[row, col]] = true;
            }
        }
    }
    Raster::new(values, valid, baseline.profile.clone())
}

/// Per-pixel difference; missing wherever either operand is missing.
fn subtract(minuend: &Raster, subtrahend: &Raster) -> Raster {
    let values = Zip::from(&minuend.values)
        .and(&subtrahend.values)
        .and(&minuend.valid)
        .and(&subtrahend.valid)
        .map_collect(|&a, &b, &av, &bv| if av && bv { a - b } else { 0.0 });
    let valid = Zip::from(&minuend.valid)
        .and(&subtrahend.valid)
        .map_collect(|&av, &bv| av && bv);
    Raster {
        values,
        valid,
        profile: minuend.profile.clone(),
    }
}
