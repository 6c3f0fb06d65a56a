pub mod flags;
pub mod predicate;

use crate::error::Result;
use crate::mask::flags::FlagSeries;
use crate::mask::predicate::PredicateSet;
use crate::series::MaskSeries;

/// Evaluate a predicate set against a quality flag series.
///
/// All requirements are resolved against the series' vocabulary before any
/// pixel is touched, so an unknown flag or label fails the whole call. The
/// returned mask is `true` wherever every requirement holds.
pub fn apply_mask(series: &FlagSeries, predicates: &PredicateSet) -> Result<MaskSeries> {
    let compiled = predicates.compile(&series.vocabulary)?;
    let data = series.words.mapv(|word| compiled.matches(word));
    MaskSeries::new(data, series.timestamps.clone(), series.profile.clone())
}
