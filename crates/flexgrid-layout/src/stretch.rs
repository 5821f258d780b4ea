#![forbid(unsafe_code)]

//! Proportional rescaling of one row onto a target total.
//!
//! Every value is scaled by `target / sum` and rounded onto the precision
//! grid, except the last one, which receives whatever is left of the
//! target. Rounding error therefore always lands in the last cell of the
//! row and the emitted values add up to `target` exactly.

use flexgrid_core::unit::{div_round, saturate_i64};
use flexgrid_core::{Length, Unit, UnitValue};

/// Rescale `values` so they sum to exactly `target`.
///
/// Output precision is the target's precision. A row whose values sum to
/// zero is split into equal shares.
#[must_use]
pub fn stretch(values: &[UnitValue], target: UnitValue) -> Vec<UnitValue> {
    let Some(last) = values.len().checked_sub(1) else {
        return Vec::new();
    };
    let precision = target.precision();
    let scaled: Vec<i128> = values
        .iter()
        .map(|value| i128::from(value.rescale(precision).scaled()))
        .collect();
    let sum: i128 = scaled.iter().sum();
    let target_raw = i128::from(target.scaled());
    let count = scaled.len() as i128;

    let mut emitted: i128 = 0;
    scaled
        .iter()
        .enumerate()
        .map(|(i, &raw)| {
            let share = if i == last {
                target_raw - emitted
            } else if sum == 0 {
                div_round(target_raw, count)
            } else {
                div_round(raw * target_raw, sum)
            };
            emitted += share;
            UnitValue::from_scaled(saturate_i64(share), precision)
        })
        .collect()
}

/// [`stretch`] with the unit suffix attached to every value.
#[must_use]
pub fn stretch_lengths(values: &[UnitValue], target: UnitValue, unit: Unit) -> Vec<Length> {
    stretch(values, target)
        .into_iter()
        .map(|value| Length::new(value, unit))
        .collect()
}

/// Exact total of `values` at `precision`.
#[must_use]
pub fn total(values: &[UnitValue], precision: u32) -> UnitValue {
    values
        .iter()
        .fold(UnitValue::zero(precision), |sum, value| sum + *value)
}
