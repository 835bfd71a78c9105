//! Decimal statistics shared by the engine.

use chrono::{NaiveDate, NaiveDateTime};
use core_types::Trade;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A trade reduced to what the metrics need, with `pnl` computed once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PnlSample {
    pub date: NaiveDateTime,
    pub pnl: Decimal,
}

/// Derives the P&L of every trade in one pass, sorted chronologically.
///
/// The sort is stable, so trades sharing a timestamp keep their input order.
pub(crate) fn chronological(trades: &[Trade]) -> Vec<PnlSample> {
    let mut samples: Vec<PnlSample> = trades
        .iter()
        .map(|t| PnlSample {
            date: t.date,
            pnl: t.pnl(),
        })
        .collect();
    samples.sort_by_key(|s| s.date);
    samples
}

/// Saturates at the `Decimal` bounds instead of panicking on overflow.
pub(crate) fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// `None` for an empty slice or when the total overflows.
pub(crate) fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    total.checked_div(Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
///
/// Deviations are scaled by the largest one before squaring, so the squares stay
/// within `Decimal` range for any P&L magnitude.
pub(crate) fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let deviations = values
        .iter()
        .map(|v| v.checked_sub(avg))
        .collect::<Option<Vec<Decimal>>>()?;
    let scale = deviations.iter().map(|d| d.abs()).max()?;
    if scale.is_zero() {
        return Some(Decimal::ZERO);
    }

    let squares = deviations
        .iter()
        .map(|d| {
            let unit = *d / scale;
            unit * unit
        })
        .sum::<Decimal>();
    let variance = squares / Decimal::from(values.len() - 1);
    variance.sqrt()?.checked_mul(scale)
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `q` is a fraction in `[0, 1]`.
pub(crate) fn quantile(values: &[Decimal], q: Decimal) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();

    let last = sorted.len() - 1;
    let position = q.clamp(Decimal::ZERO, Decimal::ONE) * Decimal::from(last);
    let lower = position.floor().to_usize().unwrap_or(0).min(last);
    let upper = (lower + 1).min(last);
    let fraction = position - Decimal::from(lower);

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Sums P&L per calendar date, ascending by date.
pub(crate) fn daily_pnl(samples: &[PnlSample]) -> Vec<Decimal> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for sample in samples {
        let total = by_day.entry(sample.date.date()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(sample.pnl);
    }
    by_day.into_values().collect()
}

pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        // Sum of squared deviations is 32, so variance is 32 / 7.
        let std = sample_std_dev(&values).unwrap();
        assert_eq!(std.round_dp(4), dec!(2.1381));
        assert_eq!(sample_std_dev(&[dec!(1)]), None);
    }

    #[test]
    fn sample_std_dev_handles_values_whose_squares_overflow() {
        // Squared deviations of 1e15 are 1e30, beyond the Decimal range.
        let values = [dec!(1000000000000000), dec!(-1000000000000000)];
        let std = sample_std_dev(&values).unwrap();
        let expected = dec!(1414213562373095.05);
        assert!((std - expected).abs() < dec!(0.01));
    }

    #[test]
    fn sample_std_dev_of_constant_series_is_zero() {
        assert_eq!(sample_std_dev(&[dec!(7), dec!(7), dec!(7)]), Some(Decimal::ZERO));
    }

    #[test]
    fn sum_saturates_instead_of_overflowing() {
        assert_eq!(sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(mean(&[Decimal::MAX, Decimal::MAX]), None);
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let values = [dec!(40), dec!(10), dec!(30), dec!(20), dec!(50)];
        assert_eq!(quantile(&values, dec!(0)), Some(dec!(10)));
        assert_eq!(quantile(&values, dec!(1)), Some(dec!(50)));
        assert_eq!(quantile(&values, dec!(0.5)), Some(dec!(30)));
        // Position 0.05 * 4 = 0.2 between 10 and 20.
        assert_eq!(quantile(&values, dec!(0.05)), Some(dec!(12)));
        assert_eq!(quantile(&[], dec!(0.05)), None);
    }

    #[test]
    fn round2_uses_bankers_rounding() {
        assert_eq!(round2(dec!(1.005)), dec!(1.00));
        assert_eq!(round2(dec!(1.015)), dec!(1.02));
        assert_eq!(round2(dec!(33.3333)), dec!(33.33));
    }
}
