use std::collections::BTreeMap;

use crate::error::AnalysisError;

/// Returns the p-th percentile of `samples` with linear interpolation
/// between order statistics. The input does not need to be sorted.
pub fn percentile(samples: &[f64], p: f64) -> Result<f64, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptySamples);
    }
    if !p.is_finite() || p < 0.0 || p > 100.0 {
        return Err(AnalysisError::BadPercentile(p));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|x, y| x.partial_cmp(y).unwrap());

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;

    Ok(sorted[low] + (sorted[high] - sorted[low]) * fraction)
}

/// Returns the `(batch_size, latency)` pair with the lowest latency.
/// Ties break toward the smallest batch size.
pub fn best_batch_size(series: &BTreeMap<u64, f64>) -> Result<(u64, f64), AnalysisError> {
    let mut best: Option<(u64, f64)> = None;
    for (&batch_size, &latency) in series {
        match best {
            Some((_, lowest)) if latency >= lowest => {}
            _ => best = Some((batch_size, latency)),
        }
    }
    best.ok_or(AnalysisError::EmptySeries)
}

/// Ratio of the unbatched baseline latency to the best batched latency.
pub fn speedup(baseline: f64, best: f64) -> Result<f64, AnalysisError> {
    if best == 0.0 || !best.is_finite() {
        return Err(AnalysisError::DivisionByZero);
    }
    Ok(baseline / best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&samples, 50.0).unwrap(), 3.0);
        assert_eq!(percentile(&samples, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&samples, 100.0).unwrap(), 5.0);
        assert_eq!(percentile(&[10.0, 20.0], 50.0).unwrap(), 15.0);
    }

    #[test]
    fn percentile_sorts_first() {
        assert_eq!(percentile(&[5.0, 1.0, 3.0, 2.0, 4.0], 25.0).unwrap(), 2.0);
    }

    #[test]
    fn percentile_rejects_empty() {
        assert!(matches!(
            percentile(&[], 50.0),
            Err(AnalysisError::EmptySamples)
        ));
    }

    #[test]
    fn percentile_rejects_out_of_range() {
        assert!(matches!(
            percentile(&[1.0], 101.0),
            Err(AnalysisError::BadPercentile(_))
        ));
        assert!(matches!(
            percentile(&[1.0], -1.0),
            Err(AnalysisError::BadPercentile(_))
        ));
    }

    #[test]
    fn best_batch_takes_lowest_latency() {
        let series: BTreeMap<u64, f64> =
            vec![(2, 10.0), (4, 5.0), (8, 7.0)].into_iter().collect();
        assert_eq!(best_batch_size(&series).unwrap(), (4, 5.0));
    }

    #[test]
    fn best_batch_tie_breaks_on_smallest_batch() {
        let series: BTreeMap<u64, f64> =
            vec![(8, 5.0), (2, 5.0), (4, 5.0)].into_iter().collect();
        assert_eq!(best_batch_size(&series).unwrap(), (2, 5.0));
    }

    #[test]
    fn best_batch_rejects_empty_series() {
        let series = BTreeMap::new();
        assert!(matches!(
            best_batch_size(&series),
            Err(AnalysisError::EmptySeries)
        ));
    }

    #[test]
    fn speedup_is_a_ratio() {
        assert_eq!(speedup(10.0, 5.0).unwrap(), 2.0);
    }

    #[test]
    fn speedup_rejects_zero_denominator() {
        assert!(matches!(
            speedup(10.0, 0.0),
            Err(AnalysisError::DivisionByZero)
        ));
    }
}
