//! Fixed-width binning for delay and speed histograms.

use serde::Serialize;

use crate::error::{Error, Result};

/// Bin width for lateness histograms, in minutes.
pub const DURATION_BIN_WIDTH: f64 = 10.0;
/// Bin width for speed histograms, in mph.
pub const SPEED_BIN_WIDTH: f64 = 10.0;
/// Axis tick step for lateness histograms, in minutes.
pub const DURATION_TICK_STEP: f64 = 30.0;
/// Most bins a single histogram may lay out.
pub const MAX_BINS: usize = 10_000;

/// Bin layout for one sample. `upper` always exceeds the sample maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub lower: f64,
    pub upper: f64,
    pub width: f64,
    pub bin_count: usize,
}

/// Lays out bins of `width` from zero up to the sample maximum rounded to the
/// nearest ten (ties to even) plus ten.
///
/// # Errors
///
/// [`Error::EmptySample`] when `sample` has no finite values, and
/// [`Error::InvalidBinWidth`] for a width that is not a positive number, and
/// [`Error::TooManyBins`] when the range would need more than [`MAX_BINS`].
pub fn bins(sample: &[f64], width: f64) -> Result<HistogramSpec> {
    if !(width.is_finite() && width > 0.0) {
        return Err(Error::InvalidBinWidth { width });
    }

    let max = sample
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(f64::max)
        .ok_or(Error::EmptySample)?;

    let upper = (max / 10.0).round_ties_even() * 10.0 + 10.0;
    let bin_count = (upper / width).floor();
    if bin_count > MAX_BINS as f64 {
        return Err(Error::TooManyBins {
            upper,
            width,
            max: MAX_BINS,
        });
    }

    Ok(HistogramSpec {
        lower: 0.0,
        upper,
        width,
        bin_count: bin_count as usize,
    })
}

impl HistogramSpec {
    /// `bin_count + 1` edges starting at `lower`.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.bin_count)
            .map(|i| self.lower + i as f64 * self.width)
            .collect()
    }

    /// Per-bin counts. Bins are half-open except the last, which also takes
    /// values equal to its right edge; values outside the range are dropped.
    pub fn counts(&self, sample: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.bin_count];
        if self.bin_count == 0 {
            return counts;
        }
        let right = self.lower + self.bin_count as f64 * self.width;

        for &v in sample {
            if !(v >= self.lower && v <= right) {
                continue;
            }
            let idx = ((v - self.lower) / self.width) as usize;
            counts[idx.min(self.bin_count - 1)] += 1;
        }

        counts
    }

    /// Axis ticks from `lower` (inclusive) to `upper` (exclusive).
    pub fn ticks(&self, step: f64) -> Vec<f64> {
        if !(step.is_finite() && step > 0.0) {
            return Vec::new();
        }
        (0..)
            .map(|i| self.lower + i as f64 * step)
            .take_while(|t| *t < self.upper)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_small_sample() {
        let spec = bins(&[5.0, 12.0, 47.0], DURATION_BIN_WIDTH).unwrap();

        assert_eq!(spec.lower, 0.0);
        assert_eq!(spec.upper, 60.0);
        assert_eq!(spec.bin_count, 6);
    }

    #[test]
    fn test_bins_empty_sample() {
        assert_eq!(bins(&[], 10.0), Err(Error::EmptySample));
        assert_eq!(bins(&[f64::NAN], 10.0), Err(Error::EmptySample));
    }

    #[test]
    fn test_bins_invalid_width() {
        assert_eq!(bins(&[1.0], 0.0), Err(Error::InvalidBinWidth { width: 0.0 }));
        assert!(bins(&[1.0], -5.0).is_err());
    }

    #[test]
    fn test_bins_too_many() {
        assert!(matches!(
            bins(&[4294967295.0], DURATION_BIN_WIDTH),
            Err(Error::TooManyBins { max: MAX_BINS, .. })
        ));
        assert!(matches!(
            bins(&[50.0], 0.001),
            Err(Error::TooManyBins { .. })
        ));
        assert_eq!(bins(&[99_990.0], 10.0).unwrap().bin_count, MAX_BINS);
    }

    #[test]
    fn test_upper_rounds_ties_to_even() {
        assert_eq!(bins(&[45.0], 10.0).unwrap().upper, 50.0);
        assert_eq!(bins(&[55.0], 10.0).unwrap().upper, 70.0);
        assert_eq!(bins(&[44.0], 10.0).unwrap().upper, 50.0);
    }

    #[test]
    fn test_upper_exceeds_maximum() {
        for max in [0.0, 0.4, 4.9, 5.0, 15.0, 79.3, 125.0, 999.9] {
            let spec = bins(&[max], 10.0).unwrap();
            assert!(spec.upper > max, "upper {} for max {}", spec.upper, max);
        }
    }

    #[test]
    fn test_bin_count_with_other_width() {
        let spec = bins(&[79.0], 25.0).unwrap();
        assert_eq!(spec.upper, 90.0);
        assert_eq!(spec.bin_count, 3);
    }

    #[test]
    fn test_counts() {
        let sample = [5.0, 12.0, 47.0, 10.0, 60.0, -1.0, 61.0];
        let spec = bins(&[5.0, 12.0, 47.0], 10.0).unwrap();

        assert_eq!(spec.counts(&sample), vec![1, 2, 0, 0, 1, 1]);
    }

    #[test]
    fn test_edges_and_ticks() {
        let spec = bins(&[125.0], DURATION_BIN_WIDTH).unwrap();

        assert_eq!(spec.upper, 130.0);
        assert_eq!(spec.edges().len(), 14);
        assert_eq!(spec.edges()[13], 130.0);
        assert_eq!(spec.ticks(DURATION_TICK_STEP), vec![0.0, 30.0, 60.0, 90.0, 120.0]);
    }
}
