//! ## tracestat-analysis::cdf
//! **Discrete distributions**
//!
//! Values are kept as a sorted histogram so that the exported CDF can be
//! walked in increasing value order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const CDF_STEP: f64 = 0.05;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cdf {
    counts: BTreeMap<u64, u64>,
    total: u64,
}

/// Sampled CDF as exported in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdfSeries {
    pub values: Vec<u64>,
    pub probabilities: Vec<f64>,
}

impl Cdf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: u64) {
        self.add_n(value, 1);
    }

    pub fn add_n(&mut self, value: u64, count: u64) {
        *self.counts.entry(value).or_insert(0) += count;
        self.total += count;
    }

    /// Number of samples.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .counts
            .iter()
            .map(|(&value, &count)| value as f64 * count as f64)
            .sum();
        sum / self.total as f64
    }

    /// Population standard deviation.
    pub fn stdev(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let sum: f64 = self
            .counts
            .iter()
            .map(|(&value, &count)| {
                let delta = value as f64 - mean;
                delta * delta * count as f64
            })
            .sum();
        (sum / self.total as f64).sqrt()
    }

    /// Samples the CDF each time the cumulative probability crosses the next
    /// 5 % step. The last point is always the maximum value at probability 1.
    pub fn points(&self) -> Vec<(u64, f64)> {
        let mut points = Vec::new();
        let mut accounted = 0u64;
        let mut next_p = 0.0;

        for (&value, &count) in &self.counts {
            accounted += count;
            if accounted == self.total {
                points.push((value, 1.0));
                break;
            }

            let p = accounted as f64 / self.total as f64;
            if p >= next_p {
                points.push((value, p));
                while p >= next_p {
                    next_p += CDF_STEP;
                }
            }
        }
        points
    }

    pub fn series(&self) -> CdfSeries {
        let (values, probabilities) = self.points().into_iter().unzip();
        CdfSeries {
            values,
            probabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_distribution() {
        let cdf = Cdf::new();
        assert_eq!(cdf.mean(), 0.0);
        assert_eq!(cdf.stdev(), 0.0);
        assert!(cdf.points().is_empty());
        assert_eq!(cdf.series(), CdfSeries::default());
    }

    #[test]
    fn test_mean_and_stdev() {
        let mut cdf = Cdf::new();
        for v in [2, 4, 4, 4, 5, 5, 7, 9] {
            cdf.add(v);
        }
        assert_eq!(cdf.total(), 8);
        assert!((cdf.mean() - 5.0).abs() < 1e-12);
        assert!((cdf.stdev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_is_certain() {
        let mut cdf = Cdf::new();
        cdf.add_n(64, 10);
        assert_eq!(cdf.points(), vec![(64, 1.0)]);
        assert_eq!(cdf.stdev(), 0.0);
    }

    #[test]
    fn test_points_are_sampled_on_five_percent_steps() {
        let mut cdf = Cdf::new();
        for v in 1..=100 {
            cdf.add(v);
        }
        let points = cdf.points();

        // 0.01 crosses the 0 step, then every fifth value crosses the next.
        assert_eq!(points[0], (1, 0.01));
        assert_eq!(points[1].0, 5);
        assert_eq!(points.last(), Some(&(100, 1.0)));
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        assert!(points.len() <= 22);
    }

    #[test]
    fn test_skewed_distribution_skips_steps() {
        let mut cdf = Cdf::new();
        cdf.add_n(1, 90);
        cdf.add_n(1000, 10);
        assert_eq!(cdf.points(), vec![(1, 0.9), (1000, 1.0)]);
        assert!((cdf.mean() - 100.9).abs() < 1e-9);
    }
}
