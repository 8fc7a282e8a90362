use std::fmt;

use crate::error::{CalibrationError, Result};
use crate::filters::percentile::nan_percentiles;

/// Root mean square of the non-NaN values.
pub fn rms<'a>(values: impl IntoIterator<Item = &'a f64>) -> Result<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v * v, n + 1));
    if count == 0 {
        return Err(CalibrationError::EmptyInput("RMS of an all-NaN array".into()));
    }
    Ok((sum / count as f64).sqrt())
}

/// Summary of one array, ignoring NaN values.
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p0_1: f64,
    pub median: f64,
    pub p99_9: f64,
    pub max: f64,
}

impl Statistics {
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Result<Self> {
        let valid: Vec<f64> = values.into_iter().copied().filter(|v| !v.is_nan()).collect();
        let q = nan_percentiles(&valid, &[0.0, 0.1, 50.0, 99.9, 100.0])?;
        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Ok(Self {
            count: valid.len(),
            mean,
            std: variance.sqrt(),
            min: q[0],
            p0_1: q[1],
            median: q[2],
            p99_9: q[3],
            max: q[4],
        })
    }
}

/// Statistics of several arrays, one row each, with a leading label column.
#[derive(Clone, Debug)]
pub struct StatisticsTable {
    pub label_header: String,
    pub rows: Vec<(String, Statistics)>,
}

impl StatisticsTable {
    pub fn new(label_header: impl Into<String>) -> Self {
        Self {
            label_header: label_header.into(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, stats: Statistics) {
        self.rows.push((label.into(), stats));
    }
}

impl fmt::Display for StatisticsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            self.label_header, "count", "mean", "std", "min", "P0.1", "median", "P99.9", "max"
        )?;
        for (label, s) in &self.rows {
            writeln!(
                f,
                "{:>8} {:>10} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                label, s.count, s.mean, s.std, s.min, s.p0_1, s.median, s.p99_9, s.max
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_ignores_nan() {
        let values = [3.0, f64::NAN, -4.0, f64::NAN];
        assert!((rms(&values).unwrap() - (12.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn table_has_one_line_per_row() {
        let mut table = StatisticsTable::new("ISO");
        let stats = Statistics::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.median, 2.0);
        table.push("100", stats.clone());
        table.push("200", stats);
        assert_eq!(table.to_string().lines().count(), 3);
    }
}
