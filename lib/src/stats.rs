//! Shared normalization routines used by every scorer.
//!
//! All standard deviations are population standard deviations (N denominator).
//! A statistic that cannot be computed is `None`, never `NaN` or a division by zero.

use std::cmp::Ordering;

/// Mean and population standard deviation of a reference population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    /// Moments of `population`, or `None` when z-scores against it are undefined:
    /// fewer than two members or a (numerically) zero standard deviation.
    pub fn of(population: &[f64]) -> Option<Self> {
        let first = *population.first()?;
        if population.len() < 2 || population.iter().all(|v| *v == first) {
            return None;
        }
        let n = population.len() as f64;
        let mean = population.iter().sum::<f64>() / n;
        let variance = population.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        // Summation error grows with n.
        if !std_dev.is_finite() || std_dev <= n * f64::EPSILON * mean.abs().max(1.0) {
            return None;
        }
        Some(Self { mean, std_dev })
    }

    pub fn zscore(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Standardizes each of `values` against `population`.
///
/// Every element is `None` if the population has fewer than two members or no spread.
pub fn zscore(values: &[f64], population: &[f64]) -> Vec<Option<f64>> {
    match Moments::of(population) {
        Some(moments) => values.iter().map(|&v| Some(moments.zscore(v))).collect(),
        None => vec![None; values.len()],
    }
}

/// Z-scores a nullable column against its own present values.
pub fn zscores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let population: Vec<f64> = values.iter().flatten().copied().collect();
    let moments = Moments::of(&population);
    values
        .iter()
        .map(|v| match (v, moments) {
            (Some(v), Some(m)) => Some(m.zscore(*v)),
            _ => None,
        })
        .collect()
}

/// Mean of the present values, skipping nulls.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Fixed-weight linear combination; undefined if any term is undefined.
pub fn weighted(terms: &[(f64, Option<f64>)]) -> Option<f64> {
    terms
        .iter()
        .try_fold(0.0, |acc, (weight, value)| value.map(|v| acc + weight * v))
}

/// Orders scores from best to worst with undefined scores last.
pub fn cmp_score_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
