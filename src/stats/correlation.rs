//! Pearson correlation and symmetric correlation matrices

use serde::{Deserialize, Serialize};

/// Pearson correlation coefficient of two equally long series
///
/// `(nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`.
/// Returns 0 for fewer than two samples, mismatched lengths or a zero
/// variance on either side.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return 0.0;
    }

    let nf = n as f64;
    let (mut sx, mut sy, mut sxy, mut sx2, mut sy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxy += a * b;
        sx2 += a * a;
        sy2 += b * b;
    }

    let var_x = nf * sx2 - sx * sx;
    let var_y = nf * sy2 - sy * sy;
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    ((nf * sxy - sx * sy) / denominator).clamp(-1.0, 1.0)
}

/// Pearson correlation over the common (most recent) tail of two series
pub fn pearson_aligned(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    pearson(&x[x.len() - n..], &y[y.len() - n..])
}

/// Cache key for an unordered symbol pair, e.g. `BTC/ETH`
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}/{b}")
    } else {
        format!("{b}/{a}")
    }
}

/// Symmetric correlation matrix with unit diagonal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Build the matrix from per-symbol return series
    pub fn compute(series: &[(String, Vec<f64>)]) -> Self {
        let n = series.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let corr = pearson_aligned(&series[i].1, &series[j].1);
                values[i][j] = corr;
                values[j][i] = corr;
            }
        }

        Self {
            symbols: series.iter().map(|(s, _)| s.clone()).collect(),
            values,
        }
    }

    /// Correlation between two symbols
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Upper-triangle pairs `(a, b, correlation)`
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        let n = self.symbols.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).map(move |j| {
                (
                    self.symbols[i].as_str(),
                    self.symbols[j].as_str(),
                    self.values[i][j],
                )
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_inputs() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
        // zero variance
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!((pearson(&x, &y) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_aligned_uses_tail() {
        let x = [100.0, 1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert!((pearson_aligned(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(pair_key("ETH", "BTC"), "BTC/ETH");
        assert_eq!(pair_key("BTC", "ETH"), "BTC/ETH");
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let series = vec![
            ("BTC".to_string(), vec![0.01, -0.02, 0.03, 0.01, -0.01]),
            ("ETH".to_string(), vec![0.02, -0.01, 0.025, 0.0, -0.02]),
            ("SOL".to_string(), vec![-0.01, 0.02, -0.03, 0.01, 0.0]),
        ];
        let matrix = CorrelationMatrix::compute(&series);

        for a in &matrix.symbols {
            assert_eq!(matrix.get(a, a), Some(1.0));
            for b in &matrix.symbols {
                assert_eq!(matrix.get(a, b), matrix.get(b, a));
            }
        }
        assert_eq!(matrix.pairs().count(), 3);
        assert!(matrix.get("BTC", "DOGE").is_none());
    }

    #[test]
    fn test_matrix_with_missing_data_is_zero_off_diagonal() {
        let series = vec![
            ("BTC".to_string(), vec![0.01, 0.02]),
            ("ETH".to_string(), vec![]),
        ];
        let matrix = CorrelationMatrix::compute(&series);
        assert_eq!(matrix.get("BTC", "ETH"), Some(0.0));
        assert_eq!(matrix.get("ETH", "ETH"), Some(1.0));
    }
}
