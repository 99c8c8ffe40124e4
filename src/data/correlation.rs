use serde::Serialize;

use super::model::Dataset;

/// Pairwise Pearson correlation over a dataset's numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` × `columns.len()`.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.columns.len() + col]
    }

    /// Coefficient between two named columns.
    #[cfg(test)]
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.get(i, j))
    }
}

/// Correlate every numeric column of `dataset` with every other.
///
/// Rows where either value is missing are dropped per pair. Constant columns
/// have no defined correlation and yield NaN, including on the diagonal.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<String> = dataset.numeric_columns().map(str::to_string).collect();
    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| dataset.column_values(c).unwrap_or_default())
        .collect();

    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                self_correlation(&data[i])
            } else {
                pearson(&data[i], &data[j])
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix { columns, values }
}

/// Pearson coefficient over the pairs where both values are present.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

// Exactly 1.0 unless the column is constant or has too few values.
fn self_correlation(x: &[f64]) -> f64 {
    let present: Vec<f64> = x.iter().copied().filter(|v| !v.is_nan()).collect();
    let varies = present.windows(2).any(|w| w[0] != w[1]);
    if present.len() >= 2 && varies {
        1.0
    } else {
        f64::NAN
    }
}
