use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Column scaling strategies applied when a model is configured with
/// `scale`. Fitting a strategy captures per-column statistics, so the same
/// transform can later be applied to records the model has never seen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureNormalization {
    /// Subtract the column mean, leaving every column centered on zero.
    MeanCenter,
    /// Subtract the column mean and divide by the column standard
    /// deviation.
    StandardScale,
    /// Rescale each column into the [0, 1] range.
    MinMaxScale,
}

impl FeatureNormalization {
    /// Captures the column statistics of `data`. The caller has already
    /// validated that the matrix is non-empty and rectangular.
    pub(crate) fn fit<T: Float>(&self, data: &[Vec<T>]) -> FittedNormalizer<T> {
        let n_dims = data[0].len();
        let mut shift = Vec::with_capacity(n_dims);
        let mut scale = Vec::with_capacity(n_dims);
        for d in 0..n_dims {
            let (s, c) = match self {
                FeatureNormalization::MeanCenter => (column_mean(data, d), T::one()),
                FeatureNormalization::StandardScale => {
                    let mean = column_mean(data, d);
                    (mean, non_zero(column_std(data, d, mean)))
                }
                FeatureNormalization::MinMaxScale => {
                    let (min, max) = column_range(data, d);
                    (min, non_zero(max - min))
                }
            };
            shift.push(s);
            scale.push(c);
        }
        FittedNormalizer { shift, scale }
    }
}

/// Per-column statistics captured when a normalization strategy was fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FittedNormalizer<T> {
    shift: Vec<T>,
    scale: Vec<T>,
}

impl<T: Float> FittedNormalizer<T> {
    pub(crate) fn transform_record(&self, record: &[T]) -> Vec<T> {
        record
            .iter()
            .zip(self.shift.iter().zip(&self.scale))
            .map(|(x, (shift, scale))| ((*x) - *shift) / *scale)
            .collect()
    }

    pub(crate) fn transform_matrix(&self, data: &[Vec<T>]) -> Vec<Vec<T>> {
        data.iter().map(|row| self.transform_record(row)).collect()
    }
}

// A constant column would otherwise divide by zero.
fn non_zero<T: Float>(x: T) -> T {
    if x == T::zero() {
        T::one()
    } else {
        x
    }
}

fn column_mean<T: Float>(data: &[Vec<T>], d: usize) -> T {
    let m = T::from(data.len()).unwrap_or(T::one());
    data.iter()
        .map(|row| row[d])
        .fold(T::zero(), std::ops::Add::add)
        / m
}

fn column_std<T: Float>(data: &[Vec<T>], d: usize, mean: T) -> T {
    let m = T::from(data.len()).unwrap_or(T::one());
    let variance = data
        .iter()
        .map(|row| {
            let dev = row[d] - mean;
            dev * dev
        })
        .fold(T::zero(), std::ops::Add::add)
        / m;
    variance.sqrt()
}

fn column_range<T: Float>(data: &[Vec<T>], d: usize) -> (T, T) {
    let mut min = T::infinity();
    let mut max = T::neg_infinity();
    for row in data {
        min = min.min(row[d]);
        max = max.max(row[d]);
    }
    (min, max)
}
