use crate::distance::Separability;
use crate::error::ClusterError;
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upper-triangular matrix of pairwise separability measures between the
/// records of a data matrix.
///
/// Only entries (i, j) with i < j are stored; the diagonal and lower
/// triangle would be redundant, so storing the triangle halves both the
/// memory and the metric evaluations. The matrix is a transient, per-fit
/// artifact: at M records it occupies O(M²) space and dominates peak
/// memory, so callers drop it as soon as the neighborhoods are known.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix<T> {
    n_records: usize,
    cells: Vec<T>,
}

impl<T: Float + Send + Sync> DistanceMatrix<T> {
    /// Computes every pairwise measure. A pure function of its inputs:
    /// identical data and metric always produce an identical matrix.
    pub fn build<S>(data: &[Vec<T>], metric: &S) -> Result<Self, ClusterError>
    where
        S: Separability<T>,
    {
        check_rows(data)?;
        let n = data.len();
        let mut cells = Vec::with_capacity(triangle_len(n));
        for i in 0..n {
            for j in (i + 1)..n {
                cells.push(metric.measure(&data[i], &data[j]));
            }
        }
        Ok(Self { n_records: n, cells })
    }

    /// Computes the rows of the triangle in parallel. Every cell is written
    /// exactly once and row order is preserved, so the output is identical
    /// to [`DistanceMatrix::build`].
    #[cfg(feature = "parallel")]
    pub fn build_par<S>(data: &[Vec<T>], metric: &S) -> Result<Self, ClusterError>
    where
        S: Separability<T> + Sync,
    {
        check_rows(data)?;
        let n = data.len();
        let cells: Vec<T> = (0..n.saturating_sub(1))
            .into_par_iter()
            .flat_map_iter(|i| {
                let row = &data[i];
                data[(i + 1)..].iter().map(move |other| metric.measure(row, other))
            })
            .collect();
        Ok(Self { n_records: n, cells })
    }

    /// Number of records the matrix was built over.
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// The measure between records `i` and `j`, in either order. Diagonal
    /// entries are not stored and must never be asked for.
    pub fn measure(&self, i: usize, j: usize) -> T {
        debug_assert!(i != j, "diagonal entries are not stored");
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.cells[self.offset(lo, hi)]
    }

    // Row i starts after the triangles of rows 0..i.
    fn offset(&self, i: usize, j: usize) -> usize {
        i * (2 * self.n_records - i - 1) / 2 + (j - i - 1)
    }
}

fn triangle_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

fn check_rows<T>(data: &[Vec<T>]) -> Result<(), ClusterError> {
    let n_dims = data.first().map(Vec::len).unwrap_or(0);
    for (n, row) in data.iter().enumerate() {
        if row.len() != n_dims {
            return Err(ClusterError::DimensionMismatch(format!(
                "record {n} has {} features, expected {n_dims}",
                row.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMetric;

    fn points() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![3.0, 4.0],
            vec![6.0, 8.0],
            vec![0.0, 1.0],
        ]
    }

    #[test]
    fn stores_every_pair_once() {
        let matrix = DistanceMatrix::build(&points(), &DistanceMetric::Euclidean).unwrap();
        assert_eq!(matrix.n_records(), 4);
        assert!((matrix.measure(0, 1) - 5.0).abs() < 1e-12);
        assert!((matrix.measure(0, 2) - 10.0).abs() < 1e-12);
        assert!((matrix.measure(1, 2) - 5.0).abs() < 1e-12);
        assert!((matrix.measure(0, 3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn accessor_is_symmetric() {
        let matrix = DistanceMatrix::build(&points(), &DistanceMetric::Manhattan).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert_eq!(matrix.measure(i, j), matrix.measure(j, i));
                }
            }
        }
    }

    #[test]
    fn single_record_has_no_cells() {
        let data = vec![vec![1.0_f64, 2.0]];
        let matrix = DistanceMatrix::build(&data, &DistanceMetric::Euclidean).unwrap();
        assert_eq!(matrix.n_records(), 1);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let data = vec![vec![1.0_f64, 2.0], vec![3.0]];
        let result = DistanceMatrix::build(&data, &DistanceMetric::Euclidean);
        assert!(matches!(result, Err(ClusterError::DimensionMismatch(..))));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_matches_serial() {
        let serial = DistanceMatrix::build(&points(), &DistanceMetric::Euclidean).unwrap();
        let parallel = DistanceMatrix::build_par(&points(), &DistanceMetric::Euclidean).unwrap();
        assert_eq!(serial, parallel);
    }
}
