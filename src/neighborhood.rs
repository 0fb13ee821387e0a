use crate::distance_matrix::DistanceMatrix;
use crate::error::ClusterError;
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::cmp::Ordering;

/// A record found within the search radius of a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<T> {
    /// Index of the neighboring record.
    pub index: usize,
    /// Measure between the query point and this record.
    pub measure: T,
}

/// Radius-bounded neighbor search over a prebuilt measure matrix.
///
/// For distance metrics a neighborhood holds exactly the records within
/// `eps`; for similarity metrics it holds the records with similarity of at
/// least `eps`, ranked closest-first in both cases.
#[derive(Debug)]
pub struct NeighborhoodFinder<'a, T> {
    matrix: &'a DistanceMatrix<T>,
    eps: T,
    similarity: bool,
}

impl<'a, T: Float + Send + Sync> NeighborhoodFinder<'a, T> {
    pub fn new(matrix: &'a DistanceMatrix<T>, eps: T, similarity: bool) -> Self {
        Self { matrix, eps, similarity }
    }

    /// All records within the radius of record `i`, excluding `i` itself,
    /// closest first. Equal measures order by ascending index, so repeated
    /// runs always see identical neighborhoods.
    pub fn neighbors_of(&self, i: usize) -> Result<Vec<Neighbor<T>>, ClusterError> {
        let n = self.matrix.n_records();
        if i >= n {
            return Err(ClusterError::DimensionMismatch(format!(
                "record index {i} is outside the matrix range 0..{n}"
            )));
        }
        let mut neighbors: Vec<Neighbor<T>> = (0..n)
            .filter(|&j| j != i)
            .map(|j| Neighbor { index: j, measure: self.matrix.measure(i, j) })
            .filter(|neighbor| self.within_radius(neighbor.measure))
            .collect();
        neighbors.sort_by(|a, b| self.closer(a, b));
        Ok(neighbors)
    }

    /// One neighborhood per record, in record order.
    pub fn all_neighborhoods(&self) -> Result<Vec<Vec<Neighbor<T>>>, ClusterError> {
        (0..self.matrix.n_records())
            .map(|i| self.neighbors_of(i))
            .collect()
    }

    /// Parallel variant of [`NeighborhoodFinder::all_neighborhoods`]. Each
    /// query is independent and results are collected in record order, so
    /// the output is identical to the serial pass.
    #[cfg(feature = "parallel")]
    pub fn all_neighborhoods_par(&self) -> Result<Vec<Vec<Neighbor<T>>>, ClusterError> {
        (0..self.matrix.n_records())
            .into_par_iter()
            .map(|i| self.neighbors_of(i))
            .collect()
    }

    fn within_radius(&self, measure: T) -> bool {
        if self.similarity {
            measure >= self.eps
        } else {
            measure <= self.eps
        }
    }

    fn closer(&self, a: &Neighbor<T>, b: &Neighbor<T>) -> Ordering {
        let by_measure = if self.similarity {
            b.measure.partial_cmp(&a.measure)
        } else {
            a.measure.partial_cmp(&b.measure)
        };
        by_measure
            .expect("non-finite measure")
            .then_with(|| a.index.cmp(&b.index))
    }
}
