use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A measure of how separable two fixed-length numeric vectors are.
///
/// Implementations must be symmetric and deterministic for a given pair.
/// Distances rank neighbors ascending (smaller is closer); similarities
/// invert that ordering, and a neighborhood radius becomes a lower bound on
/// the similarity rather than an upper bound on the distance.
pub trait Separability<T> {
    /// The measure between `a` and `b`.
    fn measure(&self, a: &[T], b: &[T]) -> T;

    /// Whether greater values mean closer records.
    fn is_similarity(&self) -> bool {
        false
    }
}

/// Built-in separability measures available to the model configuration.
///
/// Custom measures can implement [`Separability`] and drive the distance
/// matrix and neighborhood layers directly; model configurations keep to
/// this closed set so that persisted models round-trip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    /// Cosine of the angle between two vectors, a similarity in [-1, 1].
    CosineSimilarity,
}

impl DistanceMetric {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::CosineSimilarity => "cosine-similarity",
        }
    }

    /// Whether this metric ranks greater values as closer.
    pub fn is_similarity(&self) -> bool {
        matches!(self, Self::CosineSimilarity)
    }
}

impl<T: Float> Separability<T> for DistanceMetric {
    fn measure(&self, a: &[T], b: &[T]) -> T {
        match *self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Manhattan => manhattan_distance(a, b),
            Self::CosineSimilarity => cosine_similarity(a, b),
        }
    }

    fn is_similarity(&self) -> bool {
        DistanceMetric::is_similarity(self)
    }
}

pub(crate) fn euclidean_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x) - (*y)) * ((*x) - (*y)))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt()
}

pub(crate) fn manhattan_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x) - (*y)).abs())
        .fold(T::zero(), std::ops::Add::add)
}

pub(crate) fn cosine_similarity<T: Float>(a: &[T], b: &[T]) -> T {
    let dot = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x) * (*y))
        .fold(T::zero(), std::ops::Add::add);
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == T::zero() || norm_b == T::zero() {
        // A zero vector has no direction to compare.
        return T::zero();
    }
    dot / (norm_a * norm_b)
}

fn l2_norm<T: Float>(a: &[T]) -> T {
    a.iter()
        .map(|x| (*x) * (*x))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean() {
        let a = vec![0.0_f64, 0.0];
        let b = vec![3.0, 4.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-12);
        assert_eq!(euclidean_distance(&a, &b), euclidean_distance(&b, &a));
    }

    #[test]
    fn manhattan() {
        let a = vec![1.0_f64, -1.0];
        let b = vec![4.0, 3.0];
        assert!((manhattan_distance(&a, &b) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let a = vec![1.0_f64, 2.0];
        let b = vec![2.0, 4.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0_f64, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let a = vec![0.0_f64, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn similarity_flags() {
        assert!(!DistanceMetric::Euclidean.is_similarity());
        assert!(!DistanceMetric::Manhattan.is_similarity());
        assert!(DistanceMetric::CosineSimilarity.is_similarity());
    }
}
