use crate::distance::DistanceMetric;
use crate::normalize::FeatureNormalization;
use serde::{Deserialize, Serialize};

// Defaults for parameters
const MIN_PTS_DEFAULT: usize = 5;
const SCALE_DEFAULT: bool = false;
const NORMALIZER_DEFAULT: FeatureNormalization = FeatureNormalization::StandardScale;
const DISTANCE_METRIC_DEFAULT: DistanceMetric = DistanceMetric::Euclidean;
const VERBOSE_DEFAULT: bool = false;

/// A wrapper around the hyper parameters used in DBSCAN clustering. The
/// neighborhood radius `eps` is the one parameter without a usable default
/// and is required to enter the builder; everything else can be left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbscanHyperParams<T> {
    pub(crate) eps: T,
    pub(crate) min_pts: usize,
    pub(crate) scale: bool,
    pub(crate) normalizer: FeatureNormalization,
    pub(crate) dist_metric: DistanceMetric,
    pub(crate) seed: Option<u64>,
    pub(crate) verbose: bool,
}

/// Builder object to set custom hyper parameters.
pub struct DbscanParamsBuilder<T> {
    eps: T,
    min_pts: Option<usize>,
    scale: Option<bool>,
    normalizer: Option<FeatureNormalization>,
    dist_metric: Option<DistanceMetric>,
    seed: Option<u64>,
    verbose: Option<bool>,
}

impl<T> DbscanHyperParams<T> {
    /// Enters the builder pattern, allowing custom hyper parameters to be
    /// set using the various setter methods.
    ///
    /// # Parameters
    /// * `eps` - the neighborhood radius. Records closer than this (or at
    ///   least this similar, for a similarity metric) are neighbors. Must be
    ///   finite and greater than zero; the model constructor rejects
    ///   anything else.
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn builder(eps: T) -> DbscanParamsBuilder<T> {
        DbscanParamsBuilder {
            eps,
            min_pts: None,
            scale: None,
            normalizer: None,
            dist_metric: None,
            seed: None,
            verbose: None,
        }
    }

    pub(crate) fn with_eps(eps: T) -> Self {
        Self::builder(eps).build()
    }
}

impl<T> DbscanParamsBuilder<T> {
    /// Sets min points - the minimum number of records, the point itself
    /// included, that a record's neighborhood must hold for the record to be
    /// a core point. Defaults to 5.
    ///
    /// # Parameters
    /// * `min_pts` - the minimum neighborhood size of a core point
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn min_pts(mut self, min_pts: usize) -> DbscanParamsBuilder<T> {
        self.min_pts = Some(min_pts);
        self
    }

    /// Sets whether the model normalizes the feature columns of its copy of
    /// the data before fitting. Defaults to false.
    ///
    /// # Parameters
    /// * `scale` - whether to normalize the columns
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn scale(mut self, scale: bool) -> DbscanParamsBuilder<T> {
        self.scale = Some(scale);
        self
    }

    /// Sets the normalization strategy applied when `scale` is set.
    /// Defaults to standard scaling (zero mean, unit variance per column).
    ///
    /// # Parameters
    /// * `normalizer` - the column normalization strategy
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn normalizer(mut self, normalizer: FeatureNormalization) -> DbscanParamsBuilder<T> {
        self.normalizer = Some(normalizer);
        self
    }

    /// Sets the separability metric used to compare records. Defaults to
    /// Euclidean. Options are defined by the DistanceMetric enum; similarity
    /// variants invert the neighborhood radius and ordering.
    ///
    /// # Parameters
    /// * `dist_metric` - the separability metric
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn dist_metric(mut self, dist_metric: DistanceMetric) -> DbscanParamsBuilder<T> {
        self.dist_metric = Some(dist_metric);
        self
    }

    /// Sets the random seed recorded by the model. DBSCAN itself is
    /// deterministic and draws nothing from it; the seed is kept in the
    /// model state and round-trips through persistence.
    ///
    /// # Parameters
    /// * `seed` - the random seed
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn seed(mut self, seed: u64) -> DbscanParamsBuilder<T> {
        self.seed = Some(seed);
        self
    }

    /// Sets whether the model emits log events. When false (the default)
    /// the model is silent; when true, phase progress and timings are
    /// logged and warnings are emitted as well as latched.
    ///
    /// # Parameters
    /// * `verbose` - whether to log
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn verbose(mut self, verbose: bool) -> DbscanParamsBuilder<T> {
        self.verbose = Some(verbose);
        self
    }

    /// Finishes the building of the hyper parameter configuration.
    ///
    /// # Returns
    /// * The completed DBSCAN hyper parameter configuration.
    pub fn build(self) -> DbscanHyperParams<T> {
        DbscanHyperParams {
            eps: self.eps,
            min_pts: self.min_pts.unwrap_or(MIN_PTS_DEFAULT),
            scale: self.scale.unwrap_or(SCALE_DEFAULT),
            normalizer: self.normalizer.unwrap_or(NORMALIZER_DEFAULT),
            dist_metric: self.dist_metric.unwrap_or(DISTANCE_METRIC_DEFAULT),
            seed: self.seed,
            verbose: self.verbose.unwrap_or(VERBOSE_DEFAULT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let hp = DbscanHyperParams::with_eps(0.5_f64);
        assert_eq!(hp.eps, 0.5);
        assert_eq!(hp.min_pts, 5);
        assert!(!hp.scale);
        assert_eq!(hp.normalizer, FeatureNormalization::StandardScale);
        assert_eq!(hp.dist_metric, DistanceMetric::Euclidean);
        assert_eq!(hp.seed, None);
        assert!(!hp.verbose);
    }

    #[test]
    fn builder_overrides() {
        let hp = DbscanHyperParams::builder(1.5_f64)
            .min_pts(3)
            .scale(true)
            .normalizer(FeatureNormalization::MinMaxScale)
            .dist_metric(DistanceMetric::Manhattan)
            .seed(42)
            .verbose(true)
            .build();
        assert_eq!(hp.min_pts, 3);
        assert!(hp.scale);
        assert_eq!(hp.normalizer, FeatureNormalization::MinMaxScale);
        assert_eq!(hp.dist_metric, DistanceMetric::Manhattan);
        assert_eq!(hp.seed, Some(42));
        assert!(hp.verbose);
    }
}
