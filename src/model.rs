use crate::error::ClusterError;
use crate::normalize::{FeatureNormalization, FittedNormalizer};
use crate::validation::DataValidator;
use num_traits::Float;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use uuid::Uuid;

/// The fit lifecycle shared by every clustering model in this crate.
///
/// Fitting consumes the unfitted model and produces an immutable fit
/// result, so a model transitions to its fitted form at most once, a failed
/// fit leaves no partially-labelled state behind, and concurrent fits can
/// only ever happen on distinct instances.
pub trait ClusterModel<T> {
    /// The immutable result of a successful fit.
    type Fitted: FittedModel;

    /// The algorithm name used to tag log events.
    fn name(&self) -> &'static str;

    /// Runs the clustering procedure to completion.
    fn fit(self) -> Result<Self::Fitted, ClusterError>;
}

/// Read access to the outcome of a completed fit.
pub trait FittedModel {
    /// One label per record: -1 marks noise, any other value is the id of
    /// the cluster the record belongs to.
    fn labels(&self) -> &[i32];

    /// The number of clusters discovered. Noise is never counted.
    fn n_clusters(&self) -> usize;
}

/// State every model carries regardless of algorithm: the owned (possibly
/// normalized) copy of the data, the unique model key, verbosity and the
/// sticky warning flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ModelCore<T> {
    pub(crate) algo: String,
    pub(crate) data: Vec<Vec<T>>,
    pub(crate) n_samples: usize,
    pub(crate) n_dims: usize,
    pub(crate) normalizer: Option<FittedNormalizer<T>>,
    pub(crate) key: Uuid,
    pub(crate) verbose: bool,
    pub(crate) has_warnings: bool,
}

impl<T: Float + Send + Sync> ModelCore<T> {
    /// Validates `data` and takes ownership of the model's own copy of it,
    /// normalized when a strategy is supplied. The caller's matrix is never
    /// referenced again after construction.
    pub(crate) fn new(
        algo: &'static str,
        data: &[Vec<T>],
        normalization: Option<FeatureNormalization>,
        verbose: bool,
    ) -> Result<Self, ClusterError> {
        let report = DataValidator::new(data).validate()?;
        let n_samples = data.len();
        let n_dims = data[0].len();

        let mut core = ModelCore {
            algo: algo.to_owned(),
            data: Vec::new(),
            n_samples,
            n_dims,
            normalizer: None,
            key: Uuid::new_v4(),
            verbose,
            has_warnings: false,
        };
        if let Some(reason) = report.serial_fallback {
            core.warn(format!(
                "parallel NaN check could not be scheduled ({reason}), reverted to serial scan"
            ));
        }
        core.info(format!(
            "initializing {algo} clustering with {n_samples} x {n_dims} data matrix"
        ));
        core.debug(format!("model key={}", core.key));

        core.data = match normalization {
            Some(strategy) => {
                core.info("normalizing matrix columns");
                let fitted = strategy.fit(data);
                let scaled = fitted.transform_matrix(data);
                core.normalizer = Some(fitted);
                scaled
            }
            None => data.to_vec(),
        };
        Ok(core)
    }

    /// A copy of the model's data, so callers can never alter internal
    /// state through the returned matrix.
    pub(crate) fn data(&self) -> Vec<Vec<T>> {
        self.data.clone()
    }

    pub(crate) fn trace(&self, msg: impl AsRef<str>) {
        if self.verbose {
            tracing::trace!(algo = %self.algo, "{}", msg.as_ref());
        }
    }

    pub(crate) fn debug(&self, msg: impl AsRef<str>) {
        if self.verbose {
            tracing::debug!(algo = %self.algo, "{}", msg.as_ref());
        }
    }

    pub(crate) fn info(&self, msg: impl AsRef<str>) {
        if self.verbose {
            tracing::info!(algo = %self.algo, "{}", msg.as_ref());
        }
    }

    /// Warnings latch: once a model has warned, `has_warnings` stays set
    /// for the rest of its lifetime and follows it into the fit result.
    pub(crate) fn warn(&mut self, msg: impl AsRef<str>) {
        self.has_warnings = true;
        if self.verbose {
            tracing::warn!(algo = %self.algo, "{}", msg.as_ref());
        }
    }

    pub(crate) fn error(&self, msg: impl AsRef<str>) {
        if self.verbose {
            tracing::error!(algo = %self.algo, "{}", msg.as_ref());
        }
    }
}

/// Serializes a model into `writer`. Encoding happens into a buffer first,
/// so a failure surfaces before anything reaches the stream.
pub(crate) fn save_model<M, W>(model: &M, writer: &mut W) -> Result<(), ClusterError>
where
    M: Serialize,
    W: Write,
{
    let bytes =
        bincode::serialize(model).map_err(|e| ClusterError::Persistence(e.to_string()))?;
    writer
        .write_all(&bytes)
        .map_err(|e| ClusterError::Persistence(e.to_string()))
}

/// Reads a model back from `reader`, consuming the stream to its end.
pub(crate) fn load_model<M, R>(reader: &mut R) -> Result<M, ClusterError>
where
    M: DeserializeOwned,
    R: Read,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ClusterError::Persistence(e.to_string()))?;
    bincode::deserialize(&bytes).map_err(|e| ClusterError::Persistence(e.to_string()))
}

/// Builds the worker pool backing the data-parallel paths. Callers fall
/// back to their serial path, with a latched warning, when this fails.
#[cfg(feature = "parallel")]
pub(crate) fn worker_pool() -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_copies_the_callers_matrix() {
        let mut data = vec![vec![1.0_f64, 2.0], vec![3.0, 4.0]];
        let core = ModelCore::new("TEST", &data, None, false).unwrap();
        data[0][0] = 99.0;
        assert_eq!(core.data[0][0], 1.0);
    }

    #[test]
    fn data_accessor_returns_a_defensive_copy() {
        let data = vec![vec![1.0_f64, 2.0]];
        let core = ModelCore::new("TEST", &data, None, false).unwrap();
        let mut copy = core.data();
        copy[0][0] = 99.0;
        assert_eq!(core.data[0][0], 1.0);
    }

    #[test]
    fn warning_latch_is_sticky() {
        let data = vec![vec![1.0_f64]];
        let mut core = ModelCore::new("TEST", &data, None, false).unwrap();
        assert!(!core.has_warnings);
        core.warn("something benign");
        core.info("later activity");
        assert!(core.has_warnings);
    }

    #[test]
    fn model_keys_are_unique() {
        let data = vec![vec![1.0_f64]];
        let a = ModelCore::new("TEST", &data, None, false).unwrap();
        let b = ModelCore::new("TEST", &data, None, false).unwrap();
        assert_ne!(a.key, b.key);
    }
}
