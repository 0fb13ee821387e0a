use crate::distance::{DistanceMetric, Separability};
use crate::distance_matrix::DistanceMatrix;
use crate::error::ClusterError;
use crate::hyper_parameters::DbscanHyperParams;
use crate::model::{self, ClusterModel, FittedModel, ModelCore};
use crate::neighborhood::{Neighbor, NeighborhoodFinder};
use num_traits::Float;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Instant;
use uuid::Uuid;

/// Label assigned to records that no cluster reaches.
pub const NOISE: i32 = -1;

const ALGO_NAME: &str = "DBSCAN";

/// The DBSCAN clustering model, unfitted. Generic over floating point
/// numeric types.
///
/// DBSCAN groups records by neighborhood density. Its main benefits are
/// that:
///  1. It does not assume that every record belongs to a cluster: sparse
///     regions of the data become "noise", which real world data is full
///     of;
///  2. It makes no assumption about the number of clusters, unlike KMeans
///     clustering. Any region dense enough becomes one; and
///  3. Clusters can take arbitrary, non-convex shapes, since membership is
///     decided by chains of close records rather than by a centroid.
///
/// The model validates and owns its copy of the data at construction.
/// Fitting consumes the model and produces a [`DbscanFit`], from which the
/// labels can be read and unseen records classified.
///
/// # Examples
/// ```
///use declust::Dbscan;
///
///let data: Vec<Vec<f64>> = vec![
///    vec![1.0, 1.1],
///    vec![1.2, 1.4],
///    vec![0.8, 1.0],
///    vec![1.1, 1.0],
///    vec![0.9, 1.2],
///    vec![3.7, 4.0],
///    vec![3.9, 3.9],
///    vec![3.6, 4.1],
///    vec![3.8, 3.9],
///    vec![4.0, 4.1],
///    vec![10.0, 10.0],
///];
///let model = Dbscan::with_defaults(&data, 1.0).unwrap();
///let fitted = model.fit().unwrap();
///assert_eq!(fitted.labels(), &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1, -1]);
/// ```
///
/// # References
/// * [Ester, M., Kriegel, H.P., Sander, J., Xu, X. A density-based algorithm for discovering clusters in large spatial databases with noise.](https://www.aaai.org/Papers/KDD/1996/KDD96-037.pdf)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dbscan<T> {
    core: ModelCore<T>,
    hp: DbscanHyperParams<T>,
}

impl<T: Float + Send + Sync> Dbscan<T> {
    /// Creates a DBSCAN model from a custom hyper parameter configuration.
    ///
    /// The data is validated up front: an empty matrix, records of
    /// mismatched dimensionality, and NaN or non-finite cells are all
    /// rejected here, so a constructed model is always fittable. The model
    /// stores its own copy of the matrix, normalized when the configuration
    /// asks for it; later changes to the caller's matrix never affect the
    /// model.
    ///
    /// # Parameters
    /// * `data` - the records to cluster, one vector of floating point
    ///   numbers per record, all of the same dimensionality.
    /// * `hyper_params` - the hyper parameter configuration.
    ///
    /// # Errors
    /// * `InvalidArgument` - `eps` is not a finite number greater than
    ///   zero, or `min_pts` is zero.
    /// * `EmptyDataset` - the matrix has no records or no features.
    /// * `Numeric` - a cell is NaN or non-finite.
    /// * `DimensionMismatch` - records differ in dimensionality.
    ///
    /// # Examples
    /// ```
    ///use declust::{Dbscan, DbscanHyperParams, DistanceMetric};
    ///
    ///let data: Vec<Vec<f64>> = vec![
    ///    vec![1.3, 1.1],
    ///    vec![1.3, 1.2],
    ///    vec![1.0, 1.1],
    ///    vec![1.2, 1.2],
    ///    vec![0.9, 1.0],
    ///    vec![3.7, 4.0],
    ///];
    ///let config = DbscanHyperParams::builder(0.5)
    ///    .min_pts(3)
    ///    .dist_metric(DistanceMetric::Manhattan)
    ///    .build();
    ///let model = Dbscan::new(&data, config).unwrap();
    /// ```
    pub fn new(data: &[Vec<T>], hyper_params: DbscanHyperParams<T>) -> Result<Self, ClusterError> {
        if hyper_params.eps <= T::zero() || !hyper_params.eps.is_finite() {
            return Err(ClusterError::InvalidArgument {
                name: "eps",
                message: "must be a finite number greater than 0".to_owned(),
            });
        }
        if hyper_params.min_pts < 1 {
            return Err(ClusterError::InvalidArgument {
                name: "min_pts",
                message: "must be at least 1".to_owned(),
            });
        }

        let normalization = hyper_params.scale.then_some(hyper_params.normalizer);
        let core = ModelCore::new(ALGO_NAME, data, normalization, hyper_params.verbose)?;
        let kind = if hyper_params.dist_metric.is_similarity() {
            "similarity"
        } else {
            "distance"
        };
        core.debug(format!("{kind} metric={}", hyper_params.dist_metric.name()));
        core.debug(format!("scale={}", hyper_params.scale));
        core.trace(format!(
            "eps={}, min_pts={}, seed={:?}",
            num_traits::cast::<T, f64>(hyper_params.eps).unwrap_or(f64::NAN),
            hyper_params.min_pts,
            hyper_params.seed
        ));
        Ok(Dbscan {
            core,
            hp: hyper_params,
        })
    }

    /// Creates a DBSCAN model from the default configuration and the
    /// required neighborhood radius `eps`.
    pub fn with_defaults(data: &[Vec<T>], eps: T) -> Result<Self, ClusterError> {
        Dbscan::new(data, DbscanHyperParams::with_eps(eps))
    }

    /// Runs the clustering procedure on the model's copy of the data.
    ///
    /// The model is consumed; on success every record carries either a
    /// cluster label or the noise marker in the returned [`DbscanFit`], and
    /// on failure no fitted state exists at all.
    ///
    /// The O(M²) distance matrix built here lives only for the duration of
    /// this call.
    pub fn fit(self) -> Result<DbscanFit<T>, ClusterError> {
        let start = Instant::now();
        let m = self.core.n_samples;

        let matrix = DistanceMatrix::build(&self.core.data, &self.hp.dist_metric)?;
        self.core.info(format!(
            "calculated {m} x {m} distance matrix in {:?}",
            start.elapsed()
        ));

        let neighborhood_start = Instant::now();
        self.core.info(format!(
            "computing density neighborhood for each point (eps={})",
            self.eps_display()
        ));
        let finder = NeighborhoodFinder::new(
            &matrix,
            self.hp.eps,
            self.hp.dist_metric.is_similarity(),
        );
        let neighborhoods = match finder.all_neighborhoods() {
            Ok(neighborhoods) => neighborhoods,
            // Unreachable for a validated model; never swallowed.
            Err(e) => {
                self.core.error(e.to_string());
                return Err(e);
            }
        };
        drop(finder);
        // The O(M²) triangle is only needed for the neighborhood queries.
        drop(matrix);
        self.core.info(format!(
            "completed density neighborhood calculations in {:?}",
            neighborhood_start.elapsed()
        ));

        self.finish(neighborhoods, start)
    }

    /// Runs the clustering procedure with the distance matrix and the
    /// neighborhood searches spread across a worker pool. Produces exactly
    /// the labels of [`Dbscan::fit`]; if the pool cannot be built the fit
    /// degrades to the serial path and latches a warning.
    #[cfg(feature = "parallel")]
    pub fn fit_par(mut self) -> Result<DbscanFit<T>, ClusterError> {
        let pool = match model::worker_pool() {
            Ok(pool) => pool,
            Err(e) => {
                self.core
                    .warn(format!("worker pool could not be built ({e}), fitting serially"));
                return self.fit();
            }
        };

        let start = Instant::now();
        let m = self.core.n_samples;

        let matrix =
            pool.install(|| DistanceMatrix::build_par(&self.core.data, &self.hp.dist_metric))?;
        self.core.info(format!(
            "calculated {m} x {m} distance matrix in {:?}",
            start.elapsed()
        ));

        let neighborhood_start = Instant::now();
        self.core.info(format!(
            "computing density neighborhood for each point (eps={})",
            self.eps_display()
        ));
        let finder = NeighborhoodFinder::new(
            &matrix,
            self.hp.eps,
            self.hp.dist_metric.is_similarity(),
        );
        let neighborhoods = match pool.install(|| finder.all_neighborhoods_par()) {
            Ok(neighborhoods) => neighborhoods,
            Err(e) => {
                self.core.error(e.to_string());
                return Err(e);
            }
        };
        drop(finder);
        drop(matrix);
        self.core.info(format!(
            "completed density neighborhood calculations in {:?}",
            neighborhood_start.elapsed()
        ));

        self.finish(neighborhoods, start)
    }

    fn finish(
        mut self,
        neighborhoods: Vec<Vec<Neighbor<T>>>,
        started: Instant,
    ) -> Result<DbscanFit<T>, ClusterError> {
        self.core.info("identifying cluster labels");
        let label_start = Instant::now();

        if self.hp.min_pts > self.core.n_samples {
            self.core.warn(format!(
                "min_pts={} exceeds the {} records in the dataset; every point will be noise",
                self.hp.min_pts, self.core.n_samples
            ));
        }

        let (labels, is_core, n_clusters) = assign_labels(&neighborhoods, self.hp.min_pts);
        if n_clusters == 0 {
            self.core.warn(
                "no region reached the density threshold and every point was labeled noise; \
                consider raising eps or lowering min_pts",
            );
        }

        self.core
            .info(format!("completed cluster labeling in {:?}", label_start.elapsed()));
        self.core
            .info(format!("completed DBSCAN procedure in {:?}", started.elapsed()));

        Ok(DbscanFit {
            core: self.core,
            hp: self.hp,
            labels,
            is_core,
            n_clusters,
        })
    }

    fn eps_display(&self) -> f64 {
        num_traits::cast(self.hp.eps).unwrap_or(f64::NAN)
    }

    /// A copy of the model's data matrix (normalized, if the model was
    /// configured to scale). Mutating the copy never affects the model.
    pub fn data(&self) -> Vec<Vec<T>> {
        self.core.data()
    }

    /// The neighborhood radius.
    pub fn eps(&self) -> T {
        self.hp.eps
    }

    /// The minimum neighborhood size (the point itself included) of a core
    /// point.
    pub fn min_pts(&self) -> usize {
        self.hp.min_pts
    }

    /// The separability metric records are compared with.
    pub fn separability_metric(&self) -> DistanceMetric {
        self.hp.dist_metric
    }

    /// The seed recorded in the model configuration.
    pub fn seed(&self) -> Option<u64> {
        self.hp.seed
    }

    /// The model's unique key.
    pub fn key(&self) -> Uuid {
        self.core.key
    }

    /// Whether this model has latched any warning. Once set, never cleared.
    pub fn has_warnings(&self) -> bool {
        self.core.has_warnings
    }

    /// Whether the model logs its progress.
    pub fn verbose(&self) -> bool {
        self.core.verbose
    }
}

impl<T: Float + Send + Sync + Serialize> Dbscan<T> {
    /// Writes the full model state to `writer`. Nothing reaches the stream
    /// if serialization fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), ClusterError> {
        model::save_model(self, writer)
    }
}

impl<T: Float + Send + Sync + DeserializeOwned> Dbscan<T> {
    /// Reads an unfitted model back from `reader`.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, ClusterError> {
        model::load_model(reader)
    }
}

impl<T: Float + Send + Sync> ClusterModel<T> for Dbscan<T> {
    type Fitted = DbscanFit<T>;

    fn name(&self) -> &'static str {
        ALGO_NAME
    }

    fn fit(self) -> Result<DbscanFit<T>, ClusterError> {
        Dbscan::fit(self)
    }
}

/// The immutable result of a completed DBSCAN fit: the final labels, the
/// core point flags, and the model state needed to classify unseen records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbscanFit<T> {
    core: ModelCore<T>,
    hp: DbscanHyperParams<T>,
    labels: Vec<i32>,
    is_core: Vec<bool>,
    n_clusters: usize,
}

impl<T: Float + Send + Sync> DbscanFit<T> {
    /// One label per record, in the order the records were passed to the
    /// constructor. [`NOISE`] marks records no cluster reached; any other
    /// value is a cluster id in `0..n_clusters`.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// The number of clusters discovered. Noise is never counted.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Classifies a record the model has never seen: the label of the
    /// closest core point within `eps`, or [`NOISE`] when no core point is
    /// that close. When core points of several clusters are within `eps`,
    /// the closest one wins.
    ///
    /// Records are normalized with the statistics captured at construction
    /// when the model was configured to scale, so callers always pass
    /// records in the original feature space.
    ///
    /// # Errors
    /// * `DimensionMismatch` - the record's dimensionality differs from the
    ///   fitted data.
    /// * `Numeric` - the record contains NaN.
    ///
    /// # Examples
    /// ```
    ///use declust::{Dbscan, DbscanHyperParams, NOISE};
    ///
    ///let data: Vec<Vec<f64>> = vec![
    ///    vec![0.0, 0.0],
    ///    vec![0.1, 0.1],
    ///    vec![10.0, 10.0],
    ///];
    ///let config = DbscanHyperParams::builder(1.0).min_pts(2).build();
    ///let fitted = Dbscan::new(&data, config).unwrap().fit().unwrap();
    ///
    ///assert_eq!(fitted.predict(&[0.05, 0.0]).unwrap(), 0);
    ///assert_eq!(fitted.predict(&[50.0, 50.0]).unwrap(), NOISE);
    /// ```
    pub fn predict(&self, record: &[T]) -> Result<i32, ClusterError> {
        if record.len() != self.core.n_dims {
            return Err(ClusterError::DimensionMismatch(format!(
                "record has {} features, but the model was fitted on {}",
                record.len(),
                self.core.n_dims
            )));
        }
        if record.iter().any(|x| x.is_nan()) {
            return Err(ClusterError::Numeric(
                "NaN in record; select an imputation method for incomplete records".to_owned(),
            ));
        }

        let record = match &self.core.normalizer {
            Some(fitted) => fitted.transform_record(record),
            None => record.to_vec(),
        };

        let similarity = self.hp.dist_metric.is_similarity();
        let mut best: Option<(T, i32)> = None;
        for (i, row) in self.core.data.iter().enumerate() {
            if !self.is_core[i] {
                continue;
            }
            let measure = self.hp.dist_metric.measure(&record, row);
            let within = if similarity {
                measure >= self.hp.eps
            } else {
                measure <= self.hp.eps
            };
            if !within {
                continue;
            }
            let closer = match best {
                None => true,
                Some((best_measure, _)) => {
                    if similarity {
                        measure > best_measure
                    } else {
                        measure < best_measure
                    }
                }
            };
            if closer {
                best = Some((measure, self.labels[i]));
            }
        }
        Ok(best.map(|(_, label)| label).unwrap_or(NOISE))
    }

    /// A copy of the fitted data matrix. Mutating the copy never affects
    /// the model.
    pub fn data(&self) -> Vec<Vec<T>> {
        self.core.data()
    }

    /// The neighborhood radius the model was fitted with.
    pub fn eps(&self) -> T {
        self.hp.eps
    }

    /// The minimum neighborhood size of a core point.
    pub fn min_pts(&self) -> usize {
        self.hp.min_pts
    }

    /// The separability metric records are compared with.
    pub fn separability_metric(&self) -> DistanceMetric {
        self.hp.dist_metric
    }

    /// The seed recorded in the model configuration.
    pub fn seed(&self) -> Option<u64> {
        self.hp.seed
    }

    /// The model's unique key, unchanged from the unfitted model.
    pub fn key(&self) -> Uuid {
        self.core.key
    }

    /// Whether the model latched any warning during construction or
    /// fitting.
    pub fn has_warnings(&self) -> bool {
        self.core.has_warnings
    }

    /// Whether the model logs its progress.
    pub fn verbose(&self) -> bool {
        self.core.verbose
    }
}

impl<T: Float + Send + Sync + Serialize> DbscanFit<T> {
    /// Writes the full fitted state, labels included, to `writer`. Nothing
    /// reaches the stream if serialization fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), ClusterError> {
        model::save_model(self, writer)
    }
}

impl<T: Float + Send + Sync + DeserializeOwned> DbscanFit<T> {
    /// Reads a fitted model back from `reader`.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, ClusterError> {
        model::load_model(reader)
    }
}

impl<T: Float + Send + Sync> FittedModel for DbscanFit<T> {
    fn labels(&self) -> &[i32] {
        &self.labels
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

/// Density-reachability labeling over precomputed neighborhoods.
///
/// A record whose neighborhood, itself included, holds at least `min_pts`
/// members is a core point. Scanning records in index order, each
/// unassigned core point opens a new cluster and expands it breadth-first:
/// every record the frontier reaches takes the cluster's label, reached
/// core points extend the frontier with their own neighborhoods, and
/// reached non-core records become border points that do not propagate.
/// Records never reached stay [`NOISE`]. With the neighborhoods ordered
/// deterministically, the labeling is deterministic too.
fn assign_labels<T>(
    neighborhoods: &[Vec<Neighbor<T>>],
    min_pts: usize,
) -> (Vec<i32>, Vec<bool>, usize) {
    let m = neighborhoods.len();
    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|neighborhood| neighborhood.len() + 1 >= min_pts)
        .collect();

    let mut labels = vec![NOISE; m];
    let mut next_label = 0_i32;
    let mut frontier = VecDeque::new();

    for i in 0..m {
        if !is_core[i] || labels[i] != NOISE {
            continue;
        }
        labels[i] = next_label;
        frontier.extend(neighborhoods[i].iter().map(|neighbor| neighbor.index));
        while let Some(j) = frontier.pop_front() {
            if labels[j] != NOISE {
                continue;
            }
            labels[j] = next_label;
            if is_core[j] {
                frontier.extend(neighborhoods[j].iter().map(|neighbor| neighbor.index));
            }
        }
        next_label += 1;
    }

    (labels, is_core, next_label as usize)
}
