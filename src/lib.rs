//! Density-Based Spatial Clustering of Applications with Noise ("DBSCAN")
//! in Rust, generic over floating point numeric types, together with the
//! model framework around it: input validation, feature scaling, pluggable
//! separability metrics, structured logging with sticky warnings, and
//! binary model persistence.
//!
//! DBSCAN groups records by neighborhood density. A record whose
//! `eps`-neighborhood (itself included) holds at least `min_pts` records is
//! a core point; chains of core points grow clusters, records reachable
//! from a core point without being core themselves join as border points,
//! and everything else is noise. This makes DBSCAN a good fit for real
//! world data: no preset number of clusters, arbitrary cluster shapes, and
//! an explicit notion of outliers.
//!
//! Models are constructed from a data matrix and a hyper parameter
//! configuration, validated eagerly, and fitted exactly once: fitting
//! consumes the [`Dbscan`] model and produces a [`DbscanFit`] holding the
//! labels, from which unseen records can also be classified.
//!
//! # Examples
//! ```
//!use declust::{Dbscan, DbscanHyperParams};
//!
//!let data: Vec<Vec<f64>> = vec![
//!    vec![1.0, 1.1],
//!    vec![1.2, 1.4],
//!    vec![0.8, 1.0],
//!    vec![1.1, 1.0],
//!    vec![0.9, 1.2],
//!    vec![3.7, 4.0],
//!    vec![3.9, 3.9],
//!    vec![3.6, 4.1],
//!    vec![3.8, 3.9],
//!    vec![4.0, 4.1],
//!    vec![10.0, 10.0],
//!];
//!let config = DbscanHyperParams::builder(1.0).min_pts(5).build();
//!let fitted = Dbscan::new(&data, config).unwrap().fit().unwrap();
//!assert_eq!(fitted.labels(), &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1, -1]);
//!assert_eq!(fitted.n_clusters(), 2);
//! ```
//!
//! # References
//! * [Ester, M., Kriegel, H.P., Sander, J., Xu, X. A density-based algorithm for discovering clusters in large spatial databases with noise.](https://www.aaai.org/Papers/KDD/1996/KDD96-037.pdf)
//! * [scikit-learn user guide on DBSCAN](https://scikit-learn.org/stable/modules/clustering.html#dbscan)

pub use crate::dbscan::{Dbscan, DbscanFit, NOISE};
pub use crate::distance::{DistanceMetric, Separability};
pub use crate::distance_matrix::DistanceMatrix;
pub use crate::error::{ClusterError, Result};
pub use crate::hyper_parameters::{DbscanHyperParams, DbscanParamsBuilder};
pub use crate::model::{ClusterModel, FittedModel};
pub use crate::neighborhood::{Neighbor, NeighborhoodFinder};
pub use crate::normalize::FeatureNormalization;

mod dbscan;
mod distance;
mod distance_matrix;
mod error;
mod hyper_parameters;
mod model;
mod neighborhood;
mod normalize;
mod validation;
