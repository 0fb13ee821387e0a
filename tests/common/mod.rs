use declust::{ClusterError, Dbscan, DbscanFit, DbscanHyperParams, DistanceMetric, NOISE};

pub type FitFn = fn(Dbscan<f64>) -> Result<DbscanFit<f64>, ClusterError>;

fn two_clusters_and_noise_data() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 1.1],
        vec![1.2, 1.4],
        vec![0.8, 1.0],
        vec![1.1, 1.0],
        vec![0.9, 1.2],
        vec![3.7, 4.0],
        vec![3.9, 3.9],
        vec![3.6, 4.1],
        vec![3.8, 3.9],
        vec![4.0, 4.1],
        vec![10.0, 10.0],
    ]
}

pub fn test_two_clusters_and_noise(fit: FitFn) {
    let data = two_clusters_and_noise_data();
    let model = Dbscan::with_defaults(&data, 1.0).unwrap();
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1, -1]);
    assert_eq!(fitted.n_clusters(), 2);
    assert!(!fitted.has_warnings());
}

pub fn test_tight_pair_cluster(fit: FitFn) {
    let data = vec![vec![0.0, 0.0], vec![0.1, 0.1], vec![10.0, 10.0]];
    let config = DbscanHyperParams::builder(1.0).min_pts(2).build();
    let model = Dbscan::new(&data, config).unwrap();
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[0, 0, NOISE]);
    assert_eq!(fitted.n_clusters(), 1);
}

pub fn test_duplicate_points_single_cluster(fit: FitFn) {
    let data = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]];
    let config = DbscanHyperParams::builder(0.5).min_pts(2).build();
    let model = Dbscan::new(&data, config).unwrap();
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[0, 0, 0]);
    assert_eq!(fitted.n_clusters(), 1);
    assert!(fitted.labels().iter().all(|&l| l != NOISE));
}

pub fn test_all_noise_when_every_distance_exceeds_eps(fit: FitFn) {
    let data = vec![
        vec![0.0, 0.0],
        vec![10.0, 0.0],
        vec![0.0, 10.0],
        vec![10.0, 10.0],
    ];
    let config = DbscanHyperParams::builder(0.5).min_pts(2).build();
    let model = Dbscan::new(&data, config).unwrap();
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[NOISE, NOISE, NOISE, NOISE]);
    assert_eq!(fitted.n_clusters(), 0);
    // An all-noise outcome latches a warning.
    assert!(fitted.has_warnings());
}

pub fn test_chain_of_points_connects(fit: FitFn) {
    let data: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64 * 0.3, 0.0]).collect();
    let config = DbscanHyperParams::builder(0.5).min_pts(2).build();
    let model = Dbscan::new(&data, config).unwrap();
    let fitted = fit(model).unwrap();
    assert!(fitted.labels().iter().all(|&l| l == 0));
    assert_eq!(fitted.n_clusters(), 1);
}

pub fn test_determinism_across_models(fit: FitFn) {
    let data = two_clusters_and_noise_data();
    let first = fit(Dbscan::with_defaults(&data, 1.0).unwrap()).unwrap();
    let second = fit(Dbscan::with_defaults(&data, 1.0).unwrap()).unwrap();
    assert_eq!(first.labels(), second.labels());
    assert_eq!(first.n_clusters(), second.n_clusters());
}

pub fn test_defensive_data_copy(fit: FitFn) {
    let data = two_clusters_and_noise_data();
    let model = Dbscan::with_defaults(&data, 1.0).unwrap();
    let mut copy = model.data();
    for row in copy.iter_mut() {
        for value in row.iter_mut() {
            *value = 1000.0;
        }
    }
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1, -1]);
}

pub fn test_scaling_changes_stored_data(fit: FitFn) {
    let data = two_clusters_and_noise_data();

    let unscaled = Dbscan::with_defaults(&data, 1.0).unwrap();
    assert_eq!(unscaled.data()[0][0], data[0][0]);

    let config = DbscanHyperParams::builder(1.0).scale(true).build();
    let scaled = Dbscan::new(&data, config).unwrap();
    assert_ne!(scaled.data()[0][0], data[0][0]);

    let fitted = fit(scaled).unwrap();
    assert_eq!(fitted.labels().len(), data.len());
}

pub fn test_min_pts_exceeding_samples_warns(fit: FitFn) {
    let data = vec![vec![0.0, 0.0], vec![0.1, 0.1], vec![0.2, 0.2]];
    let config = DbscanHyperParams::builder(1.0).min_pts(10).build();
    let model = Dbscan::new(&data, config).unwrap();
    assert!(!model.has_warnings());
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[NOISE, NOISE, NOISE]);
    assert!(fitted.has_warnings());
}

pub fn test_cosine_similarity_clusters_by_direction(fit: FitFn) {
    // Two bundles of near-parallel vectors and one pointing away from both.
    let data = vec![
        vec![1.0, 0.0],
        vec![2.0, 0.1],
        vec![3.0, 0.2],
        vec![0.0, 1.0],
        vec![0.1, 2.0],
        vec![0.2, 3.0],
        vec![-1.0, -0.05],
    ];
    let config = DbscanHyperParams::builder(0.95)
        .min_pts(2)
        .dist_metric(DistanceMetric::CosineSimilarity)
        .build();
    let model = Dbscan::new(&data, config).unwrap();
    let fitted = fit(model).unwrap();
    assert_eq!(fitted.labels(), &[0, 0, 0, 1, 1, 1, NOISE]);
    assert_eq!(fitted.n_clusters(), 2);
}

pub fn test_labels_are_idempotent(fit: FitFn) {
    let data = two_clusters_and_noise_data();
    let fitted = fit(Dbscan::with_defaults(&data, 1.0).unwrap()).unwrap();
    let first: Vec<i32> = fitted.labels().to_vec();
    let second: Vec<i32> = fitted.labels().to_vec();
    assert_eq!(first, second);
}
