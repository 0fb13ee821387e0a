use declust::{ClusterError, Dbscan, DbscanFit};

mod common;

macro_rules! define_serial_test {
    ($test_fn:ident) => {
        #[test]
        fn $test_fn() {
            fn fit_fn(model: Dbscan<f64>) -> Result<DbscanFit<f64>, ClusterError> {
                model.fit()
            }

            common::$test_fn(fit_fn);
        }
    };
}

define_serial_test!(test_two_clusters_and_noise);
define_serial_test!(test_tight_pair_cluster);
define_serial_test!(test_duplicate_points_single_cluster);
define_serial_test!(test_all_noise_when_every_distance_exceeds_eps);
define_serial_test!(test_chain_of_points_connects);
define_serial_test!(test_determinism_across_models);
define_serial_test!(test_defensive_data_copy);
define_serial_test!(test_scaling_changes_stored_data);
define_serial_test!(test_min_pts_exceeding_samples_warns);
define_serial_test!(test_cosine_similarity_clusters_by_direction);
define_serial_test!(test_labels_are_idempotent);
