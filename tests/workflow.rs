use std::fs;

use ferrite_mlp::{
    list_models, load_dataset, normalize_dataset, train_loop, NetError, Network, NetworkSpec,
    PersistedModel, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// y = 2·x1 + 3·x2 + 1 over a small grid.
fn affine_csv() -> String {
    let mut text = String::from("x1,x2,y\n");
    for x1 in 0..5 {
        for x2 in 0..3 {
            text.push_str(&format!("{},{},{}\n", x1, x2, 2 * x1 + 3 * x2 + 1));
        }
    }
    text
}

#[test]
fn csv_normalization_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "header1,header2,header3\n1.0,2.0,3.0\n4.0,5.0,6.0").unwrap();

    let raw = load_dataset(&path, 1).unwrap();
    let (norm, params) = normalize_dataset(&raw).unwrap();

    assert_eq!(norm.inputs(), &[vec![0.0, 0.0], vec![1.0, 1.0]]);
    assert_eq!(norm.targets(), &[vec![0.0], vec![1.0]]);
    assert_eq!(params.input_min, vec![1.0, 2.0]);
    assert_eq!(params.input_max, vec![4.0, 5.0]);
    assert_eq!(params.target_min, vec![3.0]);
    assert_eq!(params.target_max, vec![6.0]);
}

#[test]
fn train_save_load_predict() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("affine.csv");
    fs::write(&csv_path, affine_csv()).unwrap();

    let raw = load_dataset(&csv_path, 1).unwrap();
    let (dataset, normalization) = normalize_dataset(&raw).unwrap();

    let spec = NetworkSpec::from_names(2, vec![], &[] as &[&str], 1, "linear").unwrap();
    let mut network = Network::new(&spec, &mut StdRng::seed_from_u64(2024)).unwrap();
    let report = train_loop(&mut network, &dataset, &TrainConfig::new(20_000, 0.1, 1e-8)).unwrap();
    assert!(report.goal_reached, "{:?}", report);

    let models_dir = dir.path().join("saved_models");
    fs::create_dir_all(&models_dir).unwrap();
    let model_path = models_dir.join("affine.json");
    let model = PersistedModel::new(network, normalization).unwrap();
    model.save_json(&model_path).unwrap();

    let loaded = PersistedModel::load_json(&model_path).unwrap();
    assert_eq!(list_models(&models_dir).unwrap(), vec![model_path.clone()]);

    for (x1, x2) in [(0.0, 0.0), (2.0, 1.0), (4.0, 2.0), (3.0, 0.0)] {
        let expected = 2.0 * x1 + 3.0 * x2 + 1.0;
        let got = loaded.predict(&[x1, x2]).unwrap();
        assert_eq!(got, model.predict(&[x1, x2]).unwrap());
        assert!((got[0] - expected).abs() < 0.05, "f({}, {}) = {} (want {})", x1, x2, got[0], expected);
    }

    assert!(matches!(loaded.predict(&[1.0, 2.0, 3.0]), Err(NetError::Dimension { .. })));
}

#[test]
fn deep_network_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("affine.csv");
    fs::write(&csv_path, affine_csv()).unwrap();

    let raw = load_dataset(&csv_path, 1).unwrap();
    let (dataset, normalization) = normalize_dataset(&raw).unwrap();

    let spec = NetworkSpec::from_names(2, vec![6, 4, 3], &["relu", "tanh", "sigmoid"], 1, "linear").unwrap();
    let mut network = Network::new(&spec, &mut StdRng::seed_from_u64(8)).unwrap();
    let config = TrainConfig::new(50, 0.01, 0.0).with_shuffle(3);
    let first = train_loop(&mut network, &dataset, &config).unwrap();
    assert_eq!(first.epochs_run, 50);

    let model = PersistedModel::new(network, normalization).unwrap();
    let path = dir.path().join("deep.json");
    model.save_json(&path).unwrap();
    let mut loaded = PersistedModel::load_json(&path).unwrap();

    assert_eq!(loaded.network.spec(), spec);
    for (a, b) in loaded.network.hidden().iter().zip(model.network.hidden()) {
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
        assert_eq!(a.activation(), b.activation());
    }
    let out = loaded.network.output();
    assert_eq!((out.weights().rows(), out.weights().cols()), (1, 3));
    assert_eq!(out.weights().data(), model.network.output().weights().data());
    for (x1, x2) in [(0.5, 1.5), (4.0, 0.0)] {
        assert_eq!(loaded.predict(&[x1, x2]).unwrap(), model.predict(&[x1, x2]).unwrap());
    }

    // Training resumes from the loaded parameters.
    let resumed = train_loop(&mut loaded.network, &dataset, &config).unwrap();
    assert_eq!(resumed.epochs_run, 50);
    assert!(resumed.final_error.is_finite());
}

#[test]
fn malformed_dataset_produces_no_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "a,b,c\n1,2,3\n4,five,6\n7,8,9\n").unwrap();
    assert!(matches!(load_dataset(&path, 1), Err(NetError::Data(_))));
}
