use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::normalize::NormalizationParams;
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::store::record::{ModelRecord, NetworkRecord};

/// A trained network together with the normalization vectors it was trained
/// under. This is the unit of save / load.
#[derive(Debug, Clone)]
pub struct PersistedModel {
    pub network: Network,
    pub normalization: NormalizationParams,
}

impl PersistedModel {
    /// Pairs a network with its normalization vectors, checking that the
    /// vector widths match the network.
    pub fn new(network: Network, normalization: NormalizationParams) -> Result<PersistedModel> {
        normalization.validate()?;
        NetError::check_len("stored input normalization", network.num_inputs(), normalization.num_inputs())?;
        NetError::check_len("stored target normalization", network.num_outputs(), normalization.num_outputs())?;
        Ok(PersistedModel { network, normalization })
    }

    pub fn to_record(&self) -> ModelRecord {
        let p = &self.normalization;
        ModelRecord {
            neural_network: NetworkRecord::from(&self.network),
            input_mins: Some(p.input_min.clone()),
            input_maxs: Some(p.input_max.clone()),
            target_mins: Some(p.target_min.clone()),
            target_maxs: Some(p.target_max.clone()),
        }
    }

    /// Rebuilds a model from its record. Fails with `Persistence` if any
    /// normalization vector is absent: without them raw inputs cannot be
    /// normalized the way training saw them.
    pub fn from_record(record: ModelRecord) -> Result<PersistedModel> {
        let missing: Vec<&str> = [
            ("inputMins", record.input_mins.is_none()),
            ("inputMaxs", record.input_maxs.is_none()),
            ("targetMins", record.target_mins.is_none()),
            ("targetMaxs", record.target_maxs.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(NetError::Persistence(format!(
                "model is missing normalization data ({}); retrain and save it again",
                missing.join(", ")
            )));
        }

        let network = record.neural_network.into_network()?;
        let normalization = NormalizationParams {
            input_min: record.input_mins.unwrap_or_default(),
            input_max: record.input_maxs.unwrap_or_default(),
            target_min: record.target_mins.unwrap_or_default(),
            target_max: record.target_maxs.unwrap_or_default(),
        };
        PersistedModel::new(network, normalization)
    }

    /// Fails with `Persistence` if any weight, bias or normalization value
    /// is NaN or infinite. JSON has no encoding for those, so such a model
    /// could be written but never read back.
    pub fn check_finite(&self) -> Result<()> {
        let net = &self.network;
        let layers = net.hidden.iter().enumerate().map(|(i, l)| (format!("hidden layer {}", i), l));
        let layers = layers.chain(std::iter::once(("output layer".to_string(), &net.output)));
        for (what, layer) in layers {
            let weights = layer.weights.data.iter().flatten();
            if weights.chain(&layer.biases).any(|v| !v.is_finite()) {
                return Err(NetError::Persistence(format!(
                    "{} has non-finite parameters; training diverged, lower the learning rate",
                    what
                )));
            }
        }
        let p = &self.normalization;
        for (what, values) in [
            ("inputMins", &p.input_min),
            ("inputMaxs", &p.input_max),
            ("targetMins", &p.target_min),
            ("targetMaxs", &p.target_max),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(NetError::Persistence(format!("{} has non-finite values", what)));
            }
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        self.check_finite()?;
        serde_json::to_string_pretty(&self.to_record())
            .map_err(|e| NetError::Persistence(format!("cannot encode model: {}", e)))
    }

    pub fn from_json_str(json: &str) -> Result<PersistedModel> {
        let record: ModelRecord = serde_json::from_str(json)
            .map_err(|e| NetError::Persistence(format!("corrupt model record: {}", e)))?;
        PersistedModel::from_record(record)
    }

    /// Serializes the model to a pretty-printed JSON file. Nothing is written
    /// when `check_finite` fails.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_finite()?;
        let path = path.as_ref();
        let io_err = |e: std::io::Error| NetError::Persistence(format!("cannot write {}: {}", path.display(), e));
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_record())
            .map_err(|e| NetError::Persistence(format!("cannot encode model: {}", e)))?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Deserializes a model from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<PersistedModel> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| NetError::Persistence(format!("cannot open {}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);
        let record: ModelRecord = serde_json::from_reader(reader)
            .map_err(|e| NetError::Persistence(format!("corrupt model record {}: {}", path.display(), e)))?;
        PersistedModel::from_record(record)
    }

    /// Raw input in, raw-scale prediction out.
    ///
    /// Normalizes `raw_input` with the stored input vectors, runs the network
    /// and maps every output back with the stored target vectors.
    pub fn predict(&self, raw_input: &[f64]) -> Result<Vec<f64>> {
        let x = self.normalization.normalize_input(raw_input)?;
        let y = self.network.predict(&x)?;
        self.normalization.denormalize_target(&y)
    }
}

/// Lists the `*.json` model files directly inside `dir`, sorted by path.
pub fn list_models(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| NetError::Persistence(format!("cannot read {}: {}", dir.display(), e)))?;
    let mut models = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| NetError::Persistence(format!("cannot read {}: {}", dir.display(), e)))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            models.push(path);
        }
    }
    models.sort();
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::network::spec::NetworkSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_model() -> PersistedModel {
        let spec = NetworkSpec::from_names(2, vec![3, 2], &["relu", "sigmoid"], 1, "tanh").unwrap();
        let mut network = Network::new(&spec, &mut StdRng::seed_from_u64(17)).unwrap();
        network.hidden[1].biases = vec![0.1, -1.0 / 3.0];
        network.output.biases = vec![std::f64::consts::PI];
        let normalization = NormalizationParams {
            input_min: vec![0.0, -2.5],
            input_max: vec![1.0, 7.125],
            target_min: vec![1.0],
            target_max: vec![10.0],
        };
        PersistedModel::new(network, normalization).unwrap()
    }

    #[test]
    fn json_round_trip_is_exact() {
        let model = sample_model();
        let loaded = PersistedModel::from_json_str(&model.to_json_string().unwrap()).unwrap();

        assert_eq!(loaded.network.spec(), model.network.spec());
        assert_eq!(loaded.normalization, model.normalization);
        assert_eq!(loaded.to_record(), model.to_record());
        for (a, b) in loaded.network.hidden.iter().zip(&model.network.hidden) {
            assert_eq!(a.weights, b.weights);
            assert_eq!(a.biases, b.biases);
        }
        assert_eq!(loaded.network.output.weights, model.network.output.weights);
        assert_eq!(loaded.predict(&[0.4, 3.0]).unwrap(), model.predict(&[0.4, 3.0]).unwrap());
    }

    #[test]
    fn record_uses_camel_case_keys_and_activation_names() {
        let json = sample_model().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nn = &value["neuralNetwork"];
        assert_eq!(nn["numInputs"], 2);
        assert_eq!(nn["hiddenLayers"], serde_json::json!([3, 2]));
        assert_eq!(nn["hiddenActivations"], serde_json::json!(["relu", "sigmoid"]));
        assert_eq!(nn["outputActivation"], "tanh");
        assert_eq!(value["targetMaxs"], serde_json::json!([10.0]));
    }

    #[test]
    fn missing_normalization_vectors_fail_to_load() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_model().to_json_string().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("targetMaxs");
        let err = PersistedModel::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, NetError::Persistence(_)));
        assert!(err.to_string().contains("targetMaxs"));
    }

    #[test]
    fn corrupt_records_are_persistence_errors() {
        let good = sample_model().to_json_string().unwrap();
        let cases = [
            "not json".to_string(),
            good.replace("\"tanh\"", "\"softmax\""),
            good.replace("\"numOutputs\": 1", "\"numOutputs\": 2"),
            good.replace("\"numInputs\": 2", "\"numInputs\": 3"),
        ];
        for json in cases {
            assert!(
                matches!(PersistedModel::from_json_str(&json), Err(NetError::Persistence(_))),
                "{}",
                json
            );
        }
    }

    #[test]
    fn normalization_width_mismatch_is_dimension_error() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_model().to_json_string().unwrap()).unwrap();
        value["inputMins"] = serde_json::json!([0.0]);
        value["inputMaxs"] = serde_json::json!([1.0]);
        assert!(matches!(
            PersistedModel::from_json_str(&value.to_string()),
            Err(NetError::Dimension { .. })
        ));
    }

    #[test]
    fn predict_normalizes_and_denormalizes() {
        // y = x1 + x2 on normalized scale.
        let network = Network::from_weights(2, vec![], vec![], vec![vec![1.0, 1.0]], Activation::Linear).unwrap();
        let model = PersistedModel::new(
            network,
            NormalizationParams {
                input_min: vec![0.0, 10.0],
                input_max: vec![2.0, 20.0],
                target_min: vec![100.0],
                target_max: vec![200.0],
            },
        )
        .unwrap();
        // Normalized input (0.5, 0.5) -> 1.0 -> 200.
        assert_eq!(model.predict(&[1.0, 15.0]).unwrap(), vec![200.0]);
        assert!(matches!(model.predict(&[1.0]), Err(NetError::Dimension { .. })));
    }

    #[test]
    fn non_finite_parameters_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diverged.json");

        let mut model = sample_model();
        model.network.output.weights.data[0][0] = f64::NAN;
        let err = model.save_json(&path).unwrap_err();
        assert!(matches!(err, NetError::Persistence(_)));
        assert!(err.to_string().contains("output layer"), "{}", err);
        assert!(!path.exists());
        assert!(matches!(model.to_json_string(), Err(NetError::Persistence(_))));

        let mut model = sample_model();
        model.network.hidden[0].biases[1] = f64::INFINITY;
        assert!(matches!(model.save_json(&path), Err(NetError::Persistence(_))));

        let mut model = sample_model();
        model.normalization.target_max[0] = f64::NAN;
        let err = model.to_json_string().unwrap_err();
        assert!(err.to_string().contains("targetMaxs"), "{}", err);
    }

    #[test]
    fn save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model();
        model.save_json(dir.path().join("b.json")).unwrap();
        model.save_json(dir.path().join("a.json")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let loaded = PersistedModel::load_json(dir.path().join("a.json")).unwrap();
        assert_eq!(loaded.to_record(), model.to_record());

        let names: Vec<String> = list_models(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        assert!(matches!(
            PersistedModel::load_json(dir.path().join("missing.json")),
            Err(NetError::Persistence(_))
        ));
    }
}
