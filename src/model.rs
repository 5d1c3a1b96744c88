use serde::Deserialize;
use std::{fs, path::Path};

use crate::encoder::{FeatureRow, FEATURE_NAMES, N_FEATURES};
use crate::error::ModelError;
use crate::forest::{argmax, RandomForest, TreeArrays};

/// The only class set a binary risk model may declare.
const CLASSES: [i64; 2] = [0, 1];

#[derive(Deserialize)]
struct ForestJson {
    #[serde(default)]
    note: Option<String>,
    feature_names: Vec<String>,
    classes: Vec<i64>,
    trees: Vec<TreeArrays>,
}

#[cfg(feature = "torchscript")]
#[derive(Deserialize)]
struct MetaJson {
    feature_names: Vec<String>,
}

enum Backend {
    Forest(RandomForest),
    #[cfg(feature = "torchscript")]
    TorchScript(torchscript::TorchClassifier),
}

/// A loaded binary classifier.
///
/// Built once at startup and only read afterwards; share it behind an `Arc`.
pub struct Model {
    backend: Backend,
}

impl Model {
    /// Loads the artifact at `path`, picking the backend by extension, and
    /// checks it against the encoder's column schema.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_forest(path),
            #[cfg(feature = "torchscript")]
            Some("pt") => Self::load_torchscript(path),
            _ => Err(ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn load_forest(path: &Path) -> Result<Self, ModelError> {
        let txt = read(path)?;
        let meta: ForestJson = serde_json::from_str(&txt).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        check_schema(&meta.feature_names)?;
        if let Some(note) = &meta.note {
            tracing::warn!("model artifact note: {note}");
        }
        if meta.classes != CLASSES {
            return Err(ModelError::Classes(meta.classes));
        }
        let forest = RandomForest::from_arrays(&meta.trees, N_FEATURES, CLASSES.len())?;

        tracing::info!(
            "loaded forest from {}: {} trees, {} nodes, max depth {}",
            path.display(),
            forest.n_trees(),
            forest.total_nodes(),
            forest.max_depth()
        );
        Ok(Self {
            backend: Backend::Forest(forest),
        })
    }

    #[cfg(feature = "torchscript")]
    fn load_torchscript(path: &Path) -> Result<Self, ModelError> {
        let meta_path = path.with_extension("meta.json");
        let txt = read(&meta_path)?;
        let meta: MetaJson = serde_json::from_str(&txt).map_err(|source| ModelError::Parse {
            path: meta_path.clone(),
            source,
        })?;
        check_schema(&meta.feature_names)?;

        let module = torchscript::TorchClassifier::load(path)?;
        tracing::info!("loaded TorchScript module from {}", path.display());
        Ok(Self {
            backend: Backend::TorchScript(module),
        })
    }

    pub fn from_forest(forest: RandomForest) -> Result<Self, ModelError> {
        if forest.n_features() != N_FEATURES || forest.n_classes() != CLASSES.len() {
            return Err(ModelError::Output(format!(
                "forest shape {}x{} does not match {}x{}",
                forest.n_features(),
                forest.n_classes(),
                N_FEATURES,
                CLASSES.len()
            )));
        }
        Ok(Self {
            backend: Backend::Forest(forest),
        })
    }

    /// Column names the model was trained on.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Forest(_) => "random-forest",
            #[cfg(feature = "torchscript")]
            Backend::TorchScript(_) => "torchscript",
        }
    }

    /// `[P(class 0), P(class 1)]` for one row.
    fn class_probs(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError> {
        let x = row.values();
        let probs = match &self.backend {
            Backend::Forest(forest) => {
                let p = forest.predict_proba(&x);
                [p[0], p[1]]
            }
            #[cfg(feature = "torchscript")]
            Backend::TorchScript(module) => module.predict_proba(&x)?,
        };
        if probs.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(ModelError::Output(format!(
                "probabilities {probs:?} outside [0, 1]"
            )));
        }
        Ok(probs)
    }

    /// Class label: 1 for high risk, 0 for low risk.
    pub fn predict(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        let probs = self.class_probs(row)?;
        Ok(CLASSES[argmax(&probs)] as u8)
    }

    /// Probability mass assigned to class 1.
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        Ok(self.class_probs(row)?[1])
    }
}

fn read(path: &Path) -> Result<String, ModelError> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Column set and order must equal the encoder's exactly.
fn check_schema(found: &[String]) -> Result<(), ModelError> {
    if found.iter().map(String::as_str).eq(FEATURE_NAMES) {
        Ok(())
    } else {
        Err(ModelError::SchemaMismatch {
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            found: found.to_vec(),
        })
    }
}

#[cfg(feature = "torchscript")]
mod torchscript {
    use std::path::Path;
    use tch::{kind::Kind, CModule, Device, IValue, Tensor};

    use crate::encoder::N_FEATURES;
    use crate::error::ModelError;

    /// A classifier exported to TorchScript (e.g. through hummingbird).
    ///
    /// Forward takes `[1, N_FEATURES]` floats and returns either a
    /// probability tensor or a `(labels, probabilities)` tuple.
    pub struct TorchClassifier {
        module: CModule,
        device: Device,
    }

    impl TorchClassifier {
        pub fn load(path: &Path) -> Result<Self, ModelError> {
            let device = Device::Cpu;
            let module = CModule::load_on_device(path, device)?;
            let this = Self { module, device };

            // Probe output shape with a dummy forward
            this.predict_proba(&[0.0; N_FEATURES])?;
            Ok(this)
        }

        pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> Result<[f64; 2], ModelError> {
            let input = Tensor::from_slice(&x.map(|v| v as f32))
                .reshape([1, N_FEATURES as i64])
                .to_device(self.device);

            let out = self.module.forward_is(&[IValue::Tensor(input)])?;
            let probs = match out {
                IValue::Tensor(t) => t,
                IValue::Tuple(mut items) if items.len() == 2 => match items.pop() {
                    Some(IValue::Tensor(t)) => t,
                    _ => return Err(ModelError::Output("tuple without probability tensor".into())),
                },
                other => return Err(ModelError::Output(format!("{other:?}"))),
            };

            let probs = probs.to_kind(Kind::Double);
            let sz = probs.size();
            if sz != [1, 2] {
                return Err(ModelError::Output(format!("probability shape {sz:?}")));
            }
            Ok([probs.f_double_value(&[0, 0])?, probs.f_double_value(&[0, 1])?])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::TreeArrays;

    fn constant_model(weights: [f64; 2]) -> Model {
        let tree = TreeArrays {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![weights.to_vec()],
        };
        Model::from_forest(RandomForest::from_arrays(&[tree], N_FEATURES, 2).unwrap()).unwrap()
    }

    fn row() -> FeatureRow {
        crate::encoder::encode(&crate::types::PatientInput::default()).unwrap()
    }

    #[test]
    fn predict_follows_majority_probability() {
        let model = constant_model([1.0, 3.0]);
        assert_eq!(model.predict(&row()).unwrap(), 1);
        assert_eq!(model.predict_proba(&row()).unwrap(), 0.75);

        let model = constant_model([3.0, 1.0]);
        assert_eq!(model.predict(&row()).unwrap(), 0);
        assert_eq!(model.predict_proba(&row()).unwrap(), 0.25);
    }

    #[test]
    fn schema_must_match_in_order() {
        let names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        assert!(check_schema(&names).is_ok());

        let mut swapped = names.clone();
        swapped.swap(0, 1);
        assert!(matches!(
            check_schema(&swapped),
            Err(ModelError::SchemaMismatch { .. })
        ));

        let mut renamed = names.clone();
        renamed[7] = "thalach".to_string();
        assert!(check_schema(&renamed).is_err());

        assert!(check_schema(&names[..12]).is_err());
    }

    #[test]
    fn unknown_extension_rejected() {
        assert!(matches!(
            Model::load(Path::new("model.pkl")),
            Err(ModelError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn wrong_shape_forest_rejected() {
        let tree = TreeArrays {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![1.0, 1.0]],
        };
        let forest = RandomForest::from_arrays(&[tree], 4, 2).unwrap();
        assert!(Model::from_forest(forest).is_err());
    }
}
