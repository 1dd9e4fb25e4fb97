use crate::domain::model::{CarFeatures, ModelInfo, FEATURE_COLUMNS};
use crate::domain::ports::Regressor;
use crate::inference::artifact::{EstimatorSpec, ModelArtifact};
use crate::inference::encoder::FeatureEncoder;
use crate::inference::linear::LinearRegressor;
use crate::utils::error::{PricingError, Result};
use std::path::Path;

/// Encoder and estimator loaded from one artifact.
pub struct PricingModel {
    name: String,
    version: String,
    encoder: FeatureEncoder,
    regressor: Box<dyn Regressor>,
    strict_categories: bool,
}

impl std::fmt::Debug for PricingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingModel")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("estimator", &self.regressor.kind())
            .field("width", &self.encoder.width())
            .finish()
    }
}

impl PricingModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact = ModelArtifact::from_file(path)?;
        Self::from_artifact(artifact, path.parent())
    }

    /// `base_dir` resolves relative estimator paths (ONNX graphs).
    pub fn from_artifact(artifact: ModelArtifact, base_dir: Option<&Path>) -> Result<Self> {
        let encoder = FeatureEncoder::new(artifact.encoder)?;

        let regressor: Box<dyn Regressor> = match artifact.estimator {
            EstimatorSpec::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != encoder.width() {
                    return Err(PricingError::model(format!(
                        "linear estimator has {} coefficients but the encoder produces {} features",
                        coefficients.len(),
                        encoder.width()
                    )));
                }
                Box::new(LinearRegressor::new(intercept, coefficients))
            }
            EstimatorSpec::Onnx { path } => load_onnx(&path, base_dir, encoder.width())?,
        };

        Ok(Self {
            name: artifact.name,
            version: artifact.version,
            encoder,
            regressor,
            strict_categories: false,
        })
    }

    /// Reject categorical values the model was not fitted on.
    pub fn with_strict_categories(mut self, strict: bool) -> Self {
        self.strict_categories = strict;
        self
    }

    pub fn predict(&self, cars: &[CarFeatures]) -> Result<Vec<f64>> {
        let mut inputs = Vec::with_capacity(cars.len());
        for car in cars {
            let row = car.to_feature_row()?;

            if self.strict_categories {
                if let Some((column, value)) = self.encoder.unknown_categories(&row).into_iter().next() {
                    let expected = self
                        .encoder
                        .categories(&column)
                        .map(|c| c.join(", "))
                        .unwrap_or_default();
                    return Err(PricingError::validation(
                        &column,
                        format!("unknown category '{}'; expected one of: {}", value, expected),
                    ));
                }
            }

            inputs.push(self.encoder.encode(&row)?);
        }

        let predictions = self.regressor.predict(&inputs)?;
        tracing::debug!("Scored {} car(s) with {} estimator", predictions.len(), self.regressor.kind());
        Ok(predictions)
    }

    pub fn info(&self, load_policy: &str) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            encoded_width: self.encoder.width(),
            estimator: self.regressor.kind().to_string(),
            load_policy: load_policy.to_string(),
        }
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &str, base_dir: Option<&Path>, width: usize) -> Result<Box<dyn Regressor>> {
    let full_path = match base_dir {
        Some(dir) if Path::new(path).is_relative() => dir.join(path),
        _ => Path::new(path).to_path_buf(),
    };
    let regressor = crate::inference::onnx::OnnxRegressor::load(full_path, width)?;
    Ok(Box::new(regressor))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &str, _base_dir: Option<&Path>, _width: usize) -> Result<Box<dyn Regressor>> {
    Err(PricingError::model(format!(
        "estimator '{}' needs ONNX support; rebuild with `--features onnx`",
        path
    )))
}
