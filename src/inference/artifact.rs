use crate::inference::encoder::EncoderSpec;
use crate::utils::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk pricing model: preprocessing plus estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub encoder: EncoderSpec,
    pub estimator: EstimatorSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Linear { intercept: f64, coefficients: Vec<f64> },
    /// ONNX graph taking a `[1, width]` f32 input; `path` is relative to the artifact.
    Onnx { path: String },
}

impl EstimatorSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Onnx { .. } => "onnx",
        }
    }
}

impl ModelArtifact {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PricingError::model(format!("cannot read model artifact '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PricingError::model(format!("invalid model artifact: {}", e)))
    }
}
