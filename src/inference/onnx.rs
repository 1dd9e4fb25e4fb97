use crate::domain::ports::Regressor;
use crate::utils::error::{PricingError, Result};
use std::path::Path;
use tract_onnx::prelude::*;

/// ONNX estimator run through tract, one `[1, width]` row per call.
pub struct OnnxRegressor {
    model: TypedRunnableModel<TypedModel>,
    width: usize,
}

impl OnnxRegressor {
    pub fn load<P: AsRef<Path>>(model_path: P, width: usize) -> Result<Self> {
        let path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| {
                m.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))
            })
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| {
                PricingError::model(format!("cannot load ONNX model '{}': {}", path.display(), e))
            })?;

        tracing::debug!("Loaded ONNX estimator from {} (width {})", path.display(), width);
        Ok(Self { model, width })
    }

    fn run_row(&self, row: &[f64]) -> TractResult<f64> {
        let features: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_shape(&[1, self.width], &features)?;
        let outputs = self.model.run(tvec!(input.into()))?;
        let value = *outputs[0]
            .to_array_view::<f32>()?
            .iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("ONNX model produced no output"))?;
        Ok(value as f64)
    }
}

impl Regressor for OnnxRegressor {
    fn input_width(&self) -> usize {
        self.width
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
        inputs
            .iter()
            .map(|row| {
                if row.len() != self.width {
                    return Err(PricingError::model(format!(
                        "expected {} features, got {}",
                        self.width,
                        row.len()
                    )));
                }
                self.run_row(row)
                    .map_err(|e| PricingError::model(format!("ONNX inference failed: {}", e)))
            })
            .collect()
    }
}
