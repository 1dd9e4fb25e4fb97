use crate::domain::ports::Regressor;
use crate::utils::error::{PricingError, Result};

#[derive(Debug, Clone)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }
}

impl Regressor for LinearRegressor {
    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
        inputs
            .iter()
            .map(|x| {
                if x.len() != self.coefficients.len() {
                    return Err(PricingError::model(format!(
                        "expected {} features, got {}",
                        self.coefficients.len(),
                        x.len()
                    )));
                }
                Ok(self.intercept
                    + x.iter()
                        .zip(&self.coefficients)
                        .map(|(value, coef)| value * coef)
                        .sum::<f64>())
            })
            .collect()
    }
}
