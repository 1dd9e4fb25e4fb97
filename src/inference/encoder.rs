use crate::domain::model::{FeatureRow, FeatureValue, FEATURE_COLUMNS};
use crate::utils::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column preprocessing, laid out like a fitted `ColumnTransformer`:
/// scaled numerics, then one-hot blocks, then passthrough columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncoderSpec {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub passthrough: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    spec: EncoderSpec,
    width: usize,
}

impl FeatureEncoder {
    pub fn new(spec: EncoderSpec) -> Result<Self> {
        let mut seen = HashSet::new();
        let columns = spec
            .numeric
            .iter()
            .map(|c| c.column.as_str())
            .chain(spec.categorical.iter().map(|c| c.column.as_str()))
            .chain(spec.passthrough.iter().map(String::as_str));

        for column in columns {
            if !FEATURE_COLUMNS.contains(&column) {
                return Err(PricingError::model(format!(
                    "encoder references unknown column '{}'",
                    column
                )));
            }
            if !seen.insert(column) {
                return Err(PricingError::model(format!(
                    "encoder lists column '{}' more than once",
                    column
                )));
            }
        }

        if let Some(empty) = spec.categorical.iter().find(|c| c.categories.is_empty()) {
            return Err(PricingError::model(format!(
                "categorical column '{}' has no categories",
                empty.column
            )));
        }

        let width = spec.numeric.len()
            + spec.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
            + spec.passthrough.len();

        Ok(Self { spec, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let mut encoded = Vec::with_capacity(self.width);

        for numeric in &self.spec.numeric {
            let value = numeric_cell(row, &numeric.column)?;
            let scale = if numeric.scale == 0.0 { 1.0 } else { numeric.scale };
            encoded.push((value - numeric.mean) / scale);
        }

        for categorical in &self.spec.categorical {
            let value = text_cell(row, &categorical.column)?;
            // 未知類別編碼為全零 (handle_unknown = "ignore")
            encoded.extend(
                categorical
                    .categories
                    .iter()
                    .map(|category| if category == value { 1.0 } else { 0.0 }),
            );
        }

        for column in &self.spec.passthrough {
            encoded.push(numeric_cell(row, column)?);
        }

        Ok(encoded)
    }

    /// `(column, value)` pairs whose value is outside the fitted vocabulary.
    pub fn unknown_categories(&self, row: &FeatureRow) -> Vec<(String, String)> {
        self.spec
            .categorical
            .iter()
            .filter_map(|categorical| {
                let value = row.get(&categorical.column)?.as_text()?;
                if categorical.categories.iter().any(|c| c == value) {
                    None
                } else {
                    Some((categorical.column.clone(), value.to_string()))
                }
            })
            .collect()
    }

    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.spec
            .categorical
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.as_slice())
    }
}

fn cell<'a>(row: &'a FeatureRow, column: &str) -> Result<&'a FeatureValue> {
    row.get(column)
        .ok_or_else(|| PricingError::model(format!("feature row has no column '{}'", column)))
}

fn numeric_cell(row: &FeatureRow, column: &str) -> Result<f64> {
    cell(row, column)?
        .as_f64()
        .ok_or_else(|| PricingError::model(format!("column '{}' is not numeric", column)))
}

fn text_cell<'a>(row: &'a FeatureRow, column: &str) -> Result<&'a str> {
    cell(row, column)?
        .as_text()
        .ok_or_else(|| PricingError::model(format!("column '{}' is not categorical", column)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CarFeatures;

    fn spec() -> EncoderSpec {
        EncoderSpec {
            numeric: vec![
                NumericColumn {
                    column: "mileage".into(),
                    mean: 100_000.0,
                    scale: 20_000.0,
                },
                NumericColumn {
                    column: "engine_power".into(),
                    mean: 120.0,
                    scale: 0.0,
                },
            ],
            categorical: vec![CategoricalColumn {
                column: "fuel".into(),
                categories: vec!["diesel".into(), "petrol".into(), "hybrid_petrol".into()],
            }],
            passthrough: vec!["has_gps".into(), "automatic_car".into()],
        }
    }

    #[test]
    fn test_encode_layout() {
        let encoder = FeatureEncoder::new(spec()).unwrap();
        assert_eq!(encoder.width(), 7);

        let row = CarFeatures::sample().to_feature_row().unwrap();
        let encoded = encoder.encode(&row).unwrap();
        // (120000 - 100000) / 20000, (120 - 120) / 1, diesel one-hot, has_gps, automatic_car
        assert_eq!(encoded, vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let encoder = FeatureEncoder::new(spec()).unwrap();
        let mut car = CarFeatures::sample();
        car.fuel = "electro".into();
        let row = car.to_feature_row().unwrap();

        let encoded = encoder.encode(&row).unwrap();
        assert_eq!(&encoded[2..5], &[0.0, 0.0, 0.0]);
        assert_eq!(
            encoder.unknown_categories(&row),
            vec![("fuel".to_string(), "electro".to_string())]
        );
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let mut bad = spec();
        bad.passthrough.push("turbo".into());
        assert!(FeatureEncoder::new(bad).is_err());
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let mut bad = spec();
        bad.passthrough.push("mileage".into());
        assert!(FeatureEncoder::new(bad).is_err());
    }

    #[test]
    fn test_categorical_on_numeric_column_fails_to_encode() {
        let mut bad = spec();
        bad.categorical.push(CategoricalColumn {
            column: "engine_power".into(),
            categories: vec!["120".into()],
        });
        bad.numeric.retain(|c| c.column != "engine_power");
        let encoder = FeatureEncoder::new(bad).unwrap();
        let row = CarFeatures::sample().to_feature_row().unwrap();
        assert!(encoder.encode(&row).is_err());
    }
}
