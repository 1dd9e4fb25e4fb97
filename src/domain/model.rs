use crate::utils::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

/// Columns of the single-row table handed to the model, in order.
pub const FEATURE_COLUMNS: [&str; 14] = [
    "model_key",
    "mileage",
    "engine_power",
    "fuel",
    "paint_color",
    "car_type",
    "private_parking_available",
    "has_gps",
    "has_air_conditioning",
    "automatic_car",
    "has_getaround_connect",
    "has_speed_regulator",
    "winter_tires",
    "mileage_inverse",
];

pub const MODEL_KEYS: [&str; 16] = [
    "Citroën",
    "Renault",
    "BMW",
    "Peugeot",
    "Audi",
    "Nissan",
    "Mitsubishi",
    "Mercedes",
    "Volkswagen",
    "Toyota",
    "SEAT",
    "Subaru",
    "PGO",
    "Opel",
    "Ferrari",
    "Maserati",
];

pub const FUELS: [&str; 3] = ["diesel", "petrol", "hybrid_petrol"];

pub const PAINT_COLORS: [&str; 10] = [
    "black", "grey", "blue", "white", "brown", "silver", "red", "beige", "green", "orange",
];

pub const CAR_TYPES: [&str; 8] = [
    "estate",
    "sedan",
    "suv",
    "hatchback",
    "subcompact",
    "coupe",
    "convertible",
    "van",
];

/// A car submitted for rental price estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFeatures {
    pub model_key: String,
    pub mileage: i64,
    pub engine_power: i64,
    pub fuel: String,
    pub paint_color: String,
    pub car_type: String,
    pub private_parking_available: bool,
    pub has_gps: bool,
    pub has_air_conditioning: bool,
    pub automatic_car: bool,
    pub has_getaround_connect: bool,
    pub has_speed_regulator: bool,
    pub winter_tires: bool,
}

impl CarFeatures {
    /// The payload the smoke-test client sends when none is given.
    pub fn sample() -> Self {
        Self {
            model_key: "Renault".to_string(),
            mileage: 120_000,
            engine_power: 120,
            fuel: "diesel".to_string(),
            paint_color: "grey".to_string(),
            car_type: "sedan".to_string(),
            private_parking_available: false,
            has_gps: false,
            has_air_conditioning: true,
            automatic_car: true,
            has_getaround_connect: false,
            has_speed_regulator: true,
            winter_tires: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        // mileage_inverse = 1 / mileage
        if self.mileage == 0 {
            return Err(PricingError::validation(
                "mileage",
                "must be non-zero (the model uses its inverse)",
            ));
        }

        for (field, value) in [
            ("model_key", &self.model_key),
            ("fuel", &self.fuel),
            ("paint_color", &self.paint_color),
            ("car_type", &self.car_type),
        ] {
            if value.trim().is_empty() {
                return Err(PricingError::validation(field, "cannot be empty"));
            }
        }

        Ok(())
    }

    pub fn to_feature_row(&self) -> Result<FeatureRow> {
        self.validate()?;

        let cells = vec![
            FeatureValue::Text(self.model_key.clone()),
            FeatureValue::Integer(self.mileage),
            FeatureValue::Integer(self.engine_power),
            FeatureValue::Text(self.fuel.clone()),
            FeatureValue::Text(self.paint_color.clone()),
            FeatureValue::Text(self.car_type.clone()),
            FeatureValue::Bool(self.private_parking_available),
            FeatureValue::Bool(self.has_gps),
            FeatureValue::Bool(self.has_air_conditioning),
            FeatureValue::Bool(self.automatic_car),
            FeatureValue::Bool(self.has_getaround_connect),
            FeatureValue::Bool(self.has_speed_regulator),
            FeatureValue::Bool(self.winter_tires),
            FeatureValue::Float(1.0 / self.mileage as f64),
        ];

        Ok(FeatureRow { cells })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One row of model input; cell `i` belongs to `FEATURE_COLUMNS[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    cells: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.cells.get(i))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        FEATURE_COLUMNS.iter().copied().zip(self.cells.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub features: Vec<String>,
    pub encoded_width: usize,
    pub estimator: String,
    pub load_policy: String,
}

/// One row of `data_delay.csv`. Empty and NA cells deserialize as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    #[serde(deserialize_with = "cells::id")]
    pub rental_id: u64,
    #[serde(deserialize_with = "cells::optional_id")]
    pub car_id: Option<u64>,
    #[serde(deserialize_with = "cells::optional_text")]
    pub checkin_type: Option<String>,
    #[serde(deserialize_with = "cells::optional_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "cells::optional_number")]
    pub delay_at_checkout_in_minutes: Option<f64>,
    #[serde(deserialize_with = "cells::optional_id")]
    pub previous_ended_rental_id: Option<u64>,
    #[serde(deserialize_with = "cells::optional_number")]
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
}

/// CSV cell readers with dataframe conventions: NA markers are missing and
/// ids may be written as integral floats (`1.0`).
mod cells {
    use serde::de::{Deserialize, Deserializer, Error};

    const NA_TOKENS: [&str; 19] = [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ];

    fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let cell = Option::<String>::deserialize(deserializer)?;
        Ok(cell
            .map(|c| c.trim().to_string())
            .filter(|c| !NA_TOKENS.contains(&c.as_str())))
    }

    fn parse_id(cell: &str) -> Result<u64, String> {
        if let Ok(id) = cell.parse::<u64>() {
            return Ok(id);
        }
        match cell.parse::<f64>() {
            Ok(value) if value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 => {
                Ok(value as u64)
            }
            _ => Err(format!("invalid id '{}'", cell)),
        }
    }

    fn parse_number(cell: &str) -> Result<Option<f64>, String> {
        let value: f64 = cell
            .parse()
            .map_err(|_| format!("invalid number '{}'", cell))?;
        Ok(Some(value).filter(|v| !v.is_nan()))
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match present(deserializer)? {
            Some(cell) => parse_id(&cell).map_err(D::Error::custom),
            None => Err(D::Error::custom("id cannot be missing")),
        }
    }

    pub fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        present(deserializer)?
            .map(|cell| parse_id(&cell))
            .transpose()
            .map_err(D::Error::custom)
    }

    pub fn optional_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match present(deserializer)? {
            Some(cell) => parse_number(&cell).map_err(D::Error::custom),
            None => Ok(None),
        }
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        present(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_keeps_column_order() {
        let row = CarFeatures::sample().to_feature_row().unwrap();
        let columns: Vec<&str> = row.columns().map(|(c, _)| c).collect();
        assert_eq!(columns, FEATURE_COLUMNS.to_vec());
        assert_eq!(row.get("model_key"), Some(&FeatureValue::Text("Renault".into())));
        assert_eq!(row.get("has_speed_regulator"), Some(&FeatureValue::Bool(true)));
    }

    #[test]
    fn test_mileage_inverse_is_derived() {
        let row = CarFeatures::sample().to_feature_row().unwrap();
        let inverse = row.get("mileage_inverse").and_then(|v| v.as_f64()).unwrap();
        assert!((inverse - 1.0 / 120_000.0).abs() < 1e-15);
    }

    #[test]
    fn test_zero_mileage_is_rejected() {
        let mut car = CarFeatures::sample();
        car.mileage = 0;
        match car.to_feature_row() {
            Err(PricingError::ValidationError { field, .. }) => assert_eq!(field, "mileage"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_mileage_is_accepted() {
        let mut car = CarFeatures::sample();
        car.mileage = -10;
        assert!(car.validate().is_ok());
    }

    #[test]
    fn test_blank_text_field_is_rejected() {
        let mut car = CarFeatures::sample();
        car.paint_color = "  ".to_string();
        assert!(matches!(
            car.validate(),
            Err(PricingError::ValidationError { ref field, .. }) if field == "paint_color"
        ));
    }

    #[test]
    fn test_every_field_is_required() {
        let full = serde_json::to_value(CarFeatures::sample()).unwrap();
        let object = full.as_object().unwrap();
        for key in object.keys() {
            let mut partial = object.clone();
            partial.remove(key);
            let parsed: std::result::Result<CarFeatures, _> =
                serde_json::from_value(serde_json::Value::Object(partial));
            assert!(parsed.is_err(), "missing '{}' should not deserialize", key);
        }
    }

    #[test]
    fn test_field_types_are_checked() {
        let mut value = serde_json::to_value(CarFeatures::sample()).unwrap();
        value["has_gps"] = serde_json::json!("yes");
        assert!(serde_json::from_value::<CarFeatures>(value).is_err());

        let mut value = serde_json::to_value(CarFeatures::sample()).unwrap();
        value["mileage"] = serde_json::json!("120000");
        assert!(serde_json::from_value::<CarFeatures>(value).is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut value = serde_json::to_value(CarFeatures::sample()).unwrap();
        value["color_code"] = serde_json::json!(3);
        let parsed: CarFeatures = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, CarFeatures::sample());
    }
}
