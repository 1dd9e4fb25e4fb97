pub mod cli;
pub mod toml_config;

use crate::domain::ports::ReportConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Parser;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "delay-report"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Compute checkout delay statistics from a Getaround delay export")
)]
pub struct ReportConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = "data_delay.csv"))]
    pub input_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    /// Delays outside [-window, window] are left out of the distribution
    #[cfg_attr(feature = "cli", arg(long, default_value = "240"))]
    pub checkout_window: f64,

    #[cfg_attr(feature = "cli", arg(long, default_value = "400"))]
    pub threshold_max: u32,

    #[cfg_attr(feature = "cli", arg(long, default_value = "20"))]
    pub threshold_step: u32,

    #[cfg_attr(feature = "cli", arg(long, default_value = "20"))]
    pub histogram_bin: f64,

    /// Write only report.json instead of a zip bundle
    #[cfg_attr(feature = "cli", arg(long))]
    pub json_only: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_file: "data_delay.csv".to_string(),
            output_path: "./output".to_string(),
            checkout_window: 240.0,
            threshold_max: 400,
            threshold_step: 20,
            histogram_bin: 20.0,
            json_only: false,
            verbose: false,
        }
    }
}

impl ReportConfigProvider for ReportConfig {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn checkout_window_minutes(&self) -> f64 {
        self.checkout_window
    }

    fn threshold_max_minutes(&self) -> u32 {
        self.threshold_max
    }

    fn threshold_step_minutes(&self) -> u32 {
        self.threshold_step
    }

    fn histogram_bin_minutes(&self) -> f64 {
        self.histogram_bin
    }

    fn zip_output(&self) -> bool {
        !self.json_only
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_file", &self.input_file)?;
        validation::validate_file_extension("input_file", &self.input_file, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("checkout_window", self.checkout_window, 1.0, 10_080.0)?;
        validation::validate_range("threshold_step", self.threshold_step, 1, 1_440)?;
        validation::validate_range("histogram_bin", self.histogram_bin, 1.0, 1_440.0)?;
        validation::validate_positive_number(
            "threshold_max",
            self.threshold_max as usize,
            self.threshold_step as usize,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "predict-request"))]
#[cfg_attr(feature = "cli", command(about = "Send a car to the pricing API and print the estimate"))]
pub struct ClientConfig {
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "http://localhost:4000/prediction")
    )]
    pub url: String,

    /// JSON file holding the car; the built-in sample is sent when omitted
    #[cfg_attr(feature = "cli", arg(long))]
    pub payload: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "30"))]
    pub timeout_seconds: u64,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("url", &self.url)?;
        if let Some(payload) = &self.payload {
            validation::validate_file_extension("payload", payload, &["json"])?;
        }
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_config_is_valid() {
        assert!(ReportConfig::default().validate().is_ok());
        assert!(ReportConfig::default().zip_output());
    }

    #[test]
    fn test_report_config_rejects_bad_values() {
        let config = ReportConfig {
            input_file: "data_delay.xlsx".to_string(),
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            threshold_step: 0,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            threshold_max: 10,
            threshold_step: 20,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_validation() {
        let config = ClientConfig {
            url: "ftp://localhost/prediction".to_string(),
            payload: None,
            timeout_seconds: 30,
            verbose: false,
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            url: "http://localhost:4000/prediction".to_string(),
            payload: Some("car.json".to_string()),
            timeout_seconds: 30,
            verbose: false,
        };
        assert!(config.validate().is_ok());
    }
}
