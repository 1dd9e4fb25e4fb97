pub mod analytics;
pub mod api;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod inference;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::ServiceConfig, ClientConfig, ReportConfig};
pub use core::{etl::EtlEngine, pipeline::DelayReportPipeline};
pub use domain::model::{CarFeatures, PredictionResponse};
pub use inference::{ModelStore, PricingModel};
pub use utils::error::{PricingError, Result};
