use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Settings read by the delay-report pipeline.
pub trait ReportConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn checkout_window_minutes(&self) -> f64;
    fn threshold_max_minutes(&self) -> u32;
    fn threshold_step_minutes(&self) -> u32;
    fn histogram_bin_minutes(&self) -> f64;
    fn zip_output(&self) -> bool;
}

/// A regression estimator over already-encoded feature vectors.
pub trait Regressor: Send + Sync {
    fn input_width(&self) -> usize;
    fn kind(&self) -> &'static str;
    fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Record: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Vec<Self::Record>>;
    async fn transform(&self, data: Vec<Self::Record>) -> Result<Self::Output>;
    async fn load(&self, result: Self::Output) -> Result<String>;
}
