use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a pipeline through extract, transform and load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting report process...");

        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());

        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;

        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
