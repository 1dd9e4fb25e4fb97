use crate::analytics::{delay, DelayReport};
use crate::core::{DelayRecord, Pipeline, ReportConfigProvider, Storage};
use crate::utils::error::{PricingError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_ARCHIVE: &str = "delay_report.zip";
pub const REPORT_JSON: &str = "report.json";

/// Reads the delay export from `source` and writes the report into `sink`.
pub struct DelayReportPipeline<S: Storage, C: ReportConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ReportConfigProvider> DelayReportPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ReportConfigProvider> Pipeline for DelayReportPipeline<S, C> {
    type Record = DelayRecord;
    type Output = DelayReport;

    async fn extract(&self) -> Result<Vec<DelayRecord>> {
        tracing::debug!("Reading delay export: {}", self.config.input_file());
        let data = self.source.read_file(self.config.input_file()).await?;
        let records = delay::parse_delay_csv(&data)?;

        if records.is_empty() {
            return Err(PricingError::processing(format!(
                "'{}' contains no rentals",
                self.config.input_file()
            )));
        }
        Ok(records)
    }

    async fn transform(&self, data: Vec<DelayRecord>) -> Result<DelayReport> {
        let report = DelayReport::build(&data, &self.config);
        tracing::debug!(
            "Report: {} impacted rentals, {} late-impacted cancellations",
            report.cancellation_impact.impacted,
            report.cancellation_impact.impacted_canceled
        );
        Ok(report)
    }

    async fn load(&self, result: DelayReport) -> Result<String> {
        let json = result.to_json()?;

        if !self.config.zip_output() {
            self.sink.write_file(REPORT_JSON, json.as_bytes()).await?;
            return Ok(format!("{}/{}", self.config.output_path(), REPORT_JSON));
        }

        // 建立 ZIP 檔案
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(REPORT_JSON, FileOptions::default())?;
            zip.write_all(json.as_bytes())?;

            zip.start_file::<_, ()>("threshold_simulation.csv", FileOptions::default())?;
            zip.write_all(&result.threshold_csv()?)?;

            zip.start_file::<_, ()>("consecutive_rentals.csv", FileOptions::default())?;
            zip.write_all(&result.consecutive_rentals_csv()?)?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.sink.write_file(REPORT_ARCHIVE, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), REPORT_ARCHIVE))
    }
}
