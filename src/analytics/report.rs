use crate::analytics::delay::{
    self, CancellationImpact, CheckinLateness, ColumnDescription, ConsecutiveRental, HistogramBin,
    LateCheckinCount, MissingShare, StateCount, ThresholdImpact,
};
use crate::analytics::stats::{BoxSummary, LinearTrend};
use crate::domain::model::DelayRecord;
use crate::domain::ports::ReportConfigProvider;
use crate::utils::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

const HISTOGRAM_LOW: f64 = -300.0;
const HISTOGRAM_HIGH: f64 = 0.0;

/// Everything the delay dashboard shows, as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayReport {
    pub generated_at: String,
    pub source: String,
    pub rows: usize,
    pub describe: Vec<ColumnDescription>,
    pub missing: Vec<MissingShare>,
    pub checkout_delay_distribution: Option<BoxSummary>,
    pub state_by_checkin_type: Vec<StateCount>,
    pub delay_vs_time_delta_trend: Option<LinearTrend>,
    pub late_share_by_checkin_type: Vec<CheckinLateness>,
    pub cancellation_impact: CancellationImpact,
    pub late_checkin_breakdown: Vec<LateCheckinCount>,
    pub real_delay_histogram: Vec<HistogramBin>,
    pub threshold_simulation: Vec<ThresholdImpact>,
    #[serde(skip)]
    pub consecutive_rentals: Vec<ConsecutiveRental>,
}

impl DelayReport {
    pub fn build<C: ReportConfigProvider>(records: &[DelayRecord], config: &C) -> Self {
        let pairs = delay::consecutive_rentals(records);
        tracing::debug!("Joined {} consecutive rental pairs", pairs.len());

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: config.input_file().to_string(),
            rows: records.len(),
            describe: delay::describe(records),
            missing: delay::missing_percentages(records),
            checkout_delay_distribution: delay::checkout_delay_distribution(
                records,
                config.checkout_window_minutes(),
            ),
            state_by_checkin_type: delay::state_by_checkin_type(records),
            delay_vs_time_delta_trend: delay::delay_vs_time_delta_trend(records),
            late_share_by_checkin_type: delay::late_share_by_checkin_type(records),
            cancellation_impact: delay::cancellation_impact(&pairs),
            late_checkin_breakdown: delay::late_checkin_breakdown(records),
            real_delay_histogram: delay::real_delay_histogram(
                &pairs,
                HISTOGRAM_LOW,
                HISTOGRAM_HIGH,
                config.histogram_bin_minutes(),
            ),
            threshold_simulation: delay::simulate_threshold(
                &pairs,
                config.threshold_max_minutes(),
                config.threshold_step_minutes(),
            ),
            consecutive_rentals: pairs,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn threshold_csv(&self) -> Result<Vec<u8>> {
        write_csv(&self.threshold_simulation)
    }

    pub fn consecutive_rentals_csv(&self) -> Result<Vec<u8>> {
        write_csv(&self.consecutive_rentals)
    }
}

fn write_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| PricingError::processing(format!("CSV flush failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;

    fn records() -> Vec<DelayRecord> {
        let csv = "\
rental_id,car_id,checkin_type,state,delay_at_checkout_in_minutes,previous_ended_rental_id,time_delta_with_previous_rental_in_minutes
1,10,mobile,ended,120,,
2,10,connect,canceled,,1,60
";
        delay::parse_delay_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_build_report() {
        let report = DelayReport::build(&records(), &ReportConfig::default());
        assert_eq!(report.rows, 2);
        assert_eq!(report.source, "data_delay.csv");
        assert_eq!(report.consecutive_rentals.len(), 1);
        assert_eq!(report.cancellation_impact.impacted_canceled, 1);
        assert_eq!(report.threshold_simulation.len(), 20);
        assert_eq!(report.real_delay_histogram.len(), 15);
    }

    #[test]
    fn test_json_omits_pair_rows() {
        let report = DelayReport::build(&records(), &ReportConfig::default());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(json.get("consecutive_rentals").is_none());
        assert_eq!(json["cancellation_impact"]["impacted"], 1);
    }

    #[test]
    fn test_threshold_csv_has_header() {
        let report = DelayReport::build(&records(), &ReportConfig::default());
        let csv = String::from_utf8(report.threshold_csv().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("threshold_minutes,late_avoided,additional_avoided")
        );
        // gap 60 vs previous delay 120: resolved from 120 minutes on
        assert_eq!(lines.next(), Some("0,0,0"));
    }
}
