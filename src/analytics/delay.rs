//! Checkout delay analyses over `data_delay.csv`.
//!
//! Missing values follow dataframe semantics: aggregates skip them and any
//! comparison involving one is false.

use crate::analytics::stats::{self, BoxSummary, ColumnSummary, LinearTrend};
use crate::domain::model::DelayRecord;
use crate::utils::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const UNKNOWN_CHECKIN_TYPE: &str = "unknown";

pub const DELAY_COLUMNS: [&str; 7] = [
    "rental_id",
    "car_id",
    "checkin_type",
    "state",
    "delay_at_checkout_in_minutes",
    "previous_ended_rental_id",
    "time_delta_with_previous_rental_in_minutes",
];

pub fn parse_delay_csv(data: &[u8]) -> Result<Vec<DelayRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    // 缺少的欄位會被 serde 當成 None，這裡先檢查標頭
    let headers = reader.headers()?.clone();
    if let Some(missing) = DELAY_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(PricingError::processing(format!(
            "delay CSV is missing column '{}'",
            missing
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub column: String,
    #[serde(flatten)]
    pub summary: ColumnSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingShare {
    pub column: String,
    pub missing: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCount {
    pub state: String,
    pub checkin_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinLateness {
    pub checkin_type: String,
    pub total: usize,
    pub late: usize,
    pub late_percent: f64,
    pub mean_late_delay: Option<f64>,
}

/// A rental joined to the rental that ended right before it on the same car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsecutiveRental {
    pub rental_id: u64,
    pub previous_rental_id: u64,
    pub checkin_type: Option<String>,
    pub state: Option<String>,
    pub previous_checkin_type: Option<String>,
    pub previous_state: Option<String>,
    pub current_delay: Option<f64>,
    pub previous_delay: Option<f64>,
    pub time_delta_with_previous_rental: Option<f64>,
    /// Planned gap minus the previous driver's delay; negative means the car was late.
    pub real_delay_between: Option<f64>,
}

impl ConsecutiveRental {
    pub fn is_canceled(&self) -> bool {
        self.state.as_deref() == Some("canceled")
    }

    pub fn is_impacted(&self) -> bool {
        self.real_delay_between.is_some_and(|d| d < 0.0)
    }

    pub fn is_unaffected(&self) -> bool {
        self.real_delay_between.is_some_and(|d| d >= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationImpact {
    pub consecutive_pairs: usize,
    pub impacted: usize,
    pub impacted_canceled: usize,
    pub unaffected: usize,
    pub unaffected_canceled: usize,
    pub total_canceled: usize,
    pub cancel_rate_without_delay_percent: f64,
    pub cancel_rate_when_late_percent: f64,
    pub canceled_due_to_delay_percent: f64,
    pub canceled_other_reasons_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateCheckinCount {
    pub impacted_by_previous_delay: bool,
    pub checkin_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub canceled: usize,
    pub not_canceled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdImpact {
    pub threshold_minutes: u32,
    pub late_avoided: usize,
    /// Gain over running with no threshold at all.
    pub additional_avoided: usize,
}

fn numeric_columns(records: &[DelayRecord]) -> [(&'static str, Vec<f64>); 5] {
    [
        ("rental_id", records.iter().map(|r| r.rental_id as f64).collect()),
        ("car_id", records.iter().filter_map(|r| r.car_id.map(|v| v as f64)).collect()),
        (
            "delay_at_checkout_in_minutes",
            records.iter().filter_map(|r| r.delay_at_checkout_in_minutes).collect(),
        ),
        (
            "previous_ended_rental_id",
            records
                .iter()
                .filter_map(|r| r.previous_ended_rental_id.map(|v| v as f64))
                .collect(),
        ),
        (
            "time_delta_with_previous_rental_in_minutes",
            records
                .iter()
                .filter_map(|r| r.time_delta_with_previous_rental_in_minutes)
                .collect(),
        ),
    ]
}

pub fn describe(records: &[DelayRecord]) -> Vec<ColumnDescription> {
    numeric_columns(records)
        .into_iter()
        .map(|(column, values)| ColumnDescription {
            column: column.to_string(),
            summary: stats::describe_column(&values),
        })
        .collect()
}

pub fn missing_percentages(records: &[DelayRecord]) -> Vec<MissingShare> {
    let counts = [
        ("rental_id", 0),
        ("car_id", records.iter().filter(|r| r.car_id.is_none()).count()),
        ("checkin_type", records.iter().filter(|r| r.checkin_type.is_none()).count()),
        ("state", records.iter().filter(|r| r.state.is_none()).count()),
        (
            "delay_at_checkout_in_minutes",
            records.iter().filter(|r| r.delay_at_checkout_in_minutes.is_none()).count(),
        ),
        (
            "previous_ended_rental_id",
            records.iter().filter(|r| r.previous_ended_rental_id.is_none()).count(),
        ),
        (
            "time_delta_with_previous_rental_in_minutes",
            records
                .iter()
                .filter(|r| r.time_delta_with_previous_rental_in_minutes.is_none())
                .count(),
        ),
    ];

    counts
        .into_iter()
        .map(|(column, missing)| MissingShare {
            column: column.to_string(),
            missing,
            percent: stats::percentage(missing, records.len()),
        })
        .collect()
}

pub fn checkout_delay_distribution(records: &[DelayRecord], window: f64) -> Option<BoxSummary> {
    let delays: Vec<f64> = records
        .iter()
        .filter_map(|r| r.delay_at_checkout_in_minutes)
        .filter(|d| (-window..=window).contains(d))
        .collect();
    stats::box_summary(&delays)
}

pub fn state_by_checkin_type(records: &[DelayRecord]) -> Vec<StateCount> {
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for record in records {
        let key = (
            record.state.clone().unwrap_or_else(|| "unknown".to_string()),
            checkin_type_or_unknown(record),
        );
        *groups.entry(key).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|((state, checkin_type), count)| StateCount {
            state,
            checkin_type,
            count,
        })
        .collect()
}

pub fn delay_vs_time_delta_trend(records: &[DelayRecord]) -> Option<LinearTrend> {
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| {
            Some((
                r.delay_at_checkout_in_minutes?,
                r.time_delta_with_previous_rental_in_minutes?,
            ))
        })
        .collect();
    stats::ordinary_least_squares(&points)
}

/// Rows without a checkin type are not grouped.
pub fn late_share_by_checkin_type(records: &[DelayRecord]) -> Vec<CheckinLateness> {
    let mut groups: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let Some(checkin_type) = record.checkin_type.as_deref() else {
            continue;
        };
        let entry = groups.entry(checkin_type).or_default();
        entry.0 += 1;
        if let Some(delay) = record.delay_at_checkout_in_minutes.filter(|d| *d > 0.0) {
            entry.1.push(delay);
        }
    }

    groups
        .into_iter()
        .map(|(checkin_type, (total, late_delays))| CheckinLateness {
            checkin_type: checkin_type.to_string(),
            total,
            late: late_delays.len(),
            late_percent: stats::percentage(late_delays.len(), total),
            mean_late_delay: stats::mean(&late_delays),
        })
        .collect()
}

pub fn consecutive_rentals(records: &[DelayRecord]) -> Vec<ConsecutiveRental> {
    let mut by_id: HashMap<u64, Vec<&DelayRecord>> = HashMap::new();
    for record in records {
        by_id.entry(record.rental_id).or_default().push(record);
    }

    let mut pairs = Vec::new();
    for current in records {
        let Some(previous_id) = current.previous_ended_rental_id else {
            continue;
        };
        let Some(previous_rentals) = by_id.get(&previous_id) else {
            continue;
        };

        for previous in previous_rentals {
            let real_delay_between = match (
                current.time_delta_with_previous_rental_in_minutes,
                previous.delay_at_checkout_in_minutes,
            ) {
                (Some(gap), Some(delay)) => Some(gap - delay),
                _ => None,
            };

            pairs.push(ConsecutiveRental {
                rental_id: current.rental_id,
                previous_rental_id: previous.rental_id,
                checkin_type: current.checkin_type.clone(),
                state: current.state.clone(),
                previous_checkin_type: previous.checkin_type.clone(),
                previous_state: previous.state.clone(),
                current_delay: current.delay_at_checkout_in_minutes,
                previous_delay: previous.delay_at_checkout_in_minutes,
                time_delta_with_previous_rental: current.time_delta_with_previous_rental_in_minutes,
                real_delay_between,
            });
        }
    }
    pairs
}

pub fn cancellation_impact(pairs: &[ConsecutiveRental]) -> CancellationImpact {
    let impacted = pairs.iter().filter(|p| p.is_impacted()).count();
    let impacted_canceled = pairs.iter().filter(|p| p.is_impacted() && p.is_canceled()).count();
    let unaffected = pairs.iter().filter(|p| p.is_unaffected()).count();
    let unaffected_canceled = pairs
        .iter()
        .filter(|p| p.is_unaffected() && p.is_canceled())
        .count();
    let total_canceled = pairs.iter().filter(|p| p.is_canceled()).count();

    CancellationImpact {
        consecutive_pairs: pairs.len(),
        impacted,
        impacted_canceled,
        unaffected,
        unaffected_canceled,
        total_canceled,
        cancel_rate_without_delay_percent: stats::percentage(unaffected_canceled, unaffected),
        cancel_rate_when_late_percent: stats::percentage(impacted_canceled, impacted),
        canceled_due_to_delay_percent: stats::percentage(impacted_canceled, total_canceled),
        canceled_other_reasons_percent: stats::percentage(
            total_canceled - impacted_canceled,
            total_canceled,
        ),
    }
}

pub fn late_checkin_breakdown(records: &[DelayRecord]) -> Vec<LateCheckinCount> {
    let mut groups: BTreeMap<(bool, String), usize> = BTreeMap::new();
    for record in records {
        let impacted = match (
            record.delay_at_checkout_in_minutes,
            record.time_delta_with_previous_rental_in_minutes,
        ) {
            (Some(delay), Some(gap)) => delay > gap,
            _ => false,
        };
        *groups.entry((impacted, checkin_type_or_unknown(record))).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|((impacted_by_previous_delay, checkin_type), count)| LateCheckinCount {
            impacted_by_previous_delay,
            checkin_type,
            count,
        })
        .collect()
}

/// Buckets `real_delay_between` over `[low, high]`; the last bin is closed on the right.
pub fn real_delay_histogram(
    pairs: &[ConsecutiveRental],
    low: f64,
    high: f64,
    bin_width: f64,
) -> Vec<HistogramBin> {
    if high <= low || bin_width <= 0.0 {
        return Vec::new();
    }

    let bin_count = ((high - low) / bin_width).ceil() as usize;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| {
            let start = low + i as f64 * bin_width;
            HistogramBin {
                start,
                end: (start + bin_width).min(high),
                canceled: 0,
                not_canceled: 0,
            }
        })
        .collect();

    for pair in pairs {
        let Some(value) = pair.real_delay_between.filter(|v| (low..=high).contains(v)) else {
            continue;
        };
        let index = (((value - low) / bin_width) as usize).min(bin_count - 1);
        if pair.is_canceled() {
            bins[index].canceled += 1;
        } else {
            bins[index].not_canceled += 1;
        }
    }
    bins
}

/// For each minimum gap `t` in `0, step, ..` below `max`, counts the pairs
/// that would no longer overlap if every gap were raised to `t`.
pub fn simulate_threshold(pairs: &[ConsecutiveRental], max: u32, step: u32) -> Vec<ThresholdImpact> {
    if step == 0 {
        return Vec::new();
    }

    let avoided_at = |threshold: f64| {
        pairs
            .iter()
            .filter(|p| match (p.time_delta_with_previous_rental, p.previous_delay) {
                (Some(gap), Some(delay)) => gap.max(threshold) - delay >= 0.0,
                _ => false,
            })
            .count()
    };

    let baseline = avoided_at(0.0);
    (0..max)
        .step_by(step as usize)
        .map(|threshold| {
            let late_avoided = avoided_at(threshold as f64);
            ThresholdImpact {
                threshold_minutes: threshold,
                late_avoided,
                additional_avoided: late_avoided.saturating_sub(baseline),
            }
        })
        .collect()
}

fn checkin_type_or_unknown(record: &DelayRecord) -> String {
    record
        .checkin_type
        .clone()
        .unwrap_or_else(|| UNKNOWN_CHECKIN_TYPE.to_string())
}
