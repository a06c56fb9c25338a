//! Dataset-wide KPIs for the dashboard header

use super::spec::AggregationSpec;
use crate::record::ObservationRecord;

/// Headline figures over the whole bulk dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSummary {
    pub total: u64,
    pub positive: u64,
    pub mean_tenure: f64,
    pub mean_monthly_charges: f64,
}

impl DatasetSummary {
    /// Count records, positives under `spec`'s measure, and the two averages
    ///
    /// Records without the measure still count toward `total`; averages only
    /// include records holding a finite value. Empty input yields all zeros.
    pub fn compute(records: &[ObservationRecord], spec: &AggregationSpec) -> Self {
        let mut summary = Self::default();
        let (mut tenure_sum, mut tenure_n) = (0.0, 0u64);
        let (mut charge_sum, mut charge_n) = (0.0, 0u64);

        for record in records {
            summary.total += 1;
            if spec.is_positive(record) == Some(true) {
                summary.positive += 1;
            }
            if let Some(t) = record.get_f64("tenure").filter(|v| v.is_finite()) {
                tenure_sum += t;
                tenure_n += 1;
            }
            if let Some(c) = record.get_f64("MonthlyCharges").filter(|v| v.is_finite()) {
                charge_sum += c;
                charge_n += 1;
            }
        }

        summary.mean_tenure = if tenure_n > 0 { tenure_sum / tenure_n as f64 } else { 0.0 };
        summary.mean_monthly_charges = if charge_n > 0 { charge_sum / charge_n as f64 } else { 0.0 };
        summary
    }

    /// positive / total, or 0.0 when there are no records
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.positive as f64 / self.total as f64
        }
    }
}
