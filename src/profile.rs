//! Customer profile schema for the churn scoring contract
//!
//! Knows which attributes the scorer requires, what values each one accepts,
//! and how raw display-layer edits are coerced before they reach a record.

use crate::aggregation::{AggregationSpec, PositiveRule};
use crate::record::{EditValue, FieldValue, ObservationRecord};

/// Outcome column in the bulk dataset
pub const OUTCOME_ATTRIBUTE: &str = "Churn";

/// Attributes the scoring service requires, in form order
pub const REQUIRED_ATTRIBUTES: [&str; 19] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "tenure",
    "MonthlyCharges",
    "TotalCharges",
];

/// Grouping keys offered by the explorer, in menu order
pub const CATEGORICAL_ATTRIBUTES: [&str; 16] = [
    "Contract",
    "InternetService",
    "PaymentMethod",
    "TechSupport",
    "OnlineSecurity",
    "DeviceProtection",
    "OnlineBackup",
    "StreamingTV",
    "StreamingMovies",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "PhoneService",
    "MultipleLines",
    "gender",
    "PaperlessBilling",
];

const YES_NO: &[&str] = &["Yes", "No"];
const GENDERS: &[&str] = &["Female", "Male"];
const CONTRACTS: &[&str] = &["Month-to-month", "One year", "Two year"];
const INTERNET: &[&str] = &["DSL", "Fiber optic", "No"];
const INTERNET_ADDONS: &[&str] = &["Yes", "No", "No internet service"];
const MULTIPLE_LINES: &[&str] = &["Yes", "No", "No phone service"];
const PAYMENT_METHODS: &[&str] = &[
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

/// How a profile attribute is edited
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// One of a fixed set of text values
    Choice(&'static [&'static str]),
    /// Coded as 0/1
    Binary,
    /// Non-negative amount with slider bounds
    Amount { min: f64, max: f64, step: f64 },
}

pub fn field_kind(attribute: &str) -> Option<FieldKind> {
    let kind = match attribute {
        "gender" => FieldKind::Choice(GENDERS),
        "SeniorCitizen" => FieldKind::Binary,
        "Partner" | "Dependents" | "PhoneService" | "PaperlessBilling" => FieldKind::Choice(YES_NO),
        "MultipleLines" => FieldKind::Choice(MULTIPLE_LINES),
        "InternetService" => FieldKind::Choice(INTERNET),
        "OnlineSecurity" | "OnlineBackup" | "DeviceProtection" | "TechSupport" | "StreamingTV"
        | "StreamingMovies" => FieldKind::Choice(INTERNET_ADDONS),
        "Contract" => FieldKind::Choice(CONTRACTS),
        "PaymentMethod" => FieldKind::Choice(PAYMENT_METHODS),
        "tenure" => FieldKind::Amount { min: 0.0, max: 72.0, step: 1.0 },
        "MonthlyCharges" => FieldKind::Amount { min: 18.0, max: 120.0, step: 0.1 },
        "TotalCharges" => FieldKind::Amount { min: 0.0, max: 9000.0, step: 10.0 },
        _ => return None,
    };
    Some(kind)
}

pub fn required_attributes() -> Vec<String> {
    REQUIRED_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
}

/// Starting profile for a new session
pub fn default_profile() -> ObservationRecord {
    ObservationRecord::new()
        .with("gender", "Female")
        .with("SeniorCitizen", 0i64)
        .with("Partner", "Yes")
        .with("Dependents", "No")
        .with("PhoneService", "Yes")
        .with("MultipleLines", "No")
        .with("InternetService", "Fiber optic")
        .with("OnlineSecurity", "No")
        .with("OnlineBackup", "No")
        .with("DeviceProtection", "No")
        .with("TechSupport", "No")
        .with("StreamingTV", "No")
        .with("StreamingMovies", "No")
        .with("Contract", "Month-to-month")
        .with("PaperlessBilling", "Yes")
        .with("PaymentMethod", "Electronic check")
        .with("tenure", 1.0)
        .with("MonthlyCharges", 70.0)
        .with("TotalCharges", 70.0)
}

/// Coerce a display-layer edit into the value stored on the record
///
/// Returns `None` when the attribute should be removed (cleared field or
/// unparseable numeric text).
pub fn coerce_edit(attribute: &str, value: EditValue) -> Option<FieldValue> {
    let kind = field_kind(attribute);
    match value {
        EditValue::Clear => None,
        EditValue::Flag(flag) => match kind {
            Some(FieldKind::Binary) => Some(FieldValue::Number(if flag { 1.0 } else { 0.0 })),
            _ => Some(FieldValue::text(if flag { "Yes" } else { "No" })),
        },
        EditValue::Number(n) => Some(FieldValue::Number(clamp_amount(attribute, n))),
        EditValue::Text(text) => match kind {
            Some(FieldKind::Binary) | Some(FieldKind::Amount { .. }) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .map(|n| FieldValue::Number(clamp_amount(attribute, n)))
            }
            _ => Some(FieldValue::Text(text)),
        },
    }
}

/// Merge one edit into `record`, removing the attribute when the edit clears it
pub fn apply_edit(record: &mut ObservationRecord, attribute: &str, value: EditValue) {
    match coerce_edit(attribute, value) {
        Some(value) => record.set(attribute, value),
        None => {
            record.remove(attribute);
        }
    }
}

// Negative numbers clamp to zero everywhere except SeniorCitizen
fn clamp_amount(attribute: &str, n: f64) -> f64 {
    if attribute != "SeniorCitizen" && n < 0.0 {
        0.0
    } else {
        n
    }
}

/// Next value for a keyboard-driven adjustment (`direction` is +1 or -1)
pub fn step_value(attribute: &str, current: Option<&FieldValue>, direction: i32) -> Option<EditValue> {
    match field_kind(attribute)? {
        FieldKind::Choice(options) => {
            let position = current
                .and_then(FieldValue::as_str)
                .and_then(|s| options.iter().position(|o| *o == s))
                .unwrap_or(0) as i32;
            let len = options.len() as i32;
            let next = (position + direction).rem_euclid(len) as usize;
            Some(EditValue::Text(options[next].to_string()))
        }
        FieldKind::Binary => {
            let on = current.map(FieldValue::is_truthy).unwrap_or(false);
            Some(EditValue::Flag(!on))
        }
        FieldKind::Amount { min, max, step } => {
            let value = current.and_then(FieldValue::as_f64).unwrap_or(min);
            let next = (value + step * direction as f64).clamp(min, max);
            // keep 0.1 steps from drifting into 70.30000000000001
            Some(EditValue::Number((next * 100.0).round() / 100.0))
        }
    }
}

/// True when TotalCharges looks too small for the tenure and monthly charge
///
/// Treats a zero tenure as one month. The request is still valid; callers
/// only warn.
pub fn totals_look_low(record: &ObservationRecord) -> bool {
    let (Some(total), Some(monthly), Some(tenure)) = (
        record.get_f64("TotalCharges"),
        record.get_f64("MonthlyCharges"),
        record.get_f64("tenure"),
    ) else {
        return false;
    };
    let months = if tenure == 0.0 { 1.0 } else { tenure };
    total < monthly * months * 0.8
}

/// Churn counts grouped by `group_key`
pub fn churn_spec(group_key: &str) -> AggregationSpec {
    AggregationSpec::new(group_key, OUTCOME_ATTRIBUTE, PositiveRule::Equals(FieldValue::text("Yes")))
}
