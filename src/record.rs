//! Observation records - the flat attribute maps shared by the live form and
//! the bulk dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar attribute value
///
/// Booleans never appear directly: the scoring contract codes them either as
/// `"Yes"`/`"No"` text or as `0`/`1` numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Returns false only for NaN/infinite numbers
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.is_finite(),
            FieldValue::Text(_) => true,
        }
    }

    /// Equality with text/number coercion: `"1"` matches `1`, `" Yes"` matches `"Yes"`
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
            (FieldValue::Number(n), text @ FieldValue::Text(_))
            | (text @ FieldValue::Text(_), FieldValue::Number(n)) => {
                text.as_f64().map(|parsed| parsed == *n).unwrap_or(false)
            }
        }
    }

    /// Truthiness used by boolean-coded outcome columns
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true") || s == "1"
            }
        }
    }

    /// Label used when this value becomes a group key
    ///
    /// Integral numbers drop the fractional part so `1.0` groups as `"1"`.
    pub fn label(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            FieldValue::Number(n) => format!("{}", n),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// Attribute name → scalar value
///
/// Serializes as a flat JSON object, which is exactly the payload the scoring
/// service expects. Edits never mutate a snapshot that was already handed out:
/// callers clone, change, and replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl ObservationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: &str, value: impl Into<FieldValue>) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&FieldValue> {
        self.fields.get(attribute)
    }

    pub fn get_f64(&self, attribute: &str) -> Option<f64> {
        self.fields.get(attribute).and_then(FieldValue::as_f64)
    }

    pub fn set(&mut self, attribute: &str, value: impl Into<FieldValue>) {
        self.fields.insert(attribute.to_string(), value.into());
    }

    pub fn remove(&mut self, attribute: &str) -> Option<FieldValue> {
        self.fields.remove(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.fields.contains_key(attribute)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Required attributes that are absent or hold a non-finite number
    pub fn missing_attributes(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|attr| !self.fields.get(attr.as_str()).is_some_and(FieldValue::is_finite))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self, required: &[String]) -> bool {
        self.missing_attributes(required).is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for ObservationRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A value coming from the display layer before schema coercion
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    Text(String),
    Number(f64),
    Flag(bool),
    /// The user emptied the field
    Clear,
}

impl From<&str> for EditValue {
    fn from(value: &str) -> Self {
        EditValue::Text(value.to_string())
    }
}

impl From<f64> for EditValue {
    fn from(value: f64) -> Self {
        EditValue::Number(value)
    }
}

impl From<bool> for EditValue {
    fn from(value: bool) -> Self {
        EditValue::Flag(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(attrs: &[&str]) -> Vec<String> {
        attrs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_loose_equality_coerces_numeric_text() {
        assert!(FieldValue::from("1").loosely_equals(&FieldValue::Number(1.0)));
        assert!(FieldValue::Number(0.0).loosely_equals(&FieldValue::from("0")));
        assert!(FieldValue::from(" Yes").loosely_equals(&FieldValue::from("Yes")));
        assert!(!FieldValue::from("Yes").loosely_equals(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_truthiness() {
        assert!(FieldValue::from("Yes").is_truthy());
        assert!(FieldValue::Number(1.0).is_truthy());
        assert!(!FieldValue::from("No").is_truthy());
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(!FieldValue::Number(f64::NAN).is_truthy());
    }

    #[test]
    fn test_labels_drop_integral_fraction() {
        assert_eq!(FieldValue::Number(1.0).label(), "1");
        assert_eq!(FieldValue::Number(70.5).label(), "70.5");
        assert_eq!(FieldValue::from("Two year").label(), "Two year");
    }

    #[test]
    fn test_missing_attributes_reports_absent_and_non_finite() {
        let record = ObservationRecord::new()
            .with("tenure", f64::NAN)
            .with("Contract", "One year");

        let missing = record.missing_attributes(&required(&["tenure", "Contract", "gender"]));
        assert_eq!(missing, vec!["tenure", "gender"]);
        assert!(!record.is_complete(&required(&["Contract", "gender"])));
        assert!(record.is_complete(&required(&["Contract"])));
    }

    #[test]
    fn test_missing_attributes_outlive_required_list() {
        let record = ObservationRecord::new().with("tenure", 3.0);

        let missing = {
            let required = required(&["tenure", "Contract"]);
            record.missing_attributes(&required)
        };
        assert_eq!(missing, vec!["Contract".to_string()]);
    }

    #[test]
    fn test_record_serializes_as_flat_object() {
        let record = ObservationRecord::new()
            .with("SeniorCitizen", 0i64)
            .with("gender", "Female");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"SeniorCitizen": 0.0, "gender": "Female"}));

        let back: ObservationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
