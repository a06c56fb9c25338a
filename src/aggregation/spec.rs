//! Aggregation parameters

use crate::record::{FieldValue, ObservationRecord};

/// Decides whether a record's measure value counts as "positive"
#[derive(Debug, Clone, PartialEq)]
pub enum PositiveRule {
    /// Measure equals this literal (text/number coercion applies)
    Equals(FieldValue),
    /// Non-zero number, or "Yes"/"true"/"1"
    Truthy,
}

impl PositiveRule {
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            PositiveRule::Equals(expected) => value.loosely_equals(expected),
            PositiveRule::Truthy => value.is_truthy(),
        }
    }
}

/// What to group by and which outcome to count
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub group_key: String,
    pub measure_key: String,
    pub positive: PositiveRule,
}

impl AggregationSpec {
    pub fn new(group_key: &str, measure_key: &str, positive: PositiveRule) -> Self {
        Self {
            group_key: group_key.to_string(),
            measure_key: measure_key.to_string(),
            positive,
        }
    }

    /// Same measure, different grouping key
    pub fn regrouped(&self, group_key: &str) -> Self {
        Self {
            group_key: group_key.to_string(),
            ..self.clone()
        }
    }

    /// Whether the record's measure is positive; `None` when the measure is absent
    pub fn is_positive(&self, record: &ObservationRecord) -> Option<bool> {
        record.get(&self.measure_key).map(|v| self.positive.matches(v))
    }
}

/// Bucket ordering
///
/// Every sort except `FirstSeen` is stable, so ties keep first-seen order and
/// identical input always produces identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortPolicy {
    /// Order in which each key first appeared in the input
    #[default]
    FirstSeen,
    /// Highest positive count first (explorer chart)
    PositiveDesc,
    /// Largest groups first
    TotalDesc,
    /// Highest positive rate first
    RateDesc,
    /// Lexicographic by key
    KeyAsc,
}

impl SortPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortPolicy::FirstSeen => "first-seen",
            SortPolicy::PositiveDesc => "positive-desc",
            SortPolicy::TotalDesc => "total-desc",
            SortPolicy::RateDesc => "rate-desc",
            SortPolicy::KeyAsc => "key-asc",
        }
    }

    pub fn all() -> [SortPolicy; 5] {
        [
            SortPolicy::FirstSeen,
            SortPolicy::PositiveDesc,
            SortPolicy::TotalDesc,
            SortPolicy::RateDesc,
            SortPolicy::KeyAsc,
        ]
    }

    /// Next policy in `all()` order, wrapping around
    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}
