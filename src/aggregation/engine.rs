//! Single-pass grouping over observation records

use super::bucket::{GroupBucket, MeanBucket};
use super::spec::{AggregationSpec, SortPolicy};
use crate::record::{FieldValue, ObservationRecord};
use std::collections::HashMap;

/// Group `records` by `spec.group_key` and count positives of `spec.measure_key`
///
/// Records missing either key, or whose group key is a non-finite number, are
/// skipped. Buckets come out in the order `sort` asks for; ties (and
/// `SortPolicy::FirstSeen`) follow first appearance in `records`.
pub fn aggregate(records: &[ObservationRecord], spec: &AggregationSpec, sort: SortPolicy) -> Vec<GroupBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<GroupBucket> = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        let (Some(key), Some(positive)) = (group_label(record, &spec.group_key), spec.is_positive(record)) else {
            skipped += 1;
            continue;
        };

        let slot = *index.entry(key).or_insert_with_key(|key| {
            buckets.push(GroupBucket::new(key.clone()));
            buckets.len() - 1
        });
        buckets[slot].record(positive);
    }

    if skipped > 0 {
        log::debug!(
            "aggregate: skipped {} of {} records (group_key={}, measure_key={})",
            skipped,
            records.len(),
            spec.group_key,
            spec.measure_key
        );
    }

    sort_buckets(&mut buckets, sort);
    buckets
}

/// Mean of `value_key` per distinct `group_key` value, in first-seen order
///
/// Records missing either key, or whose value is not a finite number, are
/// skipped. Used for the average-tenure-by-outcome view.
pub fn mean_by_group(records: &[ObservationRecord], group_key: &str, value_key: &str) -> Vec<MeanBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<MeanBucket> = Vec::new();

    for record in records {
        let Some(key) = group_label(record, group_key) else {
            continue;
        };
        let Some(value) = record.get_f64(value_key).filter(|v| v.is_finite()) else {
            continue;
        };

        let slot = *index.entry(key).or_insert_with_key(|key| {
            buckets.push(MeanBucket::new(key.clone()));
            buckets.len() - 1
        });
        buckets[slot].record(value);
    }

    buckets
}

fn group_label(record: &ObservationRecord, group_key: &str) -> Option<String> {
    record
        .get(group_key)
        .filter(|v| v.is_finite())
        .map(FieldValue::label)
}

fn sort_buckets(buckets: &mut [GroupBucket], sort: SortPolicy) {
    match sort {
        SortPolicy::FirstSeen => {}
        SortPolicy::PositiveDesc => buckets.sort_by(|a, b| b.positive.cmp(&a.positive)),
        SortPolicy::TotalDesc => buckets.sort_by(|a, b| b.total.cmp(&a.total)),
        SortPolicy::RateDesc => buckets.sort_by(|a, b| b.rate().total_cmp(&a.rate())),
        SortPolicy::KeyAsc => buckets.sort_by(|a, b| a.key.cmp(&b.key)),
    }
}
