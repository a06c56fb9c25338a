//! Bulk dataset view model
//!
//! Holds the loaded customer records and the derived chart data. Everything
//! derived is recomputed from scratch whenever the records, the grouping or
//! the sort order change; nothing is updated incrementally.

use crate::aggregation::{aggregate, mean_by_group, AggregationSpec, DatasetSummary, GroupBucket, MeanBucket, SortPolicy};
use crate::profile::{self, CATEGORICAL_ATTRIBUTES, OUTCOME_ATTRIBUTE};
use crate::record::ObservationRecord;

pub struct Dashboard {
    records: Vec<ObservationRecord>,
    spec: AggregationSpec,
    sort: SortPolicy,
    buckets: Vec<GroupBucket>,
    tenure_by_outcome: Vec<MeanBucket>,
    summary: DatasetSummary,
}

impl Dashboard {
    /// Explorer view: grouped by the first categorical attribute (Contract),
    /// highest churn count first
    ///
    /// Use `with_spec` for any other grouping or order.
    pub fn new(records: Vec<ObservationRecord>) -> Self {
        Self::with_spec(
            records,
            profile::churn_spec(CATEGORICAL_ATTRIBUTES[0]),
            SortPolicy::PositiveDesc,
        )
    }

    pub fn with_spec(records: Vec<ObservationRecord>, spec: AggregationSpec, sort: SortPolicy) -> Self {
        let mut dashboard = Self {
            records,
            spec,
            sort,
            buckets: Vec::new(),
            tenure_by_outcome: Vec::new(),
            summary: DatasetSummary::default(),
        };
        dashboard.recompute();
        dashboard
    }

    pub fn load_records(&mut self, records: Vec<ObservationRecord>) {
        self.records = records;
        self.recompute();
    }

    pub fn set_aggregation_spec(&mut self, spec: AggregationSpec) {
        self.spec = spec;
        self.recompute_buckets();
    }

    pub fn set_sort_policy(&mut self, sort: SortPolicy) {
        if self.sort != sort {
            self.sort = sort;
            self.recompute_buckets();
        }
    }

    /// Move grouping to the next (or previous) categorical attribute
    ///
    /// A group key outside the explorer list restarts at the first entry.
    pub fn cycle_group_key(&mut self, direction: i32) {
        let len = CATEGORICAL_ATTRIBUTES.len() as i32;
        let next = match CATEGORICAL_ATTRIBUTES.iter().position(|a| *a == self.spec.group_key) {
            Some(i) => (i as i32 + direction.signum()).rem_euclid(len) as usize,
            None => 0,
        };
        let spec = self.spec.regrouped(CATEGORICAL_ATTRIBUTES[next]);
        self.set_aggregation_spec(spec);
    }

    pub fn cycle_sort_policy(&mut self) {
        self.set_sort_policy(self.sort.next());
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn spec(&self) -> &AggregationSpec {
        &self.spec
    }

    pub fn sort_policy(&self) -> SortPolicy {
        self.sort
    }

    pub fn buckets(&self) -> &[GroupBucket] {
        &self.buckets
    }

    /// Average tenure of churned vs retained customers
    pub fn tenure_by_outcome(&self) -> &[MeanBucket] {
        &self.tenure_by_outcome
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    fn recompute(&mut self) {
        self.recompute_buckets();
        self.tenure_by_outcome = mean_by_group(&self.records, OUTCOME_ATTRIBUTE, "tenure");
        self.summary = DatasetSummary::compute(&self.records, &self.spec);
    }

    fn recompute_buckets(&mut self) {
        self.buckets = aggregate(&self.records, &self.spec, self.sort);
        log::debug!(
            "Regrouped {} records by {} into {} buckets ({})",
            self.records.len(),
            self.spec.group_key,
            self.buckets.len(),
            self.sort.as_str()
        );
    }
}
