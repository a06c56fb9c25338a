//! Summary buckets produced by the aggregation engine

use serde::Serialize;

/// Count summary for one distinct group-key value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupBucket {
    pub key: String,
    pub total: u64,
    pub positive: u64,
}

impl GroupBucket {
    pub fn new(key: String) -> Self {
        Self {
            key,
            total: 0,
            positive: 0,
        }
    }

    pub fn record(&mut self, positive: bool) {
        self.total += 1;
        if positive {
            self.positive += 1;
        }
    }

    pub fn negative(&self) -> u64 {
        self.total - self.positive
    }

    /// positive / total, or 0.0 for an empty bucket
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.positive as f64 / self.total as f64
        }
    }
}

/// Running mean of a numeric attribute for one group-key value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanBucket {
    pub key: String,
    pub count: u64,
    pub sum: f64,
}

impl MeanBucket {
    pub fn new(key: String) -> Self {
        Self { key, count: 0, sum: 0.0 }
    }

    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// sum / count, or 0.0 for an empty bucket
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bucket_rate_is_zero() {
        let bucket = GroupBucket::new("A".to_string());
        assert_eq!(bucket.rate(), 0.0);
        assert_eq!(bucket.negative(), 0);
        assert_eq!(MeanBucket::new("A".to_string()).mean(), 0.0);
    }

    #[test]
    fn test_bucket_counts() {
        let mut bucket = GroupBucket::new("A".to_string());
        bucket.record(true);
        bucket.record(false);
        bucket.record(false);
        assert_eq!(bucket.total, 3);
        assert_eq!(bucket.positive, 1);
        assert_eq!(bucket.negative(), 2);
        assert!((bucket.rate() - 1.0 / 3.0).abs() < 1e-12);
    }
}
