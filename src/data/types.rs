use alloy::primitives::{Bytes, B256, U256};

/// A log emitted by the watched contract.
#[derive(Debug, Clone)]
pub struct ContractLog {
    pub block_number: u64,
    pub block_timestamp: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl ContractLog {
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// One decoded entry of the timeline's recent-activity list.
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    pub block_number: u64,
    pub timestamp: Option<u64>,
    pub name: String,
    pub transaction_hash: Option<B256>,
}

/// Event counts bucketed over a block range, plus the most recent events.
#[derive(Debug, Clone)]
pub struct TimelineData {
    pub from_block: u64,
    pub to_block: u64,
    pub buckets: Vec<TimelineBucket>,
    pub recent: Vec<TimelineEvent>,
    pub total_events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineBucket {
    pub start_block: u64,
    pub end_block: u64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub supply: f64,
    pub value: f64,
}

/// Samples of the curve function over the configured supply range.
#[derive(Debug, Clone)]
pub struct CurveData {
    pub function: String,
    pub points: Vec<CurvePoint>,
    /// Current position on the curve, when the contract exposes `totalSupply()`.
    pub current_supply: Option<U256>,
}

impl CurveData {
    /// `(min, max)` of the sampled values; `(0, 1)` when there are no points.
    pub fn value_bounds(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for point in &self.points {
            min = min.min(point.value);
            max = max.max(point.value);
        }
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if (max - min).abs() < f64::EPSILON {
            return (min, min + 1.0);
        }
        (min, max)
    }
}
