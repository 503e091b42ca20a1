/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// A single `(t, v)` data point belonging to a series.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}
