mod functions;

pub use functions::{avg, extrapolate, rate, sum, sum_by};

use crate::common::{Sample, Timestamp};
use crate::labels::Labels;
use crate::registry::Registry;

/// A regularly-spaced sequence of values for one label set. Timestamps are
/// implicit: the series starts at the anchor timestamp found by `query_last`
/// and advances by `eval_interval` per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub metric: Labels,
    pub points: Vec<f64>,
    pub eval_interval: i64,
}

impl PointSeries {
    pub fn last(&self) -> Option<f64> {
        self.points.last().copied()
    }
}

/// An ordered collection of [`PointSeries`] sharing the same evaluation step.
pub type Matrix = Vec<PointSeries>;

/// Selects series matching `name`/`selector` and returns, for each, an
/// evenly-spaced window of the last `last_s` seconds sampled every
/// `eval_interval_s`, synthesizing missing points by linear interpolation.
/// Series with no sample at or before `now - last_s` are omitted.
pub fn query_last(
    registry: &Registry,
    name: &str,
    selector: &Labels,
    last_s: i64,
    eval_interval_s: i64,
    now: Timestamp,
) -> Matrix {
    let start_t = now - last_s;
    let candidates = registry.select(name, selector);

    let mut matrix = Matrix::new();
    for series in candidates {
        let (labels, mut it) = {
            let series = series.lock().expect("series lock poisoned");
            (series.labels().clone(), series.iterator())
        };

        if !it.seek(start_t) {
            continue;
        }

        let anchor = it.at().expect("seek succeeded");
        let points = walk(&mut it, anchor, eval_interval_s);

        matrix.push(PointSeries {
            metric: labels,
            points,
            eval_interval: eval_interval_s,
        });
    }
    matrix
}

fn walk(it: &mut crate::series::MemSeriesIterator, anchor: Sample, eval_interval_s: i64) -> Vec<f64> {
    let mut points = Vec::new();
    let mut target = anchor.timestamp;
    let mut before: Option<Sample> = None;
    let mut current = Some(anchor);

    loop {
        let Some(sample) = current else { break };

        if sample.timestamp == target {
            points.push(sample.value);
            target += eval_interval_s;
            before = Some(sample);
            current = if it.next() { it.at() } else { None };
        } else if sample.timestamp < target {
            before = Some(sample);
            current = if it.next() { it.at() } else { None };
        } else {
            // sample.timestamp > target: interpolate between `before` (sB) and
            // this sample (sA). Does not consume the iterator: the same pair
            // may bracket several successive targets.
            let Some(sb) = before else { break };
            let sa = sample;
            let v = sb.value
                + (target - sb.timestamp) as f64 * (sa.value - sb.value) / (sa.timestamp - sb.timestamp) as f64;
            points.push(v);
            target += eval_interval_s;
        }
    }

    points
}
