use ahash::AHashMap;

use crate::labels::{Label, Labels};

use super::{Matrix, PointSeries};

/// Left-pads every series in `m` with zeros so all point vectors share the
/// length of the longest one.
pub fn extrapolate(m: &Matrix) -> Matrix {
    let d = m.iter().map(|ps| ps.points.len()).max().unwrap_or(0);
    m.iter()
        .map(|ps| {
            let mut points = vec![0.0; d - ps.points.len()];
            points.extend_from_slice(&ps.points);
            PointSeries {
                metric: ps.metric.clone(),
                points,
                eval_interval: ps.eval_interval,
            }
        })
        .collect()
}

/// The discrete derivative of a counter series, divided by the evaluation
/// step. The first point has no predecessor and is always `0`.
pub fn rate(ps: &PointSeries) -> PointSeries {
    let mut points = Vec::with_capacity(ps.points.len());
    for (i, &v) in ps.points.iter().enumerate() {
        if i == 0 {
            points.push(0.0);
        } else {
            points.push((v - ps.points[i - 1]) / ps.eval_interval as f64);
        }
    }
    PointSeries {
        metric: ps.metric.clone(),
        points,
        eval_interval: ps.eval_interval,
    }
}

/// Arithmetic mean of `ps.points`; `NAN` for an empty series.
pub fn avg(ps: &PointSeries) -> f64 {
    if ps.points.is_empty() {
        return f64::NAN;
    }
    ps.points.iter().sum::<f64>() / ps.points.len() as f64
}

/// Column-wise sum of every series in `m` (after left-padding to a common
/// length), with an empty label set.
pub fn sum(m: &Matrix) -> PointSeries {
    let eval_interval = m.first().map(|ps| ps.eval_interval).unwrap_or(0);
    let padded = extrapolate(m);
    let len = padded.first().map(|ps| ps.points.len()).unwrap_or(0);

    let mut points = vec![0.0; len];
    for ps in &padded {
        for (i, v) in ps.points.iter().enumerate() {
            points[i] += v;
        }
    }

    PointSeries {
        metric: Labels::default(),
        points,
        eval_interval,
    }
}

/// Groups series by the subset of their labels whose names appear in `keys`,
/// and sums within each group. The output series' labels are the group's key.
pub fn sum_by(m: &Matrix, keys: &[&str]) -> Matrix {
    let mut groups: AHashMap<Vec<Label>, Vec<PointSeries>> = AHashMap::new();

    for ps in m {
        let group_key: Vec<Label> = keys
            .iter()
            .filter_map(|k| ps.metric.value_of(k).map(|v| Label::new(*k, v)))
            .collect();
        groups.entry(group_key).or_default().push(ps.clone());
    }

    groups
        .into_iter()
        .map(|(key, series)| {
            let mut summed = sum(&series);
            summed.metric = key.into_iter().collect();
            summed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(points: &[f64], eval_interval: i64) -> PointSeries {
        PointSeries {
            metric: Labels::default(),
            points: points.to_vec(),
            eval_interval,
        }
    }

    #[test]
    fn rate_first_point_is_zero() {
        let r = rate(&ps(&[10.0, 15.0, 15.0, 25.0], 10));
        assert_eq!(r.points, vec![0.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn avg_of_empty_is_nan() {
        assert!(avg(&ps(&[], 10)).is_nan());
    }

    #[test]
    fn sum_is_commutative() {
        let a = ps(&[1.0, 2.0, 3.0], 10);
        let b = ps(&[4.0, 5.0, 6.0], 10);
        assert_eq!(sum(&vec![a.clone(), b.clone()]).points, sum(&vec![b, a]).points);
    }

    #[test]
    fn sum_by_groups_by_label_subset() {
        let a = PointSeries {
            metric: vec![Label::new("section", "/a"), Label::new("method", "GET")]
                .into_iter()
                .collect(),
            points: vec![1.0, 2.0],
            eval_interval: 10,
        };
        let b = PointSeries {
            metric: vec![Label::new("section", "/a"), Label::new("method", "POST")]
                .into_iter()
                .collect(),
            points: vec![10.0, 20.0],
            eval_interval: 10,
        };
        let c = PointSeries {
            metric: vec![Label::new("section", "/b")].into_iter().collect(),
            points: vec![5.0],
            eval_interval: 10,
        };

        let grouped = sum_by(&vec![a, b, c], &["section"]);
        assert_eq!(grouped.len(), 2);

        let a_group = grouped
            .iter()
            .find(|ps| ps.metric.value_of("section") == Some("/a"))
            .unwrap();
        assert_eq!(a_group.points, vec![11.0, 22.0]);
    }
}
