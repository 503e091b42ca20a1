use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::labels::{Label, Labels};

use super::desc::Desc;

/// A monotonically increasing counter for one fixed label combination.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self) -> f64 {
        self.value.load(Ordering::Relaxed) as f64
    }
}

/// One observed sample from a [`Collector`], ready to be appended to a series.
#[derive(Debug, Clone)]
pub struct Metric {
    pub desc_id: u64,
    pub labels: Labels,
    pub value: f64,
}

/// An entity that can describe its metric family and snapshot its current
/// values. `CounterVec` is the only collector this crate needs.
pub trait Collector: Send + Sync {
    fn describe(&self) -> Desc;
    fn collect(&self) -> Vec<Metric>;
}

/// A counter keyed by a fixed tuple of label values, e.g.
/// `request_total{method,section,status}`.
pub struct CounterVec {
    desc: Desc,
    counters: Mutex<Vec<(Vec<String>, Arc<Counter>)>>,
}

impl CounterVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        Self {
            desc: Desc::new(name, help, label_names),
            counters: Mutex::new(Vec::new()),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Returns the counter for `label_values`, creating it if this is the
    /// first time this exact combination has been observed.
    pub fn with_label_values(&self, label_values: &[&str]) -> Arc<Counter> {
        let key: Vec<String> = label_values.iter().map(|s| s.to_string()).collect();
        let mut counters = self.counters.lock().expect("counter vec lock poisoned");
        if let Some((_, c)) = counters.iter().find(|(k, _)| k == &key) {
            return c.clone();
        }
        let counter = Arc::new(Counter::default());
        counters.push((key, counter.clone()));
        counter
    }

    fn labels_for(&self, values: &[String]) -> Labels {
        self.desc
            .label_names
            .iter()
            .zip(values.iter())
            .map(|(name, value)| Label::new(name.clone(), value.clone()))
            .collect()
    }
}

impl Collector for CounterVec {
    fn describe(&self) -> Desc {
        self.desc.clone()
    }

    fn collect(&self) -> Vec<Metric> {
        let counters = self.counters.lock().expect("counter vec lock poisoned");
        counters
            .iter()
            .map(|(values, counter)| Metric {
                desc_id: self.desc.id,
                labels: self.labels_for(values),
                value: counter.value(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_same_counter_for_same_labels() {
        let cv = CounterVec::new("request_total", "help", &["method", "status"]);
        let a = cv.with_label_values(&["GET", "200"]);
        a.inc();
        a.inc();
        let b = cv.with_label_values(&["GET", "200"]);
        assert_eq!(b.value(), 2.0);
    }

    #[test]
    fn distinct_labels_get_distinct_counters() {
        let cv = CounterVec::new("request_total", "help", &["method"]);
        cv.with_label_values(&["GET"]).inc();
        cv.with_label_values(&["POST"]).inc();
        cv.with_label_values(&["POST"]).inc();

        let snap = cv.collect();
        let get = snap.iter().find(|m| m.labels.value_of("method") == Some("GET")).unwrap();
        let post = snap.iter().find(|m| m.labels.value_of("method") == Some("POST")).unwrap();
        assert_eq!(get.value, 1.0);
        assert_eq!(post.value, 2.0);
    }
}
