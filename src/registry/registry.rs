use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use ahash::AHashMap;
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::{debug, warn};

use crate::common::time::now_unix;
use crate::error::{Error, Result};
use crate::labels::Labels;
use crate::series::MemSeries;

use super::counter::{Collector, Metric};
use super::desc::Desc;

/// Holds every registered [`Collector`] and the series produced by sampling
/// them. Readers (`select`) and writers (`register`, find-or-create) share a
/// single reader-writer lock per map, per the concurrency model.
pub struct Registry {
    collectors: RwLock<AHashMap<u64, Arc<dyn Collector>>>,
    series_set: RwLock<AHashMap<u64, Vec<Arc<Mutex<MemSeries>>>>>,
    chunk_range_secs: i64,
    next_series_id: AtomicU64,
}

impl Registry {
    pub fn new(chunk_range_secs: i64) -> Self {
        Self {
            collectors: RwLock::new(AHashMap::new()),
            series_set: RwLock::new(AHashMap::new()),
            chunk_range_secs,
            next_series_id: AtomicU64::new(1),
        }
    }

    /// Registers `collector`. Fails if another collector already registered
    /// a descriptor with the same id (i.e. the same metric name).
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<Desc> {
        let desc = collector.describe();
        let mut collectors = self.collectors.write().expect("registry lock poisoned");
        if collectors.contains_key(&desc.id) {
            return Err(Error::DuplicateRegistration(desc.name.clone()));
        }
        collectors.insert(desc.id, collector);
        self.series_set
            .write()
            .expect("registry lock poisoned")
            .entry(desc.id)
            .or_default();
        Ok(desc)
    }

    /// Series registered under `name` whose labels satisfy `selector`
    /// (see [`Labels::matches`]).
    pub fn select(&self, name: &str, selector: &Labels) -> Vec<Arc<Mutex<MemSeries>>> {
        let desc_id = crate::labels::hash_name(name);
        let series_set = self.series_set.read().expect("registry lock poisoned");
        match series_set.get(&desc_id) {
            Some(list) => list
                .iter()
                .filter(|s| {
                    let series = s.lock().expect("series lock poisoned");
                    series.labels().matches(selector)
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn find_or_create_series(&self, desc_id: u64, labels: &Labels) -> Arc<Mutex<MemSeries>> {
        {
            let series_set = self.series_set.read().expect("registry lock poisoned");
            if let Some(list) = series_set.get(&desc_id) {
                if let Some(existing) = list.iter().find(|s| {
                    let series = s.lock().expect("series lock poisoned");
                    series.labels() == labels
                }) {
                    return existing.clone();
                }
            }
        }

        let mut series_set = self.series_set.write().expect("registry lock poisoned");
        let list = series_set.entry(desc_id).or_default();
        if let Some(existing) = list.iter().find(|s| {
            let series = s.lock().expect("series lock poisoned");
            series.labels() == labels
        }) {
            return existing.clone();
        }

        let id = self.next_series_id.fetch_add(1, Ordering::Relaxed);
        let series = Arc::new(Mutex::new(MemSeries::new(
            id,
            labels.clone(),
            self.chunk_range_secs,
        )));
        list.push(series.clone());
        series
    }

    /// Spawns the gather loop: one producer thread per collector ticking
    /// every `collect_interval`, all feeding a shared consumer thread that
    /// appends samples to the matching series. Runs until `stop` closes;
    /// both sides are daemon-like and are abandoned at process exit.
    pub fn start_gather(self: &Arc<Self>, collect_interval: Duration, stop: Receiver<()>) -> Result<()> {
        if collect_interval.is_zero() {
            return Err(Error::InvalidCollectInterval);
        }

        let (tx, rx) = bounded::<Metric>(1024);

        let collectors: Vec<Arc<dyn Collector>> = self
            .collectors
            .read()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect();

        for collector in collectors {
            let tx = tx.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                debug!("gather producer thread starting");
                loop {
                    if stop.try_recv() != Err(TryRecvError::Empty) {
                        break;
                    }
                    thread::sleep(collect_interval);
                    for metric in collector.collect() {
                        if tx.send(metric).is_err() {
                            return;
                        }
                    }
                }
                debug!("gather producer thread stopping");
            });
        }
        drop(tx);

        let registry = self.clone();
        thread::spawn(move || {
            debug!("gather consumer thread starting");
            for metric in rx.iter() {
                let series = registry.find_or_create_series(metric.desc_id, &metric.labels);
                let mut series = series.lock().expect("series lock poisoned");
                if !series.append(now_unix(), metric.value) {
                    warn!(
                        labels = %metric.labels,
                        "dropped out-of-order sample"
                    );
                }
            }
            debug!("gather consumer thread stopping");
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CounterVec;

    #[test]
    fn duplicate_registration_fails() {
        let registry = Registry::new(10_000);
        let a = Arc::new(CounterVec::new("request_total", "h", &["method"]));
        let b = Arc::new(CounterVec::new("request_total", "h2", &["status"]));
        registry.register(a).unwrap();
        let err = registry.register(b).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(_)));
    }

    #[test]
    fn select_filters_by_labels() {
        let registry = Registry::new(10_000);
        let cv = Arc::new(CounterVec::new("request_total", "h", &["method"]));
        let desc = registry.register(cv.clone()).unwrap();
        cv.with_label_values(&["GET"]).inc();

        let labels: Labels = vec![crate::labels::Label::new("method", "GET")]
            .into_iter()
            .collect();
        registry.find_or_create_series(desc.id, &labels);

        let matches = registry.select("request_total", &labels);
        assert_eq!(matches.len(), 1);

        let other: Labels = vec![crate::labels::Label::new("method", "POST")]
            .into_iter()
            .collect();
        assert!(registry.select("request_total", &other).is_empty());
    }
}
