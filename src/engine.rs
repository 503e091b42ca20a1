use std::sync::Arc;

use crate::common::time::now_unix;
use crate::common::Timestamp;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::filter::{Filter, HttpAccessLogFilter};
use crate::labels::Labels;
use crate::monitor::{AlertManager, Monitor};
use crate::printer::{Graph, Summary, Table};
use crate::query::{query_last, rate, sum, sum_by};
use crate::registry::{CounterVec, Registry};

const RENDER_WINDOW_TICKS: i64 = 60;

/// Owns the registry and the request-counting collector for one process.
/// There is no process-wide singleton: every test constructs its own engine.
pub struct Engine {
    registry: Arc<Registry>,
    config: EngineConfig,
    request_total: Arc<CounterVec>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new(config.chunk_range_secs));
        let request_total = Arc::new(CounterVec::new(
            "request_total",
            "total HTTP requests observed, by method/section/status",
            &["method", "section", "status"],
        ));
        registry.register(request_total.clone())?;

        Ok(Self {
            registry,
            config,
            request_total,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the filter named in the configuration.
    pub fn build_filter(&self) -> Result<Arc<dyn Filter>> {
        match self.config.filter_name.as_str() {
            "http-access-log" => Ok(Arc::new(HttpAccessLogFilter::new(self.request_total.clone()))),
            other => Err(Error::Config(format!("unknown filter: {other}"))),
        }
    }

    /// Registers the single alert monitor described by the configuration
    /// (total request rate vs. `alert_threshold`) and returns the manager.
    pub fn build_alert_manager(&self) -> AlertManager {
        let mut manager = AlertManager::new();
        let registry = self.registry.clone();
        let step = self.config.evaluate_interval_s;

        manager.register(Monitor::new(
            "request-rate",
            self.config.alert_evaluate_interval_s,
            self.config.alert_threshold,
            Box::new(move || current_request_rate(&registry, step)),
        ));
        manager
    }

    /// Assembles a render-ready [`Summary`] from the current series state.
    pub fn assemble_summary(&self, now: Timestamp) -> Summary {
        assemble_summary(&self.registry, self.config.evaluate_interval_s, now)
    }
}

fn current_request_rate(registry: &Registry, step: i64) -> f64 {
    let now = now_unix();
    let m = query_last(registry, "request_total", &Labels::default(), step * 2, step, now);
    if m.is_empty() {
        return 0.0;
    }
    rate(&sum(&m)).last().unwrap_or(0.0)
}

/// Per-render-tick summary assembly: total request rate plus a breakdown by
/// URI section.
fn assemble_summary(registry: &Registry, eval_interval_s: i64, now: Timestamp) -> Summary {
    let window = RENDER_WINDOW_TICKS * eval_interval_s;
    let matrix = query_last(
        registry,
        "request_total",
        &Labels::default(),
        window,
        eval_interval_s,
        now,
    );
    if matrix.is_empty() {
        return Summary::default();
    }

    let total_rate = rate(&sum(&matrix));
    let current_total = total_rate.last().unwrap_or(0.0);

    let mut table = Table {
        title: "request rate per second grouped by section".to_string(),
        header: vec!["section".to_string(), "rate".to_string()],
        data: vec![vec!["*".to_string(), format!("{current_total:.3}")]],
    };

    for ps in sum_by(&matrix, &["section"]) {
        let r = rate(&ps);
        let current = r.last().unwrap_or(0.0);
        let section = ps.metric.value_of("section").unwrap_or("?").to_string();
        table.data.push(vec![section, format!("{current:.3}")]);
    }

    Summary {
        tables: vec![table],
        graphs: vec![Graph {
            title: "total request rate".to_string(),
            data: total_rate.points,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> EngineConfig {
        EngineConfig {
            log_file: "/tmp/access.log".into(),
            filter_name: "http-access-log".into(),
            collect_interval: Duration::from_secs(5),
            evaluate_interval_s: 10,
            alert_threshold: 10.0,
            alert_evaluate_interval_s: 120,
            chunk_range_secs: 10_000,
        }
    }

    #[test]
    fn empty_registry_yields_empty_summary() {
        let engine = Engine::new(config()).unwrap();
        assert!(engine.assemble_summary(1_000).is_empty());
    }

    #[test]
    fn summary_reports_rate_by_section() {
        let engine = Engine::new(config()).unwrap();
        let desc_id = crate::labels::hash_name("request_total");

        let a_labels: Labels = vec![
            crate::labels::Label::new("method", "GET"),
            crate::labels::Label::new("section", "/a"),
            crate::labels::Label::new("status", "200"),
        ]
        .into_iter()
        .collect();
        let a = engine.registry().find_or_create_series(desc_id, &a_labels);
        {
            let mut s = a.lock().unwrap();
            for (t, v) in [(0, 0.0), (10, 5.0), (20, 10.0)] {
                s.append(t, v);
            }
        }

        let summary = engine.assemble_summary(20);
        assert!(!summary.is_empty());
        assert_eq!(summary.tables.len(), 1);
        assert_eq!(summary.tables[0].data.len(), 2); // the "*" row plus one section
    }
}
