use crate::common::Timestamp;

/// A monitor's alert state. `Unset` is the initial ∅ state before the first
/// threshold breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    Unset,
    Triggered,
    Recovered,
}

/// A published snapshot of a [`Monitor`] at the moment of a state
/// transition (or a re-emitted `Triggered`).
#[derive(Debug, Clone)]
pub struct Alert {
    pub name: String,
    pub status: MonitorStatus,
    pub current: f64,
    pub threshold: f64,
    pub status_time: Timestamp,
}

/// Periodically evaluates a user-supplied expression against a threshold,
/// producing `Triggered`/`Recovered` events on state transitions (and
/// re-emitting `Triggered` on every tick while still over threshold).
pub struct Monitor {
    name: String,
    eval_fn: Box<dyn Fn() -> f64 + Send>,
    duration_s: u64,
    threshold: f64,
    current: f64,
    status: MonitorStatus,
    status_time: Timestamp,
}

impl Monitor {
    pub fn new(
        name: impl Into<String>,
        duration_s: u64,
        threshold: f64,
        eval_fn: Box<dyn Fn() -> f64 + Send>,
    ) -> Self {
        Self {
            name: name.into(),
            eval_fn,
            duration_s,
            threshold,
            current: 0.0,
            status: MonitorStatus::Unset,
            status_time: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_s(&self) -> u64 {
        self.duration_s
    }

    /// Evaluates the monitor, stamps `status_time = now`, and returns a
    /// snapshot to publish iff this tick represents a `Triggered` state (new
    /// or repeated) or a fresh `Recovered` transition.
    pub fn tick(&mut self, now: Timestamp) -> Option<Alert> {
        self.current = (self.eval_fn)();
        self.status_time = now;
        let breached = self.current >= self.threshold;

        let (new_status, emit) = match (self.status, breached) {
            (_, true) => (MonitorStatus::Triggered, true),
            (MonitorStatus::Triggered, false) => (MonitorStatus::Recovered, true),
            (other, false) => (other, false),
        };

        self.status = new_status;
        if emit {
            Some(Alert {
                name: self.name.clone(),
                status: self.status,
                current: self.current,
                threshold: self.threshold,
                status_time: self.status_time,
            })
        } else {
            None
        }
    }
}
