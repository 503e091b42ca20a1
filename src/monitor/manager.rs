use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use tracing::debug;

use crate::common::time::now_unix;

use super::monitor::{Alert, Monitor};

/// Owns every registered [`Monitor`] and, once started, gives each its own
/// ticker thread. Threads are daemon-like: there is no graceful shutdown for
/// monitor loops beyond process exit, matching the gather loop (see the
/// concurrency model).
#[derive(Default)]
pub struct AlertManager {
    monitors: Vec<Monitor>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a monitor. Must be called before [`AlertManager::start`].
    pub fn register(&mut self, monitor: Monitor) {
        self.monitors.push(monitor);
    }

    /// Spawns one ticker thread per registered monitor and returns the
    /// shared channel they publish [`Alert`]s onto.
    pub fn start(self) -> Receiver<Alert> {
        let (tx, rx) = unbounded();

        for mut monitor in self.monitors {
            let tx = tx.clone();
            thread::spawn(move || {
                debug!(monitor = monitor.name(), "monitor thread starting");
                loop {
                    thread::sleep(Duration::from_secs(monitor.duration_s()));
                    let now = now_unix();
                    if let Some(alert) = monitor.tick(now) {
                        debug!(monitor = monitor.name(), status = ?alert.status, "monitor tick");
                        if tx.send(alert).is_err() {
                            break;
                        }
                    }
                }
            });
        }

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Drives a monitor through `AlertManager::register`/`start` end to end,
    /// exercising the ticker thread and the channel handoff (not just
    /// `Monitor::tick` directly): threshold `10`, duration `1s`, a scripted
    /// `eval_fn` returning `15` for 3 ticks then `5` (S5).
    #[test]
    fn start_delivers_scripted_alert_sequence_over_channel() {
        let values = [15.0, 15.0, 15.0, 5.0];
        let idx = AtomicUsize::new(0);

        let monitor = Monitor::new(
            "request-rate",
            1,
            10.0,
            Box::new(move || {
                let i = idx.fetch_add(1, Ordering::Relaxed).min(values.len() - 1);
                values[i]
            }),
        );

        let mut manager = AlertManager::new();
        manager.register(monitor);
        let rx = manager.start();

        let mut statuses = Vec::new();
        for _ in 0..4 {
            let alert = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("alert channel closed before the scripted sequence completed");
            statuses.push(alert.status);
        }

        assert_eq!(
            statuses,
            vec![
                MonitorStatus::Triggered,
                MonitorStatus::Triggered,
                MonitorStatus::Triggered,
                MonitorStatus::Recovered,
            ]
        );
    }
}
