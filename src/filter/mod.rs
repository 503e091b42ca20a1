mod http_access_log;

pub use http_access_log::HttpAccessLogFilter;

use crate::common::Timestamp;
use crate::error::Result;

/// Converts one tailed log line into counter increments (or other side
/// effects). Errors are logged and the line is skipped; they never stop the
/// tailer.
pub trait Filter: Send + Sync {
    fn handle_entry(&self, time: Timestamp, line: &str) -> Result<()>;
}
