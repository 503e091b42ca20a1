use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{debug, warn};

use crate::common::time::now_unix;
use crate::error::{Error, Result};
use crate::filter::Filter;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Follows a growing log file by polling for new bytes at a fixed interval,
/// dispatching complete lines to a [`Filter`]. Does not handle inode-level
/// rotation: if the file is replaced under the same path, this tailer keeps
/// reading the original inode until it stops growing.
pub struct Tailer {
    path: PathBuf,
}

impl Tailer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Runs until `stop` is closed or a terminal I/O error occurs. The
    /// filter is never invoked after a stop signal is observed.
    pub fn run(&self, filter: Arc<dyn Filter>, stop: Receiver<()>) -> Result<()> {
        let mut file = File::open(&self.path)
            .map_err(|e| Error::Tailer(format!("opening {}: {e}", self.path.display())))?;
        file.seek(SeekFrom::End(0))
            .map_err(|e| Error::Tailer(format!("seeking {}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), "tailer starting");

        let mut pending = String::new();
        let mut chunk = [0u8; 8192];

        loop {
            if stop.try_recv() != Err(TryRecvError::Empty) {
                break;
            }

            let n = file
                .read(&mut chunk)
                .map_err(|e| Error::Tailer(format!("reading {}: {e}", self.path.display())))?;

            if n == 0 {
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            pending.push_str(&String::from_utf8_lossy(&chunk[..n]));
            self.dispatch_complete_lines(&mut pending, filter.as_ref());
        }

        debug!(path = %self.path.display(), "tailer stopping");
        Ok(())
    }

    fn dispatch_complete_lines(&self, pending: &mut String, filter: &dyn Filter) {
        while let Some(pos) = pending.find('\n') {
            let line: String = pending.drain(..=pos).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            if let Err(err) = filter.handle_entry(now_unix(), line) {
                warn!(error = %err, line, "skipping unparseable log line");
            }
        }
    }
}
