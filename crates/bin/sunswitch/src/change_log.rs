//! Change log file: one human-readable line per power transition.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono_tz::Tz;
use sunswitch_app::ports::ChangeLog;
use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::Timestamp;

/// Appends `<local timestamp> <device> -> ON|OFF` lines to a file.
pub struct FileChangeLog {
    path: PathBuf,
    timezone: Tz,
}

impl FileChangeLog {
    pub fn new(path: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            path: path.into(),
            timezone,
        }
    }

    fn line(&self, device: &str, state: PowerState, at: Timestamp) -> String {
        let local = at.with_timezone(&self.timezone);
        format!("{} {device} -> {state}\n", local.format("%Y-%m-%d %H:%M:%S"))
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl ChangeLog for FileChangeLog {
    fn record(&self, device: &str, state: PowerState, at: Timestamp) {
        let line = self.line(device, state, at);
        if let Err(err) = self.append(&line) {
            tracing::warn!(path = %self.path.display(), %err, "unable to write change log");
        }
    }
}
