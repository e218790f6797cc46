//! Append-only log store.
//!
//! Each entry is formatted once and written with a single `write_all` to a
//! file opened in append mode, then echoed verbatim to the console sink. The
//! file lock is held across both writes so the two streams see entries in the
//! same order.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::{LogLevel, border, format_line, timestamp};

/// Destination for the live echo of every log entry.
pub type ConsoleSink = Box<dyn Write + Send>;

/// The persistent, append-only log of a single run.
pub struct LogStore {
    path: PathBuf,
    run_id: String,
    file: Mutex<File>,
    console: Mutex<ConsoleSink>,
}

impl LogStore {
    /// Opens (creating if needed) the log file, echoing to stdout.
    pub fn open(path: impl Into<PathBuf>, run_id: impl Into<String>) -> io::Result<Self> {
        Self::with_console(path, run_id, Box::new(io::stdout()))
    }

    /// Opens (creating if needed) the log file with a custom console sink.
    ///
    /// The banner header is written only when the file is created, so several
    /// processes sharing one run id all append below a single header.
    pub fn with_console(
        path: impl Into<PathBuf>,
        run_id: impl Into<String>,
        console: ConsoleSink,
    ) -> io::Result<Self> {
        let path = path.into();
        let run_id = run_id.into();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(header(&run_id).as_bytes())?;
                debug!(path = %path.display(), "Created run log");
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Appending to existing run log");
            }
            Err(e) => return Err(e),
        }

        let file = OpenOptions::new().append(true).open(&path)?;

        Ok(Self {
            path,
            run_id,
            file: Mutex::new(file),
            console: Mutex::new(console),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier of the run this log belongs to.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Appends a timestamped entry at the given level.
    pub fn append(&self, level: LogLevel, message: &str) -> io::Result<()> {
        self.append_raw(&format_line(&timestamp(), level, message))
    }

    /// Appends pre-formatted text as one atomic write, plus a trailing newline.
    pub fn append_raw(&self, text: &str) -> io::Result<()> {
        let mut entry = String::with_capacity(text.len() + 1);
        entry.push_str(text);
        entry.push('\n');

        let mut file = self.file.lock();
        file.write_all(entry.as_bytes())?;

        let mut console = self.console.lock();
        if let Err(e) = console.write_all(entry.as_bytes()).and_then(|_| console.flush()) {
            debug!(error = %e, "Console echo failed");
        }
        Ok(())
    }
}

/// The fixed banner written at the top of a new log file.
pub fn header(run_id: &str) -> String {
    let rule = border();
    format!(
        "{rule}\nAPI TEST EXECUTION STARTED\nDate: {}\nRun ID: {run_id}\n{rule}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
