//! Writes log files for each appliance plus one for the controller.

use crate::logger::{Event, LogEntry, Logger};
use chrono::Local;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// The name of the log file for log messages that don't pertain to a specific appliance.
pub const DEFAULT_LOG_FILE: &str = "switchyard.log";

/// Opens a log file for appending, or creates it if it did not exist.
fn open_log_file(path: impl AsRef<Path>) -> io::Result<File> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path.as_ref())
}

/// Writes one timestamped line.
fn write_line(file: &mut File, entry: impl Display) {
    let line = format!("{} {entry}\n", Local::now().to_rfc3339());
    if let Err(err) = file.write_all(line.as_bytes()) {
        tracing::error!(error = %err, %entry, "failed to write audit log");
    }
}

/// A [Logger] that writes one file per appliance.
///
/// Entries that don't pertain to an appliance go to [DEFAULT_LOG_FILE]. Write failures are
/// reported through [tracing] rather than interrupting the run.
#[derive(Debug)]
pub struct StandardLogger {
    /// Maps appliance names to their open log files.
    appliances: HashMap<String, File>,

    /// The directory where logs will be stored.
    directory: PathBuf,

    /// Collects any log messages that don't pertain to a specific appliance.
    default: File,
}

impl StandardLogger {
    /// Create a new [StandardLogger] that stores its files in `directory`.
    ///
    /// Attempts to create `directory` if it does not exist.
    ///
    /// # Returns
    ///
    /// A new [StandardLogger], or any [io::Error] encountered when trying to ensure that
    /// `directory` exists and is a directory.
    pub fn new(directory: impl Into<PathBuf>) -> io::Result<Self> {
        let directory = directory.into();

        match fs::metadata(&directory) {
            Ok(md) if !md.is_dir() => {
                // There's something at this path, but it's not a directory. We can't continue.
                return Err(io::Error::new(
                    ErrorKind::NotFound,
                    format!("not a directory: {}", directory.display()),
                ));
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&directory)?;
            }
            _ => {}
        }

        let default = open_log_file(directory.join(DEFAULT_LOG_FILE))?;

        Ok(Self {
            appliances: HashMap::new(),
            directory,
            default,
        })
    }

    /// Looks up or opens `<appliance>.log`.
    fn appliance_log(&mut self, appliance: &str) -> io::Result<&mut File> {
        match self.appliances.entry(appliance.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = open_log_file(self.directory.join(format!("{appliance}.log")))?;
                Ok(entry.insert(file))
            }
        }
    }
}

impl Logger for StandardLogger {
    fn log_raw(&mut self, entry: LogEntry<String>) {
        write_line(&mut self.default, entry);
    }

    fn log_event(&mut self, event: LogEntry<Event>) {
        let appliance = event.message().appliance().to_owned();
        match self.appliance_log(&appliance) {
            Ok(file) => write_line(file, event),
            Err(err) => {
                tracing::error!(error = %err, %appliance, "failed to open appliance log");
                write_line(&mut self.default, event);
            }
        }
    }
}
