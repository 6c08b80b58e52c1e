//! Audit logging: a durable record of what switchyard did to each appliance.
//!
//! Diagnostics go through [tracing]. This module is different: it records events, such as every
//! operation's outcome, for later review. Producers hold a cloneable [Log] handle and send
//! [LogEntry] values over a channel; a single [LogReceiver], typically on its own thread, passes
//! them to a [Logger] that does the actual writing.

pub mod standard;

use crossbeam::channel::{self, Receiver, Sender};
use serde_json::Value;
use std::fmt;

/// Severity classifications for log entries.
#[derive(Clone, Debug, PartialEq)]
pub enum LogEntry<E> {
    /// Just a status update; nothing's wrong.
    Notice(E),

    /// Something minor went wrong, but program execution is continuing.
    Warning(E),

    /// Something significant went wrong, but program execution is continuing.
    Error(E),

    /// Something significant went wrong, and the program is exiting as a result.
    ///
    /// If the user needs to troubleshoot by viewing the log, they are probably looking for this
    /// message at or near the end of the log.
    Fatal(E),
}

impl<E> LogEntry<E> {
    pub fn message(&self) -> &E {
        match self {
            LogEntry::Notice(e) | LogEntry::Warning(e) | LogEntry::Error(e) | LogEntry::Fatal(e) => e,
        }
    }

    pub fn severity(&self) -> &'static str {
        match self {
            LogEntry::Notice(_) => "NOTICE",
            LogEntry::Warning(_) => "WARNING",
            LogEntry::Error(_) => "ERROR",
            LogEntry::Fatal(_) => "FATAL",
        }
    }
}

impl<E: fmt::Display> fmt::Display for LogEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.message())
    }
}

/// Something that happened on an appliance.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Connected {
        appliance: String,
    },

    /// The appliance's connection could not be set up, so none of its actions ran.
    ConnectionFailed {
        appliance: String,
        error: String,
    },

    /// An operation ran and produced an outcome.
    ActionResult {
        appliance: String,
        manifest: String,
        task: String,

        /// The validated operation, e.g. `enable_csvserver name=web`.
        operation: String,

        /// The serialized [Outcome](crate::core::Outcome).
        outcome: Value,
    },
}

impl Event {
    pub fn appliance(&self) -> &str {
        match self {
            Event::Connected { appliance }
            | Event::ConnectionFailed { appliance, .. }
            | Event::ActionResult { appliance, .. } => appliance,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Connected { appliance } => write!(f, "[{appliance}] connected"),
            Event::ConnectionFailed { appliance, error } => {
                write!(f, "[{appliance}] connection failed: {error}")
            }
            Event::ActionResult {
                appliance,
                manifest,
                task,
                operation,
                outcome,
            } => write!(
                f,
                "[{appliance}] manifest \"{manifest}\", task \"{task}\": {operation} => {outcome}",
            ),
        }
    }
}

/// An interface to a physical logging mechanism, e.g. a disk logger.
///
/// If you're implementing your own logging system, you simply need to implement this trait on your
/// type.
pub trait Logger {
    /// Write a raw log entry.
    fn log_raw(&mut self, entry: LogEntry<String>);

    /// Write a log entry for an [Event].
    ///
    /// [Event] implements [std::fmt::Display], so you have the option of simply calling
    /// `event.to_string()` if you are satisfied with the default formatting.
    fn log_event(&mut self, event: LogEntry<Event>);
}

#[derive(Debug)]
enum Message {
    Raw(LogEntry<String>),
    Event(LogEntry<Event>),
}

/// A logging mechanism for use in other parts of the program.
///
/// Clone one of these and store it in your types that need to send log messages.
///
/// If sending fails, this type falls back to [tracing] so the message is not silently lost.
#[derive(Clone, Debug)]
pub struct Log {
    sender: Option<Sender<Message>>,
}

impl Log {
    /// A [Log] that discards everything.
    pub fn disabled() -> Self {
        Log { sender: None }
    }

    /// Sends a raw, notice-level log message.
    pub fn notice(&self, message: impl Into<String>) {
        self.send(Message::Raw(LogEntry::Notice(message.into())));
    }

    /// Sends a raw, warning-level log message.
    pub fn warning(&self, message: impl Into<String>) {
        self.send(Message::Raw(LogEntry::Warning(message.into())));
    }

    /// Sends a raw, error-level log message.
    pub fn error(&self, message: impl Into<String>) {
        self.send(Message::Raw(LogEntry::Error(message.into())));
    }

    /// Sends a raw, fatal-level log message.
    pub fn fatal(&self, message: impl Into<String>) {
        self.send(Message::Raw(LogEntry::Fatal(message.into())));
    }

    /// Sends an [Event].
    pub fn event(&self, event: LogEntry<Event>) {
        self.send(Message::Event(event));
    }

    fn send(&self, message: Message) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(err) = sender.send(message) {
            match err.into_inner() {
                Message::Raw(entry) => tracing::error!(%entry, "audit log unavailable"),
                Message::Event(entry) => tracing::error!(%entry, "audit log unavailable"),
            }
        }
    }
}

/// Processes log messages from the rest of the program and passes them to a [Logger].
pub struct LogReceiver<L: Logger> {
    receiver: Receiver<Message>,

    /// The mechanism for writing logs, e.g. to disk.
    logger: L,
}

impl<L: Logger> LogReceiver<L> {
    /// Creates a receiver for `logger` and the [Log] handle that feeds it.
    pub fn new(logger: L) -> (Self, Log) {
        let (sender, receiver) = channel::unbounded();
        let log = Log {
            sender: Some(sender),
        };
        (LogReceiver { receiver, logger }, log)
    }

    /// Writes messages until every [Log] handle has been dropped. Returns the [Logger].
    ///
    /// This blocks; run it on its own thread.
    pub fn run(mut self) -> L {
        for message in self.receiver.iter() {
            match message {
                Message::Raw(entry) => self.logger.log_raw(entry),
                Message::Event(entry) => self.logger.log_event(entry),
            }
        }
        self.logger
    }
}
