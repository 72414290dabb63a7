//! Operator-facing notifications.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Fire-and-forget notification target.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);

    fn success(&self, title: &str, message: &str) {
        self.notify(Severity::Success, title, message);
    }

    fn warning(&self, title: &str, message: &str) {
        self.notify(Severity::Warning, title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(Severity::Error, title, message);
    }
}

/// Output stream a console notification is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Prints notifications for the CLI: success on stdout, the rest on stderr.
/// With [`ConsoleSink::stderr_only`] stdout is left for machine-readable output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
    stderr_only: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stderr_only() -> Self {
        Self { stderr_only: true }
    }

    pub fn stream(&self, severity: Severity) -> Stream {
        match severity {
            Severity::Success if !self.stderr_only => Stream::Stdout,
            _ => Stream::Stderr,
        }
    }
}

fn render(severity: Severity, title: &str, message: &str) -> String {
    match severity {
        Severity::Success => format!("{}: {}", title, message),
        Severity::Warning => format!("Warning: {}: {}", title, message),
        Severity::Error => format!("Error: {}: {}", title, message),
    }
}

impl NotificationSink for ConsoleSink {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        let line = render(severity, title, message);
        match self.stream(severity) {
            Stream::Stdout => println!("{}", line),
            Stream::Stderr => eprintln!("{}", line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Buffers notifications in memory until the host renders them.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain buffered notifications, oldest first.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                severity,
                title: title.to_string(),
                message: message.to_string(),
            });
    }
}
