use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for operator-facing diagnostics (bad credentials, undecodable replies).
///
/// Any `Fn(Severity, &str)` closure is a logger.
pub trait Logger: Send + Sync {
    fn log(&self, severity: Severity, message: &str);
}

impl<F> Logger for F
where
    F: Fn(Severity, &str) + Send + Sync,
{
    fn log(&self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

/// Prints `[severity]: message` to stdout. Used when no logger is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, severity: Severity, message: &str) {
        println!("{}", format_line(severity, message));
    }
}

/// Forwards to the `log` facade under the `daemon_pool` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, severity: Severity, message: &str) {
        let level = match severity {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            Severity::Info => log::Level::Info,
            Severity::Debug => log::Level::Debug,
        };
        log::log!(target: "daemon_pool", level, "{message}");
    }
}

pub(crate) fn format_line(severity: Severity, message: &str) -> String {
    format!("[{severity}]: {message}")
}
