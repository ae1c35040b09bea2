use chrono::Utc;

// Diagnostic codes emitted by IdentifierMap lookups.
pub const CODE_NOT_LOADED: &str = "NOLD";
pub const CODE_NO_MATCH: &str = "NOMT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn from_str(level: &str) -> Self {
        match level.trim().to_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info, // default
        }
    }

    pub fn should_log(&self, message_level: &LogLevel) -> bool {
        match (self, message_level) {
            (LogLevel::Debug, _) => true,
            (LogLevel::Info, LogLevel::Info | LogLevel::Warn | LogLevel::Error) => true,
            (LogLevel::Warn, LogLevel::Warn | LogLevel::Error) => true,
            (LogLevel::Error, LogLevel::Error) => true,
            _ => false,
        }
    }

    /// Four-letter tag used in console lines.
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERRO",
        }
    }

    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Receiver for the leveled messages an `IdentifierMap` produces.
///
/// Sinks must be shareable across threads since a loaded map may be read concurrently.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: LogLevel, code: &str, message: &str);

    fn info(&self, code: &str, message: &str) {
        self.emit(LogLevel::Info, code, message);
    }

    fn warn(&self, code: &str, message: &str) {
        self.emit(LogLevel::Warn, code, message);
    }
}

/// Forwards diagnostics to the `tracing` subscriber installed by the host process.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, level: LogLevel, code: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(code = code, "{}", message),
            LogLevel::Info => tracing::info!(code = code, "{}", message),
            LogLevel::Warn => tracing::warn!(code = code, "{}", message),
            LogLevel::Error => tracing::error!(code = code, "{}", message),
        }
    }
}

/// Console sink with its own level threshold, writing to stderr.
#[derive(Clone, Debug)]
pub struct Logger {
    pub host: String,
    pub log_level: LogLevel,
    pub log_console: bool,
}

impl Logger {
    pub fn new(host: String, log_level: LogLevel, log_console: bool) -> Self {
        Self { host, log_level, log_console }
    }

    // Line layout: [TS] [LVL(4)] [HOST(<=32)] [CODE(4)]: [MSG]
    pub fn format_line(&self, level: LogLevel, code: &str, message: &str) -> String {
        let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        let host: String = self.host.chars().take(32).collect();
        let code_padded = format!("{:<4}", code.chars().take(4).collect::<String>());
        format!("{} {} {} {}: {}", ts, level.tag(), host, code_padded, message)
    }
}

impl DiagnosticSink for Logger {
    fn emit(&self, level: LogLevel, code: &str, message: &str) {
        if self.log_console && self.log_level.should_log(&level) {
            eprintln!("{}", self.format_line(level, code, message));
        }
    }
}
