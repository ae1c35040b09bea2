pub mod config;
pub mod diagnostics;
pub mod error;
pub mod idmap;

pub use diagnostics::{DiagnosticSink, LogLevel, Logger, TracingSink};
pub use error::{ConfigError, IdMapError};
pub use idmap::{normalize_key, parse_line, Entries, IdentifierMap};
