//! # Error Types
//!
//! Error handling for logger construction and flushing.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages. Per-call logging never returns an error; only
//! construction and `sync` do.

use std::io;

use thiserror::Error;

/// Main error type for logger operations
///
/// ## Error Categories
///
/// 1. **Configuration errors**: UnknownDriver, InvalidLevel, InvalidPathPattern
/// 2. **Sink errors**: FileSink, Sync
/// 3. **Integration errors**: InitializationFailed
/// 4. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum LoggerError
{
    /// The configured driver name is not one of `stdout` or `file`
    #[error("unknown driver: {0}")]
    UnknownDriver(String),

    /// A level or stacktrace-level name could not be parsed
    ///
    /// Accepted names are `debug`, `info`, `warn`, `error`, `dpanic`,
    /// `panic` and `fatal`.
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// The rotating file path contains a malformed strftime specifier
    #[error("invalid log path pattern: {0}")]
    InvalidPathPattern(String),

    /// The rotating file sink could not be opened
    ///
    /// This happens when:
    /// - The parent directory cannot be created
    /// - The file cannot be opened for appending (permissions, path is a directory)
    #[error("failed to create file sink {path}: {source}")]
    FileSink
    {
        /// Path that failed to open
        path: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Flushing a sink failed during `sync`
    #[error("failed to sync log sink: {0}")]
    Sync(#[source] io::Error),

    /// Installing the logger as the global `tracing` subscriber failed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// I/O error not tied to a specific sink
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for `Result<T, LoggerError>`
///
/// ```rust
/// use sklog_core::error::LoggerResult;
/// fn foo() -> LoggerResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type LoggerResult<T> = std::result::Result<T, LoggerError>;
