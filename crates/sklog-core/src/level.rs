//! # Levels
//!
//! Severity ordering and the shared, atomically mutable level gate.
//!
//! Every sink built for the same logger references one [`AtomicLevel`].
//! Changing it with [`AtomicLevel::set_level`] takes effect for the next call
//! on every thread, without any lock on the read path.
//!
//! ```rust
//! use sklog_core::level::{AtomicLevel, Severity};
//!
//! let gate = AtomicLevel::new(Severity::Info);
//! assert!(!gate.enabled(Severity::Debug));
//!
//! gate.set_level(Severity::Debug);
//! assert!(gate.enabled(Severity::Debug));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

use crate::error::LoggerError;

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Severity
{
    /// Verbose diagnostics, usually disabled in production
    Debug = -1,
    /// Default level
    #[default]
    Info = 0,
    /// Something unexpected that does not need immediate attention
    Warn = 1,
    /// A failure that should be looked at
    Error = 2,
    /// Severe error; panics when the logger is in development mode
    DPanic = 3,
    /// Logs, then panics
    Panic = 4,
    /// Logs, then exits the process with status 1
    Fatal = 5,
}

impl Severity
{
    /// All severities, least severe first.
    pub const ALL: [Severity; 7] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::DPanic,
        Severity::Panic,
        Severity::Fatal,
    ];

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::DPanic => "dpanic",
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
        }
    }

    /// Uppercase name used by the encoders.
    #[must_use]
    pub const fn as_capital_str(self) -> &'static str
    {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::DPanic => "DPANIC",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_i8(value: i8) -> Self
    {
        match value {
            i8::MIN..=-1 => Severity::Debug,
            0 => Severity::Info,
            1 => Severity::Warn,
            2 => Severity::Error,
            3 => Severity::DPanic,
            4 => Severity::Panic,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity
{
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "dpanic" => Ok(Severity::DPanic),
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

/// Shared minimum-severity threshold.
///
/// Cloning yields another handle to the same threshold.
#[derive(Debug, Clone)]
pub struct AtomicLevel
{
    inner: Arc<AtomicI8>,
}

impl AtomicLevel
{
    /// Create a gate starting at `level`.
    #[must_use]
    pub fn new(level: Severity) -> Self
    {
        Self { inner: Arc::new(AtomicI8::new(level as i8)) }
    }

    /// Current threshold.
    #[must_use]
    pub fn level(&self) -> Severity
    {
        Severity::from_i8(self.inner.load(Ordering::Relaxed))
    }

    /// Replace the threshold for every holder of this gate.
    pub fn set_level(&self, level: Severity)
    {
        self.inner.store(level as i8, Ordering::Relaxed);
    }

    /// Whether a record at `severity` passes the gate.
    #[must_use]
    pub fn enabled(&self, severity: Severity) -> bool
    {
        severity >= self.level()
    }
}

impl Default for AtomicLevel
{
    fn default() -> Self
    {
        Self::new(Severity::default())
    }
}

impl FromStr for AtomicLevel
{
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        s.parse().map(AtomicLevel::new)
    }
}
