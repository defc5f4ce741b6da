//! # Logger Builder
//!
//! Option-based construction of a [`Manager`].
//!
//! ## Options
//!
//! | Option | Method | Default |
//! |---|---|---|
//! | driver | [`LoggerBuilder::with_driver`] | `stdout` |
//! | level | [`LoggerBuilder::with_level`] | `info` |
//! | log path | [`LoggerBuilder::with_log_path`] | empty |
//! | encoder config | [`LoggerBuilder::with_encoder_config`] | JSON, keys `T L N M C S` |
//! | caller skip | [`LoggerBuilder::with_caller_skip`] | `1` |
//! | max age | [`LoggerBuilder::with_max_age`] | 7 days |
//! | rotation time | [`LoggerBuilder::with_rotation_time`] | 24 hours |
//! | color | [`LoggerBuilder::with_color`] | `false` |
//! | stacktrace level | [`LoggerBuilder::with_stacktrace_level`] | `dpanic` |
//! | caller capture | [`LoggerBuilder::with_caller`] | `true` |
//! | development | [`LoggerBuilder::with_development`] | `false` |
//! | extra sinks | [`LoggerBuilder::with_sink`] | none |
//!
//! Level names and the driver are validated in [`LoggerBuilder::build`];
//! a bad value fails construction and no logger is produced.
//!
//! ## Environment Variables
//!
//! [`LoggerBuilder::from_env`] seeds a builder from:
//!
//! - `SKLOG_DRIVER`: `stdout` or `file`
//! - `SKLOG_LEVEL`: minimum level name
//! - `SKLOG_PATH`: log path prefix for the file driver
//! - `SKLOG_FORMAT`: `json` or `text` (invalid values are ignored)
//! - `SKLOG_COLOR`: `1` / `true` to enable colored console output
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use sklog::{Context, Field, LoggerBuilder};
//!
//! let logger = LoggerBuilder::new()
//!     .with_driver("file")
//!     .with_log_path("/var/log/myapp/api-")
//!     .with_level("debug")
//!     .with_max_age(Duration::from_secs(3 * 24 * 60 * 60))
//!     .build()
//!     .expect("Failed to build logger");
//!
//! let ctx = Context::background().with_trace_id("123456");
//! logger.info(&ctx, "Application started", &[Field::int("port", 8080)]);
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sklog_core::caller::CallerSkip;
use sklog_core::encoder::{encoder_for, EncoderConfig, EncoderStyle};
use sklog_core::error::LoggerResult;
use sklog_core::level::{AtomicLevel, Severity};
use sklog_core::rotate::RotationPolicy;
use sklog_core::sink::{Driver, Route, SeverityPredicate, Sink, SinkRouter};

use crate::manager::{Manager, Pipeline};

const DEFAULT_DRIVER: &str = "stdout";
const DEFAULT_CALLER_SKIP: i32 = 1;

/// Collects options and builds a [`Manager`]
#[derive(Debug, Clone)]
pub struct LoggerBuilder
{
    driver: String,
    level: String,
    log_path: String,
    encoder_config: EncoderConfig,
    caller_skip: i32,
    caller: bool,
    rotation: RotationPolicy,
    use_color: bool,
    stacktrace_level: String,
    development: bool,
    driver_output: bool,
    extra_sinks: Vec<(SeverityPredicate, Arc<dyn Sink>)>,
    error_output: Option<Arc<dyn Sink>>,
}

impl Default for LoggerBuilder
{
    fn default() -> Self
    {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            level: Severity::Info.to_string(),
            log_path: String::new(),
            encoder_config: EncoderConfig::default(),
            caller_skip: DEFAULT_CALLER_SKIP,
            caller: true,
            rotation: RotationPolicy::default(),
            use_color: false,
            stacktrace_level: Severity::DPanic.to_string(),
            development: false,
            driver_output: true,
            extra_sinks: Vec::new(),
            error_output: None,
        }
    }
}

impl LoggerBuilder
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Builder seeded from `SKLOG_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        let mut builder = Self::default();
        if let Some(driver) = lookup("SKLOG_DRIVER") {
            builder.driver = driver;
        }
        if let Some(level) = lookup("SKLOG_LEVEL") {
            builder.level = level;
        }
        if let Some(path) = lookup("SKLOG_PATH") {
            builder.log_path = path;
        }
        if let Some(style) = lookup("SKLOG_FORMAT").and_then(|s| EncoderStyle::from_str(&s).ok()) {
            builder.encoder_config.style = style;
        }
        if let Some(color) = lookup("SKLOG_COLOR") {
            builder.use_color = matches!(color.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        builder
    }

    /// Output driver: `stdout` (default) or `file`.
    #[must_use]
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self
    {
        self.driver = driver.into();
        self
    }

    /// Minimum level by name (`debug` .. `fatal`).
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self
    {
        self.level = level.into();
        self
    }

    /// Minimum level as a typed severity.
    #[must_use]
    pub fn with_severity(mut self, level: Severity) -> Self
    {
        self.level = level.to_string();
        self
    }

    /// Path prefix for the file driver; `%Y-%m-%d.log` is appended.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<String>) -> Self
    {
        self.log_path = path.into();
        self
    }

    #[must_use]
    pub fn with_encoder_config(mut self, config: EncoderConfig) -> Self
    {
        self.encoder_config = config;
        self
    }

    /// Frames to skip when reporting the caller; see [`sklog_core::caller`].
    #[must_use]
    pub fn with_caller_skip(mut self, skip: i32) -> Self
    {
        self.caller_skip = skip;
        self
    }

    /// Enable or disable caller capture.
    #[must_use]
    pub fn with_caller(mut self, enabled: bool) -> Self
    {
        self.caller = enabled;
        self
    }

    /// Retention for rotated files; zero keeps everything.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self
    {
        self.rotation.max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_rotation_time(mut self, rotation_time: Duration) -> Self
    {
        self.rotation.rotation_time = rotation_time;
        self
    }

    /// Colored console output. Implies the text encoder; color is only
    /// emitted on terminal destinations.
    #[must_use]
    pub fn with_color(mut self, use_color: bool) -> Self
    {
        self.use_color = use_color;
        self
    }

    /// Minimum level at which a stack trace is attached.
    #[must_use]
    pub fn with_stacktrace_level(mut self, level: impl Into<String>) -> Self
    {
        self.stacktrace_level = level.into();
        self
    }

    /// Development mode: `dpanic` panics after logging.
    #[must_use]
    pub fn with_development(mut self, development: bool) -> Self
    {
        self.development = development;
        self
    }

    /// Tee records admitted by `predicate` into an additional sink.
    #[must_use]
    pub fn with_sink(mut self, predicate: SeverityPredicate, sink: Arc<dyn Sink>) -> Self
    {
        self.extra_sinks.push((predicate, sink));
        self
    }

    /// Skip the driver's own destinations; only sinks added with
    /// [`LoggerBuilder::with_sink`] receive records. The driver name is
    /// still validated.
    #[must_use]
    pub fn without_driver_output(mut self) -> Self
    {
        self.driver_output = false;
        self
    }

    /// Where sink write failures are reported (stderr by default).
    #[must_use]
    pub fn with_error_output(mut self, sink: Arc<dyn Sink>) -> Self
    {
        self.error_output = Some(sink);
        self
    }

    /// Validate the options and open every sink.
    ///
    /// ## Errors
    ///
    /// - [`sklog_core::LoggerError::InvalidLevel`] for a bad level or
    ///   stacktrace level name
    /// - [`sklog_core::LoggerError::UnknownDriver`] for a driver other than
    ///   `stdout` / `file`
    /// - [`sklog_core::LoggerError::FileSink`] or
    ///   [`sklog_core::LoggerError::InvalidPathPattern`] when the file sink
    ///   cannot be opened
    pub fn build(self) -> LoggerResult<Manager>
    {
        let level: Severity = self.level.parse()?;
        let stacktrace_level: Severity = self.stacktrace_level.parse()?;
        let driver: Driver = self.driver.parse()?;

        let mut encoder = self.encoder_config;
        if self.use_color {
            encoder.style = EncoderStyle::Text;
        }

        let gate = AtomicLevel::new(level);
        let mut router = if self.driver_output {
            let configs = driver.sink_configs(&encoder, self.use_color, &self.log_path, self.rotation);
            SinkRouter::open(gate, &configs)?
        } else {
            SinkRouter::new(gate)
        };
        for (predicate, sink) in self.extra_sinks {
            router.push_route(Route::new(predicate, sink, encoder_for(&encoder), self.use_color));
        }
        if let Some(sink) = self.error_output {
            router.set_error_output(sink);
        }

        tracing::debug!(driver = ?driver, level = %level, routes = router.routes().len(), "logger constructed");

        Ok(Manager::from_pipeline(Pipeline {
            router,
            caller: self.caller.then(|| CallerSkip::new(self.caller_skip)),
            stacktrace_level,
            development: self.development,
        }))
    }
}
