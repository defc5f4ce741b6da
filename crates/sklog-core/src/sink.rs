//! # Sinks and Routing
//!
//! Destinations for encoded records and the router that fans records out to
//! them.
//!
//! A [`Route`] pairs a [`Sink`] with a [`SeverityPredicate`] and an
//! [`Encoder`]. The [`SinkRouter`] holds every route built for one logger
//! plus the shared [`AtomicLevel`]; a record is written to each route whose
//! predicate admits it, with the gate acting as a floor for all of them.
//!
//! ## Drivers
//!
//! | Driver | Routes |
//! |---|---|
//! | `stdout` | severity < Error → stdout, severity ≥ Error → stderr |
//! | `file` | everything → `<log_path>%Y-%m-%d.log`, rotated |
//!
//! Building a router opens every destination up front; if any of them fails
//! the whole construction fails and nothing is returned.

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;

use crate::encoder::{encoder_for, format_time, Encoder, EncoderConfig};
use crate::error::{LoggerError, LoggerResult};
use crate::level::{AtomicLevel, Severity};
use crate::record::LogRecord;
use crate::rotate::{RotatingFileSink, RotationPolicy, DATE_PATTERN, FILE_SUFFIX};

/// A byte destination for encoded lines
///
/// `write` receives one complete line and must write it atomically with
/// respect to other concurrent `write` calls on the same sink.
pub trait Sink: Send + Sync + fmt::Debug
{
    fn write(&self, line: &[u8]) -> io::Result<()>;

    /// Flush buffered data to the underlying destination.
    fn sync(&self) -> io::Result<()>;

    /// Whether the destination is an interactive terminal (enables color).
    fn is_terminal(&self) -> bool
    {
        false
    }
}

/// Standard stream written by a [`ConsoleSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream
{
    Stdout,
    Stderr,
}

/// Process stdout or stderr
///
/// Each line is written while holding the stream lock.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink
{
    stream: Stream,
}

impl ConsoleSink
{
    #[must_use]
    pub const fn stdout() -> Self
    {
        Self { stream: Stream::Stdout }
    }

    #[must_use]
    pub const fn stderr() -> Self
    {
        Self { stream: Stream::Stderr }
    }

    #[must_use]
    pub const fn stream(&self) -> Stream
    {
        self.stream
    }
}

impl Sink for ConsoleSink
{
    fn write(&self, line: &[u8]) -> io::Result<()>
    {
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(line),
            Stream::Stderr => io::stderr().lock().write_all(line),
        }
    }

    fn sync(&self) -> io::Result<()>
    {
        match self.stream {
            Stream::Stdout => io::stdout().lock().flush(),
            Stream::Stderr => io::stderr().lock().flush(),
        }
    }

    fn is_terminal(&self) -> bool
    {
        match self.stream {
            Stream::Stdout => io::stdout().is_terminal(),
            Stream::Stderr => io::stderr().is_terminal(),
        }
    }
}

/// In-memory sink; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink
{
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>>
    {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String
    {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Written lines without their terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String>
    {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self)
    {
        self.lock().clear();
    }
}

impl Sink for MemorySink
{
    fn write(&self, line: &[u8]) -> io::Result<()>
    {
        self.lock().extend_from_slice(line);
        Ok(())
    }

    fn sync(&self) -> io::Result<()>
    {
        Ok(())
    }
}

/// Which severities a route accepts, on top of the shared gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityPredicate
{
    /// Every severity
    All,
    /// Strictly below the given severity
    Below(Severity),
    /// At or above the given severity
    AtLeast(Severity),
}

impl SeverityPredicate
{
    #[must_use]
    pub fn admits(self, severity: Severity) -> bool
    {
        match self {
            SeverityPredicate::All => true,
            SeverityPredicate::Below(limit) => severity < limit,
            SeverityPredicate::AtLeast(floor) => severity >= floor,
        }
    }
}

/// One sink with its predicate and encoder
#[derive(Debug, Clone)]
pub struct Route
{
    predicate: SeverityPredicate,
    sink: Arc<dyn Sink>,
    encoder: Arc<dyn Encoder>,
    color: bool,
}

impl Route
{
    /// Color is applied only if requested and the sink is a terminal.
    #[must_use]
    pub fn new(predicate: SeverityPredicate, sink: Arc<dyn Sink>, encoder: Arc<dyn Encoder>, use_color: bool) -> Self
    {
        let color = use_color && sink.is_terminal();
        Self { predicate, sink, encoder, color }
    }

    #[must_use]
    pub fn predicate(&self) -> SeverityPredicate
    {
        self.predicate
    }
}

/// Output driver selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver
{
    /// stdout for severities below Error, stderr for the rest
    #[default]
    Stdout,
    /// Date-named rotating files
    File,
}

impl FromStr for Driver
{
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s {
            "stdout" => Ok(Driver::Stdout),
            "file" => Ok(Driver::File),
            _ => Err(LoggerError::UnknownDriver(s.to_string())),
        }
    }
}

/// Where a configured sink writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination
{
    Stdout,
    Stderr,
    /// strftime file path pattern
    File(String),
}

/// Declarative description of one route, opened by [`SinkConfig::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig
{
    pub destination: Destination,
    pub encoder: EncoderConfig,
    pub predicate: SeverityPredicate,
    /// Used only by file destinations
    pub rotation: RotationPolicy,
    pub use_color: bool,
}

impl SinkConfig
{
    /// Open the destination.
    ///
    /// ## Errors
    ///
    /// File destinations fail when the pattern is malformed or the file
    /// cannot be created.
    pub fn open(&self) -> LoggerResult<Route>
    {
        let sink: Arc<dyn Sink> = match &self.destination {
            Destination::Stdout => Arc::new(ConsoleSink::stdout()),
            Destination::Stderr => Arc::new(ConsoleSink::stderr()),
            Destination::File(pattern) => Arc::new(RotatingFileSink::new(pattern.clone(), self.rotation)?),
        };
        Ok(Route::new(self.predicate, sink, encoder_for(&self.encoder), self.use_color))
    }
}

impl Driver
{
    /// Sink layout for this driver.
    #[must_use]
    pub fn sink_configs(self, encoder: &EncoderConfig, use_color: bool, log_path: &str, rotation: RotationPolicy) -> Vec<SinkConfig>
    {
        let config = |destination, predicate| SinkConfig {
            destination,
            encoder: encoder.clone(),
            predicate,
            rotation,
            use_color,
        };
        match self {
            Driver::Stdout => vec![
                config(Destination::Stdout, SeverityPredicate::Below(Severity::Error)),
                config(Destination::Stderr, SeverityPredicate::AtLeast(Severity::Error)),
            ],
            Driver::File => vec![config(
                Destination::File(format!("{log_path}{DATE_PATTERN}{FILE_SUFFIX}")),
                SeverityPredicate::All,
            )],
        }
    }
}

/// Fans records out to every admitting route
#[derive(Debug)]
pub struct SinkRouter
{
    gate: AtomicLevel,
    routes: Vec<Route>,
    error_output: Arc<dyn Sink>,
}

impl SinkRouter
{
    /// Router with no routes, reporting write failures to stderr.
    #[must_use]
    pub fn new(gate: AtomicLevel) -> Self
    {
        Self { gate, routes: Vec::new(), error_output: Arc::new(ConsoleSink::stderr()) }
    }

    /// Open every config; all or nothing.
    ///
    /// ## Errors
    ///
    /// Returns the first failure from [`SinkConfig::open`].
    pub fn open(gate: AtomicLevel, configs: &[SinkConfig]) -> LoggerResult<Self>
    {
        let routes = configs.iter().map(SinkConfig::open).collect::<LoggerResult<Vec<_>>>()?;
        Ok(Self { routes, ..Self::new(gate) })
    }

    pub fn push_route(&mut self, route: Route)
    {
        self.routes.push(route);
    }

    /// Replace the sink that receives write-failure reports.
    pub fn set_error_output(&mut self, sink: Arc<dyn Sink>)
    {
        self.error_output = sink;
    }

    #[must_use]
    pub fn gate(&self) -> &AtomicLevel
    {
        &self.gate
    }

    #[must_use]
    pub fn routes(&self) -> &[Route]
    {
        &self.routes
    }

    /// Whether at least one route would accept `severity` right now.
    #[must_use]
    pub fn enabled(&self, severity: Severity) -> bool
    {
        self.gate.enabled(severity) && self.routes.iter().any(|route| route.predicate.admits(severity))
    }

    /// Encode and write `record` to every admitting route.
    ///
    /// Failures go to the error output; they are never returned.
    pub fn write(&self, record: &LogRecord)
    {
        if !self.gate.enabled(record.severity) {
            return;
        }
        for route in self.routes.iter().filter(|route| route.predicate.admits(record.severity)) {
            let line = route.encoder.encode(record, route.color);
            if let Err(err) = route.sink.write(&line) {
                self.report(&err);
            }
        }
    }

    /// Flush every route, returning the first failure.
    ///
    /// ## Errors
    ///
    /// [`LoggerError::Sync`] wrapping the first sink error; later sinks are
    /// still flushed.
    pub fn sync(&self) -> LoggerResult<()>
    {
        let mut first = None;
        for route in &self.routes {
            if let Err(err) = route.sink.sync() {
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), |err| Err(LoggerError::Sync(err)))
    }

    fn report(&self, err: &io::Error)
    {
        let message = format!("{} write error: {err}\n", format_time(&Local::now()));
        let _ = self.error_output.write(message.as_bytes());
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::encoder::EncoderStyle;
    use crate::field::Field;

    #[derive(Debug, Default)]
    struct FailingSink
    {
        syncs: AtomicUsize,
    }

    impl Sink for FailingSink
    {
        fn write(&self, _line: &[u8]) -> io::Result<()>
        {
            Err(io::Error::other("disk on fire"))
        }

        fn sync(&self) -> io::Result<()>
        {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("sync failed"))
        }
    }

    #[derive(Debug, Default)]
    struct CountingSink
    {
        syncs: AtomicUsize,
    }

    impl Sink for CountingSink
    {
        fn write(&self, _line: &[u8]) -> io::Result<()>
        {
            Ok(())
        }

        fn sync(&self) -> io::Result<()>
        {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn json() -> Arc<dyn Encoder>
    {
        encoder_for(&EncoderConfig::default())
    }

    fn record(severity: Severity) -> LogRecord
    {
        LogRecord::new(severity, format!("{severity} message"), vec![Field::int("n", 1)])
    }

    #[test]
    fn test_driver_from_str()
    {
        assert_eq!(Driver::from_str("stdout").unwrap(), Driver::Stdout);
        assert_eq!(Driver::from_str("file").unwrap(), Driver::File);
        let err = Driver::from_str("invalid").unwrap_err();
        assert_eq!(err.to_string(), "unknown driver: invalid");
    }

    #[test]
    fn test_stdout_driver_splits_by_error()
    {
        let configs = Driver::Stdout.sink_configs(&EncoderConfig::default(), false, "", RotationPolicy::default());
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].destination, Destination::Stdout);
        assert_eq!(configs[1].destination, Destination::Stderr);
        for severity in Severity::ALL {
            assert_ne!(configs[0].predicate.admits(severity), configs[1].predicate.admits(severity));
            assert_eq!(configs[1].predicate.admits(severity), severity >= Severity::Error);
        }
    }

    #[test]
    fn test_file_driver_appends_date_pattern()
    {
        let configs = Driver::File.sink_configs(&EncoderConfig::default(), false, "/tmp/test-log-", RotationPolicy::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].destination, Destination::File("/tmp/test-log-%Y-%m-%d.log".to_string()));
        assert_eq!(configs[0].predicate, SeverityPredicate::All);
    }

    #[test]
    fn test_router_tees_to_admitting_routes()
    {
        let low = MemorySink::new();
        let high = MemorySink::new();
        let all = MemorySink::new();
        let mut router = SinkRouter::new(AtomicLevel::new(Severity::Debug));
        router.push_route(Route::new(SeverityPredicate::Below(Severity::Error), Arc::new(low.clone()), json(), false));
        router.push_route(Route::new(SeverityPredicate::AtLeast(Severity::Error), Arc::new(high.clone()), json(), false));
        router.push_route(Route::new(SeverityPredicate::All, Arc::new(all.clone()), json(), false));

        router.write(&record(Severity::Info));
        router.write(&record(Severity::Error));

        assert_eq!(low.lines().len(), 1);
        assert!(low.contents().contains("info message"));
        assert_eq!(high.lines().len(), 1);
        assert!(high.contents().contains("error message"));
        assert_eq!(all.lines().len(), 2);
    }

    #[test]
    fn test_gate_is_floor_for_every_route()
    {
        let sink = MemorySink::new();
        let gate = AtomicLevel::new(Severity::Warn);
        let mut router = SinkRouter::new(gate.clone());
        router.push_route(Route::new(SeverityPredicate::All, Arc::new(sink.clone()), json(), false));

        router.write(&record(Severity::Info));
        assert!(sink.lines().is_empty());
        assert!(!router.enabled(Severity::Info));

        gate.set_level(Severity::Debug);
        router.write(&record(Severity::Info));
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_write_failure_goes_to_error_output()
    {
        let errors = MemorySink::new();
        let healthy = MemorySink::new();
        let mut router = SinkRouter::new(AtomicLevel::new(Severity::Info));
        router.set_error_output(Arc::new(errors.clone()));
        router.push_route(Route::new(SeverityPredicate::All, Arc::new(FailingSink::default()), json(), false));
        router.push_route(Route::new(SeverityPredicate::All, Arc::new(healthy.clone()), json(), false));

        router.write(&record(Severity::Warn));

        assert!(errors.contents().contains("write error: disk on fire"));
        assert_eq!(healthy.lines().len(), 1);
    }

    #[test]
    fn test_sync_attempts_every_sink_and_returns_first_error()
    {
        let failing = Arc::new(FailingSink::default());
        let counting = Arc::new(CountingSink::default());
        let mut router = SinkRouter::new(AtomicLevel::default());
        router.push_route(Route::new(SeverityPredicate::All, failing.clone(), json(), false));
        router.push_route(Route::new(SeverityPredicate::All, counting.clone(), json(), false));

        let err = router.sync().unwrap_err();
        assert!(matches!(err, LoggerError::Sync(_)));
        assert!(err.to_string().contains("sync failed"));
        assert_eq!(failing.syncs.load(Ordering::SeqCst), 1);
        assert_eq!(counting.syncs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_is_all_or_nothing()
    {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let mut configs = Driver::Stdout.sink_configs(&EncoderConfig::default(), false, "", RotationPolicy::default());
        configs.push(SinkConfig {
            destination: Destination::File(format!("{}/sub/app-%Y.log", blocker.display())),
            encoder: EncoderConfig::default(),
            predicate: SeverityPredicate::All,
            rotation: RotationPolicy::default(),
            use_color: false,
        });

        let err = SinkRouter::open(AtomicLevel::default(), &configs).unwrap_err();
        assert!(matches!(err, LoggerError::FileSink { .. }));
    }

    #[test]
    fn test_color_requires_terminal()
    {
        let config = EncoderConfig { style: EncoderStyle::Text, ..EncoderConfig::default() };
        let sink = MemorySink::new();
        let mut router = SinkRouter::new(AtomicLevel::default());
        router.push_route(Route::new(SeverityPredicate::All, Arc::new(sink.clone()), encoder_for(&config), true));

        router.write(&record(Severity::Error));
        assert!(!sink.contents().contains('\x1b'));
    }
}
