//! # Tracing Bridge
//!
//! Routes events emitted with the `tracing` macros into a [`Manager`].
//!
//! Libraries in the `tracing` ecosystem log through `tracing::info!` and
//! friends. Installing a [`ManagerLayer`] sends those events through the
//! same sinks, level gate and encoders as direct `Manager` calls.
//!
//! ## Mapping
//!
//! - `TRACE` and `DEBUG` → Debug, `INFO` → Info, `WARN` → Warn, `ERROR` → Error
//! - the `message` field becomes the record message
//! - a `trace_id` field becomes the trace context (logged as `TraceID`)
//! - the event target is appended to the manager's namespace
//! - the event's file and line become the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sklog::{init_global, LoggerBuilder};
//!
//! let logger = LoggerBuilder::from_env().build().expect("Failed to build logger");
//! init_global(&logger).expect("Failed to initialize logging");
//!
//! tracing::info!(trace_id = "abc123", user_id = 12345, "User logged in");
//! ```

use std::error::Error as StdError;
use std::fmt;

use sklog_core::error::{LoggerError, LoggerResult};
use sklog_core::field::Field;
use sklog_core::level::Severity;
use sklog_core::record::Caller;
use sklog_core::trace::{Context, TRACE_ID_KEY};
use tracing::field::{Field as TracingField, Visit};
use tracing::subscriber::Interest;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{self, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

use crate::manager::Manager;

const MESSAGE_FIELD: &str = "message";

/// `tracing_subscriber` layer forwarding events to a [`Manager`]
#[derive(Debug, Clone)]
pub struct ManagerLayer
{
    manager: Manager,
}

impl ManagerLayer
{
    #[must_use]
    pub fn new(manager: Manager) -> Self
    {
        Self { manager }
    }
}

/// Map a `tracing` level onto a severity.
#[must_use]
pub fn severity_of(level: &Level) -> Severity
{
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

impl<S: Subscriber> Layer<S> for ManagerLayer
{
    /// The level gate can change at runtime, so interest is never cached.
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest
    {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: layer::Context<'_, S>) -> bool
    {
        self.manager.enabled(severity_of(metadata.level()))
    }

    fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>)
    {
        let metadata = event.metadata();
        let severity = severity_of(metadata.level());
        if !self.manager.enabled(severity) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let ctx = match visitor.trace_id {
            Some(trace_id) => Context::background().with_value(TRACE_ID_KEY, trace_id),
            None => Context::background(),
        };
        let caller = match (self.manager.captures_caller(), metadata.file(), metadata.line()) {
            (true, Some(file), Some(line)) => Some(Caller::new(file, line)),
            _ => None,
        };

        self.manager
            .write_record(&ctx, severity, Some(metadata.target()), &visitor.message, &visitor.fields, caller);
    }
}

#[derive(Default)]
struct EventVisitor
{
    message: String,
    trace_id: Option<String>,
    fields: Vec<Field>,
}

impl Visit for EventVisitor
{
    fn record_str(&mut self, field: &TracingField, value: &str)
    {
        match field.name() {
            MESSAGE_FIELD => self.message = value.to_string(),
            TRACE_ID_KEY => self.trace_id = Some(value.to_string()),
            name => self.fields.push(Field::string(name, value)),
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64)
    {
        self.fields.push(Field::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64)
    {
        self.fields.push(Field::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64)
    {
        self.fields.push(Field::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool)
    {
        self.fields.push(Field::bool(field.name(), value));
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn StdError + 'static))
    {
        self.fields.push(Field::named_error(field.name(), value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug)
    {
        match field.name() {
            MESSAGE_FIELD => self.message = format!("{value:?}"),
            TRACE_ID_KEY => self.trace_id = Some(format!("{value:?}")),
            name => self.fields.push(Field::string(name, format!("{value:?}"))),
        }
    }
}

/// Install `manager` as the global `tracing` subscriber.
///
/// ## Errors
///
/// Returns [`LoggerError::InitializationFailed`] if a global subscriber is
/// already set.
pub fn init_global(manager: &Manager) -> LoggerResult<()>
{
    Registry::default()
        .with(ManagerLayer::new(manager.clone()))
        .try_init()
        .map_err(|err| LoggerError::InitializationFailed(err.to_string()))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_level_mapping()
    {
        assert_eq!(severity_of(&Level::TRACE), Severity::Debug);
        assert_eq!(severity_of(&Level::DEBUG), Severity::Debug);
        assert_eq!(severity_of(&Level::INFO), Severity::Info);
        assert_eq!(severity_of(&Level::WARN), Severity::Warn);
        assert_eq!(severity_of(&Level::ERROR), Severity::Error);
    }
}
