//! # Manager
//!
//! The logging facade: leveled calls with an explicit [`Context`], runtime
//! level changes, child handles and flushing.
//!
//! A `Manager` is a cheap handle. [`Manager::named`] and [`Manager::with`]
//! return new handles that share the same sinks and level gate, so
//! [`Manager::set_level`] on any of them affects all of them.
//!
//! ## Termination
//!
//! [`Manager::panic`] and [`Manager::fatal`] write the record, flush every
//! sink and then panic or exit the process with status 1. They are meant for
//! unrecoverable conditions only.
//!
//! ## Caller location
//!
//! Every leveled method is `#[track_caller]`. Helpers that wrap a `Manager`
//! should be `#[track_caller]` too, or raise the caller skip with
//! [`crate::LoggerBuilder::with_caller_skip`].

use std::backtrace::Backtrace;
use std::panic::Location;
use std::process;
use std::sync::Arc;

use sklog_core::caller::CallerSkip;
use sklog_core::error::LoggerResult;
use sklog_core::field::Field;
use sklog_core::level::{AtomicLevel, Severity};
use sklog_core::record::{Caller, LogRecord};
use sklog_core::sink::SinkRouter;
use sklog_core::trace::{enrich_with_trace, Context};

/// Pipeline shared by a manager and every handle derived from it.
#[derive(Debug)]
pub(crate) struct Pipeline
{
    pub(crate) router: SinkRouter,
    /// `None` disables caller capture
    pub(crate) caller: Option<CallerSkip>,
    pub(crate) stacktrace_level: Severity,
    pub(crate) development: bool,
}

/// Logging facade handle
#[derive(Debug, Clone)]
pub struct Manager
{
    pipeline: Arc<Pipeline>,
    name: Option<String>,
    fields: Vec<Field>,
}

impl Manager
{
    pub(crate) fn from_pipeline(pipeline: Pipeline) -> Self
    {
        Self { pipeline: Arc::new(pipeline), name: None, fields: Vec::new() }
    }

    /// Log at Debug.
    #[track_caller]
    pub fn debug(&self, ctx: &Context, message: &str, fields: &[Field])
    {
        self.log(ctx, Severity::Debug, message, fields, Location::caller());
    }

    /// Log at Info.
    #[track_caller]
    pub fn info(&self, ctx: &Context, message: &str, fields: &[Field])
    {
        self.log(ctx, Severity::Info, message, fields, Location::caller());
    }

    /// Log at Warn.
    #[track_caller]
    pub fn warn(&self, ctx: &Context, message: &str, fields: &[Field])
    {
        self.log(ctx, Severity::Warn, message, fields, Location::caller());
    }

    /// Log at Error.
    #[track_caller]
    pub fn error(&self, ctx: &Context, message: &str, fields: &[Field])
    {
        self.log(ctx, Severity::Error, message, fields, Location::caller());
    }

    /// Log at DPanic; in development mode, flush and panic afterwards.
    ///
    /// ## Panics
    ///
    /// Panics with `message` if the manager was built with
    /// `with_development(true)`.
    #[track_caller]
    pub fn dpanic(&self, ctx: &Context, message: &str, fields: &[Field])
    {
        self.log(ctx, Severity::DPanic, message, fields, Location::caller());
        if self.pipeline.development {
            let _ = self.sync();
            panic!("{message}");
        }
    }

    /// Log at Panic, flush, then panic with `message`.
    ///
    /// ## Panics
    ///
    /// Always.
    #[track_caller]
    pub fn panic(&self, ctx: &Context, message: &str, fields: &[Field]) -> !
    {
        self.log(ctx, Severity::Panic, message, fields, Location::caller());
        let _ = self.sync();
        panic!("{message}");
    }

    /// Log at Fatal, flush, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, ctx: &Context, message: &str, fields: &[Field]) -> !
    {
        self.log(ctx, Severity::Fatal, message, fields, Location::caller());
        let _ = self.sync();
        process::exit(1);
    }

    /// Change the minimum severity for every handle sharing this pipeline.
    pub fn set_level(&self, level: Severity)
    {
        self.pipeline.router.gate().set_level(level);
    }

    #[must_use]
    pub fn level(&self) -> Severity
    {
        self.pipeline.router.gate().level()
    }

    /// Handle to the shared level gate.
    #[must_use]
    pub fn atomic_level(&self) -> AtomicLevel
    {
        self.pipeline.router.gate().clone()
    }

    /// Shared caller-skip counter, if caller capture is enabled.
    #[must_use]
    pub fn caller_skip(&self) -> Option<&CallerSkip>
    {
        self.pipeline.caller.as_ref()
    }

    /// Whether a call at `severity` would currently be written anywhere.
    #[must_use]
    pub fn enabled(&self, severity: Severity) -> bool
    {
        self.pipeline.router.enabled(severity)
    }

    /// Flush every sink.
    ///
    /// ## Errors
    ///
    /// Returns the first sink failure after attempting all of them.
    pub fn sync(&self) -> LoggerResult<()>
    {
        self.pipeline.router.sync()
    }

    /// Handle whose records carry `name` appended to this handle's namespace.
    #[must_use]
    pub fn named(&self, name: &str) -> Manager
    {
        if name.is_empty() {
            return self.clone();
        }
        Manager { name: Some(self.scoped_name(name)), ..self.clone() }
    }

    /// Handle that adds `fields` to every record it logs.
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Manager
    {
        let mut child = self.clone();
        child.fields.extend_from_slice(fields);
        child
    }

    /// Current namespace, dot-joined.
    #[must_use]
    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    fn scoped_name(&self, name: &str) -> String
    {
        match &self.name {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    fn log(&self, ctx: &Context, severity: Severity, message: &str, fields: &[Field], location: &'static Location<'static>)
    {
        if !self.enabled(severity) {
            return;
        }
        let caller = self.pipeline.caller.as_ref().map(|skip| skip.resolve(location));
        self.write_record(ctx, severity, None, message, fields, caller);
    }

    /// Build and route a record for a call that was already gated.
    ///
    /// `scope` is appended to the handle's namespace for this record only.
    pub(crate) fn write_record(
        &self,
        ctx: &Context,
        severity: Severity,
        scope: Option<&str>,
        message: &str,
        fields: &[Field],
        caller: Option<Caller>,
    )
    {
        let bound = enrich_with_trace(ctx, &self.fields);
        let mut all = Vec::with_capacity(bound.len() + fields.len());
        all.extend_from_slice(&bound);
        all.extend_from_slice(fields);

        let name = match scope.filter(|scope| !scope.is_empty()) {
            Some(scope) => Some(self.scoped_name(scope)),
            None => self.name.clone(),
        };
        let stack = (severity >= self.pipeline.stacktrace_level).then(|| Backtrace::force_capture().to_string());

        let record = LogRecord::new(severity, message, all)
            .with_name(name)
            .with_caller(caller)
            .with_stack(stack);
        self.pipeline.router.write(&record);
    }

    pub(crate) fn captures_caller(&self) -> bool
    {
        self.pipeline.caller.is_some()
    }
}
