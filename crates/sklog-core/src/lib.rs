//! # sklog-core
//!
//! The logging pipeline behind the `sklog` facade.
//!
//! This crate provides the building blocks, leaf first:
//! - [`level`]: severities and the shared, lock-free level gate
//! - [`field`] / [`record`]: typed structured fields and the per-call record
//! - [`encoder`]: JSON and console text rendering
//! - [`sink`] / [`rotate`]: stdout/stderr, in-memory and rotating file sinks,
//!   and the router that fans records out to them
//! - [`trace`]: request context and trace-id enrichment
//! - [`caller`]: call-site resolution with an adjustable skip count
//!
//! Everything here is synchronous: a record is encoded and written on the
//! calling thread.

pub mod caller;
pub mod encoder;
pub mod error;
pub mod field;
pub mod level;
pub mod record;
pub mod rotate;
pub mod sink;
pub mod trace;

// Re-export commonly used types
pub use caller::CallerSkip;
pub use encoder::{Encoder, EncoderConfig, EncoderStyle};
pub use error::{LoggerError, LoggerResult};
pub use field::{Field, FieldValue};
pub use level::{AtomicLevel, Severity};
pub use record::{Caller, LogRecord};
pub use rotate::{RotatingFileSink, RotationPolicy};
pub use sink::{ConsoleSink, Destination, Driver, MemorySink, Route, SeverityPredicate, Sink, SinkConfig, SinkRouter};
pub use trace::{enrich_with_trace, Context, TRACE_ID_FIELD, TRACE_ID_KEY};
