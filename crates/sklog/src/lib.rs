//! # sklog
//!
//! Option-based logger facade with console and rotating file drivers,
//! runtime level control and request-scoped trace ids.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sklog::{Context, Field, LoggerBuilder};
//!
//! let logger = LoggerBuilder::new().with_level("debug").build().expect("Failed to build logger");
//!
//! let ctx = Context::background().with_trace_id("123456");
//! logger.debug(&ctx, "Debug", &[]);
//! logger.info(&ctx, "Info", &[Field::string("info", "value")]);
//!
//! let err = std::io::Error::other("debug info");
//! logger.error(&ctx, "error", &[Field::error(&err)]);
//!
//! logger.sync().expect("Failed to flush logs");
//! ```
//!
//! The pipeline itself lives in `sklog-core`; this crate adds the builder,
//! the [`Manager`] facade and the bridge from the `tracing` macros.

pub mod bridge;
pub mod builder;
pub mod manager;

pub use bridge::{init_global, ManagerLayer};
pub use builder::LoggerBuilder;
pub use manager::Manager;
// Re-export the pipeline types callers need at the call site
pub use sklog_core::{
    Context, EncoderConfig, EncoderStyle, Field, FieldValue, LoggerError, LoggerResult, MemorySink, SeverityPredicate,
    Severity, Sink, TRACE_ID_KEY,
};
pub use tracing::{debug, error, info, trace, warn};
