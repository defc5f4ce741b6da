//! Example showing the logger facade and the tracing bridge
//!
//! Run with `SKLOG_FORMAT=text SKLOG_COLOR=1` for colored console output, or
//! `SKLOG_DRIVER=file SKLOG_PATH=/tmp/demo-` to write `/tmp/demo-<date>.log`.

use sklog::{init_global, Context, Field, LoggerBuilder};

fn main()
{
    let logger = LoggerBuilder::from_env().with_level("debug").build().expect("Failed to build logger");

    let ctx = Context::background().with_trace_id("123456");

    logger.debug(&ctx, "Debug", &[]);
    logger.info(&ctx, "Info", &[Field::string("info", "value")]);

    let err = std::io::Error::other("debug info");
    logger.error(&ctx, "error", &[Field::error(&err)]);

    // Child handles share sinks and level
    let api = logger.named("api").with(&[Field::string("route", "/users")]);
    api.warn(&ctx, "slow request", &[Field::duration("elapsed", std::time::Duration::from_millis(1500))]);

    // Libraries using the tracing macros go through the same pipeline
    init_global(&logger).expect("Failed to initialize logging");
    tracing::info!(trace_id = "654321", user_id = 12345, action = "login", "User logged in");

    logger.sync().expect("Failed to flush logs");
}
