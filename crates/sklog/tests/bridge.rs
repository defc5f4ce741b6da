//! Events from the `tracing` macros routed through a Manager

mod common;

use common::{memory_logger, records};
use sklog::{LoggerBuilder, ManagerLayer, Severity};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[test]
fn test_tracing_events_reach_sinks()
{
    let (logger, sink) = memory_logger(LoggerBuilder::new().with_level("debug"));
    let subscriber = Registry::default().with(ManagerLayer::new(logger));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(trace_id = "abc123", user_id = 12345, admin = false, "User logged in");
        tracing::warn!(ratio = 0.5, "half full");
    });

    let records = records(&sink);
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["L"], "INFO");
    assert_eq!(records[0]["M"], "User logged in");
    assert_eq!(records[0]["TraceID"], "abc123");
    assert_eq!(records[0]["user_id"], 12345);
    assert_eq!(records[0]["admin"], false);
    assert_eq!(records[0]["N"], "bridge");
    assert!(records[0]["C"].as_str().unwrap().starts_with("tests/bridge.rs:"));
    assert!(records[0].get("trace_id").is_none());

    assert_eq!(records[1]["L"], "WARN");
    assert_eq!(records[1]["ratio"], 0.5);
}

#[test]
fn test_tracing_respects_runtime_level()
{
    let (logger, sink) = memory_logger(LoggerBuilder::new().with_level("info"));
    let subscriber = Registry::default().with(ManagerLayer::new(logger.clone()));

    tracing::subscriber::with_default(subscriber, || {
        for round in 0..2 {
            tracing::debug!(round, "maybe");
            tracing::trace!(round, "maybe trace");
            logger.set_level(Severity::Debug);
        }
    });

    let rounds: Vec<i64> = records(&sink).iter().map(|record| record["round"].as_i64().unwrap()).collect();
    assert_eq!(rounds, [1, 1]);
}

#[test]
fn test_tracing_named_manager_prefixes_target()
{
    let (logger, sink) = memory_logger(LoggerBuilder::new());
    let subscriber = Registry::default().with(ManagerLayer::new(logger.named("app")));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(target: "db", "connection lost");
    });

    let records = records(&sink);
    assert_eq!(records[0]["N"], "app.db");
    assert_eq!(records[0]["L"], "ERROR");
}
