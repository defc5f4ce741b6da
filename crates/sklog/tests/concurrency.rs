//! Concurrent logging through one shared manager

mod common;

use std::collections::HashSet;
use std::thread;

use common::{is_child, json_lines, memory_logger, records, run_child};
use sklog::{Context, Field, LoggerBuilder, Manager};

const THREADS: i64 = 100;
const LINES_PER_THREAD: i64 = 100;

fn flood(logger: &Manager)
{
    let handles: Vec<_> = (0..THREADS)
        .map(|thread| {
            let logger = logger.clone();
            thread::spawn(move || {
                let ctx = Context::background().with_trace_id(format!("thread-{thread}"));
                for seq in 0..LINES_PER_THREAD {
                    logger.info(&ctx, "flood", &[Field::int("thread", thread), Field::int("seq", seq)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

fn assert_complete(records: &[serde_json::Value])
{
    let seen: HashSet<(i64, i64)> = records
        .iter()
        .filter(|record| record["M"] == "flood")
        .map(|record| (record["thread"].as_i64().unwrap(), record["seq"].as_i64().unwrap()))
        .collect();
    assert_eq!(seen.len(), usize::try_from(THREADS * LINES_PER_THREAD).unwrap());
}

#[test]
fn test_concurrent_lines_are_never_interleaved()
{
    let (logger, sink) = memory_logger(LoggerBuilder::new());
    flood(&logger);

    let records = records(&sink);
    assert_eq!(records.len(), 10_000);
    assert_complete(&records);
    for record in &records {
        let thread = record["thread"].as_i64().unwrap();
        assert_eq!(record["TraceID"], format!("thread-{thread}"));
    }
}

#[test]
fn test_concurrent_stdout_lines_are_whole()
{
    if is_child("stdout-flood") {
        let logger = LoggerBuilder::new().build().unwrap();
        flood(&logger);
        logger.sync().unwrap();
        return;
    }

    let output = run_child("test_concurrent_stdout_lines_are_whole", "stdout-flood");
    assert!(output.status.success());

    let flood_lines = String::from_utf8_lossy(&output.stdout).lines().filter(|line| line.contains("\"flood\"")).count();
    assert_eq!(flood_lines, 10_000);

    let records = json_lines(&output.stdout);
    assert_complete(&records);
}

#[test]
fn test_level_changes_while_logging()
{
    let (logger, sink) = memory_logger(LoggerBuilder::new());
    let writer = {
        let logger = logger.clone();
        thread::spawn(move || {
            let ctx = Context::background();
            for seq in 0..1_000 {
                logger.warn(&ctx, "tick", &[Field::int("seq", seq)]);
            }
        })
    };
    for _ in 0..100 {
        logger.set_level(sklog::Severity::Error);
        logger.set_level(sklog::Severity::Debug);
    }
    writer.join().unwrap();

    for record in records(&sink) {
        assert_eq!(record["L"], "WARN");
    }
}
