//! Shared helpers for integration tests

#![allow(dead_code)]

use std::env;
use std::process::{Command, Output};
use std::sync::Arc;

use serde_json::Value;
use sklog::{LoggerBuilder, Manager, MemorySink, SeverityPredicate};

/// Environment variable telling a re-executed test binary which child role to play.
pub const CHILD_MODE: &str = "SKLOG_TEST_CHILD";

/// Logger writing only into an in-memory sink.
pub fn memory_logger(builder: LoggerBuilder) -> (Manager, MemorySink)
{
    let sink = MemorySink::new();
    let logger = builder
        .without_driver_output()
        .with_sink(SeverityPredicate::All, Arc::new(sink.clone()))
        .build()
        .expect("memory logger should build");
    (logger, sink)
}

/// Parse every line of `sink` as a JSON record.
pub fn records(sink: &MemorySink) -> Vec<Value>
{
    sink.lines()
        .iter()
        .map(|line| serde_json::from_str(line).expect("line should be valid JSON"))
        .collect()
}

/// JSON records found in process output, located by their opening brace.
pub fn json_lines(output: &[u8]) -> Vec<Value>
{
    String::from_utf8_lossy(output)
        .lines()
        .filter_map(|line| line.find('{').map(|start| &line[start..]))
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Whether this process was spawned by [`run_child`] in `mode`.
pub fn is_child(mode: &str) -> bool
{
    env::var(CHILD_MODE).as_deref() == Ok(mode)
}

/// Re-run a single test of the current test binary in a child process.
pub fn run_child(test_name: &str, mode: &str) -> Output
{
    Command::new(env::current_exe().expect("test binary path"))
        .args([test_name, "--exact", "--quiet", "--nocapture", "--test-threads=1"])
        .env(CHILD_MODE, mode)
        .output()
        .expect("failed to spawn child test process")
}
