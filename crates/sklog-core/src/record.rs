//! Log record built once per call and handed to every sink.

use std::fmt;

use chrono::{DateTime, Local};

use crate::field::Field;
use crate::level::Severity;

/// Source location of the logical call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller
{
    /// Source file path as reported by the compiler
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl Caller
{
    pub fn new(file: impl Into<String>, line: u32) -> Self
    {
        Self { file: file.into(), line }
    }

    /// `dir/file.rs:line`, keeping only the last directory of the path.
    #[must_use]
    pub fn short(&self) -> String
    {
        let file = self.file.replace('\\', "/");
        let trimmed = match file.rfind('/') {
            Some(last) => match file[..last].rfind('/') {
                Some(prev) => &file[prev + 1..],
                None => file.as_str(),
            },
            None => file.as_str(),
        };
        format!("{trimmed}:{}", self.line)
    }
}

impl fmt::Display for Caller
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.short())
    }
}

/// A single, immutable log entry
#[derive(Debug, Clone)]
pub struct LogRecord
{
    pub time: DateTime<Local>,
    pub severity: Severity,
    /// Dot-joined logger namespace, if any
    pub name: Option<String>,
    pub message: String,
    /// Structured fields in call order
    pub fields: Vec<Field>,
    pub caller: Option<Caller>,
    pub stack: Option<String>,
}

impl LogRecord
{
    /// Record stamped with the current local time.
    pub fn new(severity: Severity, message: impl Into<String>, fields: Vec<Field>) -> Self
    {
        Self {
            time: Local::now(),
            severity,
            name: None,
            message: message.into(),
            fields,
            caller: None,
            stack: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self
    {
        self.name = name;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Option<Caller>) -> Self
    {
        self.caller = caller;
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: Option<String>) -> Self
    {
        self.stack = stack;
        self
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_caller_short_keeps_last_directory()
    {
        assert_eq!(Caller::new("crates/sklog/src/manager.rs", 42).short(), "src/manager.rs:42");
        assert_eq!(Caller::new("src/lib.rs", 7).short(), "src/lib.rs:7");
        assert_eq!(Caller::new("main.rs", 1).short(), "main.rs:1");
        assert_eq!(Caller::new("C:\\work\\app\\main.rs", 3).short(), "app/main.rs:3");
    }
}
