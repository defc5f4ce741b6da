//! # Caller Capture
//!
//! Resolves the source location reported in the `caller` key.
//!
//! Facade methods are `#[track_caller]`, so the compiler already hands us the
//! logical call site. The skip count is interpreted relative to that:
//!
//! - `0`: the facade's own emission point
//! - `1`: the logical call site (default)
//! - `n > 1`: `n - 1` frames further out, found by walking a captured
//!   backtrace. When frames cannot be resolved (no debug info), the logical
//!   call site is reported instead.
//!
//! Helper layers that wrap the facade can either be annotated with
//! `#[track_caller]` themselves or raise the skip count.

use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use crate::record::Caller;

/// Shared, atomically adjustable frame-skip count.
#[derive(Debug, Clone)]
pub struct CallerSkip
{
    skip: Arc<AtomicI32>,
}

impl CallerSkip
{
    #[must_use]
    pub fn new(skip: i32) -> Self
    {
        Self { skip: Arc::new(AtomicI32::new(skip)) }
    }

    pub fn set(&self, skip: i32)
    {
        self.skip.store(skip, Ordering::Relaxed);
    }

    #[must_use]
    pub fn load(&self) -> i32
    {
        self.skip.load(Ordering::Relaxed)
    }

    /// Resolve the caller for a call whose logical site is `logical`.
    #[track_caller]
    #[must_use]
    pub fn resolve(&self, logical: &'static Location<'static>) -> Caller
    {
        let skip = self.load();
        if skip <= 0 {
            let own = Location::caller();
            return Caller::new(own.file(), own.line());
        }
        if skip == 1 {
            return Caller::new(logical.file(), logical.line());
        }

        let frames = backtrace_locations(&Backtrace::force_capture().to_string());
        let extra = usize::try_from(skip - 1).unwrap_or(0);
        frames
            .iter()
            .position(|frame| same_location(frame, logical))
            .and_then(|index| frames.get(index + extra))
            .cloned()
            .unwrap_or_else(|| Caller::new(logical.file(), logical.line()))
    }
}

impl Default for CallerSkip
{
    fn default() -> Self
    {
        Self::new(1)
    }
}

fn same_location(frame: &Caller, location: &Location<'_>) -> bool
{
    frame.line == location.line() && same_file(&frame.file, location.file())
}

/// Backtraces render paths relative to the crate (`./tests/x.rs`) while
/// `Location` is relative to the workspace (`crates/app/tests/x.rs`); the
/// shorter path must be a suffix of the longer one at a `/` boundary.
fn same_file(left: &str, right: &str) -> bool
{
    let left = normalize_path(left);
    let right = normalize_path(right);
    let (long, short) = if left.len() >= right.len() { (&left, &right) } else { (&right, &left) };
    !short.is_empty() && (long == short || long.ends_with(&format!("/{short}")))
}

fn normalize_path(path: &str) -> String
{
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// Extract `file:line` pairs from a rendered backtrace, innermost first.
fn backtrace_locations(rendered: &str) -> Vec<Caller>
{
    rendered
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("at "))
        .filter_map(|location| {
            let mut parts = location.trim().rsplitn(3, ':');
            let _column = parts.next()?;
            let line = parts.next()?.parse().ok()?;
            let file = parts.next()?;
            Some(Caller::new(file, line))
        })
        .collect()
}
