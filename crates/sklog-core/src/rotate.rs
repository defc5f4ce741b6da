//! # Rotating File Sink
//!
//! Appends log lines to a file whose name is a strftime pattern expanded
//! against the start of the current rotation period.
//!
//! The default pattern produced by the file driver is
//! `<log_path>%Y-%m-%d.log`, rotated every 24 hours at local midnight:
//!
//! ```text
//! /var/log/app/api-2026-10-17.log
//! /var/log/app/api-2026-10-18.log   <- current
//! ```
//!
//! ## Rotation
//!
//! Periods are aligned to the local wall clock: the period start is the
//! current local time truncated to a multiple of the rotation interval. The
//! first write at or after the next boundary switches to the newly named
//! file. After each switch, sibling files matching the pattern whose
//! modification time is older than `max_age` are deleted. A zero `max_age`
//! keeps every file.
//!
//! ## Thread Safety
//!
//! All writes go through one mutex around the open file, so concurrent
//! lines never interleave.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::error::{LoggerError, LoggerResult};
use crate::sink::Sink;

/// Date pattern appended to the log path by the file driver.
pub const DATE_PATTERN: &str = "%Y-%m-%d";

/// Extension appended after the date pattern.
pub const FILE_SUFFIX: &str = ".log";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rotation and retention parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy
{
    /// Files older than this are deleted after a rotation; zero keeps all files
    pub max_age: Duration,
    /// Length of one rotation period
    pub rotation_time: Duration,
}

impl Default for RotationPolicy
{
    fn default() -> Self
    {
        Self { max_age: 7 * DAY, rotation_time: DAY }
    }
}

#[derive(Debug)]
struct ActiveFile
{
    file: File,
    path: PathBuf,
    next_rotation: NaiveDateTime,
}

/// File sink that switches files on period boundaries
#[derive(Debug)]
pub struct RotatingFileSink
{
    pattern: String,
    cleanup_glob: String,
    policy: RotationPolicy,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink
{
    /// Open the file for the current period, creating parent directories.
    ///
    /// ## Errors
    ///
    /// - [`LoggerError::InvalidPathPattern`] if `pattern` has a malformed
    ///   strftime specifier
    /// - [`LoggerError::FileSink`] if the directory or file cannot be created
    pub fn new(pattern: impl Into<String>, policy: RotationPolicy) -> LoggerResult<Self>
    {
        let pattern = pattern.into();
        let cleanup_glob = cleanup_glob(&pattern)?;
        let policy = RotationPolicy {
            rotation_time: if policy.rotation_time.is_zero() { DAY } else { policy.rotation_time },
            ..policy
        };

        let active = open_period(&pattern, policy.rotation_time, Local::now().naive_local())?;
        let sink = Self { pattern, cleanup_glob, policy, active: Mutex::new(active) };
        sink.remove_expired(&sink.lock().path);
        Ok(sink)
    }

    /// Path currently being written.
    #[must_use]
    pub fn current_path(&self) -> PathBuf
    {
        self.lock().path.clone()
    }

    #[must_use]
    pub fn policy(&self) -> RotationPolicy
    {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, ActiveFile>
    {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_at(&self, line: &[u8], now: NaiveDateTime) -> io::Result<()>
    {
        let mut active = self.lock();
        if now >= active.next_rotation {
            let next = open_period(&self.pattern, self.policy.rotation_time, now).map_err(io::Error::other)?;
            if next.path == active.path {
                active.next_rotation = next.next_rotation;
            } else {
                *active = next;
                self.remove_expired(&active.path);
            }
        }
        active.file.write_all(line)
    }

    /// Delete pattern siblings older than `max_age`, never touching `current`.
    fn remove_expired(&self, current: &Path)
    {
        if self.policy.max_age.is_zero() {
            return;
        }
        let Ok(paths) = glob::glob(&self.cleanup_glob) else {
            return;
        };
        let now = SystemTime::now();
        for path in paths.flatten() {
            if path == current {
                continue;
            }
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let expired = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > self.policy.max_age);
            if expired {
                let _ = fs::remove_file(&path);
            }
        }
    }
}

impl Sink for RotatingFileSink
{
    fn write(&self, line: &[u8]) -> io::Result<()>
    {
        self.write_at(line, Local::now().naive_local())
    }

    fn sync(&self) -> io::Result<()>
    {
        let mut active = self.lock();
        active.file.flush()?;
        active.file.sync_data()
    }
}

/// Start of the period containing `now`, on the local wall clock.
fn period_start(now: NaiveDateTime, rotation_time: Duration) -> NaiveDateTime
{
    let step = i64::try_from(rotation_time.as_secs()).unwrap_or(i64::MAX).max(1);
    let secs = now.and_utc().timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(step), 0).map_or(now, |start| start.naive_utc())
}

fn open_period(pattern: &str, rotation_time: Duration, now: NaiveDateTime) -> LoggerResult<ActiveFile>
{
    let start = period_start(now, rotation_time);
    let next_rotation = start + chrono::Duration::from_std(rotation_time).unwrap_or(chrono::Duration::days(1));
    let stamp = Local.from_local_datetime(&start).earliest().unwrap_or_else(Local::now);
    let path = PathBuf::from(expand_pattern(pattern, &stamp)?);
    let file = open_append(&path)?;
    Ok(ActiveFile { file, path, next_rotation })
}

/// Expand the strftime `pattern` for `time`.
///
/// ## Errors
///
/// Returns [`LoggerError::InvalidPathPattern`] for malformed specifiers.
pub fn expand_pattern(pattern: &str, time: &DateTime<Local>) -> LoggerResult<String>
{
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(LoggerError::InvalidPathPattern(pattern.to_string()));
    }
    let mut expanded = String::with_capacity(pattern.len() + 16);
    write!(expanded, "{}", time.format_with_items(items.into_iter()))
        .map_err(|_| LoggerError::InvalidPathPattern(pattern.to_string()))?;
    Ok(expanded)
}

/// Glob matching every file the pattern can produce.
fn cleanup_glob(pattern: &str) -> LoggerResult<String>
{
    let mut wildcard = String::with_capacity(pattern.len());
    for item in StrftimeItems::new(pattern) {
        match item {
            Item::Literal(text) | Item::Space(text) => wildcard.push_str(&glob::Pattern::escape(text)),
            Item::OwnedLiteral(text) | Item::OwnedSpace(text) => wildcard.push_str(&glob::Pattern::escape(&text)),
            Item::Error => return Err(LoggerError::InvalidPathPattern(pattern.to_string())),
            _ => {
                if !wildcard.ends_with('*') {
                    wildcard.push('*');
                }
            }
        }
    }
    Ok(wildcard)
}

fn open_append(path: &Path) -> LoggerResult<File>
{
    let sink_error = |source| LoggerError::FileSink { path: path.display().to_string(), source };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(sink_error)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(sink_error)
}
