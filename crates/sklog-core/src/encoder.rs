//! # Encoders
//!
//! Rendering of a [`LogRecord`] into one output line.
//!
//! Two styles are supported:
//! - **JSON**: one object per line, fixed keys first (level, time, name,
//!   caller, message), then structured fields in call order, then the stack
//!   trace. Suited to log shipping and machine parsing.
//! - **Text**: tab-separated, human-oriented console layout, optionally with
//!   ANSI-colored levels.
//!
//! Key names come from [`EncoderConfig`]; setting a key to the empty string
//! drops that element from the output entirely.
//!
//! ## Example
//!
//! ```rust
//! use sklog_core::encoder::{encoder_for, EncoderConfig};
//! use sklog_core::field::Field;
//! use sklog_core::level::Severity;
//! use sklog_core::record::LogRecord;
//!
//! let encoder = encoder_for(&EncoderConfig::default());
//! let record = LogRecord::new(Severity::Info, "started", vec![Field::int("port", 8080)]);
//! let line = String::from_utf8(encoder.encode(&record, false)).unwrap();
//! assert!(line.contains(r#""L":"INFO""#));
//! assert!(line.ends_with('\n'));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Offset, TimeZone};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::field::{Field, FieldValue};
use crate::level::Severity;
use crate::record::LogRecord;

/// ISO-8601 with milliseconds and numeric offset.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// [`TIME_FORMAT`] with the zero offset written as `Z`.
pub const UTC_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render `time` as ISO-8601 with milliseconds; UTC is suffixed `Z`,
/// other offsets as `+hhmm`.
#[must_use]
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    if time.offset().fix().local_minus_utc() == 0 {
        time.format(UTC_TIME_FORMAT).to_string()
    } else {
        time.format(TIME_FORMAT).to_string()
    }
}

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderStyle
{
    /// Line-delimited JSON objects (default)
    #[default]
    Json,
    /// Tab-separated console text
    Text,
}

impl FromStr for EncoderStyle
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "json" | "prod" | "production" => Ok(EncoderStyle::Json),
            "text" | "console" | "pretty" | "dev" | "development" => Ok(EncoderStyle::Text),
            _ => Err(format!("Unknown log format: {s}. Use 'json' or 'text'")),
        }
    }
}

/// Field-name mapping and style for an encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig
{
    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub message_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub style: EncoderStyle,
}

impl Default for EncoderConfig
{
    fn default() -> Self
    {
        Self {
            time_key: "T".to_string(),
            level_key: "L".to_string(),
            name_key: "N".to_string(),
            message_key: "M".to_string(),
            caller_key: "C".to_string(),
            stacktrace_key: "S".to_string(),
            line_ending: "\n".to_string(),
            style: EncoderStyle::Json,
        }
    }
}

/// Renders records to bytes
///
/// Implementations must be deterministic for a given record and must emit
/// exactly one logical entry terminated by the configured line ending.
pub trait Encoder: Send + Sync + fmt::Debug
{
    /// Encode `record`. `color` asks for ANSI styling; encoders without a
    /// notion of color ignore it.
    fn encode(&self, record: &LogRecord, color: bool) -> Vec<u8>;
}

/// Build the encoder matching `config.style`.
#[must_use]
pub fn encoder_for(config: &EncoderConfig) -> Arc<dyn Encoder>
{
    match config.style {
        EncoderStyle::Json => Arc::new(JsonEncoder::new(config.clone())),
        EncoderStyle::Text => Arc::new(TextEncoder::new(config.clone())),
    }
}

/// Line-delimited JSON encoder
#[derive(Debug, Clone)]
pub struct JsonEncoder
{
    config: EncoderConfig,
}

impl JsonEncoder
{
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self
    {
        Self { config }
    }
}

impl Encoder for JsonEncoder
{
    fn encode(&self, record: &LogRecord, _color: bool) -> Vec<u8>
    {
        let mut buf = Vec::with_capacity(256);
        let line = JsonLine { config: &self.config, record };
        if let Err(err) = serde_json::to_writer(&mut buf, &line) {
            buf.clear();
            buf.extend_from_slice(format!(r#"{{"encodeError":"{}"}}"#, err.to_string().escape_default()).as_bytes());
        }
        buf.extend_from_slice(self.config.line_ending.as_bytes());
        buf
    }
}

struct JsonLine<'a>
{
    config: &'a EncoderConfig,
    record: &'a LogRecord,
}

impl Serialize for JsonLine<'_>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        let cfg = self.config;
        let rec = self.record;
        let mut map = serializer.serialize_map(None)?;

        if !cfg.level_key.is_empty() {
            map.serialize_entry(&cfg.level_key, rec.severity.as_capital_str())?;
        }
        if !cfg.time_key.is_empty() {
            map.serialize_entry(&cfg.time_key, &format_time(&rec.time))?;
        }
        if let (false, Some(name)) = (cfg.name_key.is_empty(), &rec.name) {
            map.serialize_entry(&cfg.name_key, name)?;
        }
        if let (false, Some(caller)) = (cfg.caller_key.is_empty(), &rec.caller) {
            map.serialize_entry(&cfg.caller_key, &caller.short())?;
        }
        if !cfg.message_key.is_empty() {
            map.serialize_entry(&cfg.message_key, &rec.message)?;
        }
        for field in &rec.fields {
            map.serialize_entry(&*field.key, &JsonValue(&field.value))?;
        }
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &rec.stack) {
            map.serialize_entry(&cfg.stacktrace_key, stack)?;
        }
        map.end()
    }
}

struct JsonValue<'a>(&'a FieldValue);

impl Serialize for JsonValue<'_>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        match self.0 {
            FieldValue::String(value) | FieldValue::Error(value) => serializer.serialize_str(value),
            FieldValue::Int(value) => serializer.serialize_i64(*value),
            FieldValue::Uint(value) => serializer.serialize_u64(*value),
            FieldValue::Float(value) => serialize_float(*value, serializer),
            FieldValue::Bool(value) => serializer.serialize_bool(*value),
            FieldValue::Duration(value) => serialize_float(value.as_secs_f64(), serializer),
        }
    }
}

fn serialize_float<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error>
{
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_infinite() {
        serializer.serialize_str(if value > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        serializer.serialize_f64(value)
    }
}

/// Fields only, as a JSON object, for the text layout.
struct JsonFields<'a>(&'a [Field]);

impl Serialize for JsonFields<'_>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&*field.key, &JsonValue(&field.value))?;
        }
        map.end()
    }
}

/// Tab-separated console encoder
#[derive(Debug, Clone)]
pub struct TextEncoder
{
    config: EncoderConfig,
}

impl TextEncoder
{
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self
    {
        Self { config }
    }
}

impl Encoder for TextEncoder
{
    fn encode(&self, record: &LogRecord, color: bool) -> Vec<u8>
    {
        let cfg = &self.config;
        let mut elements: Vec<String> = Vec::with_capacity(6);

        if !cfg.time_key.is_empty() {
            elements.push(format_time(&record.time));
        }
        if !cfg.level_key.is_empty() {
            elements.push(level_text(record.severity, color));
        }
        if let (false, Some(name)) = (cfg.name_key.is_empty(), &record.name) {
            elements.push(name.clone());
        }
        if let (false, Some(caller)) = (cfg.caller_key.is_empty(), &record.caller) {
            elements.push(caller.short());
        }
        if !cfg.message_key.is_empty() {
            elements.push(record.message.clone());
        }
        if !record.fields.is_empty() {
            match serde_json::to_string(&JsonFields(&record.fields)) {
                Ok(fields) => elements.push(fields),
                Err(err) => elements.push(format!("<unencodable fields: {err}>")),
            }
        }

        let mut line = elements.join("\t");
        line.push_str(&cfg.line_ending);
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &record.stack) {
            line.push_str(stack.trim_end());
            line.push_str(&cfg.line_ending);
        }
        line.into_bytes()
    }
}

fn level_text(severity: Severity, color: bool) -> String
{
    let name = severity.as_capital_str();
    if !color {
        return name.to_string();
    }
    let code = match severity {
        Severity::Debug => 35,
        Severity::Info => 34,
        Severity::Warn => 33,
        Severity::Error | Severity::DPanic | Severity::Panic | Severity::Fatal => 31,
    };
    format!("\x1b[{code}m{name}\x1b[0m")
}
