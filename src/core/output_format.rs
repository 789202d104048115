//! Output modes for rendering records as text
//!
//! Turns one JSON record (a line from a text destination, or an object from
//! a raw one) into human-readable text:
//! - Long: `[time] LEVEL: name/pid on host (src): msg (extras)` plus details
//! - Short: like long without date, pid and hostname
//! - Simple: `LEVEL - msg`
//! - Json: indented JSON
//! - Inspect: inspect-style text
//! - BunyanCompact: single-line JSON
//!
//! Input that is not a record is returned unchanged.

use super::error::LoggerError;
use super::log_level::Level;
use super::render::inspect;
use super::timestamp::TimeDisplay;
use super::value::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Keys every record must carry to be rendered by the text modes
pub const RECORD_KEYS: [&str; 7] = ["v", "level", "name", "hostname", "pid", "time", "msg"];

/// Values longer than this move from the extras into the details block
const EXTRA_MAX_LEN: usize = 50;

const DETAIL_SEPARATOR: &str = "\n    --\n";

/// How a record is rendered as text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Multi-line human-readable format (default)
    ///
    /// Example: `[2025-01-08T10:30:45.123Z]  INFO: app/1234 on box: started (port=80)`
    #[default]
    Long,

    /// Compact human-readable format
    ///
    /// Example: `10:30:45.123Z  INFO app: started (port=80)`
    Short,

    /// Example: `INFO - started`
    Simple,

    /// JSON with configurable indentation
    Json,

    /// Inspect-style text: `{ level: 30, msg: 'started' }`
    Inspect,

    /// Compact single-line JSON
    #[serde(rename = "bunyan")]
    BunyanCompact,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Long => "long",
            OutputMode::Short => "short",
            OutputMode::Simple => "simple",
            OutputMode::Json => "json",
            OutputMode::Inspect => "inspect",
            OutputMode::BunyanCompact => "bunyan",
        }
    }
}

impl FromStr for OutputMode {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(OutputMode::Long),
            "short" => Ok(OutputMode::Short),
            "simple" => Ok(OutputMode::Simple),
            "json" => Ok(OutputMode::Json),
            "inspect" => Ok(OutputMode::Inspect),
            "bunyan" => Ok(OutputMode::BunyanCompact),
            other => Err(LoggerError::other(format!("unknown output mode: {}", other))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`render_line`] and [`render_record`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub mode: OutputMode,
    pub color: bool,
    /// Indent width for `json` mode; 0 renders a single line
    pub json_indent: usize,
    pub time_display: TimeDisplay,
}

impl RenderOptions {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_json_indent(mut self, indent: usize) -> Self {
        self.json_indent = indent;
        self
    }

    #[must_use]
    pub fn with_time_display(mut self, display: TimeDisplay) -> Self {
        self.time_display = display;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Long,
            color: cfg!(feature = "color"),
            json_indent: 2,
            time_display: TimeDisplay::Utc,
        }
    }
}

/// Render one JSON line; anything that is not a JSON object is returned as is
///
/// # Example
///
/// ```
/// use rust_bunyan::{render_line, OutputMode, RenderOptions};
///
/// let line = r#"{"name":"app","hostname":"box","pid":7,"level":30,"msg":"up","time":"2025-01-08T10:30:45.123Z","v":0}"#;
/// let options = RenderOptions::new(OutputMode::Simple).with_color(false);
/// assert_eq!(render_line(line, &options), "INFO - up");
/// assert_eq!(render_line("not json", &options), "not json");
/// ```
pub fn render_line(line: &str, options: &RenderOptions) -> String {
    match serde_json::from_str::<Value>(line) {
        Ok(value @ Value::Object(_)) => render_record(&value, options),
        _ => line.to_string(),
    }
}

/// Render one record object
///
/// The text modes need every key in [`RECORD_KEYS`]; other objects come
/// back as compact JSON.
pub fn render_record(record: &Value, options: &RenderOptions) -> String {
    let Value::Object(map) = record else {
        return record.to_string();
    };
    match options.mode {
        OutputMode::Json => to_indented_json(record, options.json_indent),
        OutputMode::BunyanCompact => record.to_string(),
        OutputMode::Inspect => inspect(&FieldValue::from(record.clone())),
        OutputMode::Simple if is_valid_record(map) => format!(
            "{} - {}",
            level_of(&map["level"]).map_or_else(|| format!("LVL{}", text_of(&map["level"])), Level::upper_name),
            text_of(&map["msg"])
        ),
        OutputMode::Long | OutputMode::Short if is_valid_record(map) => {
            Styler::new(options).long(map.clone(), options.mode == OutputMode::Short)
        }
        _ => record.to_string(),
    }
}

/// Whether `map` carries every key of [`RECORD_KEYS`]
pub fn is_valid_record(map: &Map<String, Value>) -> bool {
    RECORD_KEYS
        .iter()
        .all(|key| map.get(*key).is_some_and(|v| !v.is_null()))
}

fn to_indented_json(value: &Value, indent: usize) -> String {
    if indent == 0 {
        return value.to_string();
    }
    let spaces = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(spaces.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(not(feature = "color"), allow(dead_code))]
enum Style {
    Level(Level),
    Message,
    Source,
}

struct Styler<'a> {
    options: &'a RenderOptions,
}

impl<'a> Styler<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    #[cfg(feature = "color")]
    fn stylize(&self, text: &str, style: Style) -> String {
        use colored::Colorize;
        if !self.options.color || text.is_empty() {
            return text.to_string();
        }
        let styled = match style {
            Style::Level(level) => match level {
                Level::TRACE => text.white(),
                Level::DEBUG => text.yellow(),
                Level::INFO => text.cyan(),
                Level::WARN => text.magenta(),
                Level::ERROR => text.red(),
                Level::FATAL => text.reversed(),
                _ => return text.to_string(),
            },
            Style::Message => text.cyan(),
            Style::Source => text.green(),
        };
        styled.to_string()
    }

    #[cfg(not(feature = "color"))]
    fn stylize(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }

    fn long(&self, mut rec: Map<String, Value>, short: bool) -> String {
        rec.remove("v");

        let raw_time = rec.remove("time").map(|t| text_of(&t)).unwrap_or_default();
        let time = if short && raw_time.as_bytes().get(10) == Some(&b'T') {
            self.options.time_display.time_of_day(&raw_time)
        } else {
            format!("[{}]", self.options.time_display.full(&raw_time))
        };

        let mut name = rec.remove("name").map(|n| text_of(&n)).unwrap_or_default();
        if let Some(component) = rec.remove("component").filter(truthy) {
            name.push('/');
            name.push_str(&text_of(&component));
        }
        let pid = rec.remove("pid");
        if !short {
            if let Some(pid) = pid {
                name.push('/');
                name.push_str(&text_of(&pid));
            }
        }

        let level_value = rec.remove("level").unwrap_or(Value::Null);
        let level = match level_of(&level_value) {
            Some(level) => self.stylize(&level.upper_padded_name(), Style::Level(level)),
            None => format!("LVL{}", text_of(&level_value)),
        };

        let src = match rec.remove("src") {
            Some(Value::Object(src)) if src.get("file").is_some_and(truthy) => {
                let file = text_of(&src["file"]);
                let line = src.get("line").map(text_of).unwrap_or_default();
                let located = match src.get("func").filter(|f| truthy(f)) {
                    Some(func) => format!(" ({}:{} in {})", file, line, text_of(func)),
                    None => format!(" ({}:{})", file, line),
                };
                self.stylize(&located, Style::Source)
            }
            _ => String::new(),
        };

        let hostname = rec
            .remove("hostname")
            .filter(truthy)
            .map(|h| text_of(&h))
            .unwrap_or_else(|| "<no-hostname>".to_string());

        let mut extras: Vec<String> = Vec::new();
        let mut details: Vec<String> = Vec::new();

        if let Some(req_id) = rec.remove("req_id").filter(truthy) {
            extras.push(format!("req_id={}", text_of(&req_id)));
        }

        let msg = rec.remove("msg").map(|m| text_of(&m)).unwrap_or_default();
        let oneline_msg = if msg.contains('\n') {
            details.push(indent(&self.stylize(&msg, Style::Message)));
            String::new()
        } else {
            format!(" {}", self.stylize(&msg, Style::Message))
        };

        if let Some(Value::Object(req)) = take_object(&mut rec, "req") {
            details.push(indent(&request_text(req, "req", &mut rec, false)));
        }
        if let Some(Value::Object(req)) = take_object(&mut rec, "client_req") {
            details.push(indent(&request_text(req, "client_req", &mut rec, true)));
        }
        for key in ["res", "client_res"] {
            if let Some(Value::Object(res)) = take_object(&mut rec, key) {
                let text = response_text(res, key, &mut rec);
                if !text.is_empty() {
                    details.push(indent(&text));
                }
            }
        }

        let has_stack = rec
            .get("err")
            .and_then(|e| e.get("stack"))
            .is_some_and(truthy);
        if has_stack {
            if let Some(Value::Object(mut err)) = rec.remove("err") {
                let stack = err.remove("stack").map(|s| text_of(&s)).unwrap_or_default();
                details.push(indent(&stack));
                err.remove("message");
                err.remove("name");
                for (key, value) in err {
                    rec.insert(format!("err.{}", key), value);
                }
            }
        }

        for (key, value) in rec {
            let (text, stringified) = match value {
                Value::String(s) => (s, false),
                other => (to_indented_json(&other, 2), true),
            };
            if text.contains('\n') || text.chars().count() > EXTRA_MAX_LEN {
                details.push(indent(&format!("{}: {}", key, text)));
            } else if !stringified && (text.contains(' ') || text.is_empty()) {
                extras.push(format!("{}={}", key, Value::String(text)));
            } else {
                extras.push(format!("{}={}", key, text));
            }
        }

        let extras = if extras.is_empty() {
            String::new()
        } else {
            format!(" ({})", extras.join(", "))
        };
        let details = if details.is_empty() {
            String::new()
        } else {
            format!("\n{}", details.join(DETAIL_SEPARATOR))
        };

        if short {
            format!("{} {} {}:{}{}{}", time, level, name, oneline_msg, extras, details)
        } else {
            format!(
                "{} {}: {} on {}{}:{}{}{}",
                time, level, name, hostname, src, oneline_msg, extras, details
            )
        }
    }
}

fn take_object(rec: &mut Map<String, Value>, key: &str) -> Option<Value> {
    if rec.get(key).is_some_and(Value::is_object) {
        rec.remove(key)
    } else {
        None
    }
}

fn request_text(
    mut req: Map<String, Value>,
    prefix: &str,
    rec: &mut Map<String, Value>,
    client: bool,
) -> String {
    let method = req.remove("method").map(|m| text_of(&m)).unwrap_or_default();
    let url = req.remove("url").map(|u| text_of(&u)).unwrap_or_default();
    let version = req
        .remove("httpVersion")
        .filter(truthy)
        .map(|v| text_of(&v))
        .unwrap_or_else(|| "1.1".to_string());
    let headers = req.remove("headers");

    let mut text = if client {
        let mut host = String::new();
        if let Some(address) = req.remove("address").filter(truthy) {
            host = format!("Host: {}", text_of(&address));
            if let Some(port) = req.remove("port").filter(truthy) {
                host.push(':');
                host.push_str(&text_of(&port));
            }
            host.push('\n');
        }
        req.remove("port");
        let header_lines = match &headers {
            Some(Value::Object(h)) => header_lines(h),
            _ => String::new(),
        };
        format!("{} {} HTTP/{}\n{}{}", method, url, version, host, header_lines)
    } else {
        let header_block = match &headers {
            Some(Value::Object(h)) => format!("\n{}", header_lines(h)),
            Some(Value::String(h)) if !h.is_empty() => format!("\n{}", h),
            _ => String::new(),
        };
        format!("{} {} HTTP/{}{}", method, url, version, header_block)
    };

    if let Some(body) = req.remove("body").filter(truthy) {
        text.push_str("\n\n");
        text.push_str(&body_text(&body));
    }
    if let Some(Value::Object(trailers)) = req.remove("trailers") {
        if !trailers.is_empty() {
            text.push('\n');
            text.push_str(&header_lines(&trailers));
        }
    }
    for (key, value) in req {
        rec.insert(format!("{}.{}", prefix, key), value);
    }
    text
}

fn response_text(mut res: Map<String, Value>, prefix: &str, rec: &mut Map<String, Value>) -> String {
    let mut text = String::new();
    if let Some(status) = res.remove("statusCode") {
        let code = text_of(&status);
        let reason = status.as_u64().and_then(reason_phrase).unwrap_or("");
        text.push_str(&format!("HTTP/1.1 {} {}\n", code, reason));
    }
    let headers = res.remove("header").or_else(|| res.remove("headers"));
    match headers {
        Some(Value::String(h)) => text.push_str(h.trim_end()),
        Some(Value::Object(h)) => text.push_str(&header_lines(&h)),
        _ => {}
    }
    match res.remove("body") {
        Some(body) => {
            text.push_str("\n\n");
            text.push_str(&body_text(&body));
        }
        None => {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
        }
    }
    if let Some(trailer) = res.remove("trailer").filter(truthy) {
        text.push('\n');
        text.push_str(&text_of(&trailer));
    }
    for (key, value) in res {
        rec.insert(format!("{}.{}", prefix, key), value);
    }
    text
}

fn header_lines(headers: &Map<String, Value>) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, text_of(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn body_text(body: &Value) -> String {
    match body {
        Value::Object(_) | Value::Array(_) => to_indented_json(body, 2),
        other => text_of(other),
    }
}

fn indent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    format!("    {}", lines.join("\n    "))
}

fn level_of(value: &Value) -> Option<Level> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(Level::new)
}

/// Strings as they are, everything else as JSON
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn reason_phrase(code: u64) -> Option<&'static str> {
    let reason = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => return None,
    };
    Some(reason)
}
