//! printf-style message formatting for log calls
//!
//! The first argument is a template when it is a string. Supported tokens:
//! `%s` (string), `%d` (number), `%j` (JSON) and `%%` (literal percent). A
//! template given alone is returned untouched. Otherwise `%%` always becomes
//! `%`, and a token with no argument left to consume is kept as written.
//! Arguments left
//! over after the template are appended, separated by spaces: scalars as
//! plain text, everything else in inspect form. When the first argument is
//! not a string every argument is inspected.

use super::render::{display_scalar, format_number, inspect, to_json_lossy};
use super::value::FieldValue;

/// Build the `msg` text from a call's message arguments
pub fn format_message(args: &[FieldValue]) -> String {
    let Some(first) = args.first() else {
        return String::new();
    };
    let FieldValue::String(template) = first else {
        return args.iter().map(inspect).collect::<Vec<_>>().join(" ");
    };

    if args.len() == 1 {
        return template.clone();
    }

    let mut rest = args[1..].iter().peekable();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let token = match chars.peek() {
            Some(&t @ ('s' | 'd' | 'j' | '%')) => t,
            _ => {
                out.push('%');
                continue;
            }
        };
        chars.next();
        if token == '%' {
            out.push('%');
            continue;
        }
        if rest.peek().is_none() {
            out.push('%');
            out.push(token);
            continue;
        }
        match token {
            's' => {
                if let Some(arg) = rest.next() {
                    out.push_str(&as_string(arg));
                }
            }
            'd' => {
                if let Some(arg) = rest.next() {
                    out.push_str(&as_number(arg));
                }
            }
            _ => {
                if let Some(arg) = rest.next() {
                    out.push_str(&as_json(arg));
                }
            }
        }
    }

    for arg in rest {
        out.push(' ');
        out.push_str(&as_string(arg));
    }
    out
}

fn as_string(arg: &FieldValue) -> String {
    if arg.is_scalar() {
        display_scalar(arg)
    } else {
        inspect(arg)
    }
}

fn as_number(arg: &FieldValue) -> String {
    let n = match arg {
        FieldValue::Int(i) => return i.to_string(),
        FieldValue::UInt(u) => return u.to_string(),
        FieldValue::Float(f) => *f,
        FieldValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        FieldValue::Null => 0.0,
        FieldValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    };
    format_number(n)
}

fn as_json(arg: &FieldValue) -> String {
    serde_json::to_string(&to_json_lossy(arg)).unwrap_or_default()
}
