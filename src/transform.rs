//! Value-preserving data transforms.
//!
//! Every function here derives its output from its input alone. Whatever
//! the input carried, including markup or SQL fragments, is still present
//! in the output.

use crate::error::{ServerError, ServerResult};
use serde::Serialize;
use serde_json::{Map, Value};

pub struct DataTransformer;

impl DataTransformer {
    pub fn to_json<T: Serialize + ?Sized>(data: &T) -> ServerResult<String> {
        Ok(serde_json::to_string(data)?)
    }

    pub fn from_json(json: &str) -> ServerResult<Value> {
        Ok(serde_json::from_str(json)?)
    }

    /// Copies `base` and overlays `overrides`; on a shared key the override
    /// wins. Neither input is modified.
    pub fn merge_dicts(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = base.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn extract_field(data: &Map<String, Value>, field: &str) -> Option<Value> {
        data.get(field).cloned()
    }

    pub fn wrap_in_list<T>(item: T) -> Vec<T> {
        vec![item]
    }

    pub fn join_strings<S: AsRef<str>>(parts: &[S], separator: &str) -> String {
        parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(separator)
    }

    /// Keyword formatting in the style of Python's `str.format`.
    ///
    /// A field is `{name}`, `{name!conv}`, `{name:spec}` or both, where
    /// `conv` is `s` or `r` and `spec` is `[[fill]align][width]` with
    /// `align` one of `<`, `>`, `^`. `{{` and `}}` produce literal braces.
    /// Any other conversion, spec, attribute/index lookup or nested field
    /// is a [`ServerError::FormatError`].
    pub fn format_string(template: &str, kwargs: &Map<String, Value>) -> ServerResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => {
                                return Err(format_error("nested replacement fields are not supported"))
                            }
                            Some(ch) => field.push(ch),
                            None => return Err(format_error("unmatched '{' in format string")),
                        }
                    }
                    out.push_str(&Self::format_field(&field, kwargs)?);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => return Err(format_error("single '}' encountered in format string")),
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn format_field(field: &str, kwargs: &Map<String, Value>) -> ServerResult<String> {
        let (head, spec) = match field.split_once(':') {
            Some((head, spec)) => (head, Some(spec)),
            None => (field, None),
        };
        let (key, conversion) = match head.split_once('!') {
            Some((key, conversion)) => (key, Some(conversion)),
            None => (head, None),
        };
        if key.contains(['.', '[']) {
            return Err(format_error(format!("unsupported field lookup {:?}", key)));
        }
        let value = kwargs
            .get(key)
            .ok_or_else(|| format_error(format!("no value for field {:?}", key)))?;

        let (text, numeric) = match conversion {
            None => (Self::stringify(value), value.is_number()),
            Some("s") => (Self::stringify(value), false),
            Some("r") => (repr(value), false),
            Some(other) => {
                return Err(format_error(format!("unsupported conversion {:?}", other)))
            }
        };

        let spec = spec.unwrap_or_default();
        if spec.is_empty() {
            return Ok(text);
        }
        if conversion.is_none() && !matches!(value, Value::Number(_) | Value::String(_)) {
            return Err(format_error(format!("format spec {:?} on a non-text value", spec)));
        }
        let spec = parse_spec(spec)?;
        Ok(pad(&text, &spec, numeric))
    }

    /// String form of a value: strings as-is, everything else as JSON text.
    pub fn stringify(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn format_error<S: Into<String>>(message: S) -> ServerError {
    ServerError::FormatError(message.into())
}

struct Spec {
    fill: char,
    align: Option<char>,
    width: usize,
}

fn parse_spec(spec: &str) -> ServerResult<Spec> {
    let chars: Vec<char> = spec.chars().collect();
    let is_align = |c: &char| matches!(c, '<' | '>' | '^');
    let (fill, align, rest) = match chars.as_slice() {
        [fill, align, rest @ ..] if is_align(align) => (*fill, Some(*align), rest),
        [align, rest @ ..] if is_align(align) => (' ', Some(*align), rest),
        rest => (' ', None, rest),
    };
    let width: String = rest.iter().collect();
    if width.starts_with('0') || !width.chars().all(|c| c.is_ascii_digit()) {
        return Err(format_error(format!("unsupported format spec {:?}", spec)));
    }
    Ok(Spec {
        fill,
        align,
        width: width.parse().unwrap_or(0),
    })
}

fn pad(text: &str, spec: &Spec, numeric: bool) -> String {
    let len = text.chars().count();
    if len >= spec.width {
        return text.to_string();
    }
    let gap = spec.width - len;
    let (left, right) = match spec.align.unwrap_or(if numeric { '>' } else { '<' }) {
        '>' => (gap, 0),
        '^' => (gap / 2, gap - gap / 2),
        _ => (0, gap),
    };
    let fill = spec.fill.to_string();
    format!("{}{}{}", fill.repeat(left), text, fill.repeat(right))
}

/// Quoted form of a string value, as `repr` prints it. Other values keep
/// their plain string form.
fn repr(value: &Value) -> String {
    let Value::String(s) = value else {
        return DataTransformer::stringify(value);
    };
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
