//! Block-style YAML writer.
//!
//! # Output rules
//! - Mappings and sequences are always block style, two-space indentation,
//!   sequences indented under their key.
//! - Multi-line strings become block literals (`|`, `|-`, `|+`), with an
//!   indentation indicator when the first content line starts with whitespace.
//! - Strings a YAML loader could read as something other than a string
//!   (booleans, null, numbers, dates, indicator-led text) are single-quoted.
//! - Strings with control characters, or whitespace-only multi-line strings,
//!   are double-quoted with escapes.

use std::fmt::Write as _;

use crate::serializer::node::{Mapping, YamlNode};

const INDENT: usize = 2;

/// YAML 1.1 and 1.2 words that resolve to booleans or null.
const RESERVED_WORDS: &[&str] = &["null", "~", "true", "false", "yes", "no", "on", "off", "y", "n"];

const INDICATORS: &str = "-?:,[]{}#&*!|>'\"%@`<=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
}

pub fn emit(root: &Mapping) -> String {
    let mut out = String::new();
    write_mapping(&mut out, root, 0, false);
    out
}

pub fn scalar_style(value: &str) -> ScalarStyle {
    if value.contains('\n') {
        let literal_safe = value
            .chars()
            .all(|c| c == '\n' || c == '\t' || !needs_escape(c));
        if literal_safe && !value.trim().is_empty() {
            ScalarStyle::Literal
        } else {
            ScalarStyle::DoubleQuoted
        }
    } else if value.chars().any(needs_escape) {
        ScalarStyle::DoubleQuoted
    } else if needs_quotes(value) {
        ScalarStyle::SingleQuoted
    } else {
        ScalarStyle::Plain
    }
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize, inline_first: bool) {
    for (i, (key, value)) in map.iter().enumerate() {
        if !(inline_first && i == 0) {
            pad(out, indent);
        }
        out.push_str(&format_key(key));
        out.push(':');
        write_value(out, value, indent);
    }
}

fn write_sequence(out: &mut String, items: &[YamlNode], indent: usize) {
    for item in items {
        pad(out, indent);
        out.push('-');
        match item {
            YamlNode::Mapping(map) if !map.is_empty() => {
                out.push(' ');
                write_mapping(out, map, indent + INDENT, true);
            }
            other => write_value(out, other, indent),
        }
    }
}

/// Writes a value after its `key:` or `-` marker. `indent` is the marker's column.
fn write_value(out: &mut String, value: &YamlNode, indent: usize) {
    match value {
        YamlNode::Scalar(s) => write_scalar(out, s, indent),
        YamlNode::Bool(b) => {
            let _ = writeln!(out, " {b}");
        }
        YamlNode::Sequence(items) if items.is_empty() => out.push_str(" []\n"),
        YamlNode::Sequence(items) => {
            out.push('\n');
            write_sequence(out, items, indent + INDENT);
        }
        YamlNode::Mapping(map) if map.is_empty() => out.push_str(" {}\n"),
        YamlNode::Mapping(map) => {
            out.push('\n');
            write_mapping(out, map, indent + INDENT, false);
        }
    }
}

fn write_scalar(out: &mut String, value: &str, indent: usize) {
    match scalar_style(value) {
        ScalarStyle::Literal => write_literal(out, value, indent),
        style => {
            out.push(' ');
            out.push_str(&quote(value, style));
            out.push('\n');
        }
    }
}

fn write_literal(out: &mut String, value: &str, indent: usize) {
    let content = value.trim_end_matches('\n');
    let trailing = value.len() - content.len();

    out.push_str(" |");
    let first_content_line = content.split('\n').find(|l| !l.is_empty());
    if first_content_line.is_some_and(|l| l.starts_with([' ', '\t'])) {
        let _ = write!(out, "{INDENT}");
    }
    match trailing {
        0 => out.push('-'),
        1 => {}
        _ => out.push('+'),
    }
    out.push('\n');

    for line in content.split('\n') {
        if !line.is_empty() {
            pad(out, indent + INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
    for _ in 1..trailing {
        out.push('\n');
    }
}

fn format_key(key: &str) -> String {
    match scalar_style(key) {
        ScalarStyle::Plain => key.to_string(),
        ScalarStyle::SingleQuoted => quote(key, ScalarStyle::SingleQuoted),
        _ => quote(key, ScalarStyle::DoubleQuoted),
    }
}

fn quote(value: &str, style: ScalarStyle) -> String {
    match style {
        ScalarStyle::SingleQuoted => format!("'{}'", value.replace('\'', "''")),
        ScalarStyle::DoubleQuoted => {
            let mut quoted = String::with_capacity(value.len() + 2);
            quoted.push('"');
            for c in value.chars() {
                match c {
                    '\\' => quoted.push_str("\\\\"),
                    '"' => quoted.push_str("\\\""),
                    '\n' => quoted.push_str("\\n"),
                    '\r' => quoted.push_str("\\r"),
                    '\t' => quoted.push_str("\\t"),
                    '\0' => quoted.push_str("\\0"),
                    c if needs_escape(c) => {
                        let code = c as u32;
                        if code <= 0xFFFF {
                            let _ = write!(quoted, "\\u{code:04X}");
                        } else {
                            let _ = write!(quoted, "\\U{code:08X}");
                        }
                    }
                    c => quoted.push(c),
                }
            }
            quoted.push('"');
            quoted
        }
        _ => value.to_string(),
    }
}

fn needs_escape(c: char) -> bool {
    (c.is_control() && c != '\n') || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}')
}

/// Whether a single-line string must be quoted to load back as the same string.
fn needs_quotes(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };
    if first.is_whitespace() || value.ends_with(char::is_whitespace) {
        return true;
    }
    if INDICATORS.contains(first) {
        return true;
    }
    // Numbers, dates, timestamps and YAML 1.1 sexagesimals all lead with one of these.
    if first.is_ascii_digit() || first == '+' || first == '.' {
        return true;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}
