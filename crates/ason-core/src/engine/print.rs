//! Canonical textual form of a value.
//!
//! The output reads back through [`super::parse`] to a structurally equal
//! value (NaN and infinities excepted):
//!
//! - `null`, `true`, `false`, `42`, `18446744073709551615`, `1.5`, `2.0`
//! - `"text"` with JSON escapes
//! - `[1, 2]`, `{"a": 1}`, `{"a": 1, *}`
//! - `1 | 2`, `!1`, `!(1 | 2)`
//! - `*` (wild), `U` (universe), `∅` (empty)

use super::{Handle, Node, Number};

/// Render a value in canonical unicode form.
pub fn print(value: &Handle) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Handle, out: &mut String) {
    match value.node() {
        Node::Null => out.push_str("null"),
        Node::Bool(true) => out.push_str("true"),
        Node::Bool(false) => out.push_str("false"),
        Node::Number(n) => write_number(*n, out),
        Node::String(s) => write_string(s, out),
        Node::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Node::Object(fields) => write_fields(fields, false, out),
        Node::OpenObject(fields) => write_fields(fields, true, out),
        Node::Union(members) => {
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_value(member, out);
            }
        }
        Node::Complement(inner) => {
            out.push('!');
            if matches!(inner.node(), Node::Union(_)) {
                out.push('(');
                write_value(inner, out);
                out.push(')');
            } else {
                write_value(inner, out);
            }
        }
        Node::Wild => out.push('*'),
        Node::Universe => out.push('U'),
        Node::Empty => out.push('∅'),
    }
}

fn write_number(n: Number, out: &mut String) {
    match n {
        Number::Int(i) => out.push_str(&i.to_string()),
        Number::Uint(u) => out.push_str(&u.to_string()),
        // Debug keeps a trailing ".0" so floats read back as floats.
        Number::Float(f) => out.push_str(&format!("{f:?}")),
    }
}

fn write_fields(fields: &[(String, Handle)], open: bool, out: &mut String) {
    out.push('{');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(key, out);
        out.push_str(": ");
        write_value(value, out);
    }
    if open {
        if !fields.is_empty() {
            out.push_str(", ");
        }
        out.push('*');
    }
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
