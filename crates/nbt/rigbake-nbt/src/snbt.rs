//! Textual encoding.
//!
//! `Display` renders the compact single-line form used inside commands. The alternate flag
//! (`{:#}`) renders an indented form for standalone payload files; both are deterministic.

use std::fmt::{self, Write as _};

use crate::compound::NbtCompound;
use crate::list::NbtList;
use crate::value::Nbt;

const INDENT: &str = "  ";

/// `true` when a compound key can be written without quotes.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

/// Escape and double-quote a string literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote a compound key only when it needs it.
pub fn quote_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        escape_string(key)
    }
}

fn write_f32(f: &mut fmt::Formatter<'_>, v: f32) -> fmt::Result {
    assert!(v.is_finite(), "non-finite float in structured data: {v}");
    // Normalize -0 so equal matrices render identically.
    let v = if v == 0.0 { 0.0 } else { v };
    write!(f, "{v}f")
}

fn write_f64(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    assert!(v.is_finite(), "non-finite double in structured data: {v}");
    let v = if v == 0.0 { 0.0 } else { v };
    write!(f, "{v}d")
}

fn newline(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    f.write_char('\n')?;
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_compound(
    f: &mut fmt::Formatter<'_>,
    c: &NbtCompound,
    pretty: bool,
    depth: usize,
) -> fmt::Result {
    if c.is_empty() {
        return f.write_str("{}");
    }
    f.write_char('{')?;
    for (i, (key, value)) in c.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        if pretty {
            newline(f, depth + 1)?;
        }
        f.write_str(&quote_key(key))?;
        f.write_char(':')?;
        if pretty {
            f.write_char(' ')?;
        }
        write_value(f, value, pretty, depth + 1)?;
    }
    if pretty {
        newline(f, depth)?;
    }
    f.write_char('}')
}

fn write_list(f: &mut fmt::Formatter<'_>, l: &NbtList, pretty: bool, depth: usize) -> fmt::Result {
    // Only lists of containers are broken over lines; scalar lists stay compact.
    let nested = pretty
        && l
            .iter()
            .any(|v| matches!(v, Nbt::Compound(_) | Nbt::List(_)));
    f.write_char('[')?;
    for (i, value) in l.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        if nested {
            newline(f, depth + 1)?;
        }
        write_value(f, value, pretty, depth + 1)?;
    }
    if nested {
        newline(f, depth)?;
    }
    f.write_char(']')
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Nbt, pretty: bool, depth: usize) -> fmt::Result {
    match value {
        Nbt::Byte(v) => write!(f, "{v}b"),
        Nbt::Short(v) => write!(f, "{v}s"),
        Nbt::Int(v) => write!(f, "{v}"),
        Nbt::Long(v) => write!(f, "{v}L"),
        Nbt::Float(v) => write_f32(f, *v),
        Nbt::Double(v) => write_f64(f, *v),
        Nbt::String(s) => f.write_str(&escape_string(s)),
        Nbt::List(l) => write_list(f, l, pretty, depth),
        Nbt::Compound(c) => write_compound(f, c, pretty, depth),
        Nbt::ByteArray(values) => {
            f.write_str("[B;")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{v}b")?;
            }
            f.write_char(']')
        }
        Nbt::IntArray(values) => {
            f.write_str("[I;")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{v}")?;
            }
            f.write_char(']')
        }
    }
}

impl fmt::Display for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        write_value(f, self, pretty, 0)
    }
}

impl fmt::Display for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        write_compound(f, self, pretty, 0)
    }
}

impl fmt::Display for NbtList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        write_list(f, self, pretty, 0)
    }
}
