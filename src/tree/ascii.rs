//! ASCII form writer
//!
//! Emits the plain-text FBX form: a version banner, `Name: attrs {` blocks
//! and `*N { a: ... }` arrays. Combined name-class attributes stored as
//! `"name\x00\x01Class"` appear here as `"Class::name"`.

use std::io::Write;

use crate::error::Error;
use crate::tree::{Attribute, RawNode, NAME_CLASS_SEPARATOR};
use crate::version::FileVersion;

/// Writes the record tree as an ASCII FBX file of the given schema version.
pub fn write_ascii<W: Write>(
    writer: &mut W,
    nodes: &[RawNode],
    version: FileVersion,
) -> Result<(), Error> {
    let raw = u32::from(version);
    writeln!(
        writer,
        "; FBX {}.{}.0 project file",
        raw / 1000,
        raw % 1000 / 100
    )?;
    writeln!(writer, "; ----------------------------------------------------")?;
    writeln!(writer)?;

    for node in nodes {
        write_node(writer, node, 0)?;
    }

    Ok(())
}

fn indent<W: Write>(writer: &mut W, depth: usize) -> Result<(), Error> {
    for _ in 0..depth {
        write!(writer, "\t")?;
    }
    Ok(())
}

fn write_node<W: Write>(writer: &mut W, node: &RawNode, depth: usize) -> Result<(), Error> {
    indent(writer, depth)?;
    write!(writer, "{}:", node.name)?;

    let scalars: Vec<&Attribute> = node.attributes.iter().filter(|a| !a.is_array()).collect();
    let arrays: Vec<&Attribute> = node.attributes.iter().filter(|a| a.is_array()).collect();

    for (index, attribute) in scalars.iter().enumerate() {
        if index > 0 {
            write!(writer, ",")?;
        }
        write!(writer, " ")?;
        write_scalar(writer, attribute)?;
    }

    if arrays.is_empty() && node.children.is_empty() {
        if scalars.is_empty() {
            // Section records keep a braced body even when empty.
            writeln!(writer, " {{")?;
            indent(writer, depth)?;
            writeln!(writer, "}}")?;
        } else {
            writeln!(writer)?;
        }
        return Ok(());
    }

    if let [array] = arrays.as_slice() {
        // Array records carry their length inline and the payload in a
        // nested `a:` line.
        writeln!(writer, " *{} {{", array.len())?;
        indent(writer, depth + 1)?;
        write!(writer, "a: ")?;
        write_array(writer, array)?;
        writeln!(writer)?;
        indent(writer, depth)?;
        writeln!(writer, "}}")?;
        return Ok(());
    }

    writeln!(writer, " {{")?;
    for child in &node.children {
        write_node(writer, child, depth + 1)?;
    }
    indent(writer, depth)?;
    writeln!(writer, "}}")?;

    Ok(())
}

fn write_scalar<W: Write>(writer: &mut W, attribute: &Attribute) -> Result<(), Error> {
    match attribute {
        Attribute::I16(value) => write!(writer, "{value}")?,
        Attribute::Bool(value) => write!(writer, "{}", *value as u8)?,
        Attribute::I32(value) => write!(writer, "{value}")?,
        Attribute::F32(value) => write_f64(writer, f64::from(*value))?,
        Attribute::F64(value) => write_f64(writer, *value)?,
        Attribute::I64(value) => write!(writer, "{value}")?,
        Attribute::String(value) => write_string(writer, value)?,
        // Raw blobs have no text form; an empty string keeps the record shape.
        Attribute::Bytes(_) => write!(writer, "\"\"")?,
        _ => {}
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), Error> {
    let display = match value.split_once(NAME_CLASS_SEPARATOR) {
        Some((name, class)) => format!("{class}::{name}"),
        None => value.to_string(),
    };
    write!(writer, "\"{}\"", display.replace('"', "&quot;"))?;
    Ok(())
}

fn write_f64<W: Write>(writer: &mut W, value: f64) -> Result<(), Error> {
    if value == value.trunc() && value.abs() < 1e15 {
        write!(writer, "{}", value as i64)?;
    } else {
        write!(writer, "{value}")?;
    }
    Ok(())
}

fn write_array<W: Write>(writer: &mut W, attribute: &Attribute) -> Result<(), Error> {
    match attribute {
        Attribute::BoolArray(values) => {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    write!(writer, ",")?;
                }
                write!(writer, "{}", *value as u8)?;
            }
        }
        Attribute::I32Array(values) => {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    write!(writer, ",")?;
                }
                write!(writer, "{value}")?;
            }
        }
        Attribute::I64Array(values) => {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    write!(writer, ",")?;
                }
                write!(writer, "{value}")?;
            }
        }
        Attribute::F32Array(values) => {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    write!(writer, ",")?;
                }
                write_f64(writer, f64::from(*value))?;
            }
        }
        Attribute::F64Array(values) => {
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    write!(writer, ",")?;
                }
                write_f64(writer, *value)?;
            }
        }
        _ => {}
    }
    Ok(())
}
