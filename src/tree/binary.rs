//! Binary (Kaydara) container writer
//!
//! Node records carry an absolute end offset, so the writer serializes into
//! a seekable cursor, backpatching each record header once its payload
//! length is known. Array attributes are zlib-deflated when that wins.

use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::Error;
use crate::tree::{Attribute, RawNode};
use crate::version::FileVersion;

/// The 21 magic bytes opening every binary FBX file.
pub const MAGIC: &[u8; 21] = b"Kaydara FBX Binary  \x00";

const FOOTER_ID: [u8; 16] = [
    0xfa, 0xbc, 0xab, 0x09, 0xd0, 0xc8, 0xd4, 0x66, 0xb1, 0x76, 0xfb, 0x83, 0x1c, 0xf7, 0x26, 0x7e,
];

const FOOTER_MAGIC: [u8; 16] = [
    0xf8, 0x5a, 0x8c, 0x6a, 0xde, 0xf5, 0xd9, 0x7e, 0xec, 0xe9, 0x0c, 0xe3, 0x75, 0x8f, 0x29, 0x0b,
];

/// Only arrays at least this large are candidates for deflate.
const COMPRESS_THRESHOLD: usize = 128;

/// Writes the record tree as a binary FBX file of the given schema version.
pub fn write_binary<W: Write>(
    writer: &mut W,
    nodes: &[RawNode],
    version: FileVersion,
) -> Result<(), Error> {
    let mut cursor = Cursor::new(Vec::new());

    cursor.write_all(MAGIC)?;
    cursor.write_all(&[0x1a, 0x00])?;
    cursor.write_u32::<LittleEndian>(u32::from(version))?;

    let wide = version.wide_records();
    for node in nodes {
        write_node(&mut cursor, node, wide)?;
    }
    write_sentinel(&mut cursor, wide)?;

    write_footer(&mut cursor, version)?;

    writer.write_all(&cursor.into_inner())?;
    Ok(())
}

fn sentinel_len(wide: bool) -> usize {
    if wide {
        25
    } else {
        13
    }
}

fn write_sentinel(cursor: &mut Cursor<Vec<u8>>, wide: bool) -> Result<(), Error> {
    cursor.write_all(&vec![0u8; sentinel_len(wide)])?;
    Ok(())
}

fn write_node(cursor: &mut Cursor<Vec<u8>>, node: &RawNode, wide: bool) -> Result<(), Error> {
    let header_at = cursor.position();

    // Placeholder header, backpatched below.
    if wide {
        cursor.write_u64::<LittleEndian>(0)?;
        cursor.write_u64::<LittleEndian>(0)?;
        cursor.write_u64::<LittleEndian>(0)?;
    } else {
        cursor.write_u32::<LittleEndian>(0)?;
        cursor.write_u32::<LittleEndian>(0)?;
        cursor.write_u32::<LittleEndian>(0)?;
    }
    cursor.write_u8(node.name.len() as u8)?;
    cursor.write_all(node.name.as_bytes())?;

    let properties_at = cursor.position();
    for attribute in &node.attributes {
        write_attribute(cursor, attribute)?;
    }
    let properties_len = cursor.position() - properties_at;

    if !node.children.is_empty() {
        for child in &node.children {
            write_node(cursor, child, wide)?;
        }
        write_sentinel(cursor, wide)?;
    }

    let end_offset = cursor.position();
    cursor.seek(SeekFrom::Start(header_at))?;
    if wide {
        cursor.write_u64::<LittleEndian>(end_offset)?;
        cursor.write_u64::<LittleEndian>(node.attributes.len() as u64)?;
        cursor.write_u64::<LittleEndian>(properties_len)?;
    } else {
        cursor.write_u32::<LittleEndian>(end_offset as u32)?;
        cursor.write_u32::<LittleEndian>(node.attributes.len() as u32)?;
        cursor.write_u32::<LittleEndian>(properties_len as u32)?;
    }
    cursor.seek(SeekFrom::Start(end_offset))?;

    Ok(())
}

fn write_attribute(cursor: &mut Cursor<Vec<u8>>, attribute: &Attribute) -> Result<(), Error> {
    match attribute {
        Attribute::I16(value) => {
            cursor.write_u8(b'Y')?;
            cursor.write_i16::<LittleEndian>(*value)?;
        }
        Attribute::Bool(value) => {
            cursor.write_u8(b'C')?;
            cursor.write_u8(*value as u8)?;
        }
        Attribute::I32(value) => {
            cursor.write_u8(b'I')?;
            cursor.write_i32::<LittleEndian>(*value)?;
        }
        Attribute::F32(value) => {
            cursor.write_u8(b'F')?;
            cursor.write_f32::<LittleEndian>(*value)?;
        }
        Attribute::F64(value) => {
            cursor.write_u8(b'D')?;
            cursor.write_f64::<LittleEndian>(*value)?;
        }
        Attribute::I64(value) => {
            cursor.write_u8(b'L')?;
            cursor.write_i64::<LittleEndian>(*value)?;
        }
        Attribute::String(value) => {
            cursor.write_u8(b'S')?;
            cursor.write_u32::<LittleEndian>(value.len() as u32)?;
            cursor.write_all(value.as_bytes())?;
        }
        Attribute::Bytes(value) => {
            cursor.write_u8(b'R')?;
            cursor.write_u32::<LittleEndian>(value.len() as u32)?;
            cursor.write_all(value)?;
        }
        Attribute::BoolArray(values) => {
            let mut raw = Vec::with_capacity(values.len());
            for value in values {
                raw.push(*value as u8);
            }
            write_array(cursor, b'b', values.len(), raw)?;
        }
        Attribute::I32Array(values) => {
            let mut raw = Vec::with_capacity(values.len() * 4);
            for value in values {
                raw.write_i32::<LittleEndian>(*value)?;
            }
            write_array(cursor, b'i', values.len(), raw)?;
        }
        Attribute::I64Array(values) => {
            let mut raw = Vec::with_capacity(values.len() * 8);
            for value in values {
                raw.write_i64::<LittleEndian>(*value)?;
            }
            write_array(cursor, b'l', values.len(), raw)?;
        }
        Attribute::F32Array(values) => {
            let mut raw = Vec::with_capacity(values.len() * 4);
            for value in values {
                raw.write_f32::<LittleEndian>(*value)?;
            }
            write_array(cursor, b'f', values.len(), raw)?;
        }
        Attribute::F64Array(values) => {
            let mut raw = Vec::with_capacity(values.len() * 8);
            for value in values {
                raw.write_f64::<LittleEndian>(*value)?;
            }
            write_array(cursor, b'd', values.len(), raw)?;
        }
    }

    Ok(())
}

fn write_array(
    cursor: &mut Cursor<Vec<u8>>,
    type_code: u8,
    count: usize,
    raw: Vec<u8>,
) -> Result<(), Error> {
    let compressed = if raw.len() >= COMPRESS_THRESHOLD {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
        encoder.write_all(&raw)?;
        let deflated = encoder.finish()?;
        if deflated.len() < raw.len() {
            Some(deflated)
        } else {
            None
        }
    } else {
        None
    };

    cursor.write_u8(type_code)?;
    cursor.write_u32::<LittleEndian>(count as u32)?;
    match compressed {
        Some(deflated) => {
            cursor.write_u32::<LittleEndian>(1)?;
            cursor.write_u32::<LittleEndian>(deflated.len() as u32)?;
            cursor.write_all(&deflated)?;
        }
        None => {
            cursor.write_u32::<LittleEndian>(0)?;
            cursor.write_u32::<LittleEndian>(raw.len() as u32)?;
            cursor.write_all(&raw)?;
        }
    }

    Ok(())
}

fn write_footer(cursor: &mut Cursor<Vec<u8>>, version: FileVersion) -> Result<(), Error> {
    cursor.write_all(&FOOTER_ID)?;
    cursor.write_all(&[0u8; 4])?;

    // Pad to a 16-byte boundary; a full block when already aligned.
    let position = cursor.position() as usize;
    let mut pad = (16 - position % 16) % 16;
    if pad == 0 {
        pad = 16;
    }
    cursor.write_all(&vec![0u8; pad])?;

    cursor.write_u32::<LittleEndian>(u32::from(version))?;
    cursor.write_all(&[0u8; 120])?;
    cursor.write_all(&FOOTER_MAGIC)?;
    Ok(())
}
