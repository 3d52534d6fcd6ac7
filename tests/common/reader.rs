//! Minimal binary FBX walker used only to verify emitted files.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

/// A parsed attribute, collapsed to coarse value classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
}

impl Value {
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(value) => *value,
            other => panic!("expected int, got {other:?}"),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(value) => value,
            other => panic!("expected string, got {other:?}"),
        }
    }

    pub fn as_int_array(&self) -> &[i64] {
        match self {
            Value::IntArray(values) => values,
            other => panic!("expected int array, got {other:?}"),
        }
    }

    pub fn as_float_array(&self) -> &[f64] {
        match self {
            Value::FloatArray(values) => values,
            other => panic!("expected float array, got {other:?}"),
        }
    }
}

/// A parsed node record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub name: String,
    pub values: Vec<Value>,
    pub children: Vec<Record>,
}

impl Record {
    pub fn find(&self, name: &str) -> Option<&Record> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn expect(&self, name: &str) -> &Record {
        self.find(name)
            .unwrap_or_else(|| panic!("record {name} missing under {}", self.name))
    }
}

/// Parses a binary FBX byte stream into its top-level records.
///
/// Returns `(version, records)`. Panics on malformed input; this is test
/// tooling, not an importer.
pub fn parse(bytes: &[u8]) -> (u32, Vec<Record>) {
    assert_eq!(&bytes[..21], b"Kaydara FBX Binary  \x00", "bad magic");
    assert_eq!(&bytes[21..23], &[0x1a, 0x00], "bad pre-version bytes");

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(23);
    let version = cursor.read_u32::<LittleEndian>().unwrap();
    let wide = version >= 7500;

    let mut records = Vec::new();
    while let Some(record) = read_record(&mut cursor, wide) {
        records.push(record);
    }

    (version, records)
}

fn read_record(cursor: &mut Cursor<&[u8]>, wide: bool) -> Option<Record> {
    let (end_offset, property_count, _property_len) = if wide {
        (
            cursor.read_u64::<LittleEndian>().unwrap(),
            cursor.read_u64::<LittleEndian>().unwrap(),
            cursor.read_u64::<LittleEndian>().unwrap(),
        )
    } else {
        (
            u64::from(cursor.read_u32::<LittleEndian>().unwrap()),
            u64::from(cursor.read_u32::<LittleEndian>().unwrap()),
            u64::from(cursor.read_u32::<LittleEndian>().unwrap()),
        )
    };
    let name_len = cursor.read_u8().unwrap();

    // A zeroed header is the null-record sentinel closing a scope.
    if end_offset == 0 && property_count == 0 && name_len == 0 {
        return None;
    }

    let mut name = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name).unwrap();
    let name = String::from_utf8(name).unwrap();

    let mut values = Vec::new();
    for _ in 0..property_count {
        values.push(read_value(cursor));
    }

    let mut children = Vec::new();
    if cursor.position() < end_offset {
        while let Some(child) = read_record(cursor, wide) {
            children.push(child);
        }
    }
    assert_eq!(cursor.position(), end_offset, "record {name} end offset");

    Some(Record {
        name,
        values,
        children,
    })
}

fn read_value(cursor: &mut Cursor<&[u8]>) -> Value {
    let type_code = cursor.read_u8().unwrap();
    match type_code {
        b'Y' => Value::Int(i64::from(cursor.read_i16::<LittleEndian>().unwrap())),
        b'C' => Value::Int(i64::from(cursor.read_u8().unwrap())),
        b'I' => Value::Int(i64::from(cursor.read_i32::<LittleEndian>().unwrap())),
        b'L' => Value::Int(cursor.read_i64::<LittleEndian>().unwrap()),
        b'F' => Value::Float(f64::from(cursor.read_f32::<LittleEndian>().unwrap())),
        b'D' => Value::Float(cursor.read_f64::<LittleEndian>().unwrap()),
        b'S' => {
            let len = cursor.read_u32::<LittleEndian>().unwrap() as usize;
            let mut bytes = vec![0u8; len];
            cursor.read_exact(&mut bytes).unwrap();
            Value::Str(String::from_utf8(bytes).unwrap())
        }
        b'R' => {
            let len = cursor.read_u32::<LittleEndian>().unwrap() as usize;
            let mut bytes = vec![0u8; len];
            cursor.read_exact(&mut bytes).unwrap();
            Value::Bytes(bytes)
        }
        b'b' | b'i' | b'l' | b'f' | b'd' => read_array(cursor, type_code),
        other => panic!("unknown type code {other:#x}"),
    }
}

fn read_array(cursor: &mut Cursor<&[u8]>, type_code: u8) -> Value {
    let count = cursor.read_u32::<LittleEndian>().unwrap() as usize;
    let encoding = cursor.read_u32::<LittleEndian>().unwrap();
    let byte_len = cursor.read_u32::<LittleEndian>().unwrap() as usize;

    let mut payload = vec![0u8; byte_len];
    cursor.read_exact(&mut payload).unwrap();

    let raw = if encoding == 1 {
        let mut decoder = ZlibDecoder::new(payload.as_slice());
        let mut inflated = Vec::new();
        decoder.read_to_end(&mut inflated).unwrap();
        inflated
    } else {
        payload
    };

    let mut raw = Cursor::new(raw.as_slice());
    match type_code {
        b'b' => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(i64::from(raw.read_u8().unwrap()));
            }
            Value::IntArray(values)
        }
        b'i' => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(i64::from(raw.read_i32::<LittleEndian>().unwrap()));
            }
            Value::IntArray(values)
        }
        b'l' => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(raw.read_i64::<LittleEndian>().unwrap());
            }
            Value::IntArray(values)
        }
        b'f' => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(f64::from(raw.read_f32::<LittleEndian>().unwrap()));
            }
            Value::FloatArray(values)
        }
        _ => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(raw.read_f64::<LittleEndian>().unwrap());
            }
            Value::FloatArray(values)
        }
    }
}
