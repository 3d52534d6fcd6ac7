//! Raw FBX node-record tree
//!
//! Every FBX file, binary or ASCII, is a tree of named records carrying
//! typed attributes. The object layer lowers into this tree and the
//! writers in [`binary`] and [`ascii`] emit it.

pub mod ascii;
pub mod binary;

/// Separator embedded in combined name-class attributes.
///
/// The binary container stores `"name\x00\x01Class"`; the ASCII form shows
/// the same attribute as `"Class::name"`. [`name_class`] builds the stored
/// form and the writers translate as needed.
pub const NAME_CLASS_SEPARATOR: &str = "\u{0}\u{1}";

/// Builds the combined name-class attribute for an object record.
pub fn name_class(name: &str, class: &str) -> Attribute {
    Attribute::String(format!("{name}{NAME_CLASS_SEPARATOR}{class}"))
}

/// A typed attribute of a node record.
///
/// Mirrors the FBX 7.x property palette: scalars, strings, raw bytes and
/// the five array forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// 16-bit integer (`Y`).
    I16(i16),
    /// Boolean (`C`).
    Bool(bool),
    /// 32-bit integer (`I`).
    I32(i32),
    /// 32-bit float (`F`).
    F32(f32),
    /// 64-bit float (`D`).
    F64(f64),
    /// 64-bit integer (`L`).
    I64(i64),
    /// Length-prefixed string (`S`).
    String(String),
    /// Raw byte blob (`R`).
    Bytes(Vec<u8>),
    /// Boolean array (`b`).
    BoolArray(Vec<bool>),
    /// 32-bit integer array (`i`).
    I32Array(Vec<i32>),
    /// 64-bit integer array (`l`).
    I64Array(Vec<i64>),
    /// 32-bit float array (`f`).
    F32Array(Vec<f32>),
    /// 64-bit float array (`d`).
    F64Array(Vec<f64>),
}

impl Attribute {
    /// Whether this attribute is one of the array forms.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Attribute::BoolArray(_)
                | Attribute::I32Array(_)
                | Attribute::I64Array(_)
                | Attribute::F32Array(_)
                | Attribute::F64Array(_)
        )
    }

    /// Element count of an array attribute; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Attribute::BoolArray(v) => v.len(),
            Attribute::I32Array(v) => v.len(),
            Attribute::I64Array(v) => v.len(),
            Attribute::F32Array(v) => v.len(),
            Attribute::F64Array(v) => v.len(),
            _ => 0,
        }
    }

    /// Whether an array attribute is empty; scalars report `true`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<i16> for Attribute {
    fn from(value: i16) -> Self {
        Attribute::I16(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<i32> for Attribute {
    fn from(value: i32) -> Self {
        Attribute::I32(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::I64(value)
    }
}

impl From<f32> for Attribute {
    fn from(value: f32) -> Self {
        Attribute::F32(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::F64(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::String(value)
    }
}

impl From<Vec<i32>> for Attribute {
    fn from(value: Vec<i32>) -> Self {
        Attribute::I32Array(value)
    }
}

impl From<Vec<i64>> for Attribute {
    fn from(value: Vec<i64>) -> Self {
        Attribute::I64Array(value)
    }
}

impl From<Vec<f32>> for Attribute {
    fn from(value: Vec<f32>) -> Self {
        Attribute::F32Array(value)
    }
}

impl From<Vec<f64>> for Attribute {
    fn from(value: Vec<f64>) -> Self {
        Attribute::F64Array(value)
    }
}

impl From<Vec<bool>> for Attribute {
    fn from(value: Vec<bool>) -> Self {
        Attribute::BoolArray(value)
    }
}

/// A named record with attributes and nested records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawNode {
    /// Record name.
    pub name: String,
    /// Attributes in declaration order.
    pub attributes: Vec<Attribute>,
    /// Nested records in declaration order.
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Creates an empty record.
    pub fn new(name: impl Into<String>) -> Self {
        RawNode {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a record with the given attributes.
    pub fn with(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        RawNode {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Appends an attribute, builder style.
    pub fn attr(mut self, attribute: impl Into<Attribute>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Appends a child record, builder style.
    pub fn child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child record in place.
    pub fn push(&mut self, child: RawNode) {
        self.children.push(child);
    }

    /// First child with the given name.
    pub fn find(&self, name: &str) -> Option<&RawNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All children with the given name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawNode> {
        self.children.iter().filter(move |child| child.name == name)
    }
}
