//! FBX schema version and file format enumerations

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// FBX schema version written into the file header.
///
/// Covers the 7.x container family (FBX 2011 through 2020 era files).
/// The legacy 6.x container is not representable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum FileVersion {
    /// FBX 2011
    Fbx7100 = 7100,
    /// FBX 2012
    Fbx7200 = 7200,
    /// FBX 2013
    Fbx7300 = 7300,
    /// FBX 2014/2015
    Fbx7400 = 7400,
    /// FBX 2016 through 2020
    Fbx7500 = 7500,
}

impl FileVersion {
    /// Whether binary node records use 64-bit header fields.
    ///
    /// The record layout switched at schema 7500; everything below uses
    /// 32-bit end offsets and property counts.
    pub fn wide_records(&self) -> bool {
        u32::from(*self) >= 7500
    }
}

impl Default for FileVersion {
    fn default() -> Self {
        FileVersion::Fbx7500
    }
}

/// On-disk representation selected at export time.
///
/// The ordinals match the `pFileFormat` argument of the reference exporter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FileFormat {
    /// Binary (Kaydara container).
    Binary = 0,
    /// Plain-text form.
    Ascii = 1,
}

impl Default for FileFormat {
    fn default() -> Self {
        FileFormat::Binary
    }
}
