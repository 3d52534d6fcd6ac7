#![warn(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
#![warn(missing_docs)]

//! Fbxport
//!
//! FBX composition and export library for DCC scene graphs.
//!
//! The pipeline gathers scene nodes from an export configuration, reserves
//! an FBX shell per node, links the shells into a mirrored hierarchy,
//! fills them with skeleton/mesh/camera data, optionally bakes transform
//! animation at a possibly-fractional frame step, and emits binary or
//! ASCII FBX.
//!
//! # Examples
//!
//! ```no_run
//! use fbxport::config::{ExportSet, ObjectSet};
//! use fbxport::error::Error;
//! use fbxport::scene::memory::MemoryScene;
//! use fbxport::scene::NodeKind;
//! use fbxport::serializer::FbxSerializer;
//! use fbxport::version::{FileFormat, FileVersion};
//!
//! let mut scene = MemoryScene::new();
//! scene.add_node("root", NodeKind::Joint, None);
//!
//! let export_set = ExportSet {
//!     name: "character".to_string(),
//!     skeleton: ObjectSet::named("root"),
//!     ..Default::default()
//! };
//!
//! let mut serializer = FbxSerializer::new(&mut scene, "");
//! let saved = serializer.serialize_export_set(
//!     &export_set,
//!     "character.fbx",
//!     FileVersion::Fbx7500,
//!     FileFormat::Binary,
//! )?;
//!
//! println!("{saved:?}");
//! # Ok::<(), Error>(())
//! ```

/// Export configuration data model.
pub mod config;
/// FBX document assembly and emission.
pub mod document;
/// Error types.
pub mod error;
/// Object-set resolution.
pub mod gather;
/// Rotation orders and transform decomposition.
pub mod math;
/// Typed FBX scene objects.
pub mod objects;
/// Host-scene abstraction.
pub mod scene;
/// The custom FBX serializer.
pub mod serializer;
/// FBX time units and frame conversion.
pub mod time;
/// Raw node-record tree and the binary/ASCII writers.
pub mod tree;
/// Schema version and file format enumerations.
pub mod version;

pub use document::FbxDocument;
pub use error::Error;
pub use serializer::FbxSerializer;
