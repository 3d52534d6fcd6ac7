use std::io;

use thiserror::Error;

/// Gets thrown when the host scene rejects a lookup or sample request.
///
/// Scene errors are recoverable: the affected entity is logged and skipped
/// while the export continues.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A node could not be resolved by handle.
    #[error("No scene node with handle {0}")]
    UnknownHandle(u64),
    /// A node was expected to carry a mesh but does not.
    #[error("Node \"{0}\" has no mesh data")]
    MissingMesh(String),
    /// A node was expected to carry a skin but does not.
    #[error("Node \"{0}\" has no skin data")]
    MissingSkin(String),
    /// A skin references an influence that was not gathered.
    #[error("Influence {0} is not part of the export")]
    UnknownInfluence(u64),
}

/// Gets thrown when the serializer's internal bookkeeping is violated.
///
/// Structural errors are fatal: the export aborts and no file is produced.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// Two gathered entities resolved to the same handle-to-shell slot.
    #[error("Duplicate shell for handle {0}")]
    DuplicateShell(u64),
    /// A shell lookup failed during compose or bake.
    #[error("No shell allocated for handle {0}")]
    MissingShell(u64),
    /// The reverse-lookup property on an emitted node was absent or unreadable.
    #[error("Node \"{0}\" carries no usable handle property")]
    BadHandleProperty(String),
    /// The mesh edge array was built more than once.
    #[error("Edge array for \"{0}\" was already built")]
    EdgesAlreadyBuilt(String),
    /// An object id resolved to the wrong object class.
    #[error("Object {0} is not a {1}")]
    WrongObjectClass(i64, &'static str),
}

/// A wrapper for the various error types this crate can emit.
#[derive(Error, Debug)]
pub enum Error {
    /// A `SceneError` escaped as fatal.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// A `StructuralError` occurred.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// An `std::io::Error` occurred.
    #[error(transparent)]
    Io(#[from] io::Error),
}
