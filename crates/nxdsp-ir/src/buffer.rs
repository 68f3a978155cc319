//! Handles describing where a loaded buffer comes from.

/// An externally allocated image buffer.
///
/// The base address of an image is supplied by the caller at run time and is
/// opaque to the compiler; in particular it is not known to satisfy any
/// vector alignment.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Image {
    pub name: String,
}

impl Image {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A caller-bound buffer parameter.
///
/// A param may carry a user-declared host alignment: the caller promises
/// that the buffer's base address is a multiple of `host_alignment` bytes.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Param {
    pub name: String,
    host_alignment: i64,
}

impl Param {
    pub fn new(name: impl Into<String>, host_alignment: i64) -> Self {
        Self {
            name: name.into(),
            host_alignment,
        }
    }

    /// The declared base-address alignment in bytes.
    pub fn host_alignment(&self) -> i64 {
        self.host_alignment
    }
}
