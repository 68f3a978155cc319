//! Type system for the nxdsp kernel IR.

/// Width of a scalar type in bytes.
pub type Bytes = u8;

/// The kind of a scalar type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// Signed integer.
    Sint,
    /// Unsigned integer.
    Uint,
    /// Floating point.
    Float,
}

impl ScalarKind {
    /// Returns `true` for signed and unsigned integers.
    pub fn is_int(self) -> bool {
        matches!(self, Self::Sint | Self::Uint)
    }
}

/// A scalar type: kind + byte width.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Scalar {
    pub kind: ScalarKind,
    pub width: Bytes,
}

impl Scalar {
    pub const BOOL: Self = Self {
        kind: ScalarKind::Bool,
        width: 1,
    };
    pub const I8: Self = Self {
        kind: ScalarKind::Sint,
        width: 1,
    };
    pub const I16: Self = Self {
        kind: ScalarKind::Sint,
        width: 2,
    };
    pub const I32: Self = Self {
        kind: ScalarKind::Sint,
        width: 4,
    };
    pub const U8: Self = Self {
        kind: ScalarKind::Uint,
        width: 1,
    };
    pub const U16: Self = Self {
        kind: ScalarKind::Uint,
        width: 2,
    };
    pub const U32: Self = Self {
        kind: ScalarKind::Uint,
        width: 4,
    };
    pub const F16: Self = Self {
        kind: ScalarKind::Float,
        width: 2,
    };
    pub const F32: Self = Self {
        kind: ScalarKind::Float,
        width: 4,
    };
}

/// An IR value type: a scalar element type and a lane count.
///
/// `lanes == 1` is a scalar; `lanes > 1` is a vector of that many lanes.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Type {
    pub scalar: Scalar,
    pub lanes: u32,
}

impl Type {
    /// A scalar type (one lane).
    pub const fn scalar(scalar: Scalar) -> Self {
        Self { scalar, lanes: 1 }
    }

    /// A vector type with the given lane count.
    pub const fn vector(scalar: Scalar, lanes: u32) -> Self {
        Self { scalar, lanes }
    }

    /// The same element type with a different lane count.
    pub const fn with_lanes(self, lanes: u32) -> Self {
        Self {
            scalar: self.scalar,
            lanes,
        }
    }

    /// Returns `true` if this type has more than one lane.
    pub fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    /// Returns `true` if this type has exactly one lane.
    pub fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    /// Returns `true` for scalar or vector integer types.
    pub fn is_int(&self) -> bool {
        self.scalar.kind.is_int()
    }

    /// Byte width of one element. The lane count does not participate.
    pub fn bytes(&self) -> u32 {
        self.scalar.width as u32
    }
}
