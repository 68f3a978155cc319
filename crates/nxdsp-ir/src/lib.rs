//! nxdsp intermediate representation.
//!
//! An owned-tree IR for tensor kernel statements, small enough to rewrite
//! structurally: vector loads are indexed by [`Expr::Ramp`] nodes, lane
//! rearrangement is expressed with the pure `concat_vectors` /
//! `shuffle_vector` intrinsics, and loop nests carry the device they are
//! offloaded to.

mod buffer;
mod display;
mod expr;
mod stmt;
mod types;

pub use buffer::{Image, Param};
pub use expr::{BinaryOp, Expr, Intrinsic};
pub use stmt::{DeviceApi, ForKind, Stmt};
pub use types::{Bytes, Scalar, ScalarKind, Type};
