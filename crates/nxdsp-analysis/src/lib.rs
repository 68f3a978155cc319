//! IR analyses for nxdsp.
//!
//! Provides the scoped symbol table used to track facts about let-bound
//! names during traversal, and the modulus–remainder analysis that proves
//! congruence facts about integer index expressions.

mod modular;
mod scope;

pub use modular::{modulus_remainder, reduce_expr_modulo, ModulusRemainder};
pub use scope::Scope;
