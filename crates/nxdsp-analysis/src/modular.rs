//! Modulus–remainder analysis over integer expressions.
//!
//! Summarizes an integer expression `e` as a pair `(modulus, remainder)`
//! meaning `e ≡ remainder (mod modulus)` for every valuation of its free
//! variables consistent with the scope. The load alignment rewriter uses
//! this to prove that a ramp base starts a known number of lanes past an
//! aligned boundary.

use std::fmt;

use nxdsp_ir::{BinaryOp, Expr};

use crate::scope::Scope;

/// A congruence summary of an integer expression.
///
/// Encoding:
/// - `modulus == 0`: the value is exactly `remainder` (a known constant);
/// - `modulus == 1, remainder == 0`: no information;
/// - otherwise `modulus > 1` and `0 <= remainder < modulus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModulusRemainder {
    pub modulus: i64,
    pub remainder: i64,
}

impl ModulusRemainder {
    pub const fn new(modulus: i64, remainder: i64) -> Self {
        Self { modulus, remainder }
    }

    /// The summary carrying no information.
    pub const fn unknown() -> Self {
        Self {
            modulus: 1,
            remainder: 0,
        }
    }

    /// The summary of a known constant.
    pub const fn constant(value: i64) -> Self {
        Self {
            modulus: 0,
            remainder: value,
        }
    }
}

impl fmt::Display for ModulusRemainder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(mod {}, rem {})", self.modulus, self.remainder)
    }
}

/// Non-negative gcd with `gcd(0, x) = |x|`.
///
/// The degenerate `|i64::MIN|` case falls back to 1 (no information),
/// which is always a sound modulus.
fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    i64::try_from(a).unwrap_or(1)
}

/// Euclidean remainder with `modulo(x, 0) = x`.
fn modulo(x: i64, m: i64) -> i64 {
    if m == 0 {
        return x;
    }
    let m = m.abs();
    let r = x % m;
    if r < 0 {
        r + m
    } else {
        r
    }
}

/// Computes the modulus–remainder summary of `e`.
///
/// Variables are looked up in `scope`; unbound variables, non-integer
/// subtrees, and arithmetic that overflows i64 all degrade to
/// [`ModulusRemainder::unknown`].
pub fn modulus_remainder(e: &Expr, scope: &Scope<ModulusRemainder>) -> ModulusRemainder {
    Analyzer {
        outer: scope,
        lets: Scope::new(),
    }
    .analyze(e)
}

/// Reduces `e` modulo `modulus` when the summary allows it.
///
/// Returns `Some(r)` with `r` in `[0, modulus)` when the summary's modulus
/// is a multiple of `modulus` (a known constant counts as a multiple of
/// everything); `None` otherwise.
pub fn reduce_expr_modulo(e: &Expr, modulus: i64, scope: &Scope<ModulusRemainder>) -> Option<i64> {
    debug_assert!(modulus > 0);
    let mr = modulus_remainder(e, scope);
    if mr.modulus % modulus == 0 {
        Some(modulo(mr.remainder, modulus))
    } else {
        None
    }
}

struct Analyzer<'a> {
    /// Bindings supplied by the caller.
    outer: &'a Scope<ModulusRemainder>,
    /// Bindings of lets inside the analyzed expression; these shadow `outer`.
    lets: Scope<ModulusRemainder>,
}

impl Analyzer<'_> {
    fn analyze(&mut self, e: &Expr) -> ModulusRemainder {
        match e {
            Expr::IntImm { value, .. } => ModulusRemainder::constant(*value),
            Expr::Var { name, .. } => self
                .lets
                .get(name)
                .or_else(|| self.outer.get(name))
                .copied()
                .unwrap_or(ModulusRemainder::unknown()),
            Expr::Binary { op, a, b } => {
                let a = self.analyze(a);
                let b = self.analyze(b);
                let result = match op {
                    BinaryOp::Add => add(a, b),
                    BinaryOp::Sub => sub(a, b),
                    BinaryOp::Mul => mul(a, b),
                    BinaryOp::Div => None,
                    BinaryOp::Mod => rem(a, b),
                    BinaryOp::Min | BinaryOp::Max => min_max(a, b),
                };
                result.unwrap_or(ModulusRemainder::unknown())
            }
            Expr::Let { name, value, body } => {
                let value = self.analyze(value);
                self.lets.push(name.clone(), value);
                let result = self.analyze(body);
                self.lets.pop(name);
                result
            }
            // Vector-valued and memory nodes carry no congruence facts.
            Expr::Ramp { .. } | Expr::Broadcast { .. } | Expr::Load { .. } | Expr::Call { .. } => {
                ModulusRemainder::unknown()
            }
        }
    }
}

fn add(a: ModulusRemainder, b: ModulusRemainder) -> Option<ModulusRemainder> {
    let m = gcd(a.modulus, b.modulus);
    let r = a.remainder.checked_add(b.remainder)?;
    Some(ModulusRemainder::new(m, modulo(r, m)))
}

fn sub(a: ModulusRemainder, b: ModulusRemainder) -> Option<ModulusRemainder> {
    let m = gcd(a.modulus, b.modulus);
    let r = a.remainder.checked_sub(b.remainder)?;
    Some(ModulusRemainder::new(m, modulo(r, m)))
}

fn mul(a: ModulusRemainder, b: ModulusRemainder) -> Option<ModulusRemainder> {
    if a.modulus == 0 && b.modulus == 0 {
        return Some(ModulusRemainder::constant(
            a.remainder.checked_mul(b.remainder)?,
        ));
    }
    // Scaling by a constant scales both the modulus and the remainder.
    let scaled = |mr: ModulusRemainder, c: i64| -> Option<ModulusRemainder> {
        if c == 0 {
            return Some(ModulusRemainder::constant(0));
        }
        let m = mr.modulus.checked_mul(c)?.checked_abs()?;
        let r = mr.remainder.checked_mul(c)?;
        Some(ModulusRemainder::new(m, modulo(r, m)))
    };
    if a.modulus == 0 {
        return scaled(b, a.remainder);
    }
    if b.modulus == 0 {
        return scaled(a, b.remainder);
    }
    // (ma*i + ra) * (mb*j + rb): every term but ra*rb is divisible by
    // gcd(ma*mb, ma*rb, mb*ra).
    let g = gcd(
        gcd(
            a.modulus.checked_mul(b.modulus)?,
            a.modulus.checked_mul(b.remainder)?,
        ),
        b.modulus.checked_mul(a.remainder)?,
    );
    let r = a.remainder.checked_mul(b.remainder)?;
    Some(ModulusRemainder::new(g, modulo(r, g)))
}

fn rem(a: ModulusRemainder, b: ModulusRemainder) -> Option<ModulusRemainder> {
    // Only a constant divisor tells us anything. Euclidean remainder by c
    // and by |c| agree, so normalize the sign up front.
    if b.modulus != 0 || b.remainder == 0 {
        return None;
    }
    let c = b.remainder.checked_abs()?;
    if a.modulus == 0 {
        return Some(ModulusRemainder::constant(modulo(a.remainder, c)));
    }
    // a mod c differs from a by a multiple of c, so it is congruent to
    // a's remainder modulo gcd(ma, c).
    let g = gcd(a.modulus, c);
    Some(ModulusRemainder::new(g, modulo(a.remainder, g)))
}

fn min_max(a: ModulusRemainder, b: ModulusRemainder) -> Option<ModulusRemainder> {
    // The result is one of the two operands, so it is congruent to both
    // modulo the gcd of their moduli and their remainder difference.
    let g = gcd(
        gcd(a.modulus, b.modulus),
        a.remainder.checked_sub(b.remainder)?,
    );
    Some(ModulusRemainder::new(g, modulo(a.remainder, g)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxdsp_ir::{Scalar, Type};

    fn empty() -> Scope<ModulusRemainder> {
        Scope::new()
    }

    #[test]
    fn constant_is_exact() {
        let mr = modulus_remainder(&Expr::int(42), &empty());
        assert_eq!(mr, ModulusRemainder::constant(42));
        assert_eq!(reduce_expr_modulo(&Expr::int(42), 16, &empty()), Some(10));
        assert_eq!(reduce_expr_modulo(&Expr::int(0), 16, &empty()), Some(0));
    }

    #[test]
    fn unbound_variable_is_unknown() {
        let mr = modulus_remainder(&Expr::var("x"), &empty());
        assert_eq!(mr, ModulusRemainder::unknown());
        assert_eq!(reduce_expr_modulo(&Expr::var("x"), 16, &empty()), None);
    }

    #[test]
    fn scope_fact_plus_constant() {
        let mut scope = Scope::new();
        scope.push("x", ModulusRemainder::new(16, 0));
        let e = Expr::var("x") + Expr::int(3);
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(16, 3));
        assert_eq!(reduce_expr_modulo(&e, 16, &scope), Some(3));
    }

    #[test]
    fn constant_times_variable() {
        // 16 * k is 0 mod 16 whatever k is.
        let e = Expr::int(16) * Expr::var("k");
        assert_eq!(modulus_remainder(&e, &empty()), ModulusRemainder::new(16, 0));
        assert_eq!(reduce_expr_modulo(&e, 16, &empty()), Some(0));
        assert_eq!(reduce_expr_modulo(&e, 8, &empty()), Some(0));
        assert_eq!(reduce_expr_modulo(&e, 32, &empty()), None);
    }

    #[test]
    fn subtraction_normalizes_remainder() {
        let mut scope = Scope::new();
        scope.push("x", ModulusRemainder::new(16, 0));
        let e = Expr::var("x") - Expr::int(3);
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(16, 13));
    }

    #[test]
    fn product_of_facts() {
        let mut scope = Scope::new();
        scope.push("a", ModulusRemainder::new(4, 2));
        scope.push("b", ModulusRemainder::new(6, 3));
        let e = Expr::var("a") * Expr::var("b");
        // gcd(24, 12, 12) = 12, 2*3 = 6.
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(12, 6));
    }

    #[test]
    fn modulo_by_constant() {
        let mut scope = Scope::new();
        scope.push("x", ModulusRemainder::new(16, 5));
        let e = Expr::Binary {
            op: BinaryOp::Mod,
            a: Box::new(Expr::var("x")),
            b: Box::new(Expr::int(8)),
        };
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(8, 5));
    }

    #[test]
    fn division_is_unknown() {
        let e = Expr::Binary {
            op: BinaryOp::Div,
            a: Box::new(Expr::int(32)),
            b: Box::new(Expr::int(2)),
        };
        assert_eq!(modulus_remainder(&e, &empty()), ModulusRemainder::unknown());
    }

    #[test]
    fn min_of_congruent_operands() {
        let mut scope = Scope::new();
        scope.push("a", ModulusRemainder::new(16, 3));
        scope.push("b", ModulusRemainder::new(16, 3));
        let e = Expr::min(Expr::var("a"), Expr::var("b"));
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(16, 3));
    }

    #[test]
    fn min_of_constants_keeps_shared_residue() {
        let e = Expr::min(Expr::int(3), Expr::int(7));
        // Both operands are 3 mod 4.
        assert_eq!(modulus_remainder(&e, &empty()), ModulusRemainder::new(4, 3));
    }

    #[test]
    fn let_binding_shadows_caller_scope() {
        let mut scope = Scope::new();
        scope.push("t", ModulusRemainder::new(2, 1));
        // let t = 16 * k in t + 4
        let e = Expr::let_(
            "t",
            Expr::int(16) * Expr::var("k"),
            Expr::var("t") + Expr::int(4),
        );
        assert_eq!(modulus_remainder(&e, &scope), ModulusRemainder::new(16, 4));
        // The caller's binding is untouched.
        assert_eq!(scope.get("t"), Some(&ModulusRemainder::new(2, 1)));
    }

    #[test]
    fn overflow_degrades_to_unknown() {
        let e = Expr::int(i64::MAX) + Expr::int(1);
        assert_eq!(modulus_remainder(&e, &empty()), ModulusRemainder::unknown());
        let e = Expr::int(i64::MAX) * Expr::int(2);
        assert_eq!(modulus_remainder(&e, &empty()), ModulusRemainder::unknown());
    }

    #[test]
    fn vector_nodes_are_unknown() {
        let load = Expr::load(
            Type::vector(Scalar::I8, 16),
            "buf",
            Expr::ramp(Expr::int(0), Expr::int(1), 16),
            None,
            None,
        );
        assert_eq!(
            modulus_remainder(&load, &empty()),
            ModulusRemainder::unknown()
        );
    }

    #[test]
    fn negative_constant_reduces_into_range() {
        assert_eq!(reduce_expr_modulo(&Expr::int(-3), 16, &empty()), Some(13));
    }
}
