//! Constant folding and canonicalization of integer expressions.
//!
//! This is deliberately lightweight: it folds literal arithmetic, applies
//! the usual identities, and re-associates constant offsets so that chains
//! like `(x + 3) - 3` collapse. Rewriting passes run it on the index
//! expressions they synthesize.

use nxdsp_ir::{BinaryOp, Expr};

/// Simplifies an expression bottom-up.
///
/// Integer division and remainder use Euclidean semantics; division and
/// remainder by zero are left unfolded.
pub fn simplify(expr: Expr) -> Expr {
    match expr {
        Expr::Binary { op, a, b } => {
            let a = simplify(*a);
            let b = simplify(*b);
            simplify_binary(op, a, b)
        }
        Expr::Ramp {
            base,
            stride,
            lanes,
        } => Expr::ramp(simplify(*base), simplify(*stride), lanes),
        Expr::Broadcast { value, lanes } => Expr::broadcast(simplify(*value), lanes),
        Expr::Load {
            ty,
            buffer,
            index,
            image,
            param,
        } => Expr::Load {
            ty,
            buffer,
            index: Box::new(simplify(*index)),
            image,
            param,
        },
        Expr::Call { ty, op, args } => Expr::Call {
            ty,
            op,
            args: args.into_iter().map(simplify).collect(),
        },
        Expr::Let { name, value, body } => Expr::Let {
            name,
            value: Box::new(simplify(*value)),
            body: Box::new(simplify(*body)),
        },
        leaf @ (Expr::IntImm { .. } | Expr::Var { .. }) => leaf,
    }
}

fn simplify_binary(op: BinaryOp, a: Expr, b: Expr) -> Expr {
    use BinaryOp::{Add, Div, Max, Min, Mod, Mul, Sub};

    if let (Some(x), Some(y)) = (a.as_int(), b.as_int()) {
        if let Some(value) = fold_const(op, x, y) {
            return Expr::IntImm { ty: a.ty(), value };
        }
    }

    match op {
        Add => {
            if b.as_int() == Some(0) {
                return a;
            }
            if a.as_int() == Some(0) {
                return b;
            }
            // Constants to the right.
            if a.as_int().is_some() && b.as_int().is_none() {
                return simplify_binary(Add, b, a);
            }
            if let Some(c2) = b.as_int() {
                // (x + c1) + c2 -> x + (c1 + c2); (x - c1) + c2 -> x + (c2 - c1)
                match a {
                    Expr::Binary {
                        op: inner @ (Add | Sub),
                        a: x,
                        b: c1e,
                    } if c1e.as_int().is_some() => {
                        let c1 = c1e.as_int().unwrap();
                        let c = if inner == Add {
                            c1.wrapping_add(c2)
                        } else {
                            c2.wrapping_sub(c1)
                        };
                        return simplify_binary(
                            Add,
                            *x,
                            Expr::IntImm {
                                ty: c1e.ty(),
                                value: c,
                            },
                        );
                    }
                    other => return rebuild(Add, other, b),
                }
            }
            rebuild(Add, a, b)
        }
        Sub => {
            if b.as_int() == Some(0) {
                return a;
            }
            // x - c -> x + (-c), sharing the Add canonicalization.
            if let Some(c) = b.as_int() {
                return simplify_binary(
                    Add,
                    a,
                    Expr::IntImm {
                        ty: b.ty(),
                        value: c.wrapping_neg(),
                    },
                );
            }
            rebuild(Sub, a, b)
        }
        Mul => {
            if a.as_int() == Some(0) || b.as_int() == Some(0) {
                return Expr::IntImm {
                    ty: a.ty(),
                    value: 0,
                };
            }
            if b.as_int() == Some(1) {
                return a;
            }
            if a.as_int() == Some(1) {
                return b;
            }
            // Constants to the right.
            if a.as_int().is_some() && b.as_int().is_none() {
                return simplify_binary(Mul, b, a);
            }
            rebuild(Mul, a, b)
        }
        Div => {
            if b.as_int() == Some(1) {
                return a;
            }
            rebuild(Div, a, b)
        }
        Mod => {
            if b.as_int() == Some(1) {
                return Expr::IntImm {
                    ty: a.ty(),
                    value: 0,
                };
            }
            rebuild(Mod, a, b)
        }
        Min | Max => rebuild(op, a, b),
    }
}

fn rebuild(op: BinaryOp, a: Expr, b: Expr) -> Expr {
    Expr::Binary {
        op,
        a: Box::new(a),
        b: Box::new(b),
    }
}

fn fold_const(op: BinaryOp, x: i64, y: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => Some(x.wrapping_add(y)),
        BinaryOp::Sub => Some(x.wrapping_sub(y)),
        BinaryOp::Mul => Some(x.wrapping_mul(y)),
        BinaryOp::Div if y != 0 => x.checked_div_euclid(y),
        BinaryOp::Mod if y != 0 => x.checked_rem_euclid(y),
        BinaryOp::Min => Some(x.min(y)),
        BinaryOp::Max => Some(x.max(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxdsp_ir::{Scalar, Type};

    #[test]
    fn folds_literal_arithmetic() {
        let e = (Expr::int(2) + Expr::int(3)) * Expr::int(4);
        assert_eq!(simplify(e), Expr::int(20));
        assert_eq!(simplify(Expr::min(Expr::int(3), Expr::int(7))), Expr::int(3));
        assert_eq!(simplify(Expr::max(Expr::int(3), Expr::int(7))), Expr::int(7));
    }

    #[test]
    fn additive_identities() {
        assert_eq!(simplify(Expr::var("x") + Expr::int(0)), Expr::var("x"));
        assert_eq!(simplify(Expr::int(0) + Expr::var("x")), Expr::var("x"));
        assert_eq!(simplify(Expr::var("x") - Expr::int(0)), Expr::var("x"));
    }

    #[test]
    fn multiplicative_identities() {
        assert_eq!(simplify(Expr::var("x") * Expr::int(1)), Expr::var("x"));
        assert_eq!(simplify(Expr::int(1) * Expr::var("x")), Expr::var("x"));
        assert_eq!(simplify(Expr::var("x") * Expr::int(0)), Expr::int(0));
        let e = Expr::Binary {
            op: BinaryOp::Div,
            a: Box::new(Expr::var("x")),
            b: Box::new(Expr::int(1)),
        };
        assert_eq!(simplify(e), Expr::var("x"));
    }

    #[test]
    fn reassociates_constant_offsets() {
        // (x + 3) - 3 -> x
        let e = (Expr::var("x") + Expr::int(3)) - Expr::int(3);
        assert_eq!(simplify(e), Expr::var("x"));
        // (x + 16) - 1 -> x + 15
        let e = (Expr::var("x") + Expr::int(16)) - Expr::int(1);
        assert_eq!(simplify(e), Expr::var("x") + Expr::int(15));
        // (x - 4) + 6 -> x + 2
        let e = (Expr::var("x") - Expr::int(4)) + Expr::int(6);
        assert_eq!(simplify(e), Expr::var("x") + Expr::int(2));
        // 3 + x -> x + 3
        let e = Expr::int(3) + Expr::var("x");
        assert_eq!(simplify(e), Expr::var("x") + Expr::int(3));
    }

    #[test]
    fn remainder_by_one_is_zero() {
        let e = Expr::Binary {
            op: BinaryOp::Mod,
            a: Box::new(Expr::var("x")),
            b: Box::new(Expr::int(1)),
        };
        assert_eq!(simplify(e), Expr::int(0));
    }

    #[test]
    fn division_by_zero_left_unfolded() {
        let e = Expr::Binary {
            op: BinaryOp::Div,
            a: Box::new(Expr::int(1)),
            b: Box::new(Expr::int(0)),
        };
        assert_eq!(simplify(e.clone()), e);
    }

    #[test]
    fn recurses_into_ramps_and_loads() {
        let load = Expr::load(
            Type::vector(Scalar::I8, 16),
            "buf",
            Expr::ramp(Expr::var("b") + Expr::int(0), Expr::int(1), 16),
            None,
            None,
        );
        let expected = Expr::load(
            Type::vector(Scalar::I8, 16),
            "buf",
            Expr::ramp(Expr::var("b"), Expr::int(1), 16),
            None,
            None,
        );
        assert_eq!(simplify(load), expected);
    }

    #[test]
    fn simplify_is_idempotent() {
        let exprs = [
            (Expr::var("x") + Expr::int(3)) - Expr::int(3),
            (Expr::var("x") + Expr::int(16)) - Expr::int(1),
            Expr::var("x") * Expr::int(7) + Expr::int(2),
            Expr::ramp(Expr::int(4) + Expr::var("b"), Expr::int(2), 8),
        ];
        for e in exprs {
            let once = simplify(e);
            assert_eq!(simplify(once.clone()), once);
        }
    }
}
