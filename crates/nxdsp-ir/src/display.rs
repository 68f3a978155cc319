//! Display implementations and text dump for debugging.

use std::fmt;

use crate::expr::{BinaryOp, Expr, Intrinsic};
use crate::stmt::{DeviceApi, ForKind, Stmt};
use crate::types::{Scalar, ScalarKind, Type};

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Sint => write!(f, "i{}", self.width * 8),
            ScalarKind::Uint => write!(f, "u{}", self.width * 8),
            ScalarKind::Float => write!(f, "f{}", self.width * 8),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lanes == 1 {
            write!(f, "{}", self.scalar)
        } else {
            write!(f, "{}x{}", self.scalar, self.lanes)
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Min => "min",
            Self::Max => "max",
        })
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConcatVectors => "concat_vectors",
            Self::ShuffleVector => "shuffle_vector",
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntImm { value, .. } => write!(f, "{value}"),
            Self::Var { name, .. } => f.write_str(name),
            Self::Binary { op, a, b } => match op {
                BinaryOp::Min | BinaryOp::Max => write!(f, "{op}({a}, {b})"),
                _ => write!(f, "({a} {op} {b})"),
            },
            Self::Ramp {
                base,
                stride,
                lanes,
            } => write!(f, "ramp({base}, {stride}, {lanes})"),
            Self::Broadcast { value, lanes } => write!(f, "x{lanes}({value})"),
            Self::Load { buffer, index, .. } => write!(f, "{buffer}[{index}]"),
            Self::Call { op, args, .. } => {
                write!(f, "{op}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Let { name, value, body } => write!(f, "(let {name} = {value} in {body})"),
        }
    }
}

impl fmt::Display for DeviceApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "host",
            Self::Dsp => "dsp",
        })
    }
}

impl fmt::Display for ForKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serial => "for",
            Self::Parallel => "parallel",
            Self::Vectorized => "vectorized",
            Self::Unrolled => "unrolled",
        })
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_stmt(f, self, 0)
    }
}

fn fmt_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = "  ".repeat(indent);
    match stmt {
        Stmt::Store {
            buffer,
            index,
            value,
            ..
        } => writeln!(f, "{pad}{buffer}[{index}] = {value}"),
        Stmt::Evaluate(e) => writeln!(f, "{pad}{e}"),
        Stmt::LetStmt { name, value, body } => {
            writeln!(f, "{pad}let {name} = {value}")?;
            fmt_stmt(f, body, indent)
        }
        Stmt::For {
            var,
            min,
            extent,
            kind,
            device_api,
            body,
        } => {
            writeln!(f, "{pad}{kind} {var} in [{min}, {min} + {extent}) @{device_api} {{")?;
            fmt_stmt(f, body, indent + 1)?;
            writeln!(f, "{pad}}}")
        }
        Stmt::Block(stmts) => {
            for s in stmts {
                fmt_stmt(f, s, indent)?;
            }
            Ok(())
        }
    }
}
