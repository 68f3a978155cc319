//! Statements — operations with side effects and control flow.

use crate::buffer::Param;
use crate::expr::Expr;

/// How a loop's iterations are executed.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ForKind {
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
}

/// The device a loop nest is offloaded to.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum DeviceApi {
    /// Runs on the host.
    None,
    /// Runs on the wide-vector DSP.
    Dsp,
}

/// A statement in the kernel IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    /// Write `value` to `buffer` at element indices `index`.
    Store {
        buffer: String,
        index: Expr,
        value: Expr,
        param: Option<Param>,
    },
    /// Evaluate an expression for its loads.
    Evaluate(Expr),
    /// `name` bound to `value` within `body`.
    LetStmt {
        name: String,
        value: Expr,
        body: Box<Stmt>,
    },
    /// A loop over `[min, min + extent)`.
    For {
        var: String,
        min: Expr,
        extent: Expr,
        kind: ForKind,
        device_api: DeviceApi,
        body: Box<Stmt>,
    },
    /// Statements executed in order.
    Block(Vec<Stmt>),
}

impl Stmt {
    /// A let statement binding `name` to `value` in `body`.
    pub fn let_stmt(name: impl Into<String>, value: Expr, body: Stmt) -> Self {
        Self::LetStmt {
            name: name.into(),
            value,
            body: Box::new(body),
        }
    }

    /// A serial host loop.
    pub fn for_loop(var: impl Into<String>, min: Expr, extent: Expr, body: Stmt) -> Self {
        Self::For {
            var: var.into(),
            min,
            extent,
            kind: ForKind::Serial,
            device_api: DeviceApi::None,
            body: Box::new(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_let_stmt() {
        let s = Stmt::let_stmt("x", Expr::int(0), Stmt::Evaluate(Expr::var("x")));
        match s {
            Stmt::LetStmt { name, value, body } => {
                assert_eq!(name, "x");
                assert_eq!(value.as_int(), Some(0));
                assert_eq!(*body, Stmt::Evaluate(Expr::var("x")));
            }
            other => panic!("expected LetStmt, got {other:?}"),
        }
    }

    #[test]
    fn host_loop_defaults() {
        let s = Stmt::for_loop("i", Expr::int(0), Expr::int(8), Stmt::Block(vec![]));
        match s {
            Stmt::For {
                kind, device_api, ..
            } => {
                assert_eq!(kind, ForKind::Serial);
                assert_eq!(device_api, DeviceApi::None);
            }
            other => panic!("expected For, got {other:?}"),
        }
    }
}
