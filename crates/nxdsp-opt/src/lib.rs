//! IR rewriting passes for nxdsp.
//!
//! Provides a [`Pass`] trait over kernel statement trees, a [`PassPipeline`]
//! that runs passes in sequence, the integer-expression simplifier
//! [`simplify`], and the load alignment pass ([`align_loads`]) that rewrites
//! vector loads into naturally aligned loads plus lane shuffles.

mod align_loads;
mod simplify;

pub use align_loads::{align_loads, AlignLoads};
pub use simplify::simplify;

use std::fmt::Debug;

use nxdsp_ir::Stmt;

/// Errors that abort a pass.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// A loop is offloaded to the wide-vector DSP but the target carries no
    /// recognized vector mode feature.
    #[error("loop '{loop_var}' is offloaded to the dsp but the target has neither hvx_64 nor hvx_128")]
    UnknownDspMode { loop_var: String },
}

/// A transformation over a kernel statement tree.
///
/// Passes consume the statement and return the rewritten tree; an error
/// fails the enclosing compilation.
pub trait Pass: Debug {
    /// Human-readable name of the pass.
    fn name(&self) -> &str;

    /// Runs the pass on a statement.
    fn run(&self, stmt: Stmt) -> Result<Stmt, PassError>;
}

/// Runs passes in sequence, stopping at the first error.
#[derive(Debug, Default)]
pub struct PassPipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl PassPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Appends a pass to the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Runs every pass in order.
    pub fn run(&self, mut stmt: Stmt) -> Result<Stmt, PassError> {
        for pass in &self.passes {
            log::trace!("running pass {}", pass.name());
            stmt = pass.run(stmt)?;
        }
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxdsp_ir::Expr;

    #[test]
    fn empty_pipeline_is_identity() {
        let stmt = Stmt::Evaluate(Expr::int(0));
        let out = PassPipeline::new().run(stmt.clone()).unwrap();
        assert_eq!(out, stmt);
    }

    #[test]
    fn pipeline_runs_passes_in_order() {
        #[derive(Debug)]
        struct Wrap(&'static str);
        impl Pass for Wrap {
            fn name(&self) -> &str {
                self.0
            }
            fn run(&self, stmt: Stmt) -> Result<Stmt, PassError> {
                Ok(Stmt::LetStmt {
                    name: self.0.to_string(),
                    value: Expr::int(0),
                    body: Box::new(stmt),
                })
            }
        }

        let mut pipeline = PassPipeline::new();
        pipeline.add_pass(Box::new(Wrap("first")));
        pipeline.add_pass(Box::new(Wrap("second")));
        let out = pipeline.run(Stmt::Evaluate(Expr::int(1))).unwrap();
        // The last pass wraps outermost.
        match out {
            Stmt::LetStmt { name, body, .. } => {
                assert_eq!(name, "second");
                match *body {
                    Stmt::LetStmt { name, .. } => assert_eq!(name, "first"),
                    other => panic!("expected inner LetStmt, got {other:?}"),
                }
            }
            other => panic!("expected LetStmt, got {other:?}"),
        }
    }
}
