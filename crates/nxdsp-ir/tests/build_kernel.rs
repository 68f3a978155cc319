//! Integration test: build a small blur-like kernel tree programmatically
//! and verify the text dump output.

use nxdsp_ir::*;

/// Build the statement tree for
///
/// ```text
/// let base = (y * 256)
/// for x in [0, 0 + 16) @dsp {
///     out[ramp((base + x), 1, 16)] =
///         concat_vectors(in[ramp((base + x), 2, 8)], in[ramp(((base + x) + 16), 2, 8)])
/// }
/// ```
#[test]
fn build_strided_copy_kernel() {
    let idx = Expr::var("base") + Expr::var("x");
    let lo = Expr::load(
        Type::vector(Scalar::U8, 8),
        "in",
        Expr::ramp(idx.clone(), Expr::int(2), 8),
        None,
        Some(Param::new("in", 128)),
    );
    let hi = Expr::load(
        Type::vector(Scalar::U8, 8),
        "in",
        Expr::ramp(idx.clone() + Expr::int(16), Expr::int(2), 8),
        None,
        Some(Param::new("in", 128)),
    );
    let value = Expr::concat_vectors(vec![lo, hi]);
    assert_eq!(value.ty(), Type::vector(Scalar::U8, 16));

    let store = Stmt::Store {
        buffer: "out".into(),
        index: Expr::ramp(idx, Expr::int(1), 16),
        value,
        param: None,
    };
    let loop_ = Stmt::For {
        var: "x".into(),
        min: Expr::int(0),
        extent: Expr::int(16),
        kind: ForKind::Vectorized,
        device_api: DeviceApi::Dsp,
        body: Box::new(store),
    };
    let kernel = Stmt::let_stmt("base", Expr::var("y") * Expr::int(256), loop_);

    let text = format!("{kernel}");
    assert!(text.contains("let base = (y * 256)"));
    assert!(text.contains("vectorized x in [0, 0 + 16) @dsp {"));
    assert!(text.contains("out[ramp((base + x), 1, 16)] = concat_vectors("));
    assert!(text.contains("in[ramp((base + x), 2, 8)]"));
}

#[test]
fn clone_compares_equal() {
    let e = Expr::let_(
        "t",
        Expr::var("x") + Expr::int(1),
        Expr::load(
            Type::vector(Scalar::I8, 16),
            "buf",
            Expr::ramp(Expr::var("t"), Expr::int(1), 16),
            None,
            None,
        ),
    );
    assert_eq!(e.clone(), e);
}
