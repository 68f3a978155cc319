#![no_main]

use libfuzzer_sys::fuzz_target;
use nxdsp_ir::{BinaryOp, Expr};
use nxdsp_opt::simplify;

struct Bytes<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Bytes<'_> {
    fn next(&mut self) -> u8 {
        let b = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        b
    }
}

fn gen_expr(b: &mut Bytes, depth: u32) -> Expr {
    let names = ["x", "y", "z"];
    let ops = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Min,
        BinaryOp::Max,
    ];
    match b.next() % 4 {
        0 => Expr::int(i64::from(b.next()) - 128),
        1 => Expr::var(names[b.next() as usize % names.len()]),
        2 if depth > 0 => Expr::Binary {
            op: ops[b.next() as usize % ops.len()],
            a: Box::new(gen_expr(b, depth - 1)),
            b: Box::new(gen_expr(b, depth - 1)),
        },
        3 if depth > 0 => Expr::let_("t", gen_expr(b, depth - 1), gen_expr(b, depth - 1)),
        _ => Expr::int(i64::from(b.next())),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut b = Bytes { data, pos: 0 };
    let expr = gen_expr(&mut b, 6);
    // Simplification must never panic and must reach a fixed point in one
    // step.
    let once = simplify(expr);
    let twice = simplify(once.clone());
    assert_eq!(twice, once);
});
