#![no_main]

use libfuzzer_sys::fuzz_target;
use nxdsp_ir::{DeviceApi, Expr, ForKind, Image, Param, Scalar, Stmt, Type};
use nxdsp_opt::align_loads;
use nxdsp_target::{Feature, Target};

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

fn gen_index(b: &mut Bytes, depth: u32) -> Expr {
    let names = ["x", "y", "k"];
    match b.next() % 6 {
        0 => Expr::int(i64::from(b.next()) - 128),
        1 => Expr::var(names[b.next() as usize % names.len()]),
        2 if depth > 0 => gen_index(b, depth - 1) + gen_index(b, depth - 1),
        3 if depth > 0 => gen_index(b, depth - 1) - gen_index(b, depth - 1),
        4 if depth > 0 => gen_index(b, depth - 1) * Expr::int(i64::from(b.next() % 17)),
        5 if depth > 0 => Expr::let_(
            "t",
            gen_index(b, depth - 1),
            Expr::var("t") + gen_index(b, depth - 1),
        ),
        _ => Expr::int(i64::from(b.next())),
    }
}

fn gen_load(b: &mut Bytes) -> Expr {
    let lanes = [1, 4, 8, 16, 24, 32, 48, 64, 128, 192][b.next() as usize % 10];
    let scalar = [Scalar::I8, Scalar::U8, Scalar::I16, Scalar::U16, Scalar::I32]
        [b.next() as usize % 5];
    let stride = i64::from(b.next() % 5);
    let image = if b.next() % 4 == 0 {
        Some(Image::new("img"))
    } else {
        None
    };
    let param = if b.next() % 2 == 0 {
        Some(Param::new("buf", [1, 8, 16, 64, 128][b.next() as usize % 5]))
    } else {
        None
    };
    Expr::load(
        Type::vector(scalar, lanes),
        "buf",
        Expr::ramp(gen_index(b, 2), Expr::int(stride), lanes),
        image,
        param,
    )
}

fn gen_stmt(b: &mut Bytes, depth: u32) -> Stmt {
    match b.next() % 4 {
        1 if depth > 0 => Stmt::let_stmt("x", gen_index(b, 2), gen_stmt(b, depth - 1)),
        2 if depth > 0 => Stmt::For {
            var: "i".into(),
            min: Expr::int(0),
            extent: Expr::int(i64::from(b.next())),
            kind: ForKind::Serial,
            device_api: if b.next() % 4 == 0 {
                DeviceApi::Dsp
            } else {
                DeviceApi::None
            },
            body: Box::new(gen_stmt(b, depth - 1)),
        },
        3 if depth > 0 => Stmt::Block(vec![gen_stmt(b, depth - 1), gen_stmt(b, depth - 1)]),
        _ => Stmt::Evaluate(gen_load(b)),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut b = Bytes { data, pos: 0 };
    let stmt = gen_stmt(&mut b, 4);
    let target = match b.next() % 3 {
        0 => Target::new(),
        1 => Target::new().with_feature(Feature::Hvx64),
        _ => Target::new().with_feature(Feature::Hvx128),
    };
    // The rewrite must never panic, and when it succeeds a second run must
    // leave the tree alone.
    if let Ok(once) = align_loads(stmt, &target) {
        let twice = align_loads(once.clone(), &target).expect("rewritten tree failed to rewrite");
        assert_eq!(twice, once);
    }
});
