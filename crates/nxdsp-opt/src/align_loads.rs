//! Load alignment rewriting for wide-vector DSP targets.
//!
//! Wide-vector devices only load efficiently (or legally) at the natural
//! vector width from naturally aligned addresses. This pass rewrites every
//! vector load it can prove something about into that form: misaligned
//! dense loads become two aligned loads plus a lane-window shuffle, narrow
//! loads borrow a prefix of a widened aligned load, oversized loads are
//! sliced to the native width, and stride-2 loads become two dense loads
//! followed by an even/odd deinterleave. Loads it cannot prove anything
//! about (external images, unknown base alignment, unsupported strides)
//! are left untouched for the backend to handle generically.

use nxdsp_analysis::{modulus_remainder, reduce_expr_modulo, ModulusRemainder, Scope};
use nxdsp_ir::{DeviceApi, Expr, Image, Intrinsic, Param, Scalar, Stmt, Type};
use nxdsp_target::{Feature, Target};

use crate::simplify::simplify;
use crate::{Pass, PassError};

/// Rewrites the vector loads in `stmt` into naturally aligned loads plus
/// lane shuffles for `target`.
pub fn align_loads(stmt: Stmt, target: &Target) -> Result<Stmt, PassError> {
    let mut rewriter = Rewriter {
        target,
        required_alignment: target.natural_vector_size(Scalar::I8),
        alignment_info: Scope::new(),
    };
    let result = rewriter.mutate_stmt(stmt);
    debug_assert!(rewriter.alignment_info.is_empty());
    result
}

/// The load alignment pass.
#[derive(Debug)]
pub struct AlignLoads {
    target: Target,
}

impl AlignLoads {
    /// Creates the pass for a target.
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

impl Pass for AlignLoads {
    fn name(&self) -> &str {
        "align-loads"
    }

    fn run(&self, stmt: Stmt) -> Result<Stmt, PassError> {
        align_loads(stmt, &self.target)
    }
}

struct Rewriter<'a> {
    target: &'a Target,
    /// Required byte alignment of a vector load: the byte width of the
    /// active device's natural vector. Switched inside dsp loops.
    required_alignment: u32,
    /// Congruence facts for integer names in scope.
    alignment_info: Scope<ModulusRemainder>,
}

impl Rewriter<'_> {
    /// The lane count of the natural vector for loads of `ty`'s element.
    fn natural_vector_lanes(&self, ty: Type) -> u32 {
        self.required_alignment / ty.bytes()
    }

    /// The alignment oracle: reports the lane offset of `base` from an
    /// aligned boundary, or `None` when alignment cannot be proven.
    ///
    /// A buffer whose own base address is not a multiple of the required
    /// alignment defeats any conclusion drawn from the index, so alignment
    /// detection is restricted to buffers where only the ramp matters.
    fn known_lane_offset(&self, base: &Expr, host_alignment: i64, ty: Type) -> Option<i64> {
        if host_alignment % i64::from(self.required_alignment) != 0 {
            return None;
        }
        let lanes = i64::from(self.natural_vector_lanes(ty));
        reduce_expr_modulo(base, lanes, &self.alignment_info)
    }

    fn mutate_stmt(&mut self, stmt: Stmt) -> Result<Stmt, PassError> {
        match stmt {
            Stmt::Store {
                buffer,
                index,
                value,
                param,
            } => Ok(Stmt::Store {
                buffer,
                index: self.mutate_expr(index)?,
                value: self.mutate_expr(value)?,
                param,
            }),
            Stmt::Evaluate(e) => Ok(Stmt::Evaluate(self.mutate_expr(e)?)),
            Stmt::LetStmt { name, value, body } => {
                let (value, body) = self.mutate_binding(&name, value, *body, Self::mutate_stmt)?;
                Ok(Stmt::LetStmt {
                    name,
                    value,
                    body: Box::new(body),
                })
            }
            Stmt::For {
                var,
                min,
                extent,
                kind,
                device_api,
                body,
            } => {
                let saved = self.required_alignment;
                if device_api == DeviceApi::Dsp {
                    self.required_alignment = if self.target.has_feature(Feature::Hvx128) {
                        128
                    } else if self.target.has_feature(Feature::Hvx64) {
                        64
                    } else {
                        return Err(PassError::UnknownDspMode { loop_var: var });
                    };
                }
                let result = (|| {
                    let min = self.mutate_expr(min)?;
                    let extent = self.mutate_expr(extent)?;
                    let body = self.mutate_stmt(*body)?;
                    Ok((min, extent, body))
                })();
                self.required_alignment = saved;
                let (min, extent, body) = result?;
                Ok(Stmt::For {
                    var,
                    min,
                    extent,
                    kind,
                    device_api,
                    body: Box::new(body),
                })
            }
            Stmt::Block(stmts) => Ok(Stmt::Block(
                stmts
                    .into_iter()
                    .map(|s| self.mutate_stmt(s))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    fn mutate_expr(&mut self, expr: Expr) -> Result<Expr, PassError> {
        match expr {
            Expr::IntImm { .. } | Expr::Var { .. } => Ok(expr),
            Expr::Binary { op, a, b } => Ok(Expr::Binary {
                op,
                a: Box::new(self.mutate_expr(*a)?),
                b: Box::new(self.mutate_expr(*b)?),
            }),
            Expr::Ramp {
                base,
                stride,
                lanes,
            } => Ok(Expr::Ramp {
                base: Box::new(self.mutate_expr(*base)?),
                stride: Box::new(self.mutate_expr(*stride)?),
                lanes,
            }),
            Expr::Broadcast { value, lanes } => Ok(Expr::Broadcast {
                value: Box::new(self.mutate_expr(*value)?),
                lanes,
            }),
            Expr::Call { ty, op, args } => Ok(Expr::Call {
                ty,
                op,
                args: args
                    .into_iter()
                    .map(|a| self.mutate_expr(a))
                    .collect::<Result<_, _>>()?,
            }),
            Expr::Let { name, value, body } => {
                let (value, body) = self.mutate_binding(&name, *value, *body, Self::mutate_expr)?;
                Ok(Expr::Let {
                    name,
                    value: Box::new(value),
                    body: Box::new(body),
                })
            }
            Expr::Load {
                ty,
                buffer,
                index,
                image,
                param,
            } => self.mutate_load(ty, buffer, *index, image, param),
        }
    }

    /// Mutates a let's value and body with the value's congruence summary
    /// bound in the alignment context. The binding is popped on every exit
    /// path, including when an inner mutation fails.
    fn mutate_binding<B>(
        &mut self,
        name: &str,
        value: Expr,
        body: B,
        mutate_body: impl FnOnce(&mut Self, B) -> Result<B, PassError>,
    ) -> Result<(Expr, B), PassError> {
        let tracked = value.ty().is_scalar() && value.ty().is_int();
        if tracked {
            let info = modulus_remainder(&value, &self.alignment_info);
            self.alignment_info.push(name, info);
        }
        let result = (|| {
            let value = self.mutate_expr(value)?;
            let body = mutate_body(self, body)?;
            Ok((value, body))
        })();
        if tracked {
            self.alignment_info.pop(name);
        }
        result
    }

    fn mutate_load(
        &mut self,
        ty: Type,
        buffer: String,
        index: Expr,
        image: Option<Image>,
        param: Option<Param>,
    ) -> Result<Expr, PassError> {
        let unchanged = |index: Expr| Expr::Load {
            ty,
            buffer: buffer.clone(),
            index: Box::new(index),
            image: image.clone(),
            param: param.clone(),
        };

        if !ty.is_vector() {
            return Ok(unchanged(index));
        }
        log::trace!("align_loads: working on {buffer}[{index}]");
        if image.is_some() {
            log::debug!("align_loads: not dealing with external image load {buffer}[{index}]");
            return Ok(unchanged(index));
        }

        let mutated = self.mutate_expr(index.clone())?;
        let (base, stride, lanes) = match &mutated {
            Expr::Ramp {
                base,
                stride,
                lanes,
            } => match stride.as_int() {
                Some(s) => ((**base).clone(), s, *lanes),
                None => return Ok(unchanged(index)),
            },
            _ => return Ok(unchanged(index)),
        };

        // We only work toward natural vectors supported by the device.
        let native_lanes = self.natural_vector_lanes(ty);
        debug_assert!(native_lanes > 0);

        if lanes < native_lanes {
            // Strides beyond 2 are not handled.
            if stride > 2 {
                return Ok(unchanged(index));
            }
            // Load a native vector and take the leading lanes: the widened
            // recursive rewrite produces an aligned-load-plus-shuffle form
            // whose prefix is exactly the lanes asked for.
            let wide = Expr::load(
                ty.with_lanes(native_lanes),
                buffer,
                Expr::ramp(base, Expr::int(stride), native_lanes),
                image,
                param,
            );
            let vec = self.mutate_expr(wide)?;
            let indices: Vec<i64> = (0..i64::from(lanes)).collect();
            return Ok(Expr::shuffle_vector(vec, &indices));
        }

        if lanes > native_lanes {
            // Slice into native-width pieces and recurse on the
            // concatenation; each slice is rewritten on re-entry.
            let mut slices = Vec::new();
            let mut i = 0;
            while i < lanes {
                let slice_lanes = native_lanes.min(lanes - i);
                let slice_base = simplify(base.clone() + Expr::int(i64::from(i)));
                slices.push(Expr::load(
                    ty.with_lanes(slice_lanes),
                    buffer.clone(),
                    Expr::ramp(slice_base, Expr::int(stride), slice_lanes),
                    image.clone(),
                    param.clone(),
                ));
                i += native_lanes;
            }
            let concat = Expr::Call {
                ty,
                op: Intrinsic::ConcatVectors,
                args: slices,
            };
            return self.mutate_expr(concat);
        }

        match stride {
            1 => {
                // A param's base address is only as aligned as the caller
                // declared; an internal buffer is always aligned to the
                // natural vector width. (External images were handled above.)
                let base_alignment = param
                    .as_ref()
                    .map_or(i64::from(self.required_alignment), Param::host_alignment);
                match self.known_lane_offset(&base, base_alignment, ty) {
                    Some(lanes_off) if lanes_off != 0 => {
                        let base_low = simplify(base.clone() - Expr::int(lanes_off));
                        let ramp_low = Expr::ramp(base_low.clone(), Expr::int(1), lanes);
                        let ramp_high = Expr::ramp(
                            simplify(base_low + Expr::int(i64::from(lanes))),
                            Expr::int(1),
                            lanes,
                        );
                        let load_low =
                            Expr::load(ty, buffer.clone(), ramp_low, image.clone(), param.clone());
                        let load_high = Expr::load(ty, buffer.clone(), ramp_high, image, param);
                        // The window [lanes_off, lanes_off + lanes) of the
                        // two concatenated aligned loads is exactly the
                        // original ramp's lanes.
                        let result =
                            concat_and_slice(load_low, load_high, lanes_off, i64::from(lanes));
                        log::debug!("align_loads: unaligned load {buffer}[{mutated}] -> {result}");
                        Ok(result)
                    }
                    _ => {
                        log::trace!("align_loads: {buffer}[{mutated}]: aligned or unknown alignment, leaving as is");
                        Ok(unchanged(index))
                    }
                }
            }
            2 => {
                // Break into two dense loads followed by an even/odd
                // deinterleave shuffle.
                let mut base_b = base.clone() + Expr::int(i64::from(lanes));
                let mut b_shift = 0;

                if let Some(p) = &param {
                    // If buffer_base + base is not provably aligned, reading
                    // [base_b, base_b + lanes) may run one element past the
                    // end of the caller's region. Shift base_b left one lane
                    // and compensate in the shuffle.
                    let off = self.known_lane_offset(&base, p.host_alignment(), ty);
                    if off != Some(0) {
                        log::debug!(
                            "align_loads: {buffer}[{mutated}]: stride-2 base not provably aligned, shifting high load"
                        );
                        base_b = base_b - Expr::int(1);
                        b_shift = 1;
                    }
                }

                let ramp_a = Expr::ramp(base, Expr::int(1), lanes);
                let ramp_b = Expr::ramp(simplify(base_b), Expr::int(1), lanes);
                let vec_a = self.mutate_expr(Expr::load(
                    ty,
                    buffer.clone(),
                    ramp_a,
                    image.clone(),
                    param.clone(),
                ))?;
                let vec_b = self.mutate_expr(Expr::load(ty, buffer.clone(), ramp_b, image, param))?;

                let half = i64::from(lanes) / 2;
                let mut indices = Vec::with_capacity(lanes as usize);
                for i in 0..half {
                    indices.push(i * 2);
                }
                for i in half..i64::from(lanes) {
                    indices.push(i * 2 + b_shift);
                }

                let result = concat_and_shuffle(vec_a, vec_b, &indices);
                log::debug!("align_loads: stride-2 load {buffer}[{mutated}] -> {result}");
                Ok(result)
            }
            _ => Ok(unchanged(index)),
        }
    }
}

/// Emits `shuffle_vector(concat_vectors(a, b), indices...)`.
///
/// The result has `a`'s type; every index must select a lane of the
/// concatenation.
fn concat_and_shuffle(vec_a: Expr, vec_b: Expr, indices: &[i64]) -> Expr {
    let a_lanes = vec_a.ty().lanes;
    let b_lanes = vec_b.ty().lanes;
    debug_assert_eq!(indices.len() as u32, a_lanes);
    debug_assert!(indices
        .iter()
        .all(|&i| i >= 0 && (i as u32) < a_lanes + b_lanes));
    Expr::shuffle_vector(Expr::concat_vectors(vec![vec_a, vec_b]), indices)
}

/// The `size` contiguous lanes of the concatenation of `a` and `b`
/// beginning at lane `start`.
fn concat_and_slice(vec_a: Expr, vec_b: Expr, start: i64, size: i64) -> Expr {
    let indices: Vec<i64> = (start..start + size).collect();
    concat_and_shuffle(vec_a, vec_b, &indices)
}
