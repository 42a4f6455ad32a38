//! Householder reflections of the form `H = I - v v^H / tau`, where `v[0] = 1` and `tau` is real.
//!
//! A reflection with an infinite `tau` is the identity.

use crate::{ComplexField, RealField};

/// Computes the Householder reflection `I - v v^H / tau` such that when multiplied by `x` from
/// the left, the result is `beta e_0`. `tau` and `beta` are returned.
///
/// `x` is determined by `x_0`, contained in `head`, and `|x_{1..}|`, contained in `tail_norm`.
/// The tail of `v` overwrites `essential`, which initially holds the tail of `x`.
pub(crate) fn make_householder_in_place<E: ComplexField>(
    essential: &mut [E],
    head: E,
    tail_norm: E::Real,
) -> (E::Real, E) {
    let zero = <E::Real as ComplexField>::zero();
    let one = <E::Real as ComplexField>::one();
    if tail_norm == zero {
        return (zero.inv(), head);
    }

    let head_norm = head.abs();
    let norm = hypot(head_norm, tail_norm);

    let sign = if head_norm != zero {
        head.scale(head_norm.inv())
    } else {
        E::one()
    };

    let signed_norm = sign * E::from_real(norm);
    let head_with_beta = head + signed_norm;
    let head_with_beta_inv = head_with_beta.inv();

    for e in essential.iter_mut() {
        *e = *e * head_with_beta_inv;
    }
    let ratio = tail_norm * head_with_beta_inv.abs();
    let half = <E::Real as ComplexField>::from_f64(0.5);
    let tau = half * (one + ratio * ratio);
    (tau, -signed_norm)
}

/// Returns the euclidean norm of `values`.
pub(crate) fn norm_l2<E: ComplexField>(values: &[E]) -> E::Real {
    let mut scale = <E::Real as ComplexField>::zero();
    for v in values {
        let abs = v.abs();
        if abs > scale {
            scale = abs;
        }
    }
    if scale == <E::Real as ComplexField>::zero() {
        return scale;
    }
    let scale_inv = scale.inv();
    let mut acc = <E::Real as ComplexField>::zero();
    for v in values {
        acc += v.scale(scale_inv).abs2();
    }
    acc.sqrt() * scale
}

#[inline]
fn hypot<R: RealField>(a: R, b: R) -> R {
    let (a, b) = (a.abs(), b.abs());
    let max = if a > b { a } else { b };
    let min = if a > b { b } else { a };
    if max == R::zero() {
        return max;
    }
    let r = min / max;
    max * (R::one() + r * r).sqrt()
}
