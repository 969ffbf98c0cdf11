use crate::{
    composite::rule::{ArithmeticCoefficients, CompositeOperator},
    foundation::{
        error::{GraphError, GraphResult},
        math::mul_div255_u8,
    },
};

pub type PremulRgba8 = [u8; 4];

/// Combine incoming `src` onto accumulated `dst`, both premultiplied.
pub fn composite(op: &CompositeOperator, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    let da = u16::from(dst[3]);
    let (fs, fd) = match op {
        CompositeOperator::Over => (255, 255 - sa),
        CompositeOperator::In => (da, 0),
        CompositeOperator::Out => (255 - da, 0),
        CompositeOperator::Atop => (da, 255 - sa),
        CompositeOperator::Xor => (255 - da, 255 - sa),
        CompositeOperator::Arithmetic(k) => return arithmetic(k, dst, src),
    };
    porter_duff(dst, src, fs, fd)
}

fn porter_duff(dst: PremulRgba8, src: PremulRgba8, fs: u16, fd: u16) -> PremulRgba8 {
    let mut out = [0u8; 4];
    for i in 0..4 {
        let sc = mul_div255_u8(u16::from(src[i]), fs);
        let dc = mul_div255_u8(u16::from(dst[i]), fd);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// `out = k1*i1*i2 + k2*i1 + k3*i2 + k4` per channel with `i1 = src`, `i2 = dst`.
///
/// Channels are clamped to `[0, 1]`, then color is clamped to alpha so the result stays a
/// valid premultiplied pixel.
fn arithmetic(k: &ArithmeticCoefficients, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let mut out = [0u8; 4];
    for i in 0..4 {
        let i1 = f32::from(src[i]) / 255.0;
        let i2 = f32::from(dst[i]) / 255.0;
        let v = k.k1() * i1 * i2 + k.k2() * i1 + k.k3() * i2 + k.k4();
        out[i] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    let a = out[3];
    for c in &mut out[..3] {
        *c = (*c).min(a);
    }
    out
}

pub fn composite_in_place(op: &CompositeOperator, dst: &mut [u8], src: &[u8]) -> GraphResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GraphError::evaluation(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = composite(op, [d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/math.rs"]
mod tests;
