//! Pixel-level blend operations over premultiplied RGBA8 buffers.
//!
//! These back the built-in transitions and are public so custom transition
//! functions can compose them.

use crate::foundation::error::{CueflowError, CueflowResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::target::ColorBuffer;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over composite of `src` onto `dst` at `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Linear crossfade between `a` and `b`; `t = 0` is all `a`, `t = 1` all `b`.
pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = add_sat_u8(av, bv);
    }
    out
}

/// Whole-buffer crossfade writing the blend of `a` and `b` into `out`.
///
/// All three buffers must share the same dimensions.
pub fn crossfade_into(
    out: &mut ColorBuffer,
    a: &ColorBuffer,
    b: &ColorBuffer,
    t: f32,
) -> CueflowResult<()> {
    if out.data.len() != a.data.len() || out.data.len() != b.data.len() {
        return Err(CueflowError::render(
            "crossfade_into expects equal-size rgba8 buffers",
        ));
    }
    for ((o, a), b) in out
        .data
        .chunks_exact_mut(4)
        .zip(a.data.chunks_exact(4))
        .zip(b.data.chunks_exact(4))
    {
        let px = crossfade([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], t);
        o.copy_from_slice(&px);
    }
    Ok(())
}

/// Sweep direction of a [`wipe_into`] blend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeDir {
    /// Reveal `b` from the left edge.
    LeftToRight,
    /// Reveal `b` from the right edge.
    RightToLeft,
    /// Reveal `b` from the top edge.
    TopToBottom,
    /// Reveal `b` from the bottom edge.
    BottomToTop,
}

/// Parameters for [`wipe_into`].
#[derive(Clone, Copy, Debug)]
pub struct WipeParams {
    /// Sweep progress in `[0, 1]`.
    pub t: f32,
    /// Sweep direction.
    pub dir: WipeDir,
    /// Softened edge width as a fraction of the swept axis, `0` for a hard
    /// cut.
    pub soft_edge: f32,
}

/// Whole-buffer directional wipe revealing `b` over `a` into `out`.
pub fn wipe_into(
    out: &mut ColorBuffer,
    a: &ColorBuffer,
    b: &ColorBuffer,
    params: WipeParams,
) -> CueflowResult<()> {
    let (width, height) = (out.width, out.height);
    if a.width != width || a.height != height || b.width != width || b.height != height {
        return Err(CueflowError::render(
            "wipe_into expects equal-size rgba8 buffers",
        ));
    }

    let t = params.t.clamp(0.0, 1.0);
    let soft_edge = params.soft_edge.max(0.0);

    let axis_len = match params.dir {
        WipeDir::LeftToRight | WipeDir::RightToLeft => width as f32,
        WipeDir::TopToBottom | WipeDir::BottomToTop => height as f32,
    };
    let soft_px = soft_edge * axis_len;

    let edge = t * (axis_len + 2.0 * soft_px) - soft_px;
    let a_edge = edge - soft_px;
    let b_edge = edge + soft_px;

    for y in 0..height {
        for x in 0..width {
            let pos = match params.dir {
                WipeDir::LeftToRight => x as f32,
                WipeDir::RightToLeft => (width - 1 - x) as f32,
                WipeDir::TopToBottom => y as f32,
                WipeDir::BottomToTop => (height - 1 - y) as f32,
            };

            let m = if soft_px <= 0.0 {
                if pos < edge { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(a_edge, b_edge, pos)
            };

            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let ap = [a.data[idx], a.data[idx + 1], a.data[idx + 2], a.data[idx + 3]];
            let bp = [b.data[idx], b.data[idx + 1], b.data[idx + 2], b.data[idx + 3]];
            let px = crossfade(ap, bp, m);
            out.data[idx..idx + 4].copy_from_slice(&px);
        }
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}
