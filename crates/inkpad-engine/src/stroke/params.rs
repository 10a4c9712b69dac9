//! Per-dab GPU parameters.
//!
//! The recorded dab draw never changes; only these two uniforms are
//! rewritten per slot before a block is resubmitted.

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

use super::StrokeSample;

/// Maps the unit quad `[-1, 1]²` to the dab's NDC rectangle on the canvas:
/// `ndc = corner * scale_offset.xy + scale_offset.zw`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DabTransform {
    pub scale_offset: [f32; 4],
}

/// Layout (32 bytes):
///
///  offset  0  color   [f32; 4]  premultiplied ink
///  offset 16  params  [f32; 4]  .x = pressure, .y = flow
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InkParams {
    pub color: [f32; 4],
    pub params: [f32; 4],
}

/// Translation to the sample position, uniform scale by
/// `radius_px * pressure`, expressed in the canvas's NDC.
pub fn dab_transform(sample: &StrokeSample, canvas_size: Vec2, radius_px: f32) -> DabTransform {
    let w = canvas_size.x.max(1.0);
    let h = canvas_size.y.max(1.0);
    let r = radius_px.max(0.0) * sample.pressure;
    DabTransform {
        scale_offset: [
            2.0 * r / w,
            2.0 * r / h,
            2.0 * sample.position.x / w - 1.0,
            1.0 - 2.0 * sample.position.y / h,
        ],
    }
}

pub fn ink_params(sample: &StrokeSample, ink: Color, flow: f32) -> InkParams {
    InkParams {
        color: ink.to_array(),
        params: [sample.pressure, flow.clamp(0.0, 1.0), 0.0, 0.0],
    }
}

pub(crate) fn uniform_size<T>() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .unwrap_or(std::num::NonZeroU64::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(1024.0, 512.0);

    #[test]
    fn uniform_layout_sizes() {
        assert_eq!(std::mem::size_of::<DabTransform>(), 16);
        assert_eq!(std::mem::size_of::<InkParams>(), 32);
    }

    #[test]
    fn center_maps_to_ndc_origin() {
        let s = StrokeSample::new(Vec2::new(512.0, 256.0), 1.0);
        let t = dab_transform(&s, CANVAS, 8.0);
        assert_eq!(t.scale_offset[2], 0.0);
        assert_eq!(t.scale_offset[3], 0.0);
    }

    #[test]
    fn top_left_is_minus_one_plus_one() {
        let s = StrokeSample::new(Vec2::zero(), 1.0);
        let t = dab_transform(&s, CANVAS, 8.0);
        assert_eq!((t.scale_offset[2], t.scale_offset[3]), (-1.0, 1.0));
    }

    #[test]
    fn scale_follows_pressure() {
        let full = dab_transform(&StrokeSample::new(Vec2::zero(), 1.0), CANVAS, 8.0);
        let half = dab_transform(&StrokeSample::new(Vec2::zero(), 0.5), CANVAS, 8.0);
        assert_eq!(full.scale_offset[0], 16.0 / 1024.0);
        assert_eq!(full.scale_offset[1], 16.0 / 512.0);
        assert_eq!(half.scale_offset[0], full.scale_offset[0] * 0.5);
    }

    #[test]
    fn ink_carries_pressure_and_flow() {
        let s = StrokeSample::new(Vec2::zero(), 0.3);
        let p = ink_params(&s, Color::BLACK, 2.0);
        assert_eq!(p.color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(p.params, [0.3, 1.0, 0.0, 0.0]);
    }
}
