//! Canvas readback to an image file.
//!
//! HDR exports keep the linear float values (OpenEXR). 8-bit exports are
//! un-premultiplied and sRGB-encoded (PNG).

use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result};
use thiserror::Error;

use super::state::{CanvasAccess, CanvasLayout, PipelineStage};
use super::Canvas;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export from {0:?} is not supported")]
    UnsupportedFormat(wgpu::TextureFormat),
    #[error("readback too short: {actual} of {expected}")]
    ShortReadback { expected: usize, actual: usize },
    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("map callback dropped")]
    MapCallback,
    #[error("failed to encode {path}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// File flavor for [`Canvas::export`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExportKind {
    /// 32-bit float RGBA, linear.
    Hdr,
    /// 8-bit RGBA, sRGB.
    Ldr,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Hdr => "exr",
            ExportKind::Ldr => "png",
        }
    }
}

/// Bytes per texel for the formats export can read.
pub fn texel_size(format: wgpu::TextureFormat) -> Result<u32, ExportError> {
    match format {
        wgpu::TextureFormat::Rgba16Float => Ok(8),
        wgpu::TextureFormat::Rgba32Float => Ok(16),
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => Ok(4),
        other => Err(ExportError::UnsupportedFormat(other)),
    }
}

/// Row pitch rounded up to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32, texel: u32) -> u32 {
    let unpadded = width * texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a texture readback.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, texel: u32) -> Result<Vec<u8>, ExportError> {
    let row = (width * texel) as usize;
    let padded = padded_bytes_per_row(width, texel) as usize;
    let expected = padded * height as usize;
    if data.len() < expected {
        return Err(ExportError::ShortReadback {
            expected,
            actual: data.len(),
        });
    }

    let mut out = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        out.extend_from_slice(&data[y * padded..y * padded + row]);
    }
    Ok(out)
}

/// IEEE 754 binary16 to binary32.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) & 1) as u32;
    let exp = ((bits >> 10) & 0x1f) as u32;
    let frac = (bits & 0x3ff) as u32;

    let out = match (exp, frac) {
        (0, 0) => sign << 31,
        (0, _) => {
            // Subnormal: renormalize.
            let mut shift = 0u32;
            let mut f = frac;
            while f & 0x400 == 0 {
                f <<= 1;
                shift += 1;
            }
            let f = f & 0x3ff;
            (sign << 31) | ((113 - shift) << 23) | (f << 13)
        }
        (0x1f, 0) => (sign << 31) | 0x7f80_0000,
        (0x1f, _) => (sign << 31) | 0x7fc0_0000 | (frac << 13),
        _ => (sign << 31) | ((exp + 127 - 15) << 23) | (frac << 13),
    };
    f32::from_bits(out)
}

/// Tightly packed texels to linear float RGBA.
pub fn decode_texels(format: wgpu::TextureFormat, bytes: &[u8]) -> Result<Vec<f32>, ExportError> {
    match format {
        wgpu::TextureFormat::Rgba16Float => Ok(bytes
            .chunks_exact(2)
            .map(|c| f16_to_f32(u16::from_le_bytes([c[0], c[1]])))
            .collect()),
        wgpu::TextureFormat::Rgba32Float => Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()),
        wgpu::TextureFormat::Rgba8Unorm => Ok(bytes.iter().map(|b| *b as f32 / 255.0).collect()),
        wgpu::TextureFormat::Rgba8UnormSrgb => {
            Ok(bytes
                .chunks_exact(4)
                .flat_map(|c| {
                    [
                        srgb_to_linear(c[0] as f32 / 255.0),
                        srgb_to_linear(c[1] as f32 / 255.0),
                        srgb_to_linear(c[2] as f32 / 255.0),
                        c[3] as f32 / 255.0,
                    ]
                })
                .collect())
        }
        other => Err(ExportError::UnsupportedFormat(other)),
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Premultiplied linear RGBA to straight sRGB bytes.
pub fn to_srgb8(linear_premul: &[f32]) -> Vec<u8> {
    linear_premul
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3].clamp(0.0, 1.0);
            let unpremul = |c: f32| if a > 0.0 { c / a } else { 0.0 };
            [
                (linear_to_srgb(unpremul(px[0])) * 255.0).round() as u8,
                (linear_to_srgb(unpremul(px[1])) * 255.0).round() as u8,
                (linear_to_srgb(unpremul(px[2])) * 255.0).round() as u8,
                (a * 255.0).round() as u8,
            ]
        })
        .collect()
}

/// Encodes linear premultiplied RGBA to `path`.
pub fn write_image(path: &Path, width: u32, height: u32, rgba: Vec<f32>, kind: ExportKind) -> Result<(), ExportError> {
    let encode_err = |source| ExportError::Encode {
        path: path.display().to_string(),
        source,
    };
    match kind {
        ExportKind::Hdr => {
            let len = rgba.len();
            let img = image::Rgba32FImage::from_raw(width, height, rgba).ok_or(ExportError::ShortReadback {
                expected: (width * height * 4) as usize,
                actual: len,
            })?;
            image::DynamicImage::ImageRgba32F(img)
                .save_with_format(path, image::ImageFormat::OpenExr)
                .map_err(encode_err)
        }
        ExportKind::Ldr => {
            let bytes = to_srgb8(&rgba);
            let len = bytes.len();
            let img = image::RgbaImage::from_raw(width, height, bytes).ok_or(ExportError::ShortReadback {
                expected: (width * height * 4) as usize,
                actual: len,
            })?;
            img.save_with_format(path, image::ImageFormat::Png)
                .map_err(encode_err)
        }
    }
}

impl Canvas {
    /// Copies the display image to host memory and writes it to `path`.
    pub fn export(&mut self, path: &Path, kind: ExportKind) -> Result<()> {
        let rgba = self.read_pixels()?;
        write_image(path, self.width(), self.height(), rgba, kind)?;

        log::info!("exported canvas to {}", path.display());
        Ok(())
    }

    /// Reads the display image back as premultiplied linear RGBA floats,
    /// row-major, no padding.
    ///
    /// Sequence: `TransferSrc` transition, copy + wait, back to
    /// `ShaderReadOnly`. The canvas is restored even when the readback fails.
    pub fn read_pixels(&mut self) -> Result<Vec<f32>> {
        let texel = texel_size(self.format())?;

        self.transition_to(
            CanvasAccess::TRANSFER_READ,
            CanvasLayout::TransferSrc,
            PipelineStage::FragmentShader,
            PipelineStage::Transfer,
        )?;
        let readback = self.read_back(texel);
        self.end_export()?;

        let bytes = readback?;
        let texels = strip_row_padding(&bytes, self.width(), self.height(), texel)?;
        Ok(decode_texels(self.format(), &texels)?)
    }

    fn read_back(&self, texel: u32) -> Result<Vec<u8>> {
        self.state().require("export", CanvasLayout::TransferSrc)?;

        let (width, height) = (self.width(), self.height());
        let bytes_per_row = padded_bytes_per_row(width, texel);
        let device = self.device();

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("inkpad export readback"),
            size: bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("inkpad export encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: self.display_texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let queue = self.queue();
        queue
            .submit_and_wait(device, std::iter::once(encoder.finish()))
            .context("export copy")?;

        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        queue.with_lock(|_| device.poll(wgpu::PollType::wait_indefinitely()))
            .map_err(|e| anyhow::anyhow!("device poll failed: {e}"))?;
        receiver
            .recv()
            .map_err(|_| ExportError::MapCallback)?
            .map_err(ExportError::Map)?;

        let data = slice.get_mapped_range().to_vec();
        buffer.unmap();
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── f16 ───────────────────────────────────────────────────────────────

    #[test]
    fn f16_known_values() {
        assert_eq!(f16_to_f32(0x0000), 0.0);
        assert_eq!(f16_to_f32(0x3c00), 1.0);
        assert_eq!(f16_to_f32(0xc000), -2.0);
        assert_eq!(f16_to_f32(0x3800), 0.5);
        assert_eq!(f16_to_f32(0x7bff), 65504.0);
        assert_eq!(f16_to_f32(0x7c00), f32::INFINITY);
        assert!(f16_to_f32(0x7e00).is_nan());
    }

    #[test]
    fn f16_subnormal() {
        // Smallest positive subnormal: 2^-24.
        assert_eq!(f16_to_f32(0x0001), 2f32.powi(-24));
        assert_eq!(f16_to_f32(0x0200), 2f32.powi(-15));
    }

    // ── row padding ───────────────────────────────────────────────────────

    #[test]
    fn padded_rows_are_aligned() {
        assert_eq!(padded_bytes_per_row(1, 8), 256);
        assert_eq!(padded_bytes_per_row(32, 8), 256);
        assert_eq!(padded_bytes_per_row(33, 8), 512);
    }

    #[test]
    fn strip_padding_keeps_row_payload() {
        let (w, h, texel) = (3u32, 2u32, 4u32);
        let padded = padded_bytes_per_row(w, texel) as usize;
        let mut data = vec![0xAAu8; padded * h as usize];
        for y in 0..h as usize {
            for i in 0..(w * texel) as usize {
                data[y * padded + i] = (y * 100 + i) as u8;
            }
        }

        let out = strip_row_padding(&data, w, h, texel).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(out[0], 0);
        assert_eq!(out[12], 100);
        assert!(!out.contains(&0xAA));
    }

    #[test]
    fn short_readback_is_error() {
        let err = strip_row_padding(&[0u8; 10], 4, 4, 8).unwrap_err();
        assert!(matches!(err, ExportError::ShortReadback { .. }));
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[test]
    fn decode_rgba16f() {
        let bytes: Vec<u8> = [0x3c00u16, 0x3800, 0x0000, 0x3c00]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let px = decode_texels(wgpu::TextureFormat::Rgba16Float, &bytes).unwrap();
        assert_eq!(px, vec![1.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn unsupported_format_is_error() {
        assert!(texel_size(wgpu::TextureFormat::Depth32Float).is_err());
        assert!(decode_texels(wgpu::TextureFormat::R8Unorm, &[0]).is_err());
    }

    #[test]
    fn srgb8_white_black_transparent() {
        let out = to_srgb8(&[1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.3, 0.3, 0.3, 0.0]);
        assert_eq!(out, vec![255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn srgb8_unpremultiplies() {
        // 50% coverage of linear white.
        let out = to_srgb8(&[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(out, vec![255, 255, 255, 128]);
    }

    // ── files ─────────────────────────────────────────────────────────────

    #[test]
    fn writes_png_and_exr() {
        let dir = tempfile::tempdir().unwrap();
        let rgba = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let png = dir.path().join("c.png");
        write_image(&png, 2, 1, rgba.clone(), ExportKind::Ldr).unwrap();
        let back = image::open(&png).unwrap().into_rgba8();
        assert_eq!(back.get_pixel(1, 0).0, [0, 0, 0, 255]);

        let exr = dir.path().join("c.exr");
        write_image(&exr, 2, 1, rgba, ExportKind::Hdr).unwrap();
        assert!(exr.is_file());
    }

    #[test]
    fn wrong_pixel_count_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_image(&dir.path().join("x.png"), 4, 4, vec![0.0; 4], ExportKind::Ldr)
            .unwrap_err();
        assert!(matches!(err, ExportError::ShortReadback { .. }));
    }
}
