//! In-place conversion of device pixel encodings to canonical 8-bit RGBA.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use tracing::error;

use crate::error::ExportError;
use crate::texture::{PixelBuffer, TextureDescriptor, TextureFormat};

/// Convert `pixels` to canonical RGBA8 in place.
///
/// Every convertible source format stores at least four bytes per pixel, so
/// the narrowing rewrite can reuse the same backing buffer front to back;
/// the buffer is truncated to `width * height * 4` afterwards and
/// `row_stride` becomes `width * 4`. Channels are clamped to `[0, 1]` before
/// quantization so out-of-range HDR values saturate instead of wrapping.
/// Block-compressed data is left untouched for the block decompressor.
pub fn normalize_in_place(
    desc: &TextureDescriptor,
    pixels: &mut PixelBuffer,
) -> Result<(), ExportError> {
    let pixel_count = desc.width as usize * desc.height as usize;

    match desc.format {
        TextureFormat::Rgba8Unorm => {}
        TextureFormat::Rgb10a2Unorm => {
            for i in 0..pixel_count {
                let packed = LittleEndian::read_u32(&pixels.data[i * 4..]);
                let r = (packed & 1023) as f32 / 1023.0;
                let g = ((packed >> 10) & 1023) as f32 / 1023.0;
                let b = ((packed >> 20) & 1023) as f32 / 1023.0;
                let a = ((packed >> 30) & 3) as f32 / 3.0;
                write_rgba8(&mut pixels.data, i, [r, g, b, a]);
            }
        }
        TextureFormat::Rgba32Float => {
            for i in 0..pixel_count {
                let src = i * 16;
                let r = LittleEndian::read_f32(&pixels.data[src..]);
                let g = LittleEndian::read_f32(&pixels.data[src + 4..]);
                let b = LittleEndian::read_f32(&pixels.data[src + 8..]);
                let a = LittleEndian::read_f32(&pixels.data[src + 12..]);
                write_rgba8(&mut pixels.data, i, [r, g, b, a]);
            }
        }
        TextureFormat::Rgba16Float => {
            for i in 0..pixel_count {
                let src = i * 8;
                let r = read_f16(&pixels.data, src);
                let g = read_f16(&pixels.data, src + 2);
                let b = read_f16(&pixels.data, src + 4);
                let a = read_f16(&pixels.data, src + 6);
                write_rgba8(&mut pixels.data, i, [r, g, b, a]);
            }
        }
        TextureFormat::Rg11b10Float => {
            for i in 0..pixel_count {
                let packed = LittleEndian::read_u32(&pixels.data[i * 4..]);
                let r = float11_to_f32(packed & 0x7FF);
                let g = float11_to_f32((packed >> 11) & 0x7FF);
                let b = float10_to_f32((packed >> 22) & 0x3FF);
                // The packed format carries no alpha; exports are opaque.
                write_rgba8(&mut pixels.data, i, [r, g, b, 1.0]);
            }
        }
        fmt if fmt.is_block_compressed() => return Ok(()),
        fmt => {
            error!(format = ?fmt, "no conversion rule for source pixel format");
            return Err(ExportError::UnsupportedFormat(fmt));
        }
    }

    pixels.data.truncate(pixel_count * 4);
    pixels.row_stride = desc.width as usize * 4;
    pixels.width = desc.width;
    Ok(())
}

#[inline]
fn write_rgba8(data: &mut [u8], pixel_index: usize, rgba: [f32; 4]) {
    let offset = pixel_index * 4;
    data[offset] = quantize(rgba[0]);
    data[offset + 1] = quantize(rgba[1]);
    data[offset + 2] = quantize(rgba[2]);
    data[offset + 3] = quantize(rgba[3]);
}

/// Quantize a channel to 8 bits, truncating. NaN saturates to 0.
#[inline]
fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[inline]
fn read_f16(data: &[u8], offset: usize) -> f32 {
    f16::from_bits(LittleEndian::read_u16(&data[offset..])).to_f32()
}

/// Unsigned 11-bit float: 5-bit exponent (bias 15), 6-bit mantissa.
fn float11_to_f32(bits: u32) -> f32 {
    decode_unsigned_float((bits >> 6) & 0x1F, bits & 0x3F, 64.0)
}

/// Unsigned 10-bit float: 5-bit exponent (bias 15), 5-bit mantissa.
fn float10_to_f32(bits: u32) -> f32 {
    decode_unsigned_float((bits >> 5) & 0x1F, bits & 0x1F, 32.0)
}

fn decode_unsigned_float(exponent: u32, mantissa: u32, mantissa_scale: f32) -> f32 {
    if exponent == 0x1F {
        if mantissa == 0 {
            f32::INFINITY
        } else {
            f32::NAN
        }
    } else if exponent == 0 {
        // Denormal: no implicit leading one.
        mantissa as f32 / mantissa_scale * 2f32.powi(-14)
    } else {
        (1.0 + mantissa as f32 / mantissa_scale) * 2f32.powi(exponent as i32 - 15)
    }
}
