//! Decoding of block-compressed texture payloads into raw RGBA images.

use tracing::{error, warn};

use crate::error::ExportError;
use crate::texture::{TextureDescriptor, TextureFormat};

/// A decoded, tightly packed RGBA8 image.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decode a block-compressed mip-0 payload into a `width x height` RGBA
/// image.
///
/// Truncated payloads are zero-padded to the expected block-image size
/// before unpacking rather than rejected; bytes past the expected size are
/// ignored. Single- and two-channel block formats expand to grayscale and
/// red/green respectively, with opaque alpha.
pub fn decompress_blocks(
    desc: &TextureDescriptor,
    data: &[u8],
) -> Result<RawImage, ExportError> {
    let (block_bytes, pixel_bytes, decoder): (usize, usize, fn(&[u8], &mut [u8], usize)) =
        match desc.format {
            TextureFormat::Bc1Unorm => (8, 4, bcdec_rs::bc1),
            TextureFormat::Bc3Unorm => (16, 4, bcdec_rs::bc3),
            TextureFormat::Bc4Unorm => {
                (8, 1, (|b, o, p| bcdec_rs::bc4(b, o, p, false)) as fn(&[u8], &mut [u8], usize))
            }
            TextureFormat::Bc5Unorm => {
                (16, 2, (|b, o, p| bcdec_rs::bc5(b, o, p, false)) as fn(&[u8], &mut [u8], usize))
            }
            TextureFormat::Bc7Unorm => (16, 4, bcdec_rs::bc7),
            fmt => {
                error!(format = ?fmt, "no decoder for block-compressed format");
                return Err(ExportError::UnsupportedBlockFormat(fmt));
            }
        };

    let width = desc.width as usize;
    let height = desc.height as usize;
    if width == 0 || height == 0 {
        return Ok(RawImage {
            width: desc.width,
            height: desc.height,
            data: Vec::new(),
        });
    }

    let blocks_x = (width + 3) / 4;
    let blocks_y = (height + 3) / 4;
    let expected = blocks_x * blocks_y * block_bytes;

    let padded;
    let blocks: &[u8] = if data.len() < expected {
        warn!(
            have = data.len(),
            expected, "block payload truncated, zero-padding"
        );
        let mut buf = vec![0u8; expected];
        buf[..data.len()].copy_from_slice(data);
        padded = buf;
        &padded
    } else {
        &data[..expected]
    };

    let mut rgba = vec![0u8; width * height * 4];
    let mut decoded = [0u8; 4 * 4 * 4];
    let row_pitch = width * 4;

    for block_y in 0..blocks_y {
        for block_x in 0..blocks_x {
            let offset = (block_y * blocks_x + block_x) * block_bytes;
            let block = &blocks[offset..offset + block_bytes];
            decoded.fill(0);
            decoder(block, &mut decoded[..4 * 4 * pixel_bytes], 4 * pixel_bytes);

            for row in 0..4 {
                let dest_y = block_y * 4 + row;
                if dest_y >= height {
                    continue;
                }
                let dest_x = block_x * 4;
                if dest_x >= width {
                    continue;
                }

                let pixels_in_row = (width - dest_x).min(4);
                let dest_start = dest_y * row_pitch + dest_x * 4;
                for px in 0..pixels_in_row {
                    let src = (row * 4 + px) * pixel_bytes;
                    let dst = dest_start + px * 4;
                    match pixel_bytes {
                        1 => {
                            let v = decoded[src];
                            rgba[dst..dst + 4].copy_from_slice(&[v, v, v, 255]);
                        }
                        2 => {
                            rgba[dst..dst + 4]
                                .copy_from_slice(&[decoded[src], decoded[src + 1], 0, 255]);
                        }
                        _ => {
                            rgba[dst..dst + 4].copy_from_slice(&decoded[src..src + 4]);
                        }
                    }
                }
            }
        }
    }

    Ok(RawImage {
        width: desc.width,
        height: desc.height,
        data: rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DXT1_SAMPLE: [u8; 8] = [139, 37, 139, 37, 0, 0, 0, 0];
    const BC7_SAMPLE: [u8; 16] = [
        32, 145, 72, 54, 219, 106, 253, 255, 175, 170, 170, 170, 86, 85, 85, 85,
    ];
    const DXT_EXPECTED_PIXEL: [u8; 4] = [33, 178, 90, 255];
    const BC7_EXPECTED_PIXEL: [u8; 4] = [34, 179, 90, 255];

    fn descriptor(width: u32, height: u32, format: TextureFormat) -> TextureDescriptor {
        TextureDescriptor {
            width,
            height,
            format,
            mip_levels: 1,
        }
    }

    #[test]
    fn test_bc1_block_decodes_to_expected_pixels() {
        let desc = descriptor(4, 4, TextureFormat::Bc1Unorm);
        let image = decompress_blocks(&desc, &DXT1_SAMPLE).expect("decode bc1");
        assert_eq!(image.data.len(), 4 * 4 * 4);
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, DXT_EXPECTED_PIXEL);
        }
    }

    #[test]
    fn test_bc7_block_decodes_to_expected_pixels() {
        let desc = descriptor(4, 4, TextureFormat::Bc7Unorm);
        let image = decompress_blocks(&desc, &BC7_SAMPLE).expect("decode bc7");
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, BC7_EXPECTED_PIXEL);
        }
    }

    #[test]
    fn test_bc4_expands_to_grayscale() {
        let desc = descriptor(4, 4, TextureFormat::Bc4Unorm);
        // red0 = red1 = 255, all indices select red0.
        let block = [255, 255, 0, 0, 0, 0, 0, 0];
        let image = decompress_blocks(&desc, &block).expect("decode bc4");
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_bc5_expands_to_red_green() {
        let desc = descriptor(4, 4, TextureFormat::Bc5Unorm);
        let block = [255, 255, 0, 0, 0, 0, 0, 0, 128, 128, 0, 0, 0, 0, 0, 0];
        let image = decompress_blocks(&desc, &block).expect("decode bc5");
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, [255, 128, 0, 255]);
        }
    }

    #[test]
    fn test_non_block_aligned_dimensions_are_clipped() {
        let desc = descriptor(5, 3, TextureFormat::Bc1Unorm);
        // 2x1 blocks.
        let mut data = Vec::new();
        data.extend_from_slice(&DXT1_SAMPLE);
        data.extend_from_slice(&DXT1_SAMPLE);
        let image = decompress_blocks(&desc, &data).expect("decode");
        assert_eq!(image.data.len(), 5 * 3 * 4);
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, DXT_EXPECTED_PIXEL);
        }
    }

    #[test]
    fn test_truncated_payload_is_zero_padded() {
        let desc = descriptor(8, 4, TextureFormat::Bc1Unorm);
        // Only one of the two expected blocks present.
        let image = decompress_blocks(&desc, &DXT1_SAMPLE).expect("decode truncated");
        assert_eq!(image.data.len(), 8 * 4 * 4);
        for pixel in image.data[..4 * 4].chunks_exact(4) {
            assert_eq!(pixel, DXT_EXPECTED_PIXEL);
        }
    }

    #[test]
    fn test_oversized_payload_is_ignored_past_expected_size() {
        let desc = descriptor(4, 4, TextureFormat::Bc1Unorm);
        let mut data = DXT1_SAMPLE.to_vec();
        data.extend_from_slice(&[0xFF; 64]);
        let image = decompress_blocks(&desc, &data).expect("decode oversized");
        for pixel in image.data.chunks_exact(4) {
            assert_eq!(pixel, DXT_EXPECTED_PIXEL);
        }
    }

    #[test]
    fn test_unknown_block_format_is_rejected() {
        let desc = descriptor(4, 4, TextureFormat::Bc2Unorm);
        assert!(matches!(
            decompress_blocks(&desc, &[0u8; 16]),
            Err(ExportError::UnsupportedBlockFormat(TextureFormat::Bc2Unorm))
        ));

        let desc = descriptor(4, 4, TextureFormat::Bc6hUfloat);
        assert!(decompress_blocks(&desc, &[0u8; 16]).is_err());
    }
}
