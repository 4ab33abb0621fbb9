//! Export orchestration: readback, normalization, encoding, file write.

use std::path::Path;

use tracing::info;

use crate::decompress::{self, RawImage};
use crate::encode;
use crate::error::ExportError;
use crate::normalize;
use crate::readback::{self, ReadbackSource};
use crate::texture::{PixelBuffer, TextureDescriptor};

/// Capture every mip-0 pixel of a live texture into CPU memory.
pub fn read_texture_pixels(source: &dyn ReadbackSource) -> Result<PixelBuffer, ExportError> {
    readback::read_texture(source)
}

/// Convert captured pixels into an encoded image file in memory.
///
/// Both orchestrator entry points funnel through here, so behavior from
/// normalization onward is identical whether the pixels came from a live
/// readback or an earlier capture. Block-compressed sources are decoded to
/// raw RGBA first; every destination encoder consumes raw pixels.
pub fn encode_pixels(
    desc: &TextureDescriptor,
    mut pixels: PixelBuffer,
    extension: &str,
) -> Result<Vec<u8>, ExportError> {
    let image = if desc.format.is_block_compressed() {
        decompress::decompress_blocks(desc, &pixels.data)?
    } else {
        normalize::normalize_in_place(desc, &mut pixels)?;
        RawImage {
            width: desc.width,
            height: desc.height,
            data: pixels.data,
        }
    };
    encode::encode(&image, extension)
}

/// Read back a live texture and encode it in memory; the caller keeps the
/// bytes.
pub fn encode_texture(
    source: &dyn ReadbackSource,
    extension: &str,
) -> Result<Vec<u8>, ExportError> {
    let desc = source.descriptor();
    let pixels = read_texture_pixels(source)?;
    encode_pixels(&desc, pixels, extension)
}

/// Read back a live texture and write it to `path`; the file extension
/// selects the encoder.
pub fn save_texture_to_file(
    source: &dyn ReadbackSource,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let desc = source.descriptor();
    let pixels = read_texture_pixels(source)?;
    save_pixels_to_file(&desc, pixels, path)
}

/// Write previously captured pixels to `path`; the file extension selects
/// the encoder. The file-write result propagates verbatim.
pub fn save_pixels_to_file(
    desc: &TextureDescriptor,
    pixels: PixelBuffer,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let encoded = encode_pixels(desc, pixels, extension)?;
    std::fs::write(path, &encoded)?;
    info!(path = %path.display(), bytes = encoded.len(), "texture exported");
    Ok(())
}
