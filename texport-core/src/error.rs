use crate::texture::TextureFormat;
use thiserror::Error;

/// Errors surfaced by the export pipeline.
///
/// The first three variants are precondition violations: they indicate a
/// caller or configuration bug (a texture format nothing here knows how to
/// convert, or a device that handed back no mapping) and abort the current
/// export. The remaining variants are runtime failures the caller may
/// recover from, for example by retrying with a different destination
/// format. No path in this crate retries internally.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no conversion rule for source pixel format {0:?}")]
    UnsupportedFormat(TextureFormat),

    #[error("no decoder for block-compressed format {0:?}")]
    UnsupportedBlockFormat(TextureFormat),

    #[error("staging texture mapping returned no data")]
    MappingFailed,

    #[error("unrecognized destination extension: {0}")]
    UnrecognizedExtension(String),

    #[error("compressor initialization failed")]
    CompressorInit,

    #[error("compression failed: {0}")]
    CompressorProcess(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
