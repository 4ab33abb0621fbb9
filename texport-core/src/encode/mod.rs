//! Encoding of canonical RGBA pixels into destination file formats.
//!
//! The dispatcher keys on the destination extension, case-insensitively:
//! `basis` and `ktx2` select the universal compressor, everything else goes
//! to the raster encoders (which accept `jpg`/`jpeg`, `png`, `tga`, `bmp`
//! and report failure for anything unknown).

pub mod raster;
pub mod universal;

pub use raster::RasterFormat;
pub use universal::{initialize_encoder, CompressorConfig, UniversalContainer};

use crate::decompress::RawImage;
use crate::error::ExportError;

/// Encode `image` for the destination selected by `extension`.
pub fn encode(image: &RawImage, extension: &str) -> Result<Vec<u8>, ExportError> {
    if extension.eq_ignore_ascii_case("basis") {
        universal::compress(
            image,
            &CompressorConfig::for_container(UniversalContainer::Basis),
        )
    } else if extension.eq_ignore_ascii_case("ktx2") {
        universal::compress(
            image,
            &CompressorConfig::for_container(UniversalContainer::Ktx2),
        )
    } else {
        raster::encode(image, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_image() -> RawImage {
        let mut data = Vec::new();
        for _ in 0..4 * 4 {
            data.extend_from_slice(&[255, 0, 0, 255]);
        }
        RawImage {
            width: 4,
            height: 4,
            data,
        }
    }

    #[test]
    fn test_unrecognized_extension_is_reported() {
        let image = red_image();
        assert!(matches!(
            encode(&image, "xyz"),
            Err(ExportError::UnrecognizedExtension(_))
        ));
    }

    #[test]
    fn test_extension_case_does_not_change_output() {
        let image = red_image();
        let lower = encode(&image, "png").expect("png");
        let upper = encode(&image, "PNG").expect("PNG");
        let mixed = encode(&image, "Png").expect("Png");
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
    }
}
