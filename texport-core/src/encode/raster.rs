//! Raster encoders: PNG, JPEG, TGA and BMP from canonical RGBA.

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tga::TgaEncoder;
use image::{ColorType, ImageEncoder};

use crate::decompress::RawImage;
use crate::error::ExportError;

/// Baseline JPEG quality on the encoder's 0-100 scale.
const JPEG_QUALITY: u8 = 100;

/// Raster destination formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Tga,
    Bmp,
}

impl RasterFormat {
    /// Case-insensitive extension lookup; `jpg` and `jpeg` are synonyms.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tga" => Some(Self::Tga),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Encode canonical RGBA into the raster format named by `extension`,
/// appending into a growable buffer.
pub fn encode(image: &RawImage, extension: &str) -> Result<Vec<u8>, ExportError> {
    let format = RasterFormat::from_extension(extension)
        .ok_or_else(|| ExportError::UnrecognizedExtension(extension.to_string()))?;

    let mut out = Vec::new();
    match format {
        RasterFormat::Jpeg => {
            // Baseline JPEG carries no alpha channel.
            let mut rgb = Vec::with_capacity(image.width as usize * image.height as usize * 3);
            for pixel in image.data.chunks_exact(4) {
                rgb.extend_from_slice(&pixel[..3]);
            }
            JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY).write_image(
                &rgb,
                image.width,
                image.height,
                ColorType::Rgb8,
            )?;
        }
        RasterFormat::Png => {
            PngEncoder::new_with_quality(
                Cursor::new(&mut out),
                CompressionType::Default,
                FilterType::NoFilter,
            )
            .write_image(&image.data, image.width, image.height, ColorType::Rgba8)?;
        }
        RasterFormat::Tga => {
            TgaEncoder::new(Cursor::new(&mut out)).write_image(
                &image.data,
                image.width,
                image.height,
                ColorType::Rgba8,
            )?;
        }
        RasterFormat::Bmp => {
            let mut cursor = Cursor::new(&mut out);
            BmpEncoder::new(&mut cursor).write_image(
                &image.data,
                image.width,
                image.height,
                ColorType::Rgba8,
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RawImage {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[
                    (x * 255 / width.max(1)) as u8,
                    (y * 255 / height.max(1)) as u8,
                    128,
                    255,
                ]);
            }
        }
        RawImage {
            width,
            height,
            data,
        }
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let image = gradient_image(16, 8);
        let encoded = encode(&image, "png").expect("encode png");
        let decoded = image::load_from_memory(&encoded)
            .expect("decode png")
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.into_raw(), image.data);
    }

    #[test]
    fn test_jpg_round_trip_is_close() {
        let image = gradient_image(16, 16);
        let encoded = encode(&image, "jpg").expect("encode jpg");
        let decoded = image::load_from_memory(&encoded)
            .expect("decode jpg")
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16));
        for (expected, actual) in image.data.chunks_exact(4).zip(decoded.chunks(4)) {
            for channel in 0..3 {
                let diff = (expected[channel] as i16 - actual[channel] as i16).abs();
                assert!(diff <= 12, "channel off by {diff}");
            }
        }
    }

    #[test]
    fn test_jpeg_and_jpg_select_the_same_encoder() {
        let image = gradient_image(8, 8);
        assert_eq!(
            encode(&image, "jpg").expect("jpg"),
            encode(&image, "JPEG").expect("JPEG")
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let image = gradient_image(8, 8);
        for extension in ["png", "jpg", "tga", "bmp"] {
            let first = encode(&image, extension).expect(extension);
            let second = encode(&image, extension).expect(extension);
            assert_eq!(first, second, "{extension} output not byte-identical");
            assert!(!first.is_empty());
        }
    }

    #[test]
    fn test_unknown_extension_produces_no_bytes() {
        let image = gradient_image(4, 4);
        let result = encode(&image, "xyz");
        assert!(matches!(
            result,
            Err(ExportError::UnrecognizedExtension(ref ext)) if ext == "xyz"
        ));
    }
}
