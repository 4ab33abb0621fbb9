use serde::{Deserialize, Serialize};

/// GPU pixel formats understood by the export pipeline.
///
/// The set mirrors what a device descriptor can report, which is wider than
/// what the pipeline can convert: formats without a conversion rule are
/// rejected when they reach the normalizer or the block decompressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgb10a2Unorm,
    Rgba32Float,
    Rgba16Float,
    Rg11b10Float,
    R8Unorm,
    Rg8Unorm,
    Bc1Unorm,
    Bc2Unorm,
    Bc3Unorm,
    Bc4Unorm,
    Bc5Unorm,
    Bc6hUfloat,
    Bc7Unorm,
}

impl TextureFormat {
    /// Bytes per pixel, or per 4x4 block for block-compressed formats.
    pub fn stride(&self) -> usize {
        match self {
            Self::R8Unorm => 1,
            Self::Rg8Unorm => 2,
            Self::Rgba8Unorm | Self::Rgb10a2Unorm | Self::Rg11b10Float => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
            Self::Bc1Unorm | Self::Bc4Unorm => 8,
            Self::Bc2Unorm | Self::Bc3Unorm | Self::Bc5Unorm | Self::Bc6hUfloat
            | Self::Bc7Unorm => 16,
        }
    }

    /// Block edge length in pixels: 1 for uncompressed formats, 4 for BC.
    pub fn block_size(&self) -> u32 {
        if self.is_block_compressed() {
            4
        } else {
            1
        }
    }

    pub fn is_block_compressed(&self) -> bool {
        matches!(
            self,
            Self::Bc1Unorm
                | Self::Bc2Unorm
                | Self::Bc3Unorm
                | Self::Bc4Unorm
                | Self::Bc5Unorm
                | Self::Bc6hUfloat
                | Self::Bc7Unorm
        )
    }
}

/// Immutable description of a texture as captured from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
}

impl TextureDescriptor {
    /// Width in storage units: pixels, or blocks for compressed formats.
    pub fn logical_width(&self) -> u32 {
        self.width / self.format.block_size()
    }

    /// Height in storage units: pixels, or blocks for compressed formats.
    pub fn logical_height(&self) -> u32 {
        self.height / self.format.block_size()
    }

    /// Bytes in one tightly packed row of storage units.
    pub fn logical_row_size(&self) -> usize {
        self.logical_width() as usize * self.format.stride()
    }
}

/// CPU-side pixel storage together with the row layout actually used by
/// `data`.
///
/// Invariant: `data.len() >= row_stride * height` for the texture the buffer
/// was captured from. After normalization `row_stride` is `width * 4`
/// (canonical RGBA) unless the data is still block-compressed.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub data: Vec<u8>,
    /// Bytes per row as laid out in `data`.
    pub row_stride: usize,
    /// Logical row width in storage units (pixels, or blocks for BC data).
    pub width: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_and_block_size() {
        assert_eq!(TextureFormat::Rgba8Unorm.stride(), 4);
        assert_eq!(TextureFormat::Rgba32Float.stride(), 16);
        assert_eq!(TextureFormat::Bc1Unorm.stride(), 8);
        assert_eq!(TextureFormat::Bc7Unorm.stride(), 16);
        assert_eq!(TextureFormat::Rgba8Unorm.block_size(), 1);
        assert_eq!(TextureFormat::Bc3Unorm.block_size(), 4);
    }

    #[test]
    fn test_logical_dimensions_divide_by_block_size() {
        let desc = TextureDescriptor {
            width: 64,
            height: 32,
            format: TextureFormat::Bc1Unorm,
            mip_levels: 1,
        };
        assert_eq!(desc.logical_width(), 16);
        assert_eq!(desc.logical_height(), 8);
        assert_eq!(desc.logical_row_size(), 16 * 8);

        let desc = TextureDescriptor {
            width: 64,
            height: 32,
            format: TextureFormat::Rgba16Float,
            mip_levels: 1,
        };
        assert_eq!(desc.logical_width(), 64);
        assert_eq!(desc.logical_row_size(), 64 * 8);
    }
}
