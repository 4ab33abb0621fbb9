//! Synchronous GPU-to-CPU texture readback with row-pitch correction.

use tracing::{debug, error};

use crate::error::ExportError;
use crate::texture::{PixelBuffer, TextureDescriptor};

/// One completed device copy: the mapped staging bytes plus the row pitch
/// the device laid them out with.
#[derive(Debug, Clone)]
pub struct StagingCopy {
    pub data: Vec<u8>,
    /// Byte stride between consecutive rows in `data`; may exceed the
    /// logical row size due to device alignment.
    pub row_pitch: usize,
}

/// Narrow contract over the GPU device: copy a texture into CPU-visible
/// staging memory and map it.
///
/// Implementations must allocate a single-mip staging resource matching the
/// source format and dimensions, transition the source to a copy state,
/// copy, and restore the original state within one submission, then block on
/// a full device flush before exposing the mapping. Every mapped row must
/// span the full `row_pitch`, with at least one logical row of bytes in the
/// final row. Anything providing this contract (a real device API, a
/// software rasterizer, a test mock) can drive the pipeline.
pub trait ReadbackSource {
    fn descriptor(&self) -> TextureDescriptor;

    /// Returns `None` when the mapped pointer is still null after the wait.
    /// The caller treats that as a device-level failure, not a retry
    /// condition.
    fn copy_and_map(&self) -> Option<StagingCopy>;
}

/// Read every mip-0 pixel of `source` into a tightly packed buffer.
///
/// This blocks the calling thread until the device copy completes. Device
/// row alignment may pad each mapped row past the logical row size; padded
/// rows are copied one by one so the padding never reaches the exported
/// image.
pub fn read_texture(source: &dyn ReadbackSource) -> Result<PixelBuffer, ExportError> {
    let desc = source.descriptor();
    let staging = match source.copy_and_map() {
        Some(staging) => staging,
        None => {
            error!("texture readback failed: staging mapping returned no data");
            return Err(ExportError::MappingFailed);
        }
    };

    let rows = desc.logical_height() as usize;
    let row_size = desc.logical_row_size();
    if rows == 0 || row_size == 0 {
        return Ok(PixelBuffer {
            data: Vec::new(),
            row_stride: row_size,
            width: desc.logical_width(),
        });
    }

    let mut data = vec![0u8; rows * row_size];
    if staging.row_pitch != row_size {
        debug!(
            row_pitch = staging.row_pitch,
            row_size, "discarding device row padding"
        );
        for (row, dst) in data.chunks_exact_mut(row_size).enumerate() {
            let start = row * staging.row_pitch;
            dst.copy_from_slice(&staging.data[start..start + row_size]);
        }
    } else {
        data.copy_from_slice(&staging.data[..rows * row_size]);
    }

    Ok(PixelBuffer {
        data,
        row_stride: row_size,
        width: desc.logical_width(),
    })
}
