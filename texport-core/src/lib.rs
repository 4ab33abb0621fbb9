//! # Texport Core
//!
//! GPU texture export pipeline: synchronous readback of device textures
//! into CPU memory, normalization of heterogeneous pixel encodings into
//! canonical 8-bit RGBA, and encoding into raster images (PNG/JPEG/TGA/BMP)
//! or universal compressed-texture containers (basis/KTX2).
//!
//! ## Architecture
//!
//! The pipeline is a straight line of small modules:
//!
//! - [`readback`] copies a texture through a staging resource behind the
//!   narrow [`readback::ReadbackSource`] trait and strips device row
//!   padding, so any copy-and-map provider (device API, software renderer,
//!   test mock) can drive it.
//! - [`normalize`] rewrites packed-integer, float and half-float encodings
//!   to canonical RGBA in place.
//! - [`decompress`] decodes block-compressed payloads (BC1/3/4/5/7) to raw
//!   RGBA.
//! - [`encode`] dispatches on the destination extension to the raster
//!   encoders or the basis/KTX2 compressor.
//! - [`export`] sequences the above and hands the bytes to the filesystem.
//!
//! Everything runs synchronously on the calling thread; the universal
//! compressor's internal job pool is the only parallel region and it never
//! outlives one call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use texport_core::{PixelBuffer, TextureDescriptor, TextureFormat};
//!
//! let desc = TextureDescriptor {
//!     width: 2,
//!     height: 1,
//!     format: TextureFormat::Rgba8Unorm,
//!     mip_levels: 1,
//! };
//! let pixels = PixelBuffer {
//!     data: vec![0; 8],
//!     row_stride: 8,
//!     width: 2,
//! };
//! texport_core::save_pixels_to_file(&desc, pixels, "out.png")?;
//! # Ok::<(), texport_core::ExportError>(())
//! ```

pub mod decompress;
pub mod encode;
pub mod error;
pub mod export;
pub mod normalize;
pub mod readback;
pub mod texture;

// Re-export commonly used types
pub use decompress::RawImage;
pub use encode::{initialize_encoder, CompressorConfig, RasterFormat, UniversalContainer};
pub use error::ExportError;
pub use export::{
    encode_pixels, encode_texture, read_texture_pixels, save_pixels_to_file,
    save_texture_to_file,
};
pub use readback::{ReadbackSource, StagingCopy};
pub use texture::{PixelBuffer, TextureDescriptor, TextureFormat};

use tracing::info;

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with structured logging
pub fn init() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("texport_core=info,texport_cli=info")
        .with_target(false)
        .try_init();

    info!("Initializing texport-core v{}", VERSION);

    Ok(())
}
