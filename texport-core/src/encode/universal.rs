//! Universal compressed-texture output through the basis encoder.

use std::sync::Once;
use std::thread;

use basis_universal::{BasisTextureFormat, ColorSpace, Compressor, CompressorParams};
use tracing::{debug, info};

use crate::decompress::RawImage;
use crate::error::ExportError;

/// Upper bound of the ETC1S quality range.
const QUALITY_MAX: u32 = 255;
/// Default effort preset of the backend encoder.
const COMPRESSION_LEVEL_DEFAULT: u32 = 2;

/// Destination container for universal compressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversalContainer {
    Basis,
    Ktx2,
}

/// Per-call compressor settings. Built fresh for each export; nothing here
/// is persisted across calls.
#[derive(Debug, Clone)]
pub struct CompressorConfig {
    pub container: UniversalContainer,
    pub quality_level: u32,
    pub compression_level: u32,
    pub generate_mipmaps: bool,
    pub multithreading: bool,
    pub thread_count: u32,
}

impl CompressorConfig {
    /// Settings used by the export path: maximum quality, default effort
    /// preset, mip generation on, one worker per detected hardware thread.
    pub fn for_container(container: UniversalContainer) -> Self {
        Self {
            container,
            quality_level: QUALITY_MAX,
            compression_level: COMPRESSION_LEVEL_DEFAULT,
            generate_mipmaps: true,
            multithreading: true,
            thread_count: available_threads(),
        }
    }
}

fn available_threads() -> u32 {
    thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
        .max(1)
}

static ENCODER_TABLES: Once = Once::new();

/// Publish the process-wide encoder tables.
///
/// Must happen before the first compression. Subsequent calls are no-ops;
/// the tables are read-only afterwards, so any number of concurrent export
/// calls can share them without further synchronization.
pub fn initialize_encoder() {
    ENCODER_TABLES.call_once(basis_universal::encoder_init);
}

/// Compress a canonical RGBA image into the configured container.
///
/// The worker pool lives for the duration of this call only; all workers
/// are joined before it returns. Initialization and processing failures are
/// reported to the caller, which may fall back to a raster format.
pub fn compress(image: &RawImage, config: &CompressorConfig) -> Result<Vec<u8>, ExportError> {
    initialize_encoder();

    let mut params = CompressorParams::new();
    params.set_basis_format(BasisTextureFormat::ETC1S);
    params.set_etc1s_quality_level(config.quality_level);
    params.set_generate_mipmaps(config.generate_mipmaps);
    params.set_color_space(ColorSpace::Srgb);
    params.set_print_status_to_stdout(false);
    params.set_create_ktx2_file(matches!(config.container, UniversalContainer::Ktx2));
    if config.compression_level != COMPRESSION_LEVEL_DEFAULT {
        debug!(
            level = config.compression_level,
            "backend pins its default compression preset"
        );
    }

    let mut source = params.source_image_mut(0);
    source.init(&image.data, image.width, image.height, 4);

    let threads = if config.multithreading {
        config.thread_count.max(1)
    } else {
        1
    };
    debug!(threads, container = ?config.container, "compressing with basis job pool");

    let mut compressor = Compressor::new(threads);
    unsafe {
        if !compressor.init(&params) {
            return Err(ExportError::CompressorInit);
        }
        compressor
            .process()
            .map_err(|code| ExportError::CompressorProcess(format!("{code:?}")))?;
    }

    let output = match config.container {
        UniversalContainer::Basis => compressor.basis_file().to_vec(),
        UniversalContainer::Ktx2 => compressor.ktx2_file().to_vec(),
    };
    info!(
        bytes = output.len(),
        container = ?config.container,
        "universal compression finished"
    );
    Ok(output)
}
