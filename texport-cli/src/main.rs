use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};

use texport_core::{PixelBuffer, TextureDescriptor, TextureFormat};

/// Texport CLI - convert captured GPU pixel data and images between formats
#[derive(Parser)]
#[command(
    name = "texport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert GPU pixel dumps and images to raster or universal compressed formats",
    long_about = None,
    arg_required_else_help = true
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an input image or raw pixel dump to another format
    Convert(ConvertCommand),

    /// List supported source pixel formats and destination extensions
    Formats,
}

#[derive(Args)]
struct ConvertCommand {
    /// Input file (an image, or a raw pixel dump with --raw)
    input: PathBuf,

    /// Output file; the extension selects the encoder
    /// (jpg/jpeg, png, tga, bmp, basis, ktx2)
    output: PathBuf,

    /// Treat the input as a raw GPU pixel dump
    #[arg(long)]
    raw: bool,

    /// Pixel width of the raw dump
    #[arg(long, requires = "raw")]
    width: Option<u32>,

    /// Pixel height of the raw dump
    #[arg(long, requires = "raw")]
    height: Option<u32>,

    /// Pixel format of the raw dump
    #[arg(long, value_enum, default_value = "rgba8", requires = "raw")]
    format: PixelFormatArg,

    /// Write a JSON metadata sidecar next to the output
    #[arg(long)]
    metadata: bool,
}

/// Source pixel formats accepted for raw dumps
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PixelFormatArg {
    Rgba8,
    Rgb10a2,
    Rgba32f,
    Rgba16f,
    Rg11b10f,
    Bc1,
    Bc3,
    Bc4,
    Bc5,
    Bc7,
}

impl From<PixelFormatArg> for TextureFormat {
    fn from(arg: PixelFormatArg) -> Self {
        match arg {
            PixelFormatArg::Rgba8 => TextureFormat::Rgba8Unorm,
            PixelFormatArg::Rgb10a2 => TextureFormat::Rgb10a2Unorm,
            PixelFormatArg::Rgba32f => TextureFormat::Rgba32Float,
            PixelFormatArg::Rgba16f => TextureFormat::Rgba16Float,
            PixelFormatArg::Rg11b10f => TextureFormat::Rg11b10Float,
            PixelFormatArg::Bc1 => TextureFormat::Bc1Unorm,
            PixelFormatArg::Bc3 => TextureFormat::Bc3Unorm,
            PixelFormatArg::Bc4 => TextureFormat::Bc4Unorm,
            PixelFormatArg::Bc5 => TextureFormat::Bc5Unorm,
            PixelFormatArg::Bc7 => TextureFormat::Bc7Unorm,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Convert(cmd) => run_convert(cmd),
        Commands::Formats => {
            print_formats();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "texport_core=debug,texport_cli=debug"
    } else {
        "texport_core=warn,texport_cli=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn run_convert(cmd: &ConvertCommand) -> Result<()> {
    let (desc, pixels) = if cmd.raw {
        load_raw_dump(cmd)?
    } else {
        load_image_file(&cmd.input)?
    };

    let input_bytes = pixels.data.len();
    texport_core::save_pixels_to_file(&desc, pixels, &cmd.output)
        .with_context(|| format!("Failed to export {}", cmd.output.display()))?;

    if cmd.metadata {
        write_sidecar(&cmd.output, &desc, input_bytes)?;
    }

    println!(
        "{} {} -> {}",
        "converted".green().bold(),
        cmd.input.display(),
        cmd.output.display()
    );
    Ok(())
}

fn load_raw_dump(cmd: &ConvertCommand) -> Result<(TextureDescriptor, PixelBuffer)> {
    let width = cmd.width.context("--raw requires --width")?;
    let height = cmd.height.context("--raw requires --height")?;
    let format = TextureFormat::from(cmd.format);

    let data = std::fs::read(&cmd.input)
        .with_context(|| format!("Failed to read {}", cmd.input.display()))?;

    let desc = TextureDescriptor {
        width,
        height,
        format,
        mip_levels: 1,
    };
    let needed = desc.logical_row_size() * desc.logical_height() as usize;
    if data.len() < needed {
        bail!(
            "{} holds {} bytes but a {}x{} {:?} dump needs {}",
            cmd.input.display(),
            data.len(),
            width,
            height,
            format,
            needed
        );
    }

    let row_stride = desc.logical_row_size();
    let logical_width = desc.logical_width();
    Ok((
        desc,
        PixelBuffer {
            data,
            row_stride,
            width: logical_width,
        },
    ))
}

fn load_image_file(input: &Path) -> Result<(TextureDescriptor, PixelBuffer)> {
    let image = image::open(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let desc = TextureDescriptor {
        width,
        height,
        format: TextureFormat::Rgba8Unorm,
        mip_levels: 1,
    };
    Ok((
        desc,
        PixelBuffer {
            data: image.into_raw(),
            row_stride: width as usize * 4,
            width,
        },
    ))
}

fn write_sidecar(output: &Path, desc: &TextureDescriptor, input_bytes: usize) -> Result<()> {
    let written = std::fs::metadata(output)?.len();
    let sidecar = serde_json::json!({
        "source": {
            "width": desc.width,
            "height": desc.height,
            "format": format!("{:?}", desc.format),
            "bytes": input_bytes,
        },
        "output": {
            "path": output.file_name().and_then(|n| n.to_str()),
            "bytes": written,
        },
        "generator": format!("texport v{}", env!("CARGO_PKG_VERSION")),
    });

    let mut path = output.to_path_buf();
    path.as_mut_os_string().push(".json");
    std::fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("Failed to write sidecar {}", path.display()))?;
    Ok(())
}

fn print_formats() {
    println!("{}", "source pixel formats (--format):".bold());
    for format in [
        "rgba8", "rgb10a2", "rgba32f", "rgba16f", "rg11b10f", "bc1", "bc3", "bc4", "bc5", "bc7",
    ] {
        println!("  {format}");
    }
    println!();
    println!("{}", "destination extensions:".bold());
    println!("  jpg/jpeg, png, tga, bmp  (raster)");
    println!("  basis, ktx2              (universal compressed)");
}
