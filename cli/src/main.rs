use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, debug};
use qr_matrix::render;
use qr_matrix::{
    ByteSegment, EncodeOptions, EncodedQr, ErrorCorrectionLevel, QrCode, TextEncoding,
};

/// Codewords printed per line by `codewords`.
const CODEWORDS_PER_LINE: usize = 16;

#[derive(Parser)]
#[command(name = "qr-matrix")]
#[command(version, about = "Encode text as a QR code module matrix", long_about = None)]
struct Cli {
    /// Log encoder decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SymbolArgs {
    /// Text to encode
    text: String,
    /// Error correction level: L, M, Q or H (default: M)
    #[arg(short, long)]
    ec_level: Option<ErrorCorrectionLevel>,
    /// Encode the text as UTF-8 instead of one byte per UTF-16 code unit
    #[arg(long)]
    utf8: bool,
    /// JSON options file (errorCorrection, targetPixelSize, textEncoding)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Two characters per module
    Ascii,
    /// Half blocks, two rows per line
    Compact,
    /// SVG document sized to the target pixel size
    Svg,
    /// Module matrix as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text and print or save the symbol
    Encode {
        #[command(flatten)]
        symbol: SymbolArgs,
        /// Target size in pixels (default: 120)
        #[arg(short, long)]
        size: Option<u32>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
        format: OutputFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite the output file if it exists
        #[arg(long, requires = "output")]
        force: bool,
    },
    /// Show version, mask and penalty breakdown
    Info {
        #[command(flatten)]
        symbol: SymbolArgs,
    },
    /// Print the interleaved codeword stream as hex
    Codewords {
        #[command(flatten)]
        symbol: SymbolArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode {
            symbol,
            size,
            format,
            output,
            force,
        } => encode(&symbol, size, format, output.as_deref(), force),
        Commands::Info { symbol } => show_info(&symbol),
        Commands::Codewords { symbol } => show_codewords(&symbol),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Options from the config file, if any, with command-line flags on top.
fn load_options(symbol: &SymbolArgs, size: Option<u32>) -> Result<EncodeOptions> {
    let mut options = match &symbol.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid config file '{}'", path.display()))?
        }
        None => EncodeOptions::default(),
    };

    if let Some(ecl) = symbol.ec_level {
        options.error_correction = ecl;
    }
    if let Some(size) = size {
        options.target_pixel_size = size;
    }
    if symbol.utf8 {
        options.text_encoding = TextEncoding::Utf8;
    }

    debug!("encoder options: {:?}", options);
    Ok(options)
}

fn build_code(text: &str, options: &EncodeOptions) -> Result<QrCode> {
    let segment: ByteSegment = options.text_encoding.segment(text);
    QrCode::from_segment(&segment, options.error_correction).with_context(|| {
        format!(
            "Failed to encode {} bytes at level {}",
            segment.len(),
            options.error_correction
        )
    })
}

fn render_code(code: &QrCode, options: &EncodeOptions, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Ascii => render::to_ascii(code),
        OutputFormat::Compact => render::to_ascii_compact(code),
        OutputFormat::Svg => {
            render::to_svg(&EncodedQr::from_code(code, options.target_pixel_size))
        }
        OutputFormat::Json => {
            let encoded = EncodedQr::from_code(code, options.target_pixel_size);
            serde_json::to_string_pretty(&encoded)?
        }
    };
    Ok(rendered)
}

fn encode(
    symbol: &SymbolArgs,
    size: Option<u32>,
    format: OutputFormat,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let options = load_options(symbol, size)?;
    let code = build_code(&symbol.text, &options)?;
    let rendered = render_code(&code, &options, format)?;

    match output {
        Some(path) => {
            if path.exists() && !force {
                bail!(
                    "Output file '{}' already exists. Use --force to overwrite it.",
                    path.display()
                );
            }
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            println!(
                "Version {} ({}x{}) written to {}",
                code.version(),
                code.size(),
                code.size(),
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn show_info(symbol: &SymbolArgs) -> Result<()> {
    let options = load_options(symbol, None)?;
    let code = build_code(&symbol.text, &options)?;
    let version = code.version();
    let ecl = code.error_correction();
    let penalty = code.penalty();
    let encoded = EncodedQr::from_code(&code, options.target_pixel_size);

    println!("============================================================");
    println!("           QR SYMBOL");
    println!("============================================================");
    println!();
    println!("  Version:           {}", version);
    println!("  Size:              {}x{} modules", code.size(), code.size());
    println!("  Error correction:  {}", ecl);
    println!("  Mask:              {}", code.mask());
    println!(
        "  Codewords:         {} data + {} EC",
        version.data_codewords(ecl),
        version.total_codewords(ecl) - version.data_codewords(ecl)
    );
    println!(
        "  Cell size:         {} px ({} px total)",
        encoded.cell_size_pixels,
        encoded.rendered_size()
    );
    println!();
    println!("------------------------------------------------------------");
    println!("PENALTY");
    println!("------------------------------------------------------------");
    println!();
    println!("  Adjacent modules:  {}", penalty.adjacent);
    println!("  2x2 blocks:        {}", penalty.blocks);
    println!("  Finder-like runs:  {}", penalty.finder_like);
    println!("  Dark balance:      {:.2}", penalty.balance);
    println!("  Total:             {:.2}", penalty.total());
    println!();

    Ok(())
}

fn format_codewords(codewords: &[u8]) -> String {
    codewords
        .chunks(CODEWORDS_PER_LINE)
        .map(|line| {
            line.iter()
                .map(|byte| hex::encode([*byte]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn show_codewords(symbol: &SymbolArgs) -> Result<()> {
    let options = load_options(symbol, None)?;
    let code = build_code(&symbol.text, &options)?;
    println!("{}", format_codewords(code.codewords()));
    Ok(())
}
