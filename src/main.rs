use clap::Parser;
use cutpath::{CutpathConfig, Diagnostic, StrokeStyle};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cutpath", about = "Transparent image to offset cut-path SVG")]
struct Cli {
    /// Input image path (PNG with alpha; JPEG and BMP fall back to luminance)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Cut margin in pixels
    #[arg(long, default_value = "10")]
    offset: u32,

    /// Largest accepted offset (kernel cost grows with its square)
    #[arg(long, default_value = "500")]
    max_offset: u32,

    /// Smooth outlines into cubic curves (anything but "false" enables it)
    #[arg(long, default_value = "true", action = clap::ArgAction::Set, value_parser = parse_smooth)]
    smooth: bool,

    /// Occupancy threshold (0-255): alpha, or luminance without alpha, must exceed it
    #[arg(long, default_value = "0")]
    threshold: u8,

    /// Stroke color for cut paths
    #[arg(long, default_value = "red")]
    stroke: String,

    /// Stroke width in pixels
    #[arg(long, default_value = "1")]
    stroke_width: f64,

    /// Also render a PNG preview of the cut paths over the source
    #[arg(long)]
    preview: Option<PathBuf>,
}

fn parse_smooth(value: &str) -> Result<bool, String> {
    Ok(!value.eq_ignore_ascii_case("false"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.offset > cli.max_offset {
        return Err(format!(
            "offset {} exceeds --max-offset {}",
            cli.offset, cli.max_offset
        )
        .into());
    }

    let config = CutpathConfig {
        offset: cli.offset,
        smooth: cli.smooth,
        threshold: cli.threshold,
        stroke: StrokeStyle {
            color: cli.stroke,
            width: cli.stroke_width,
        },
    };

    // Header
    eprintln!();
    eprintln!("  cutpath \u{00b7} {}", cli.input.display());
    eprintln!();

    // Pipeline (lib prints step-by-step progress to stderr)
    let image = cutpath::load(&cli.input)?;
    let result = cutpath::generate_cutpath(&image, &config)?;

    for diagnostic in &result.diagnostics {
        match diagnostic {
            Diagnostic::EmptySilhouette => {
                eprintln!("  Note        nothing visible in the image; no cut paths written")
            }
            Diagnostic::DegenerateContourSkipped { index, points } => eprintln!(
                "  Note        contour {} has {} points, kept straight",
                index, points
            ),
        }
    }

    result.document.write_svg(&cli.output)?;

    if let Some(preview_path) = &cli.preview {
        cutpath::render::write_preview(&image, &result.document, preview_path)?;
        eprintln!("  Preview     {}", preview_path.display());
    }

    // Footer
    eprintln!();
    eprintln!("  \u{2713} {}", cli.output.display());
    eprintln!();

    Ok(())
}
