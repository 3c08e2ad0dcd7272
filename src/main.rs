use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use clap::{Parser, Subcommand};
use printfit::analysis::BoundsDetector;
use printfit::session::{ArtworkSource, EditingSession, decode_artwork};
use printfit::settings::EngineSettings;
use printfit::types::PrintLocation;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "printfit", version, about = "Place artwork inside a garment print area")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Auto-crop and place an image, printing the initial placement as JSON
    Place {
        image: PathBuf,

        #[arg(long, default_value_t = PrintLocation::Front)]
        location: PrintLocation,

        /// Garment mockup drawn behind the artwork
        #[arg(long)]
        backdrop: Option<PathBuf>,

        /// Write a PNG snapshot of the canvas
        #[arg(long)]
        capture: Option<PathBuf>,
    },
    /// Print the detected content bounds of an image as JSON
    Bounds { image: PathBuf },
}

fn main() -> Result<()> {
    printfit::init_logging();
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().or_else(EngineSettings::default_path);
    let settings = EngineSettings::load_or_default(settings_path.as_deref())
        .context("Failed to load settings")?;
    settings.validate().context("Invalid settings")?;

    match cli.command {
        Command::Place { image, location, backdrop, capture } => {
            place(settings, &image, location, backdrop.as_deref(), capture.as_deref())
        }
        Command::Bounds { image } => bounds(&settings, &image),
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn place(
    settings: EngineSettings,
    path: &Path,
    location: PrintLocation,
    backdrop: Option<&Path>,
    capture: Option<&Path>,
) -> Result<()> {
    let source = ArtworkSource::Upload {
        file_name: path.display().to_string(),
        bytes: read_image(path)?,
    };

    let mut session = EditingSession::new(settings);
    session.set_active_location(location);
    let Some(transform) = session.load_artwork(location, &source)?.transform else {
        bail!("{} could not be placed", path.display());
    };

    let ctx = session.context(location);
    let report = json!({
        "location": location,
        "printArea": ctx.print_area(),
        "imageSize": ctx.displayed_size(),
        "contentBounds": ctx.content_bounds(),
        "transform": transform,
        "dimensions": ctx.dimensions(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(out) = capture {
        let canvas = &session.settings().canvas;
        let backdrop = match backdrop {
            Some(path) => image::open(path)
                .with_context(|| format!("Failed to open backdrop {}", path.display()))?
                .to_rgba8(),
            None => image::RgbaImage::from_pixel(canvas.width, canvas.height, image::Rgba([255, 255, 255, 255])),
        };
        session.set_backdrop(Some(backdrop));
        for _ in 0..session.settings().canvas.settle_frames {
            session.frame_rendered();
        }

        let url = session.capture_canvas().context("Canvas not ready for capture")?;
        let payload = url
            .strip_prefix("data:image/png;base64,")
            .context("Unexpected capture encoding")?;
        let png = BASE64.decode(payload).context("Capture is not valid base64")?;
        fs::write(out, png).with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "Canvas captured");
    }
    Ok(())
}

fn bounds(settings: &EngineSettings, path: &Path) -> Result<()> {
    let hint = path.to_str();
    let decoded = decode_artwork(&read_image(path)?, hint)?;
    let detector = BoundsDetector::from(&settings.bounds);
    let found = detector.detect(&decoded.image)?;

    let report = json!({
        "imageSize": [decoded.image.width(), decoded.image.height()],
        "contentBounds": found,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
