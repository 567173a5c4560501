//! Tether-demo binary: show a reference, shoot, show the developed shot.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tether_demo::config::{DEFAULT_CAPTURE_FILE, DEFAULT_WINDOW_TITLE};
use tether_demo::{
    AnyDecoder, CameraDevice, DecoderKind, Demo, DemoConfig, DemoError, DisplayError,
    DisplaySize, GPhotoCamera, MinifbViewer,
};

#[derive(Debug, Parser)]
#[command(
    name = "tether-demo",
    version,
    about = "Tethered capture demo: reference image, capture, developed raw"
)]
struct Args {
    /// Reference images, shown in order (default: colorbars.png and
    /// checkerboard.png from --resources)
    #[arg(value_name = "IMAGE")]
    references: Vec<PathBuf>,
    /// Directory holding the default reference images
    #[arg(long, value_name = "DIR", default_value = "resources")]
    resources: PathBuf,
    /// Local file each capture is written to (overwritten every shot)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CAPTURE_FILE)]
    capture_file: PathBuf,
    /// Window title
    #[arg(long, default_value = DEFAULT_WINDOW_TITLE)]
    title: String,
    /// Display width images are scaled to
    #[arg(long, default_value_t = DisplaySize::default().width)]
    width: u32,
    /// Display height images are scaled to
    #[arg(long, default_value_t = DisplaySize::default().height)]
    height: u32,
    /// How captured files are decoded
    #[arg(long, value_enum, default_value_t = DecoderKind::Auto)]
    decoder: DecoderKind,
}

impl Args {
    fn into_config(self) -> DemoConfig {
        let reference_images = if self.references.is_empty() {
            DemoConfig::default_references(&self.resources)
        } else {
            self.references
        };
        DemoConfig {
            reference_images,
            capture_file: self.capture_file,
            window_title: self.title,
            display_size: DisplaySize::new(self.width, self.height),
            decoder: self.decoder,
        }
    }
}

fn main() {
    // RUST_LOG controls level, default = info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DemoError> {
    let config = Args::parse().into_config();

    let camera = GPhotoCamera::open()?;
    info!(model = %camera.info().model, port = %camera.info().port, "camera opened");

    let decoder = AnyDecoder::from(config.decoder);
    let viewer = MinifbViewer::open(&config.window_title, config.display_size)?;

    let mut demo = Demo::new(camera, decoder, viewer, config);
    match demo.run() {
        Ok(summary) => {
            info!(
                completed = summary.completed,
                failed = summary.failed,
                "done"
            );
            Ok(())
        }
        Err(DemoError::Display(DisplayError::Closed)) => {
            info!("window closed, exiting");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
