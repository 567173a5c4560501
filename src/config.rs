//! Demo configuration.

use std::path::{Path, PathBuf};

use crate::decode::DecoderKind;
use crate::display::DisplaySize;

/// File name the capture is stored under locally, overwritten on every shot.
pub const DEFAULT_CAPTURE_FILE: &str = "foo.nef";

/// Title of the display window.
pub const DEFAULT_WINDOW_TITLE: &str = "Camera Demo";

/// Everything the demo loop needs to know besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Reference images, shown in this order.
    pub reference_images: Vec<PathBuf>,
    /// Local path the raw capture is written to.
    pub capture_file: PathBuf,
    /// Window title.
    pub window_title: String,
    /// Size every image is scaled to before it is shown.
    pub display_size: DisplaySize,
    /// How captured files are decoded.
    pub decoder: DecoderKind,
}

impl DemoConfig {
    /// The default reference images under `dir`: colour bars first, then the
    /// checkerboard.
    #[must_use]
    pub fn default_references(dir: &Path) -> Vec<PathBuf> {
        vec![dir.join("colorbars.png"), dir.join("checkerboard.png")]
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            reference_images: Self::default_references(Path::new("resources")),
            capture_file: PathBuf::from(DEFAULT_CAPTURE_FILE),
            window_title: DEFAULT_WINDOW_TITLE.to_owned(),
            display_size: DisplaySize::default(),
            decoder: DecoderKind::Auto,
        }
    }
}
