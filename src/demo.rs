//! The display loop: reference image, key, capture, decoded capture, key.

use std::path::{Path, PathBuf};

use image::{ImageError, RgbImage};
use thiserror::Error;
use tracing::{error, info};

use crate::capture::capture_image;
use crate::config::DemoConfig;
use crate::display::{load_reference, scale_to_display};
use crate::traits::{
    CameraDevice, CaptureError, DecodeError, DeviceError, DisplayError, RawDecoder, Viewer,
};

/// Anything that can stop a worklist item.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The camera could not be opened at startup.
    #[error("opening the camera failed: {0}")]
    Camera(#[from] DeviceError),
    /// Capturing or transferring the shot failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The captured file could not be developed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The reference image could not be loaded.
    #[error("cannot load reference {}: {source}", .path.display())]
    Reference {
        /// Reference image path.
        path: PathBuf,
        /// Underlying image error.
        #[source]
        source: ImageError,
    },
    /// The window failed or was closed.
    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl DemoError {
    /// Whether the run cannot continue with the next item.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Camera(_) | Self::Display(_))
    }
}

/// Outcome of a run over the worklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items whose reference and capture were both shown.
    pub completed: usize,
    /// Items skipped after a capture, decode or reference failure.
    pub failed: usize,
}

/// Where the loop is within one worklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The reference image is on screen.
    ShowReference,
    /// The decoded capture is on screen.
    ShowCapture,
}

/// Wires a camera, a decoder and a viewer into the demo loop.
pub struct Demo<C, D, V> {
    camera: C,
    decoder: D,
    viewer: V,
    config: DemoConfig,
}

impl<C, D, V> Demo<C, D, V>
where
    C: CameraDevice,
    D: RawDecoder,
    V: Viewer,
{
    /// Create a demo from its collaborators.
    pub const fn new(camera: C, decoder: D, viewer: V, config: DemoConfig) -> Self {
        Self {
            camera,
            decoder,
            viewer,
            config,
        }
    }

    /// Visit every configured reference image in order.
    ///
    /// Item failures are logged and the loop moves on; a display failure
    /// (including the window being closed) ends the run.
    pub fn run(&mut self) -> Result<RunSummary, DemoError> {
        let mut summary = RunSummary::default();
        let worklist = self.config.reference_images.clone();

        for (index, reference) in worklist.iter().enumerate() {
            info!(item = index + 1, of = worklist.len(), reference = %reference.display(), "next item");
            match self.run_item(reference) {
                Ok(()) => summary.completed += 1,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    error!(reference = %reference.display(), error = %err, "skipping item");
                    summary.failed += 1;
                }
            }
        }

        info!(
            completed = summary.completed,
            failed = summary.failed,
            "worklist finished"
        );
        Ok(summary)
    }

    fn run_item(&mut self, reference: &Path) -> Result<(), DemoError> {
        let image = load_reference(reference).map_err(|source| DemoError::Reference {
            path: reference.to_path_buf(),
            source,
        })?;
        self.present(Stage::ShowReference, &image)?;

        let captured = capture_image(&mut self.camera, &self.config.capture_file)?;
        let image = self.decoder.decode(&captured)?;
        self.present(Stage::ShowCapture, &image)
    }

    fn present(&mut self, stage: Stage, image: &RgbImage) -> Result<(), DemoError> {
        let scaled = scale_to_display(image, self.config.display_size);
        self.viewer.show(&scaled)?;
        info!(?stage, "waiting for a key press");
        self.viewer.wait_for_key()?;
        Ok(())
    }

    /// Give back the collaborators.
    pub fn into_parts(self) -> (C, D, V) {
        (self.camera, self.decoder, self.viewer)
    }
}
