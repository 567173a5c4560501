//! Core traits and types for the capture, decode and display seams.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{ImageError, RgbImage};
use thiserror::Error;

/// Location of a capture on the camera's own storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Folder on the device, e.g. `/store_00010001/DCIM/100NIKON`.
    pub folder: String,
    /// File name inside `folder`.
    pub name: String,
}

impl CapturedImage {
    /// Create a reference to a file on device storage.
    #[must_use]
    pub fn new<F: Into<String>, N: Into<String>>(folder: F, name: N) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.folder.ends_with('/') {
            write!(f, "{}{}", self.folder, self.name)
        } else {
            write!(f, "{}/{}", self.folder, self.name)
        }
    }
}

/// Identity of an opened camera.
#[derive(Debug, Clone, Default)]
pub struct CameraInfo {
    /// Camera model as reported by the driver.
    pub model: String,
    /// Port the camera is attached to (e.g. `usb:001,004`).
    pub port: String,
}

/// The device operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePhase {
    /// Detecting and initialising the camera.
    Init,
    /// Triggering the exposure.
    Capture,
    /// Copying the capture off the device.
    Transfer,
    /// Removing the capture from device storage.
    Delete,
}

impl fmt::Display for DevicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Capture => "capture",
            Self::Transfer => "transfer",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A camera operation failed.
#[derive(Debug, Clone, Error)]
#[error("camera {phase} failed: {reason}")]
pub struct DeviceError {
    /// Which operation failed.
    pub phase: DevicePhase,
    /// Driver-provided reason.
    pub reason: String,
}

impl DeviceError {
    /// Create an error for the given phase.
    pub fn new<R: Into<String>>(phase: DevicePhase, reason: R) -> Self {
        Self {
            phase,
            reason: reason.into(),
        }
    }
}

/// Step of the LibRaw pipeline that reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Allocating the processor.
    Init,
    /// Parsing the raw container.
    Open,
    /// Unpacking sensor data.
    Unpack,
    /// Demosaic and colour processing.
    Process,
    /// Rendering the processed image to memory.
    MemImage,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Open => "open",
            Self::Unpack => "unpack",
            Self::Process => "process",
            Self::MemImage => "make_mem_image",
        };
        f.write_str(name)
    }
}

/// Decoding a raw file failed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The raw file could not be read from disk.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The raw file exists but holds no data.
    #[error("{} is empty", .path.display())]
    Empty {
        /// File that was empty.
        path: PathBuf,
    },
    /// LibRaw returned a non-success status.
    #[error("libraw {stage} failed ({code}): {message}")]
    LibRaw {
        /// Pipeline step that failed.
        stage: DecodeStage,
        /// LibRaw status code.
        code: i32,
        /// LibRaw's description of `code`.
        message: String,
    },
    /// The file is not a raw container and the image decoders rejected it.
    #[error("cannot decode {}: {source}", .path.display())]
    Image {
        /// File that was being decoded.
        path: PathBuf,
        /// Underlying image error.
        #[source]
        source: ImageError,
    },
    /// The developed image is not 8-bit RGB of the advertised size.
    #[error("unexpected processed image layout: {0}")]
    Layout(String),
}

/// Capturing and transferring a shot failed.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A device operation failed.
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// The local destination could not be created or written.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// Local destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    /// The device phase that failed, if the failure came from the camera.
    #[must_use]
    pub const fn phase(&self) -> Option<DevicePhase> {
        match self {
            Self::Device(err) => Some(err.phase),
            Self::Io { .. } => None,
        }
    }
}

/// The display window failed.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The windowing backend reported an error.
    #[error("window error: {0}")]
    Window(String),
    /// The operator closed the window.
    #[error("window was closed")]
    Closed,
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Abstraction over a tethered still camera.
pub trait CameraDevice {
    /// Identity of the opened camera.
    fn info(&self) -> &CameraInfo;

    /// Trigger an exposure, leaving the file on device storage.
    fn capture(&mut self) -> Result<CapturedImage>;

    /// Read the contents of a file on device storage.
    fn download(&mut self, image: &CapturedImage) -> Result<Vec<u8>>;

    /// Remove a file from device storage.
    fn delete(&mut self, image: &CapturedImage) -> Result<()>;
}

/// Abstraction over raw development.
pub trait RawDecoder {
    /// Develop the raw file at `path` into an RGB buffer owned by the caller.
    fn decode(&self, path: &Path) -> std::result::Result<RgbImage, DecodeError>;
}

/// Abstraction over the on-screen window.
pub trait Viewer {
    /// Present `image` in the window.
    fn show(&mut self, image: &RgbImage) -> std::result::Result<(), DisplayError>;

    /// Block until any key is pressed.
    fn wait_for_key(&mut self) -> std::result::Result<(), DisplayError>;
}
