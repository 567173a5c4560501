//! Tether-Demo: a tethered camera capture and raw development demo.
//!
//! This library provides trait-based seams over a gphoto2 camera, a LibRaw
//! decoder and a minifb window, so the display loop can run against real
//! hardware or be tested with mock collaborators.

pub mod capture;
pub mod config;
pub mod decode;
pub mod demo;
pub mod device;
pub mod display;
mod libraw;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub mod mock;

pub use capture::capture_image;
pub use config::DemoConfig;
pub use decode::{AnyDecoder, DecoderKind, ImageFileDecoder, LibRawDecoder};
pub use demo::{Demo, DemoError, RunSummary};
pub use device::GPhotoCamera;
pub use display::{DisplaySize, MinifbViewer};
pub use traits::{
    CameraDevice, CameraInfo, CaptureError, CapturedImage, DecodeError, DeviceError, DevicePhase,
    DisplayError, RawDecoder, Viewer,
};
