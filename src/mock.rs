//! Mock collaborators for testing without a camera or a display.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::traits::{
    CameraDevice, CameraInfo, CapturedImage, DecodeError, DecodeStage, DeviceError, DevicePhase,
    DisplayError, RawDecoder, Result, Viewer,
};
use crate::validation::SMPTE_COLOR_BARS;

/// A camera operation recorded by [`MockCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCall {
    /// `capture` was called.
    Capture,
    /// `download` was called.
    Download,
    /// `delete` was called.
    Delete,
}

/// Mock camera with an in-memory device storage.
pub struct MockCamera {
    info: CameraInfo,
    payload: Vec<u8>,
    failures: Vec<DeviceError>,
    stored: Vec<CapturedImage>,
    calls: Vec<CameraCall>,
    shot_count: u32,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// Create a mock camera whose captures hold a small non-empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: CameraInfo {
                model: "Mock Camera".to_owned(),
                port: "mock:0".to_owned(),
            },
            payload: vec![0x4d; 1024],
            failures: Vec::new(),
            stored: Vec::new(),
            calls: Vec::new(),
            shot_count: 0,
        }
    }

    /// Set the bytes every capture downloads as.
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Make every call of the given phase fail with `reason`.
    #[must_use]
    pub fn failing(mut self, phase: DevicePhase, reason: &str) -> Self {
        self.failures.push(DeviceError::new(phase, reason));
        self
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> &[CameraCall] {
        &self.calls
    }

    /// Files currently on device storage.
    pub fn stored(&self) -> &[CapturedImage] {
        &self.stored
    }

    fn check(&self, phase: DevicePhase) -> Result<()> {
        match self.failures.iter().find(|err| err.phase == phase) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl CameraDevice for MockCamera {
    fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn capture(&mut self) -> Result<CapturedImage> {
        self.calls.push(CameraCall::Capture);
        self.check(DevicePhase::Capture)?;

        let image = CapturedImage::new("/", format!("capt{:04}.nef", self.shot_count));
        self.shot_count += 1;
        self.stored.push(image.clone());
        Ok(image)
    }

    fn download(&mut self, image: &CapturedImage) -> Result<Vec<u8>> {
        self.calls.push(CameraCall::Download);
        self.check(DevicePhase::Transfer)?;

        if !self.stored.contains(image) {
            return Err(DeviceError::new(
                DevicePhase::Transfer,
                format!("{image} not found"),
            ));
        }
        Ok(self.payload.clone())
    }

    fn delete(&mut self, image: &CapturedImage) -> Result<()> {
        self.calls.push(CameraCall::Delete);
        self.check(DevicePhase::Delete)?;

        let before = self.stored.len();
        self.stored.retain(|stored| stored != image);
        if self.stored.len() == before {
            return Err(DeviceError::new(
                DevicePhase::Delete,
                format!("{image} not found"),
            ));
        }
        Ok(())
    }
}

/// Mock decoder returning color bars of a fixed size.
pub struct MockDecoder {
    width: u32,
    height: u32,
    fail: bool,
    decoded: RefCell<Vec<PathBuf>>,
}

impl MockDecoder {
    /// Decode every file to `width` x `height` color bars.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail: false,
            decoded: RefCell::new(Vec::new()),
        }
    }

    /// Fail every decode as an unpack error.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            width: 0,
            height: 0,
            fail: true,
            decoded: RefCell::new(Vec::new()),
        }
    }

    /// Paths successfully decoded so far.
    pub fn decoded(&self) -> Vec<PathBuf> {
        self.decoded.borrow().clone()
    }
}

impl RawDecoder for MockDecoder {
    fn decode(&self, path: &Path) -> std::result::Result<RgbImage, DecodeError> {
        if self.fail {
            return Err(DecodeError::LibRaw {
                stage: DecodeStage::Unpack,
                code: -4,
                message: "Unsupported file format or not RAW file".to_owned(),
            });
        }
        self.decoded.borrow_mut().push(path.to_path_buf());
        Ok(color_bars(self.width, self.height))
    }
}

/// Mock viewer recording what it was asked to show.
#[derive(Default)]
pub struct MockViewer {
    shown: Vec<(u32, u32)>,
    waits_before_show: Vec<usize>,
    key_waits: usize,
    close_after: Option<usize>,
}

impl MockViewer {
    /// Create a viewer where every key wait returns immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the window closed once `waits` key presses were delivered.
    #[must_use]
    pub fn closing_after(mut self, waits: usize) -> Self {
        self.close_after = Some(waits);
        self
    }

    /// Dimensions of every image shown, in order.
    pub fn shown(&self) -> &[(u32, u32)] {
        &self.shown
    }

    /// For every image shown, the number of key waits completed before it.
    pub fn waits_before_show(&self) -> &[usize] {
        &self.waits_before_show
    }

    /// Number of completed key waits.
    pub const fn key_waits(&self) -> usize {
        self.key_waits
    }
}

impl Viewer for MockViewer {
    fn show(&mut self, image: &RgbImage) -> std::result::Result<(), DisplayError> {
        self.shown.push(image.dimensions());
        self.waits_before_show.push(self.key_waits);
        Ok(())
    }

    fn wait_for_key(&mut self) -> std::result::Result<(), DisplayError> {
        if self.close_after == Some(self.key_waits) {
            return Err(DisplayError::Closed);
        }
        self.key_waits += 1;
        Ok(())
    }
}

/// Generate an RGB SMPTE color bars image.
pub fn color_bars(width: u32, height: u32) -> RgbImage {
    let bar_width = (width / 8).max(1);
    RgbImage::from_fn(width, height, |x, _| {
        let bar_idx = ((x / bar_width).min(7)) as usize;
        Rgb(SMPTE_COLOR_BARS
            .get(bar_idx)
            .copied()
            .unwrap_or([0, 0, 0]))
    })
}

/// Generate a solid RGB image.
pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_creation() {
        let camera = MockCamera::new();
        assert_eq!(camera.info().model, "Mock Camera");
        assert!(camera.stored().is_empty());
    }

    #[test]
    fn test_mock_camera_capture_names_increment() {
        let mut camera = MockCamera::new();
        let first = camera.capture().expect("capture should succeed");
        let second = camera.capture().expect("capture should succeed");

        assert_eq!(first.name, "capt0000.nef");
        assert_eq!(second.name, "capt0001.nef");
        assert_eq!(camera.stored().len(), 2);
    }

    #[test]
    fn test_mock_camera_delete_unknown_file() {
        let mut camera = MockCamera::new();
        let err = camera
            .delete(&CapturedImage::new("/", "nope.nef"))
            .expect_err("delete should fail");
        assert_eq!(err.phase, DevicePhase::Delete);
    }

    #[test]
    fn test_mock_viewer_closes() {
        let mut viewer = MockViewer::new().closing_after(1);
        assert!(viewer.wait_for_key().is_ok());
        assert!(matches!(viewer.wait_for_key(), Err(DisplayError::Closed)));
        assert_eq!(viewer.key_waits(), 1);
    }

    #[test]
    fn test_color_bars_pattern() {
        let image = color_bars(640, 480);
        assert_eq!(image.dimensions(), (640, 480));
        // First bar is white, last is black
        assert_eq!(image.get_pixel(0, 0).0, [235, 235, 235]);
        assert_eq!(image.get_pixel(639, 479).0, [16, 16, 16]);
    }
}
