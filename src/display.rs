//! On-screen window using minifb, plus scaling to the fixed display size.

use std::path::Path;

use image::imageops::{resize, FilterType};
use image::{ImageError, RgbImage};
use minifb::{KeyRepeat, Window, WindowOptions};
use tracing::debug;

use crate::traits::{DisplayError, Viewer};

/// Fixed size images are presented at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DisplaySize {
    /// Create a display size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self::new(1600, 1069)
    }
}

/// Resize `image` to exactly `size`, ignoring aspect ratio.
#[must_use]
pub fn scale_to_display(image: &RgbImage, size: DisplaySize) -> RgbImage {
    if image.dimensions() == (size.width, size.height) {
        return image.clone();
    }
    resize(image, size.width, size.height, FilterType::Triangle)
}

/// Load a reference image (JPEG or PNG) as RGB.
pub fn load_reference(path: &Path) -> Result<RgbImage, ImageError> {
    Ok(image::open(path)?.into_rgb8())
}

/// Pack RGB samples into minifb's `0RGB` pixels.
fn to_framebuffer(image: &RgbImage) -> Vec<u32> {
    image
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        })
        .collect()
}

/// Key polling rate, matching a 30 ms wait per poll.
const POLL_FPS: usize = 33;

/// Single window held for the lifetime of the demo.
pub struct MinifbViewer {
    window: Window,
    framebuffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbViewer {
    /// Open a window of the given size.
    pub fn open(title: &str, size: DisplaySize) -> Result<Self, DisplayError> {
        let width = size.width as usize;
        let height = size.height as usize;

        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|err| DisplayError::Window(err.to_string()))?;
        window.set_target_fps(POLL_FPS);

        Ok(Self {
            window,
            framebuffer: vec![0; width * height],
            width,
            height,
        })
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.window
            .update_with_buffer(&self.framebuffer, self.width, self.height)
            .map_err(|err| DisplayError::Window(err.to_string()))
    }
}

impl Viewer for MinifbViewer {
    fn show(&mut self, image: &RgbImage) -> Result<(), DisplayError> {
        if !self.window.is_open() {
            return Err(DisplayError::Closed);
        }
        self.framebuffer = to_framebuffer(image);
        self.width = image.width() as usize;
        self.height = image.height() as usize;
        self.present()
    }

    fn wait_for_key(&mut self) -> Result<(), DisplayError> {
        loop {
            if !self.window.is_open() {
                return Err(DisplayError::Closed);
            }
            self.present()?;

            let keys = self.window.get_keys_pressed(KeyRepeat::No);
            if let Some(key) = keys.first() {
                debug!(?key, "key pressed");
                return Ok(());
            }
        }
    }
}
