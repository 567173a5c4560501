//! Pixel buffer validation utilities.
//!
//! [`validate_rgb_buffer`] guards the copy out of the raw decoder. The image
//! checks below it are test helpers for geometry and channel order.

#[cfg(test)]
use image::RgbImage;

use crate::traits::DecodeError;

/// Expected RGB values for the 8 SMPTE color bars.
///
/// Colors in order: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
#[cfg(test)]
pub const SMPTE_COLOR_BARS: [[u8; 3]; 8] = [
    [235, 235, 235], // White
    [235, 235, 16],  // Yellow
    [16, 235, 235],  // Cyan
    [16, 235, 16],   // Green
    [235, 16, 235],  // Magenta
    [235, 16, 16],   // Red
    [16, 16, 235],   // Blue
    [16, 16, 16],    // Black
];

/// Tolerance for RGB color matching (accounts for resampling and JPEG error).
#[cfg(test)]
const COLOR_TOLERANCE: u8 = 15;

/// Checks that a buffer of `len` bytes holds exactly `width * height` RGB pixels.
///
/// # Errors
///
/// Returns `DecodeError::Layout` if either dimension is zero or the byte count
/// does not match.
pub fn validate_rgb_buffer(len: usize, width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::Layout(format!(
            "image has no pixels: {width}x{height}"
        )));
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| DecodeError::Layout(format!("{width}x{height} overflows")))?;

    if len != expected {
        return Err(DecodeError::Layout(format!(
            "{width}x{height} RGB needs {expected} bytes, got {len}"
        )));
    }

    Ok(())
}

/// Checks that `image` has the given dimensions.
///
/// # Errors
///
/// Returns a description of the mismatch.
#[cfg(test)]
pub fn validate_dimensions(image: &RgbImage, width: u32, height: u32) -> Result<(), String> {
    if image.dimensions() != (width, height) {
        return Err(format!(
            "expected {width}x{height}, got {}x{}",
            image.width(),
            image.height()
        ));
    }
    Ok(())
}

/// Validates that an RGB image shows the SMPTE color bar pattern.
///
/// Samples the center of each of the 8 vertical stripes and compares it to
/// [`SMPTE_COLOR_BARS`]. A swapped channel order (BGR) fails on the yellow bar.
///
/// # Errors
///
/// Returns a description of the first bar that does not match.
#[cfg(test)]
pub fn validate_color_bars(image: &RgbImage) -> Result<(), String> {
    let (width, height) = image.dimensions();
    let bar_width = width / 8;
    if bar_width == 0 || height == 0 {
        return Err(format!("{width}x{height} is too small for 8 bars"));
    }
    let center_y = height / 2;

    for (bar_idx, expected) in SMPTE_COLOR_BARS.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let sample_x = (bar_idx as u32 * bar_width) + (bar_width / 2);

        let actual = image
            .get_pixel_checked(sample_x, center_y)
            .ok_or_else(|| format!("Failed to get pixel at ({sample_x}, {center_y})"))?
            .0;

        if !colors_match(actual, *expected, COLOR_TOLERANCE) {
            return Err(format!(
                "Color bar {bar_idx} mismatch at ({sample_x}, {center_y}): \
                 expected RGB{expected:?}, got RGB{actual:?}"
            ));
        }
    }

    Ok(())
}

/// Helper function to check if two RGB colors match within a tolerance.
#[cfg(test)]
fn colors_match(actual: [u8; 3], expected: [u8; 3], tolerance: u8) -> bool {
    actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= tolerance)
}
