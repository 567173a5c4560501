//! Capture trigger and transfer of the shot to local storage.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::traits::{CameraDevice, CaptureError, CapturedImage, DeviceError, DevicePhase};

/// Take a picture and move it from device storage to `destination`.
///
/// The destination is created if missing and truncated otherwise. Once the
/// exposure succeeded, deleting the file from the device is always attempted,
/// even when the copy failed. The first failure is the one reported.
pub fn capture_image<C: CameraDevice>(
    camera: &mut C,
    destination: &Path,
) -> Result<PathBuf, CaptureError> {
    let captured = camera.capture()?;
    info!(file = %captured, "captured image on device");

    let copied = transfer(camera, &captured, destination);
    let deleted = camera.delete(&captured);

    match (copied, deleted) {
        (Ok(bytes), Ok(())) => {
            info!(
                file = %captured,
                destination = %destination.display(),
                bytes,
                "transferred capture"
            );
            Ok(destination.to_path_buf())
        }
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup)) => {
            warn!(file = %captured, error = %cleanup, "capture left on device");
            Err(err)
        }
    }
}

/// Copy the capture into `destination`, returning the number of bytes written.
fn transfer<C: CameraDevice>(
    camera: &mut C,
    captured: &CapturedImage,
    destination: &Path,
) -> Result<usize, CaptureError> {
    let data = camera.download(captured)?;
    if data.is_empty() {
        return Err(DeviceError::new(
            DevicePhase::Transfer,
            format!("{captured} downloaded as zero bytes"),
        )
        .into());
    }

    let io_err = |source| CaptureError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(destination)
        .map_err(io_err)?;
    file.write_all(&data).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    Ok(data.len())
}
