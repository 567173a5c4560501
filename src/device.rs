//! Tethered camera implementation using the gphoto2 crate.

use gphoto2::{Camera, Context};

use crate::traits::{CameraDevice, CameraInfo, CapturedImage, DeviceError, DevicePhase, Result};

/// gphoto2 camera wrapping an explicit context and camera handle.
///
/// The camera is released (`gp_camera_exit`) when this value is dropped.
pub struct GPhotoCamera {
    context: Context,
    camera: Camera,
    info: CameraInfo,
}

impl GPhotoCamera {
    /// Open the first camera gphoto2 can autodetect.
    pub fn open() -> Result<Self> {
        let context =
            Context::new().map_err(|err| DeviceError::new(DevicePhase::Init, err.to_string()))?;

        let camera = context
            .autodetect_camera()
            .wait()
            .map_err(|err| DeviceError::new(DevicePhase::Init, err.to_string()))?;

        let info = CameraInfo {
            model: camera.abilities().model().into_owned(),
            port: camera
                .port_info()
                .map(|port| port.path())
                .unwrap_or_default(),
        };

        Ok(Self {
            context,
            camera,
            info,
        })
    }
}

impl CameraDevice for GPhotoCamera {
    fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn capture(&mut self) -> Result<CapturedImage> {
        let path = self
            .camera
            .capture_image()
            .wait()
            .map_err(|err| DeviceError::new(DevicePhase::Capture, err.to_string()))?;

        Ok(CapturedImage::new(path.folder(), path.name()))
    }

    fn download(&mut self, image: &CapturedImage) -> Result<Vec<u8>> {
        let file = self
            .camera
            .fs()
            .download(&image.folder, &image.name)
            .wait()
            .map_err(|err| DeviceError::new(DevicePhase::Transfer, err.to_string()))?;

        let data = file
            .get_data(&self.context)
            .wait()
            .map_err(|err| DeviceError::new(DevicePhase::Transfer, err.to_string()))?;

        Ok(data.into_vec())
    }

    fn delete(&mut self, image: &CapturedImage) -> Result<()> {
        self.camera
            .fs()
            .delete_file(&image.folder, &image.name)
            .wait()
            .map_err(|err| DeviceError::new(DevicePhase::Delete, err.to_string()))
    }
}
