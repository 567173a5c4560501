//! Scoped LibRaw decoding session.
//!
//! All FFI lives here. A [`Session`] owns the `libraw_data_t` handle together
//! with the input bytes it was opened from; [`Session::develop`] copies the
//! processed samples into a `Vec` before the memory image is released, so
//! nothing handed back to callers points into LibRaw-owned memory.

#![allow(unsafe_code)]

use std::ffi::{c_void, CStr};
use std::ptr::NonNull;
use std::slice;

use rsraw_sys as sys;
use tracing::debug;

use crate::traits::{DecodeError, DecodeStage};
use crate::validation::validate_rgb_buffer;

const LIBRAW_SUCCESS: i32 = 0;

/// An 8-bit RGB image copied out of LibRaw.
#[derive(Debug)]
pub struct Developed {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Interleaved R, G, B samples, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

/// An open LibRaw processor with its input buffer.
pub struct Session {
    // Declared before `input`: the handle is closed before the bytes it reads
    // from are freed.
    handle: Handle,
    input: Vec<u8>,
}

struct Handle(NonNull<sys::libraw_data_t>);

impl Drop for Handle {
    fn drop(&mut self) {
        // SAFETY: the pointer came from libraw_init and is closed exactly once.
        unsafe { sys::libraw_close(self.0.as_ptr()) };
    }
}

struct MemImage(NonNull<sys::libraw_processed_image_t>);

impl Drop for MemImage {
    fn drop(&mut self) {
        // SAFETY: the pointer came from libraw_dcraw_make_mem_image and is freed once.
        unsafe { sys::libraw_dcraw_clear_mem(self.0.as_ptr()) };
    }
}

impl Session {
    /// Open `input` as a raw container, configured to use the white balance
    /// recorded by the camera instead of auto white balance.
    pub fn open(input: Vec<u8>) -> Result<Self, DecodeError> {
        // SAFETY: libraw_init has no preconditions and returns null on failure.
        let raw = unsafe { sys::libraw_init(0) };
        let handle = NonNull::new(raw).map(Handle).ok_or_else(|| DecodeError::LibRaw {
            stage: DecodeStage::Init,
            code: -1,
            message: "libraw_init returned null".to_owned(),
        })?;

        let mut session = Self { handle, input };
        let ptr = session.handle.0.as_ptr();

        // SAFETY: ptr is a live handle owned by `session`.
        unsafe {
            (*ptr).params.use_camera_wb = 1;
            (*ptr).params.use_auto_wb = 0;
        }

        let buffer = session.input.as_mut_ptr().cast::<c_void>();
        // SAFETY: ptr is live and `session.input` outlives the handle (field order).
        let ret = unsafe { sys::libraw_open_buffer(ptr, buffer, session.input.len()) };
        check(DecodeStage::Open, ret)?;

        Ok(session)
    }

    /// Output size LibRaw reports for the opened image, before any flip.
    pub fn size(&self) -> (u32, u32) {
        // SAFETY: the handle is live; `sizes` is filled in by a successful open.
        let sizes = unsafe { &(*self.handle.0.as_ptr()).sizes };
        (u32::from(sizes.width), u32::from(sizes.height))
    }

    /// Unpack sensor data.
    pub fn unpack(&mut self) -> Result<(), DecodeError> {
        // SAFETY: the handle is live and was opened successfully.
        let ret = unsafe { sys::libraw_unpack(self.handle.0.as_ptr()) };
        check(DecodeStage::Unpack, ret)?;

        let (width, height) = self.size();
        debug!(width, height, "unpacked raw image");
        Ok(())
    }

    /// Run demosaic and colour processing, then copy the result out.
    pub fn develop(&mut self) -> Result<Developed, DecodeError> {
        let ptr = self.handle.0.as_ptr();

        // SAFETY: the handle is live and unpacked.
        let ret = unsafe { sys::libraw_dcraw_process(ptr) };
        check(DecodeStage::Process, ret)?;

        let mut errc: i32 = 0;
        // SAFETY: the handle is live and processed; errc is a valid out-pointer.
        let image = unsafe { sys::libraw_dcraw_make_mem_image(ptr, &mut errc) };
        let image = NonNull::new(image).map(MemImage);
        check(DecodeStage::MemImage, errc)?;
        let image = image.ok_or_else(|| DecodeError::LibRaw {
            stage: DecodeStage::MemImage,
            code: errc,
            message: "libraw_dcraw_make_mem_image returned null".to_owned(),
        })?;

        // SAFETY: image is live until `image` drops at the end of this scope.
        let header = unsafe { image.0.as_ref() };
        let width = u32::from(header.width);
        let height = u32::from(header.height);
        let colors = header.colors;
        let bits = header.bits;
        let data_size = header.data_size as usize;

        debug!(width, height, colors, bits, data_size, "libraw memory image");

        if colors != 3 || bits != 8 {
            return Err(DecodeError::Layout(format!(
                "expected 3 colours at 8 bits, got {colors} at {bits}"
            )));
        }
        validate_rgb_buffer(data_size, width, height)?;

        // SAFETY: `data` is a flexible array member holding data_size bytes; the
        // pointer is taken from the raw image pointer, not the header reference.
        let samples = unsafe {
            let first = std::ptr::addr_of!((*image.0.as_ptr()).data).cast::<u8>();
            slice::from_raw_parts(first, data_size)
        };
        let data = samples.to_vec();

        drop(image);

        Ok(Developed {
            width,
            height,
            data,
        })
    }
}

fn check(stage: DecodeStage, code: i32) -> Result<(), DecodeError> {
    if code == LIBRAW_SUCCESS {
        return Ok(());
    }
    Err(DecodeError::LibRaw {
        stage,
        code,
        message: strerror(code),
    })
}

fn strerror(code: i32) -> String {
    // SAFETY: libraw_strerror returns a pointer to a static string or null.
    let message = unsafe { sys::libraw_strerror(code) };
    if message.is_null() {
        return format!("libraw error {code}");
    }
    // SAFETY: non-null pointers from libraw_strerror are NUL-terminated statics.
    unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned()
}
