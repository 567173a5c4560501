//! Raw development into an RGB buffer owned by the caller.

use std::path::Path;

use clap::ValueEnum;
use image::{ImageReader, RgbImage};
use tracing::{debug, info};

use crate::libraw::Session;
use crate::traits::{DecodeError, DecodeStage, RawDecoder};

/// Decoder backed by LibRaw, honouring the camera's recorded white balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibRawDecoder;

impl LibRawDecoder {
    /// Create a decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RawDecoder for LibRawDecoder {
    fn decode(&self, path: &Path) -> Result<RgbImage, DecodeError> {
        let input = std::fs::read(path).map_err(|source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if input.is_empty() {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }

        // The session is released at the end of this block; `developed` only
        // holds samples copied out of it.
        let developed = {
            let mut session = Session::open(input)?;
            session.unpack()?;
            session.develop()?
        };

        let (width, height) = (developed.width, developed.height);
        let image = RgbImage::from_raw(width, height, developed.data).ok_or_else(|| {
            DecodeError::Layout(format!("{width}x{height} does not fit the decoded samples"))
        })?;

        info!(path = %path.display(), width, height, "decoded raw image");
        Ok(image)
    }
}

/// Decoder that treats the file as an ordinary image (JPEG, PNG).
///
/// The format is sniffed from the file contents, so a JPEG written under a
/// raw file name still decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileDecoder;

impl RawDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path) -> Result<RgbImage, DecodeError> {
        let read_error = |source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        };
        let metadata = std::fs::metadata(path).map_err(read_error)?;
        if metadata.len() == 0 {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }

        let image = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(read_error)?
            .decode()
            .map_err(|source| DecodeError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgb8();
        info!(path = %path.display(), width = image.width(), height = image.height(), "decoded image file");
        Ok(image)
    }
}

/// Which decoder to use for captured files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DecoderKind {
    /// LibRaw, falling back to the image decoders for non-raw captures.
    #[default]
    Auto,
    /// LibRaw only.
    Raw,
    /// Plain image files only (camera shooting JPEG).
    #[value(name = "image")]
    ImageFile,
}

/// Either supported decoder, or LibRaw with an image-file fallback.
#[derive(Debug, Clone, Copy, Default)]
pub enum AnyDecoder {
    /// Try LibRaw; if it does not recognise the container, decode as an
    /// image file.
    #[default]
    Auto,
    /// LibRaw.
    Raw(LibRawDecoder),
    /// `image` crate.
    ImageFile(ImageFileDecoder),
}

impl From<DecoderKind> for AnyDecoder {
    fn from(kind: DecoderKind) -> Self {
        match kind {
            DecoderKind::Auto => Self::Auto,
            DecoderKind::Raw => Self::Raw(LibRawDecoder::new()),
            DecoderKind::ImageFile => Self::ImageFile(ImageFileDecoder),
        }
    }
}

impl RawDecoder for AnyDecoder {
    fn decode(&self, path: &Path) -> Result<RgbImage, DecodeError> {
        match self {
            Self::Auto => decode_with_fallback(path),
            Self::Raw(decoder) => decoder.decode(path),
            Self::ImageFile(decoder) => decoder.decode(path),
        }
    }
}

// A capture LibRaw cannot open is retried as an image file. If that fails
// too, the LibRaw error is the one reported.
fn decode_with_fallback(path: &Path) -> Result<RgbImage, DecodeError> {
    match LibRawDecoder::new().decode(path) {
        Err(
            raw_err @ DecodeError::LibRaw {
                stage: DecodeStage::Open,
                ..
            },
        ) => {
            debug!(path = %path.display(), error = %raw_err, "not a raw file, trying image decoders");
            ImageFileDecoder.decode(path).map_err(|image_err| {
                debug!(error = %image_err, "image decoders rejected the file too");
                raw_err
            })
        }
        other => other,
    }
}
