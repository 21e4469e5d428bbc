//! Image operations used by the pipeline stages.
//!
//! Stages only see the [`ImageOps`] trait; [`StandardOps`] backs it with the `image` and
//! `imageproc` crates. Tests inject their own implementation.

use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageError, ImageFormat, ImageReader, Luma, Rgba};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single image operation on a single item.
#[derive(Debug, Error)]
pub enum ImageOpError {
    #[error("failed to open image file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", .path.display())]
    Decode { path: PathBuf, source: ImageError },

    #[error("failed to create output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode image {}: {source}", .path.display())]
    Encode { path: PathBuf, source: ImageError },

    /// A transform rejected its input or parameters.
    #[error("{op} failed: {reason}")]
    Transform { op: &'static str, reason: String },
}

/// The operation set a pipeline runs. Implementations must be callable from several stage
/// threads at once; each call works on an image owned by the calling stage.
pub trait ImageOps: Send + Sync {
    /// Read and decode the file at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, ImageOpError>;

    /// Encode `image` into a new file at `path`. The only operation with a side effect.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), ImageOpError>;

    /// Scale to exactly `width`×`height`.
    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageOpError>;

    /// Per-pixel luminance, same dimensions.
    fn grayscale(&self, image: DynamicImage) -> Result<DynamicImage, ImageOpError>;

    fn blur(&self, image: DynamicImage, sigma: f32) -> Result<DynamicImage, ImageOpError>;

    /// Rotate counter-clockwise by `degrees` about the centre.
    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, ImageOpError>;
}

/// Colour conversion `format`'s encoder needs before it can take `image`, if any.
/// JPEG holds 8-bit luma or RGB only; GIF holds RGB or RGBA only.
fn convert_for_format(image: &DynamicImage, format: ImageFormat) -> Option<DynamicImage> {
    match (format, image.color()) {
        (ImageFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => None,
        (ImageFormat::Jpeg, _) => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        (ImageFormat::Gif, ColorType::Rgb8 | ColorType::Rgba8) => None,
        (ImageFormat::Gif, _) => Some(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => None,
    }
}

/// [`ImageOps`] over the `image` crate (codecs, resize, luma, blur) and `imageproc` (rotation).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardOps;

impl ImageOps for StandardOps {
    fn decode(&self, path: &Path) -> Result<DynamicImage, ImageOpError> {
        let open_err = |source| ImageOpError::Open {
            path: path.to_path_buf(),
            source,
        };
        ImageReader::open(path)
            .map_err(open_err)?
            .with_guessed_format()
            .map_err(open_err)?
            .decode()
            .map_err(|source| ImageOpError::Decode {
                path: path.to_path_buf(),
                source,
            })
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), ImageOpError> {
        let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Jpeg);
        let file = File::create(path).map_err(|source| ImageOpError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let encode_err = |source| ImageOpError::Encode {
            path: path.to_path_buf(),
            source,
        };

        let converted = convert_for_format(image, format);
        let image = converted.as_ref().unwrap_or(image);

        let mut writer = BufWriter::new(file);
        image.write_to(&mut writer, format).map_err(encode_err)?;
        writer
            .flush()
            .map_err(|e| encode_err(ImageError::IoError(e)))
    }

    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageOpError> {
        if width == 0 || height == 0 {
            return Err(ImageOpError::Transform {
                op: "resize",
                reason: format!("target size {width}x{height} has a zero dimension"),
            });
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn grayscale(&self, image: DynamicImage) -> Result<DynamicImage, ImageOpError> {
        Ok(DynamicImage::ImageLuma8(image.to_luma8()))
    }

    fn blur(&self, image: DynamicImage, sigma: f32) -> Result<DynamicImage, ImageOpError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ImageOpError::Transform {
                op: "blur",
                reason: format!("sigma must be a positive number, got {sigma}"),
            });
        }
        Ok(image.blur(sigma))
    }

    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, ImageOpError> {
        if !degrees.is_finite() {
            return Err(ImageOpError::Transform {
                op: "rotate",
                reason: format!("angle must be finite, got {degrees}"),
            });
        }
        // imageproc rotates clockwise in image coordinates.
        let theta = -degrees.to_radians();
        let rotated = match image {
            DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(rotate_about_center(
                &gray,
                theta,
                Interpolation::Bilinear,
                Luma([0]),
            )),
            other => DynamicImage::ImageRgba8(rotate_about_center(
                &other.to_rgba8(),
                theta,
                Interpolation::Bilinear,
                Rgba([0, 0, 0, 0]),
            )),
        };
        Ok(rotated)
    }
}
