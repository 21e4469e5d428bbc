//! Shared fixtures: a scripted `ImageOps` and temp directories.

#![allow(dead_code)]

use graypipe::imaging::{ImageOpError, ImageOps, StandardOps};
use image::DynamicImage;
use image::imageops::FilterType;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory image operations. Decodes only the paths it was given, can be told to fail
/// specific paths at specific steps, and records every call.
#[derive(Default)]
pub struct FakeOps {
    sources: HashMap<PathBuf, (u32, u32)>,
    fail_resize: HashSet<PathBuf>,
    fail_encode: HashSet<PathBuf>,
    pub decoded: Mutex<Vec<PathBuf>>,
    pub written: Mutex<Vec<PathBuf>>,
    pub grayscaled: Mutex<usize>,
    /// Dimensions of the images handed to `encode`, keyed by output path.
    pub written_dims: Mutex<HashMap<PathBuf, (u32, u32)>>,
}

impl FakeOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` decodable as a `width`×`height` image.
    pub fn with_source(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.sources.insert(path.into(), (width, height));
        self
    }

    /// Fail resize for images decoded from `path`. Items carry no path into `resize`, so the
    /// match is on source dimensions: give scripted failures unique sizes.
    pub fn failing_resize(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_resize.insert(path.into());
        self
    }

    /// Fail encode when writing to `output`.
    pub fn failing_encode(mut self, output: impl Into<PathBuf>) -> Self {
        self.fail_encode.insert(output.into());
        self
    }

    pub fn decoded(&self) -> Vec<PathBuf> {
        self.decoded.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }

    pub fn grayscale_calls(&self) -> usize {
        *self.grayscaled.lock().unwrap()
    }
}

impl ImageOps for FakeOps {
    fn decode(&self, path: &Path) -> Result<DynamicImage, ImageOpError> {
        let Some(&(w, h)) = self.sources.get(path) else {
            return Err(ImageOpError::Open {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such image"),
            });
        };
        self.decoded.lock().unwrap().push(path.to_path_buf());
        Ok(DynamicImage::new_rgb8(w, h))
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), ImageOpError> {
        if self.fail_encode.contains(path) {
            return Err(ImageOpError::Create {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.written.lock().unwrap().push(path.to_path_buf());
        self.written_dims
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), (image.width(), image.height()));
        Ok(())
    }

    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageOpError> {
        let source_dims = (image.width(), image.height());
        let doomed = self
            .fail_resize
            .iter()
            .filter_map(|p| self.sources.get(p))
            .any(|dims| *dims == source_dims);
        if doomed {
            return Err(ImageOpError::Transform {
                op: "resize",
                reason: "scripted failure".to_string(),
            });
        }
        Ok(image.resize_exact(width, height, FilterType::Nearest))
    }

    fn grayscale(&self, image: DynamicImage) -> Result<DynamicImage, ImageOpError> {
        *self.grayscaled.lock().unwrap() += 1;
        StandardOps.grayscale(image)
    }

    fn blur(&self, image: DynamicImage, sigma: f32) -> Result<DynamicImage, ImageOpError> {
        StandardOps.blur(image, sigma)
    }

    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, ImageOpError> {
        StandardOps.rotate(image, degrees)
    }
}

/// Fresh, empty directory under the cargo target tmpdir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"))
        .join("graypipe_tests")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
