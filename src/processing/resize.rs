//! # Downscale and Re-encode
//!
//! Turns a picked [`SourceImage`] into the [`ScaledFile`] that gets uploaded:
//!
//! 1. Decode the source bytes (format sniffed from content, not the name)
//! 2. Plan output dimensions with [`img_scale::presets::build_plan`]
//! 3. Render into an off-screen RGB surface with one whole-image resample
//! 4. Re-encode the surface as JPEG at the encoder's default quality
//! 5. Rename to `<stem>.jpg` and stamp the current time
//!
//! Decoding and encoding are CPU bound, so [`Downscaler::resize`] runs them on
//! tokio's blocking pool and the calling task simply awaits the result.

use std::io::Cursor;

use chrono::Utc;
use fast_image_resize::Resizer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageReader, RgbImage};
use img_scale::cpu::{rgb_len, scale_rgb_cpu};
use img_scale::presets::{ScalePlan, Size, build_plan};
use tracing::{debug, info};

use super::media::{Dimensions, OUTPUT_EXTENSION, OUTPUT_MIME_TYPE, ScaledFile, SourceImage};
use crate::error::{ClassifyError, ClassifyResult};

/// Downscales images to a bounded longest edge.
#[derive(Debug, Clone, Copy)]
pub struct Downscaler {
    max_dimension: u32,
}

impl Downscaler {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Resize `source` without blocking the calling task.
    pub async fn resize(&self, source: &SourceImage) -> ClassifyResult<ScaledFile> {
        let source = source.clone();
        let max_dimension = self.max_dimension;
        tokio::task::spawn_blocking(move || downscale_blocking(&source, max_dimension))
            .await
            .map_err(|e| {
                ClassifyError::encode(format!("resize task did not complete: {}", e))
                    .with_operation("resize_image")
            })?
    }
}

/// Resize `source` so its longest edge is at most `max_dimension` and re-encode it as JPEG.
pub async fn resize_image(source: &SourceImage, max_dimension: u32) -> ClassifyResult<ScaledFile> {
    Downscaler::new(max_dimension).resize(source).await
}

/// Synchronous body of [`resize_image`]. Fails with `Decode` or `Encode`; never
/// returns a partial file.
pub fn downscale_blocking(source: &SourceImage, max_dimension: u32) -> ClassifyResult<ScaledFile> {
    let decoded = decode(source)?;
    let input = Size {
        w: decoded.width(),
        h: decoded.height(),
    };
    let plan = build_plan(input, max_dimension);
    debug!(
        file = source.file_name(),
        input = %Dimensions::from(plan.input),
        output = %Dimensions::from(plan.out),
        "planned downscale"
    );

    let rgb = decoded.into_rgb8();
    let bytes = {
        let surface = Surface::render(rgb, &plan)?;
        surface.encode_jpeg()?
        // surface released here, on success or failure
    };

    let scaled = ScaledFile {
        bytes,
        file_name: canonical_file_name(source.file_name()),
        mime_type: OUTPUT_MIME_TYPE,
        dimensions: plan.out.into(),
        last_modified: Utc::now(),
    };
    info!(
        file = %scaled.file_name,
        dimensions = %scaled.dimensions,
        bytes = scaled.bytes.len(),
        "re-encoded image"
    );
    Ok(scaled)
}

/// Replace the final extension of `file_name` with `.jpg`.
///
/// `photo.png` → `photo.jpg`, `a.b.png` → `a.b.jpg`, `photo` → `photo.jpg`.
pub fn canonical_file_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(pos) => &file_name[..pos],
        None => file_name,
    };
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

fn decode(source: &SourceImage) -> ClassifyResult<DynamicImage> {
    let decode_error = |reason: String| {
        ClassifyError::decode(source.file_name(), reason)
            .with_operation("resize_image")
            .with_metadata("bytes", source.len().to_string())
            .with_recovery_suggestion("Pick a valid JPEG, PNG, GIF, BMP or WebP image")
    };

    ImageReader::new(Cursor::new(source.bytes()))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}

/// Off-screen RGB raster sized to the planned output.
struct Surface {
    size: Size,
    pixels: Vec<u8>,
}

impl Surface {
    fn render(src: RgbImage, plan: &ScalePlan) -> ClassifyResult<Self> {
        if plan.is_identity() {
            return Ok(Self {
                size: plan.out,
                pixels: src.into_raw(),
            });
        }

        let mut pixels = vec![0u8; rgb_len(plan.out)];
        scale_rgb_cpu(
            &mut Resizer::new(),
            src.as_raw(),
            plan.input,
            plan,
            &mut pixels,
        )
        .map_err(|e| ClassifyError::encode(e.to_string()).with_operation("render_surface"))?;

        Ok(Self {
            size: plan.out,
            pixels,
        })
    }

    fn encode_jpeg(&self) -> ClassifyResult<Vec<u8>> {
        let mut buf = Vec::new();
        JpegEncoder::new(&mut buf)
            .encode(
                &self.pixels,
                self.size.w,
                self.size.h,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| ClassifyError::encode(e.to_string()).with_operation("encode_jpeg"))?;
        Ok(buf)
    }
}
