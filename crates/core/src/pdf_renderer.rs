//! Native certificate thumbnails using pdfium (Google's PDF engine).
//!
//! Renders the first page of each certificate with the same scale-fit rules
//! the browser preview uses, so a site build can ship static PNG previews.
//!
//! - Pages are rendered sequentially (pdfium documents are not thread-safe)
//! - PNG encoding is parallelized via rayon

use crate::catalog::{Catalog, CertificateEntry};
use crate::config::{PreviewConfig, ThumbnailConfig};
use crate::error::{GalleryError, Result};
use crate::layout::{fit_preview, Orientation, ScaleFit};
use image::RgbaImage;
use pdfium_render::prelude::*;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// A rendered first-page thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Catalog index (1-based).
    pub index: usize,

    /// PNG image data.
    pub data: Vec<u8>,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    pub orientation: Orientation,

    /// Path where the PNG was written (if saved to disk).
    pub output_path: Option<PathBuf>,
}

/// A certificate whose thumbnail could not be produced.
#[derive(Debug, Clone)]
pub struct FailedThumbnail {
    pub index: usize,
    pub file_name: String,
    pub error: String,
}

/// Result of rendering a whole catalog.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailBatch {
    pub successful: Vec<Thumbnail>,
    pub failed: Vec<FailedThumbnail>,
    pub total_duration: Duration,
}

/// File name a thumbnail is written under.
pub fn thumbnail_file_name(index: usize) -> String {
    format!("certificate-{}.png", index)
}

/// First-page thumbnail renderer using pdfium.
pub struct ThumbnailRenderer {
    config: ThumbnailConfig,
    pdfium: Arc<Pdfium>,
    /// Rayon thread pool for parallel encoding.
    thread_pool: rayon::ThreadPool,
}

impl ThumbnailRenderer {
    /// Create a new thumbnail renderer.
    pub fn new(config: ThumbnailConfig) -> Result<Self> {
        config.validate()?;

        // Try the working directory first, then the usual system locations
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/lib",
                    ))
                })
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/local/lib",
                    ))
                })
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| GalleryError::Pdfium(format!("Failed to load pdfium library: {}", e)))?,
        );

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.render_threads)
            .build()
            .map_err(|e| {
                GalleryError::InvalidConfig(format!("Failed to create thread pool: {}", e))
            })?;

        info!(
            "Thumbnail renderer initialized with {} threads",
            config.render_threads
        );

        Ok(Self {
            config,
            pdfium: Arc::new(pdfium),
            thread_pool,
        })
    }

    /// Render the first page of `pdf_path` into an RGBA image fitted with
    /// `preview`.
    fn render_raw(&self, pdf_path: &Path, preview: &PreviewConfig) -> Result<(RgbaImage, ScaleFit)> {
        let path = pdf_path.display().to_string();

        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| GalleryError::DocumentLoad {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let page = document.pages().get(0).map_err(|e| GalleryError::PageFetch {
            path: path.clone(),
            page: 1,
            message: e.to_string(),
        })?;

        let fit = fit_preview(
            page.width().value as f64,
            page.height().value as f64,
            preview,
        )?;
        let (width, height) = fit.pixel_size();
        debug!("Rendering {} at {}x{} (scale {:.4})", path, width, height, fit.scale);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| GalleryError::Render {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let rgba_image: RgbaImage = bitmap.as_image().into_rgba8();

        let image = if !self.config.use_alpha {
            apply_background(rgba_image, self.config.background_color)
        } else {
            rgba_image
        };

        Ok((image, fit))
    }

    /// Render and encode the first page of a single PDF.
    pub fn render_first_page(
        &self,
        pdf_path: &Path,
        index: usize,
        preview: &PreviewConfig,
    ) -> Result<Thumbnail> {
        let (image, fit) = self.render_raw(pdf_path, preview)?;
        let data = encode_png_standalone(&image)?;
        Ok(Thumbnail {
            index,
            data,
            width: image.width(),
            height: image.height(),
            orientation: fit.orientation,
            output_path: None,
        })
    }

    /// Render a thumbnail for every catalog entry found in `source_dir` and
    /// write them to `output_dir`.
    ///
    /// A certificate that fails is recorded in the batch; the rest still
    /// render.
    pub fn render_catalog(
        &self,
        catalog: &Catalog,
        preview: &PreviewConfig,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<ThumbnailBatch> {
        let start = Instant::now();

        std::fs::create_dir_all(output_dir).map_err(|e| GalleryError::OutputDir {
            path: output_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut batch = ThumbnailBatch::default();

        // Render sequentially, collecting raw images for parallel encoding
        let mut raw_images: Vec<(&CertificateEntry, RgbaImage, ScaleFit)> =
            Vec::with_capacity(catalog.len());
        for entry in catalog.entries() {
            match self.render_raw(&source_dir.join(&entry.file_name), preview) {
                Ok((image, fit)) => raw_images.push((entry, image, fit)),
                Err(e) => {
                    error!("Failed to render thumbnail for {}: {}", entry.file_name, e);
                    batch.failed.push(failed(entry, &e));
                }
            }
        }

        let encoded: Vec<(&CertificateEntry, Result<Thumbnail>)> = self.thread_pool.install(|| {
            raw_images
                .into_par_iter()
                .map(|(entry, image, fit)| {
                    let result = encode_png_standalone(&image).map(|data| Thumbnail {
                        index: entry.index,
                        data,
                        width: image.width(),
                        height: image.height(),
                        orientation: fit.orientation,
                        output_path: None,
                    });
                    (entry, result)
                })
                .collect()
        });

        for (entry, result) in encoded {
            let written = result.and_then(|mut thumbnail| {
                let output_path = output_dir.join(thumbnail_file_name(entry.index));
                std::fs::write(&output_path, &thumbnail.data).map_err(|e| {
                    GalleryError::OutputDir {
                        path: output_path.clone(),
                        message: e.to_string(),
                    }
                })?;
                thumbnail.output_path = Some(output_path);
                Ok(thumbnail)
            });

            match written {
                Ok(thumbnail) => batch.successful.push(thumbnail),
                Err(e) => {
                    error!("Failed to write thumbnail for {}: {}", entry.file_name, e);
                    batch.failed.push(failed(entry, &e));
                }
            }
        }

        batch.successful.sort_by_key(|t| t.index);
        batch.failed.sort_by_key(|f| f.index);
        batch.total_duration = start.elapsed();

        info!(
            "Rendered {} thumbnails ({} failed) in {:?}",
            batch.successful.len(),
            batch.failed.len(),
            batch.total_duration
        );

        Ok(batch)
    }
}

fn failed(entry: &CertificateEntry, err: &GalleryError) -> FailedThumbnail {
    FailedThumbnail {
        index: entry.index,
        file_name: entry.file_name.clone(),
        error: err.to_string(),
    }
}

/// Blend transparent areas onto a solid background.
fn apply_background(mut image: RgbaImage, (r, g, b): (u8, u8, u8)) -> RgbaImage {
    for pixel in image.pixels_mut() {
        let alpha = pixel[3] as f32 / 255.0;
        if alpha < 1.0 {
            let inv_alpha = 1.0 - alpha;
            pixel[0] = ((pixel[0] as f32 * alpha) + (r as f32 * inv_alpha)) as u8;
            pixel[1] = ((pixel[1] as f32 * alpha) + (g as f32 * inv_alpha)) as u8;
            pixel[2] = ((pixel[2] as f32 * alpha) + (b as f32 * inv_alpha)) as u8;
            pixel[3] = 255;
        }
    }

    image
}

/// Standalone PNG encoding function (Send + Sync safe for parallel execution).
fn encode_png_standalone(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);

    let mut writer = encoder.write_header().map_err(|e| {
        GalleryError::PngEncoding(format!("Failed to write PNG header: {}", e))
    })?;

    writer.write_image_data(image.as_raw()).map_err(|e| {
        GalleryError::PngEncoding(format!("Failed to write PNG data: {}", e))
    })?;

    drop(writer);

    Ok(buffer.into_inner())
}
