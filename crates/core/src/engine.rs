//! The PDF rendering library as seen by the gallery.
//!
//! The gallery only needs four calls from a PDF library: load a document,
//! fetch a page, measure it at a scale, and render it into a surface. The
//! browser build implements these over pdf.js; tests use in-memory engines.

#![allow(async_fn_in_trait)]

use crate::error::{GalleryError, Result};
use crate::layout::ScaleFit;
use tracing::debug;

/// Page size at a given scale, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

/// Entry point of a PDF library.
pub trait PdfEngine {
    type Document: PdfDocument;

    /// Load the document at `path`.
    async fn load_document(&self, path: &str) -> Result<Self::Document>;
}

/// A loaded PDF document.
pub trait PdfDocument {
    type Page: PdfPage;

    /// Fetch a page by its 1-based number.
    async fn page(&self, number: u32) -> Result<Self::Page>;
}

/// A single page of a loaded document.
pub trait PdfPage {
    /// What the page is rendered into (a canvas in the browser).
    type Surface;

    fn viewport(&self, scale: f64) -> Result<Viewport>;

    /// Render the page at `viewport` into `surface`, resizing the surface to
    /// the viewport first.
    async fn render(&self, surface: &Self::Surface, viewport: &Viewport) -> Result<()>;
}

/// Surface type an engine renders into.
pub type EngineSurface<E> =
    <<<E as PdfEngine>::Document as PdfDocument>::Page as PdfPage>::Surface;

/// Load `path`, fit its first page with `fit`, and render it into `surface`.
pub async fn render_first_page<E, F>(
    engine: &E,
    path: &str,
    surface: &EngineSurface<E>,
    fit: F,
) -> Result<ScaleFit>
where
    E: PdfEngine,
    F: FnOnce(f64, f64) -> Result<ScaleFit>,
{
    let document = engine.load_document(path).await?;
    let page = document.page(1).await?;

    let natural = page.viewport(1.0)?;
    let fit = fit(natural.width, natural.height)?;
    debug!(
        "Fitting {} ({}x{}) at scale {:.4} as {:?}",
        path, natural.width, natural.height, fit.scale, fit.orientation
    );

    let scaled = page.viewport(fit.scale)?;
    page.render(surface, &scaled).await?;

    Ok(fit)
}

/// Wrap a library failure during document load.
pub fn load_error(path: &str, message: impl Into<String>) -> GalleryError {
    GalleryError::DocumentLoad {
        path: path.to_string(),
        message: message.into(),
    }
}

/// Wrap a library failure during page fetch.
pub fn page_error(path: &str, page: u32, message: impl Into<String>) -> GalleryError {
    GalleryError::PageFetch {
        path: path.to_string(),
        page,
        message: message.into(),
    }
}

/// Wrap a library failure during render.
pub fn render_error(path: &str, message: impl Into<String>) -> GalleryError {
    GalleryError::Render {
        path: path.to_string(),
        message: message.into(),
    }
}
