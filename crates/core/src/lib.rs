//! # certificate-gallery-core
//!
//! Renders a fixed list of PDF certificates as first-page previews, with an
//! enlarged modal view.
//!
//! The crate is independent of any particular PDF library or display:
//!
//! - [`engine`] describes the four calls needed from a PDF library
//! - [`view`] describes the grid and modal the gallery writes to
//! - [`gallery`] loads the catalog into cards, falling back per card
//! - [`modal`] drives the enlarged view
//! - [`layout`] holds the scale-fit rules both of them share
//!
//! The browser build plugs in pdf.js and the DOM. With the `thumbnails`
//! feature, [`pdf_renderer`] renders the same previews natively with pdfium.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certificate_gallery_core::{fit_preview, Orientation, PreviewConfig};
//!
//! let fit = fit_preview(800.0, 600.0, &PreviewConfig::default()).unwrap();
//! assert_eq!(fit.orientation, Orientation::Landscape);
//! println!("{:.1}x{:.1}", fit.output_width, fit.output_height);
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gallery;
pub mod layout;
pub mod modal;
#[cfg(feature = "thumbnails")]
pub mod pdf_renderer;
pub mod view;

// Re-export main types for convenience
pub use catalog::{display_title, Catalog, CertificateEntry};
#[cfg(feature = "thumbnails")]
pub use config::ThumbnailConfig;
pub use config::{DomConfig, GalleryConfig, LoadStrategy, ModalConfig, PreviewConfig};
pub use engine::{render_first_page, EngineSurface, PdfDocument, PdfEngine, PdfPage, Viewport};
pub use error::{GalleryError, Result};
pub use gallery::{CardReport, CardState, Gallery, LoadReport};
pub use layout::{fit_modal, fit_preview, fit_to_box, BoundingBox, Orientation, ScaleFit};
pub use modal::{modal_content, ClickTarget, ModalPresenter, ModalSession, ModalState, ModalTicket};
#[cfg(feature = "thumbnails")]
pub use pdf_renderer::{Thumbnail, ThumbnailBatch, ThumbnailRenderer};
pub use view::{CardContent, GalleryView, ModalContent, ModalFallback, ModalView};

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
