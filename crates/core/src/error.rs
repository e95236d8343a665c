//! Error types for the certificate gallery.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the certificate gallery.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// The grid element that receives certificate cards is not on the page.
    #[error("Certificates grid not found (selector '{selector}')")]
    GridMissing { selector: String },

    /// The modal overlay element is not on the page.
    #[error("Certificate modal not found (id '{id}')")]
    ModalRootMissing { id: String },

    /// The PDF rendering library is not loaded.
    #[error("PDF rendering library is not available")]
    LibraryUnavailable,

    /// The document could not be loaded.
    #[error("Failed to load PDF '{path}': {message}")]
    DocumentLoad { path: String, message: String },

    /// A page could not be fetched from a loaded document.
    #[error("Failed to get page {page} of '{path}': {message}")]
    PageFetch {
        path: String,
        page: u32,
        message: String,
    },

    /// The page could not be rendered into its surface.
    #[error("Failed to render '{path}': {message}")]
    Render { path: String, message: String },

    /// A certificate card could not be built.
    #[error("Failed to build certificate card for '{file_name}': {message}")]
    CardBuild { file_name: String, message: String },

    /// A page reported a non-positive or non-finite size.
    #[error("Invalid page dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A DOM operation failed.
    #[error("DOM error: {0}")]
    Dom(String),

    /// Pdfium library error.
    #[error("Pdfium error: {0}")]
    Pdfium(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncoding(String),

    /// Output directory creation or write failed.
    #[error("Failed to write to '{path}': {message}")]
    OutputDir { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GalleryError {
    /// Whether this error belongs to the group that collapses into the
    /// click-to-open fallback rather than an error card.
    pub fn is_preview_failure(&self) -> bool {
        matches!(
            self,
            GalleryError::LibraryUnavailable
                | GalleryError::DocumentLoad { .. }
                | GalleryError::PageFetch { .. }
                | GalleryError::Render { .. }
                | GalleryError::InvalidDimensions { .. }
        )
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_grid_missing() {
        let err = GalleryError::GridMissing {
            selector: ".certificatesGrid".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Certificates grid not found"));
        assert!(msg.contains(".certificatesGrid"));
    }

    #[test]
    fn test_error_display_document_load() {
        let err = GalleryError::DocumentLoad {
            path: "../certificates/A.pdf".to_string(),
            message: "Missing PDF".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("../certificates/A.pdf"));
        assert!(msg.contains("Missing PDF"));
    }

    #[test]
    fn test_error_display_page_fetch() {
        let err = GalleryError::PageFetch {
            path: "A.pdf".to_string(),
            page: 1,
            message: "Invalid page request".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 1"));
        assert!(msg.contains("A.pdf"));
    }

    #[test]
    fn test_error_display_card_build() {
        let err = GalleryError::CardBuild {
            file_name: "B.pdf".to_string(),
            message: "appendChild failed".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("B.pdf"));
        assert!(msg.contains("appendChild failed"));
    }

    #[test]
    fn test_preview_failures_are_classified() {
        assert!(GalleryError::LibraryUnavailable.is_preview_failure());
        assert!(GalleryError::Render {
            path: "A.pdf".into(),
            message: "boom".into()
        }
        .is_preview_failure());
        assert!(GalleryError::InvalidDimensions {
            width: 0.0,
            height: 10.0
        }
        .is_preview_failure());

        assert!(!GalleryError::Dom("detached".into()).is_preview_failure());
        assert!(!GalleryError::GridMissing {
            selector: ".grid".into()
        }
        .is_preview_failure());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GalleryError = io_err.into();
        match err {
            GalleryError::Io(_) => (),
            _ => panic!("Expected Io"),
        }
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GalleryError = json_err.into();
        assert!(format!("{}", err).contains("Invalid configuration JSON"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);

        fn returns_error() -> Result<i32> {
            Err(GalleryError::LibraryUnavailable)
        }
        assert!(returns_error().is_err());
    }
}
