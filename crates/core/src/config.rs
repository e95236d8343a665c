//! Configuration types for the certificate gallery.

use crate::error::{GalleryError, Result};
use crate::layout::{BoundingBox, Orientation};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Certificates shown on the portfolio page, in display order.
pub const DEFAULT_CERTIFICATES: &[&str] = &[
    "Agile Scrum in Practice.pdf",
    "Introduction to Artificial Intelligence.pdf",
    "Introduction to Data Science.pdf",
    "OpenAI Generative Pre-trained Transformer 3 (GPT-3) for developers.pdf",
];

/// pdf.js worker matching the library version the page loads.
pub const DEFAULT_WORKER_SRC: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js";

/// Bounding boxes for grid card previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Box for pages wider than they are tall.
    /// Default: 500x350.
    pub landscape: BoundingBox,

    /// Box for all other pages.
    /// Default: 350x500.
    pub portrait: BoundingBox,

    /// Upper limit on the preview scale. Small pages are upscaled to fill
    /// the box when this is `None`.
    /// Default: None.
    pub max_scale: Option<f64>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            landscape: BoundingBox::new(500.0, 350.0),
            portrait: BoundingBox::new(350.0, 500.0),
            max_scale: None,
        }
    }
}

impl PreviewConfig {
    /// The box a page of the given orientation must fit.
    pub fn bounds_for(&self, orientation: Orientation) -> BoundingBox {
        match orientation {
            Orientation::Landscape => self.landscape,
            Orientation::Portrait => self.portrait,
        }
    }

    /// Cap the preview scale.
    pub fn max_scale(mut self, max_scale: f64) -> Self {
        self.max_scale = Some(max_scale);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.landscape.is_valid() || !self.portrait.is_valid() {
            return Err(GalleryError::InvalidConfig(
                "preview bounding boxes must be positive".to_string(),
            ));
        }
        if let Some(cap) = self.max_scale {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(GalleryError::InvalidConfig(
                    "max_scale must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Sizing for the enlarged modal view, relative to the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Fraction of the window width available to the page.
    /// Default: 0.8.
    pub width_fraction: f64,

    /// Fraction of the window height available to the page.
    /// Default: 0.7.
    pub height_fraction: f64,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            width_fraction: 0.8,
            height_fraction: 0.7,
        }
    }
}

impl ModalConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let in_range = |f: f64| f > 0.0 && f <= 1.0;
        if !in_range(self.width_fraction) || !in_range(self.height_fraction) {
            return Err(GalleryError::InvalidConfig(
                "modal fractions must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the catalog loader schedules preview renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Each card is built and rendered before the next one starts.
    #[default]
    Sequential,
    /// All cards are inserted first, then previews render together.
    Concurrent,
}

/// Where the gallery lives in the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConfig {
    /// Selector for the grid that receives certificate cards.
    pub grid_selector: String,
    /// Id of the modal overlay element.
    pub modal_id: String,
    /// Selector, inside the overlay, of the region rebuilt on each open.
    pub content_selector: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            grid_selector: ".certificatesGrid".to_string(),
            modal_id: "certificateModal".to_string(),
            content_selector: ".modalContent".to_string(),
        }
    }
}

/// Complete gallery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory, relative to the page, holding the certificate PDFs.
    /// Default: `../certificates`.
    pub certificate_dir: String,

    /// Certificate file names, in display order.
    pub files: Vec<String>,

    /// Issuer shown on every card.
    pub issuer: String,

    /// Category shown on every card and passed to the modal.
    pub category: String,

    /// Year shown in the modal.
    pub year: String,

    pub preview: PreviewConfig,
    pub modal: ModalConfig,
    pub strategy: LoadStrategy,
    pub dom: DomConfig,

    /// pdf.js worker script. Applied at startup when the library is present.
    pub worker_src: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            certificate_dir: "../certificates".to_string(),
            files: DEFAULT_CERTIFICATES.iter().map(|f| f.to_string()).collect(),
            issuer: "Arshad Pasha".to_string(),
            category: "Professional Certificate".to_string(),
            year: "2024".to_string(),
            preview: PreviewConfig::default(),
            modal: ModalConfig::default(),
            strategy: LoadStrategy::default(),
            dom: DomConfig::default(),
            worker_src: Some(DEFAULT_WORKER_SRC.to_string()),
        }
    }
}

impl GalleryConfig {
    /// Create a config for the given certificate files.
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the certificate directory.
    pub fn certificate_dir(mut self, dir: impl Into<String>) -> Self {
        self.certificate_dir = dir.into();
        self
    }

    /// Set the load strategy.
    pub fn strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the preview config.
    pub fn preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }

    /// Set the pdf.js worker script, or `None` to leave it untouched.
    pub fn worker_src(mut self, src: Option<String>) -> Self {
        self.worker_src = src;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        if self.certificate_dir.trim().is_empty() {
            return Err(GalleryError::InvalidConfig(
                "certificate_dir must not be empty".to_string(),
            ));
        }
        if let Some(name) = self.files.iter().find(|f| f.trim().is_empty()) {
            return Err(GalleryError::InvalidConfig(format!(
                "certificate file name must not be blank: {:?}",
                name
            )));
        }
        self.preview.validate()?;
        self.modal.validate()?;
        Ok(())
    }
}

/// Configuration for native thumbnail rendering.
#[cfg(feature = "thumbnails")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Number of threads for parallel PNG encoding.
    /// Default: number of CPU cores.
    pub render_threads: usize,

    /// Whether to keep the alpha channel (transparency).
    /// Default: false.
    pub use_alpha: bool,

    /// Background color for pages (if not using alpha).
    /// Default: white (255, 255, 255).
    pub background_color: (u8, u8, u8),
}

#[cfg(feature = "thumbnails")]
impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            render_threads: num_cpus::get(),
            use_alpha: false,
            background_color: (255, 255, 255),
        }
    }
}

#[cfg(feature = "thumbnails")]
impl ThumbnailConfig {
    /// Set the number of encoding threads.
    pub fn render_threads(mut self, threads: usize) -> Self {
        self.render_threads = threads;
        self
    }

    /// Keep transparency instead of flattening onto the background.
    pub fn use_alpha(mut self, enabled: bool) -> Self {
        self.use_alpha = enabled;
        self
    }

    /// Set the background color used when flattening.
    pub fn background_color(mut self, color: (u8, u8, u8)) -> Self {
        self.background_color = color;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.render_threads == 0 {
            return Err(GalleryError::InvalidConfig(
                "render_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
