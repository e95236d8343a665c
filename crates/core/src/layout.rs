//! Scale fitting for page previews.
//!
//! A page is fit into a bounding box with a single uniform scale factor,
//! so the aspect ratio is preserved exactly. Card previews pick the box
//! from the page orientation; the modal derives its box from the current
//! window size.

use crate::config::{ModalConfig, PreviewConfig};
use crate::error::{GalleryError, Result};
use serde::{Deserialize, Serialize};

/// Page orientation, derived from the unscaled page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Classify a page. Square pages are portrait.
    pub fn of(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// CSS class applied to a rendered preview canvas.
    pub fn css_class(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// Maximum size a rendered preview may occupy, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_width: f64,
    pub max_height: f64,
}

impl BoundingBox {
    pub const fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.max_width.is_finite()
            && self.max_height.is_finite()
            && self.max_width > 0.0
            && self.max_height > 0.0
    }
}

/// Result of fitting a page into a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFit {
    pub scale: f64,
    pub orientation: Orientation,
    pub output_width: f64,
    pub output_height: f64,
}

impl ScaleFit {
    /// Output size rounded to whole canvas pixels (at least 1x1).
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.output_width.round().max(1.0) as u32,
            self.output_height.round().max(1.0) as u32,
        )
    }
}

fn check_dimensions(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(GalleryError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Fit a `width` x `height` page into `bounds`.
///
/// `max_scale` caps upscaling of pages smaller than the box; `None` leaves
/// the scale unbounded.
pub fn fit_to_box(
    width: f64,
    height: f64,
    bounds: BoundingBox,
    max_scale: Option<f64>,
) -> Result<ScaleFit> {
    check_dimensions(width, height)?;
    if !bounds.is_valid() {
        return Err(GalleryError::InvalidConfig(format!(
            "bounding box must be positive, got {}x{}",
            bounds.max_width, bounds.max_height
        )));
    }

    let mut scale = (bounds.max_width / width).min(bounds.max_height / height);
    if let Some(cap) = max_scale {
        scale = scale.min(cap);
    }

    Ok(ScaleFit {
        scale,
        orientation: Orientation::of(width, height),
        output_width: width * scale,
        output_height: height * scale,
    })
}

/// Fit a page for a grid card, choosing the box from its orientation.
pub fn fit_preview(width: f64, height: f64, config: &PreviewConfig) -> Result<ScaleFit> {
    check_dimensions(width, height)?;
    let bounds = config.bounds_for(Orientation::of(width, height));
    fit_to_box(width, height, bounds, config.max_scale)
}

/// Box available to the modal for a window of the given size.
pub fn modal_bounds(window_width: f64, window_height: f64, config: &ModalConfig) -> BoundingBox {
    BoundingBox::new(
        window_width * config.width_fraction,
        window_height * config.height_fraction,
    )
}

/// Fit a page for the modal against the current window size.
pub fn fit_modal(
    width: f64,
    height: f64,
    window_width: f64,
    window_height: f64,
    config: &ModalConfig,
) -> Result<ScaleFit> {
    let bounds = modal_bounds(window_width, window_height, config);
    fit_to_box(width, height, bounds, None)
}
