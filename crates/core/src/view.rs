//! Display surfaces the gallery writes to.
//!
//! Views only build and swap elements. Deciding which state a card or the
//! modal is in happens in [`crate::gallery`] and [`crate::modal`].

use crate::catalog::CertificateEntry;
use crate::error::Result;
use crate::layout::ScaleFit;

/// Text shown in a card's overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub index: usize,
    pub title: String,
    /// Rendered as "Issued by: {issuer}".
    pub issuer: String,
    pub category: String,
    pub path: String,
}

impl CardContent {
    pub fn new(entry: &CertificateEntry, issuer: &str, category: &str) -> Self {
        Self {
            index: entry.index,
            title: entry.title.clone(),
            issuer: issuer.to_string(),
            category: category.to_string(),
            path: entry.path.clone(),
        }
    }
}

/// The grid of certificate cards.
pub trait GalleryView {
    type Surface;

    /// Locate and empty the grid. Fails with `GridMissing` if absent.
    fn reset(&self) -> Result<()>;

    /// Append a card showing its loading indicator and return the hidden
    /// surface its preview will be drawn into.
    fn append_card(&self, card: &CardContent) -> Result<Self::Surface>;

    /// Hide the loader of card `index` and reveal its drawn surface.
    fn show_preview(&self, index: usize, surface: &Self::Surface, fit: &ScaleFit) -> Result<()>;

    /// Hide the loader of card `index` and replace its surface with a
    /// click-to-open placeholder for `path`.
    fn show_fallback(&self, index: usize, path: &str) -> Result<()>;

    /// Show a card reporting that `file_name` could not be loaded. Replaces
    /// card `index` if it was already inserted, otherwise appends.
    fn show_error_card(&self, index: usize, file_name: &str) -> Result<()>;
}

/// Contents of the modal info panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub path: String,
    pub title: String,
    pub organization: String,
    pub date: String,
}

/// Why the modal shows a link instead of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalFallback {
    /// No PDF library on the page.
    Unavailable,
    /// The library failed to load or render the document.
    Failed,
}

/// The modal overlay.
pub trait ModalView {
    type Surface;

    /// Current window size in CSS pixels.
    fn window_size(&self) -> (f64, f64);

    /// Replace the modal contents with `content` and a loading indicator,
    /// then make the overlay visible.
    fn open(&self, content: &ModalContent) -> Result<()>;

    /// A fresh, detached surface for the enlarged page.
    fn create_surface(&self) -> Result<Self::Surface>;

    /// Swap the loading indicator for the drawn surface.
    fn show_page(&self, surface: &Self::Surface, fit: &ScaleFit) -> Result<()>;

    /// Swap the loading indicator for an open-in-new-tab link to `path`.
    fn show_fallback(&self, path: &str, reason: ModalFallback) -> Result<()>;

    /// Hide the overlay.
    fn close(&self) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Views that record every call, for orchestration tests.

    use super::*;
    use crate::engine::testing::MockSurface;
    use crate::error::GalleryError;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq)]
    pub enum GridEvent {
        Reset,
        Card(usize),
        Preview(usize, f64),
        Fallback(usize, String),
        ErrorCard(usize, String),
    }

    #[derive(Default)]
    pub struct RecordingGrid {
        pub events: RefCell<Vec<GridEvent>>,
        pub cards: RefCell<Vec<CardContent>>,
        pub missing: bool,
        /// Card indices whose insertion fails.
        pub broken: Vec<usize>,
    }

    impl RecordingGrid {
        pub fn events(&self) -> Vec<GridEvent> {
            self.events.borrow().clone()
        }
    }

    impl GalleryView for RecordingGrid {
        type Surface = MockSurface;

        fn reset(&self) -> Result<()> {
            if self.missing {
                return Err(GalleryError::GridMissing {
                    selector: ".certificatesGrid".to_string(),
                });
            }
            self.events.borrow_mut().push(GridEvent::Reset);
            Ok(())
        }

        fn append_card(&self, card: &CardContent) -> Result<MockSurface> {
            if self.broken.contains(&card.index) {
                return Err(GalleryError::Dom("appendChild failed".to_string()));
            }
            self.events.borrow_mut().push(GridEvent::Card(card.index));
            self.cards.borrow_mut().push(card.clone());
            Ok(MockSurface::default())
        }

        fn show_preview(&self, index: usize, _surface: &MockSurface, fit: &ScaleFit) -> Result<()> {
            self.events
                .borrow_mut()
                .push(GridEvent::Preview(index, fit.scale));
            Ok(())
        }

        fn show_fallback(&self, index: usize, path: &str) -> Result<()> {
            self.events
                .borrow_mut()
                .push(GridEvent::Fallback(index, path.to_string()));
            Ok(())
        }

        fn show_error_card(&self, index: usize, file_name: &str) -> Result<()> {
            self.events
                .borrow_mut()
                .push(GridEvent::ErrorCard(index, file_name.to_string()));
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum ModalEvent {
        Open(ModalContent),
        Page(f64),
        Fallback(String, ModalFallback),
        Close,
    }

    pub struct RecordingModal {
        pub events: RefCell<Vec<ModalEvent>>,
        pub window: Cell<(f64, f64)>,
        pub visible: Cell<bool>,
        /// Make `open` fail as if the overlay were gone.
        pub fail_open: Cell<bool>,
    }

    impl RecordingModal {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                events: RefCell::new(Vec::new()),
                window: Cell::new((width, height)),
                visible: Cell::new(false),
                fail_open: Cell::new(false),
            }
        }

        pub fn events(&self) -> Vec<ModalEvent> {
            self.events.borrow().clone()
        }
    }

    impl ModalView for RecordingModal {
        type Surface = MockSurface;

        fn window_size(&self) -> (f64, f64) {
            self.window.get()
        }

        fn open(&self, content: &ModalContent) -> Result<()> {
            if self.fail_open.get() {
                return Err(GalleryError::ModalRootMissing {
                    id: "certificateModal".to_string(),
                });
            }
            self.visible.set(true);
            self.events
                .borrow_mut()
                .push(ModalEvent::Open(content.clone()));
            Ok(())
        }

        fn create_surface(&self) -> Result<MockSurface> {
            Ok(MockSurface::default())
        }

        fn show_page(&self, _surface: &MockSurface, fit: &ScaleFit) -> Result<()> {
            self.events.borrow_mut().push(ModalEvent::Page(fit.scale));
            Ok(())
        }

        fn show_fallback(&self, path: &str, reason: ModalFallback) -> Result<()> {
            self.events
                .borrow_mut()
                .push(ModalEvent::Fallback(path.to_string(), reason));
            Ok(())
        }

        fn close(&self) -> Result<()> {
            self.visible.set(false);
            self.events.borrow_mut().push(ModalEvent::Close);
            Ok(())
        }
    }
}
