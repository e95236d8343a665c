//! Enlarged certificate view.
//!
//! At most one modal session is live. Opening replaces whatever was shown
//! before; closing discards the session. Each session carries a generation
//! number so a render that completes after its session was closed or
//! replaced leaves the modal untouched.

use crate::catalog::CertificateEntry;
use crate::config::{GalleryConfig, ModalConfig};
use crate::engine::{render_first_page, EngineSurface, PdfEngine};
use crate::error::Result;
use crate::layout::fit_modal;
use crate::view::{ModalContent, ModalFallback, ModalView};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, error, info};

/// What the open modal is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Loading,
    Rendered,
    /// Download link shown because no PDF library is available.
    FallbackLink,
    /// Download link shown because the document failed to load or render.
    Error,
}

/// The live modal session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSession {
    pub content: ModalContent,
    pub state: ModalState,
    generation: u64,
}

/// Handle to the session created by [`ModalPresenter::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTicket(u64);

/// Where a click inside the overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay background itself.
    Backdrop,
    /// The close control.
    CloseControl,
    /// Anything inside the modal content.
    Content,
}

/// Modal contents for a catalog entry: the category is shown as the
/// issuing organization and the configured year as the date.
pub fn modal_content(entry: &CertificateEntry, config: &GalleryConfig) -> ModalContent {
    ModalContent {
        path: entry.path.clone(),
        title: entry.title.clone(),
        organization: config.category.clone(),
        date: config.year.clone(),
    }
}

pub struct ModalPresenter<E, V> {
    config: ModalConfig,
    engine: Option<Rc<E>>,
    view: V,
    session: RefCell<Option<ModalSession>>,
    generation: Cell<u64>,
}

impl<E, V> ModalPresenter<E, V>
where
    E: PdfEngine,
    V: ModalView<Surface = EngineSurface<E>>,
{
    pub fn new(config: ModalConfig, engine: Option<Rc<E>>, view: V) -> Self {
        Self {
            config,
            engine,
            view,
            session: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// A copy of the live session, if any.
    pub fn session(&self) -> Option<ModalSession> {
        self.session.borrow().clone()
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_current(&self, ticket: ModalTicket) -> bool {
        self.session
            .borrow()
            .as_ref()
            .is_some_and(|s| s.generation == ticket.0)
    }

    fn set_state(&self, ticket: ModalTicket, state: ModalState) {
        if let Some(session) = self.session.borrow_mut().as_mut() {
            if session.generation == ticket.0 {
                session.state = state;
            }
        }
    }

    /// Rebuild the modal for `content` and show it in its loading state.
    ///
    /// If the view cannot be rebuilt, the previous session is dropped as
    /// well, since its contents are gone.
    pub fn open(&self, content: ModalContent) -> Result<ModalTicket> {
        if let Err(e) = self.view.open(&content) {
            error!("Failed to open certificate {}: {}", content.path, e);
            self.next_generation();
            self.session.borrow_mut().take();
            return Err(e);
        }

        let generation = self.next_generation();
        info!("Opening certificate {}", content.path);
        *self.session.borrow_mut() = Some(ModalSession {
            content,
            state: ModalState::Loading,
            generation,
        });
        Ok(ModalTicket(generation))
    }

    /// Render the page for the session behind `ticket`.
    ///
    /// Returns `None` when that session was closed or replaced, in which
    /// case the modal is not touched.
    pub async fn render(&self, ticket: ModalTicket) -> Result<Option<ModalState>> {
        let path = match self.session.borrow().as_ref() {
            Some(s) if s.generation == ticket.0 => s.content.path.clone(),
            _ => return Ok(None),
        };

        let Some(engine) = self.engine.as_deref() else {
            info!("PDF library not loaded, showing download link for {}", path);
            self.view.show_fallback(&path, ModalFallback::Unavailable)?;
            self.set_state(ticket, ModalState::FallbackLink);
            return Ok(Some(ModalState::FallbackLink));
        };

        let surface = self.view.create_surface()?;
        let (window_width, window_height) = self.view.window_size();
        let result = render_first_page(engine, &path, &surface, |w, h| {
            fit_modal(w, h, window_width, window_height, &self.config)
        })
        .await;

        if !self.is_current(ticket) {
            debug!("Discarding stale modal render for {}", path);
            return Ok(None);
        }

        let state = match result {
            Ok(fit) => {
                self.view.show_page(&surface, &fit)?;
                ModalState::Rendered
            }
            Err(e) => {
                error!("Error loading PDF in modal: {}", e);
                self.view.show_fallback(&path, ModalFallback::Failed)?;
                ModalState::Error
            }
        };
        self.set_state(ticket, state);
        Ok(Some(state))
    }

    /// Open the modal for `content` and render its page.
    pub async fn show(&self, content: ModalContent) -> Result<Option<ModalState>> {
        let ticket = self.open(content)?;
        self.render(ticket).await
    }

    /// Close the modal, discarding the session. Closing a closed modal is a
    /// no-op.
    pub fn close(&self) -> Result<()> {
        self.next_generation();
        if self.session.borrow_mut().take().is_some() {
            self.view.close()?;
        }
        Ok(())
    }

    /// Handle a click inside the overlay. Returns whether the modal closed.
    pub fn handle_click(&self, target: ClickTarget) -> Result<bool> {
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseControl if self.is_open() => {
                self.close()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Failure, MockEngine};
    use crate::view::testing::{ModalEvent, RecordingModal};

    fn content(path: &str, title: &str) -> ModalContent {
        ModalContent {
            path: path.to_string(),
            title: title.to_string(),
            organization: "Professional Certificate".to_string(),
            date: "2024".to_string(),
        }
    }

    fn presenter(engine: MockEngine) -> ModalPresenter<MockEngine, RecordingModal> {
        ModalPresenter::new(
            ModalConfig::default(),
            Some(Rc::new(engine)),
            RecordingModal::new(1000.0, 1000.0),
        )
    }

    #[test]
    fn test_modal_content_for_entry() {
        let config = GalleryConfig::default();
        let entry = CertificateEntry::new("../certificates", "DataScience.pdf", 3);
        let content = modal_content(&entry, &config);

        assert_eq!(content.path, "../certificates/DataScience.pdf");
        assert_eq!(content.title, "Data Science");
        assert_eq!(content.organization, "Professional Certificate");
        assert_eq!(content.date, "2024");
    }

    #[tokio::test]
    async fn test_show_renders_at_window_scale() {
        let engine = MockEngine::new().with_page("A.pdf", 800.0, 600.0);
        let modal = presenter(engine);

        let state = modal.show(content("A.pdf", "A")).await.unwrap();

        assert_eq!(state, Some(ModalState::Rendered));
        // Box is 800x700 for a 1000x1000 window
        assert_eq!(
            modal.view().events(),
            vec![ModalEvent::Open(content("A.pdf", "A")), ModalEvent::Page(1.0)]
        );
        assert_eq!(modal.session().unwrap().state, ModalState::Rendered);
    }

    #[tokio::test]
    async fn test_window_size_is_read_on_each_open() {
        let engine = MockEngine::new().with_page("A.pdf", 800.0, 600.0);
        let modal = presenter(engine);

        modal.show(content("A.pdf", "A")).await.unwrap();
        modal.view().window.set((500.0, 500.0));
        modal.show(content("A.pdf", "A")).await.unwrap();

        // Box is 400x350 now
        assert_eq!(modal.view().events().last(), Some(&ModalEvent::Page(0.5)));
    }

    #[tokio::test]
    async fn test_second_open_replaces_first() {
        let engine = MockEngine::new()
            .with_page("A.pdf", 800.0, 600.0)
            .with_page("B.pdf", 600.0, 800.0);
        let modal = presenter(engine);

        let first = modal.open(content("A.pdf", "First")).unwrap();
        let second = modal.open(content("B.pdf", "Second")).unwrap();

        assert_eq!(modal.render(first).await.unwrap(), None);
        assert_eq!(modal.render(second).await.unwrap(), Some(ModalState::Rendered));

        let session = modal.session().unwrap();
        assert_eq!(session.content.title, "Second");
        assert_eq!(session.content.path, "B.pdf");

        let pages = modal
            .view()
            .events()
            .into_iter()
            .filter(|e| matches!(e, ModalEvent::Page(_)))
            .count();
        assert_eq!(pages, 1);
    }

    #[tokio::test]
    async fn test_close_during_render_discards_result() {
        let engine = MockEngine::new().with_page("A.pdf", 800.0, 600.0);
        let release = engine.gate("A.pdf");
        let modal = presenter(engine);

        let (state, _) = futures::join!(modal.show(content("A.pdf", "A")), async {
            while !modal.is_open() {
                tokio::task::yield_now().await;
            }
            modal.close().unwrap();
            release.send(()).unwrap();
        });

        assert_eq!(state.unwrap(), None);
        assert!(!modal.is_open());
        assert_eq!(
            modal.view().events(),
            vec![ModalEvent::Open(content("A.pdf", "A")), ModalEvent::Close]
        );
    }

    #[tokio::test]
    async fn test_reopen_during_render_keeps_new_session() {
        let engine = MockEngine::new()
            .with_page("A.pdf", 800.0, 600.0)
            .with_page("B.pdf", 800.0, 600.0);
        let release = engine.gate("A.pdf");
        let modal = presenter(engine);

        let (first, second) = futures::join!(modal.show(content("A.pdf", "A")), async {
            while !modal.is_open() {
                tokio::task::yield_now().await;
            }
            let ticket = modal.open(content("B.pdf", "B")).unwrap();
            release.send(()).unwrap();
            modal.render(ticket).await
        });

        assert_eq!(first.unwrap(), None);
        assert_eq!(second.unwrap(), Some(ModalState::Rendered));
        assert_eq!(modal.session().unwrap().content.title, "B");
    }

    #[tokio::test]
    async fn test_failed_open_drops_previous_session() {
        let engine = MockEngine::new()
            .with_page("A.pdf", 800.0, 600.0)
            .with_page("B.pdf", 800.0, 600.0);
        let modal = presenter(engine);

        let first = modal.open(content("A.pdf", "A")).unwrap();
        modal.view().fail_open.set(true);
        assert!(modal.open(content("B.pdf", "B")).is_err());

        assert!(!modal.is_open());
        assert_eq!(modal.render(first).await.unwrap(), None);
        assert!(!modal
            .view()
            .events()
            .iter()
            .any(|e| matches!(e, ModalEvent::Page(_))));

        modal.view().fail_open.set(false);
        let ticket = modal.open(content("B.pdf", "B")).unwrap();
        assert_eq!(modal.render(ticket).await.unwrap(), Some(ModalState::Rendered));
    }

    #[tokio::test]
    async fn test_unavailable_library_shows_download_link() {
        let modal = ModalPresenter::<MockEngine, _>::new(
            ModalConfig::default(),
            None,
            RecordingModal::new(1000.0, 800.0),
        );

        let state = modal.show(content("A.pdf", "A")).await.unwrap();

        assert_eq!(state, Some(ModalState::FallbackLink));
        assert_eq!(
            modal.view().events().last(),
            Some(&ModalEvent::Fallback("A.pdf".to_string(), ModalFallback::Unavailable))
        );
    }

    #[tokio::test]
    async fn test_render_failure_shows_error_link() {
        let engine = MockEngine::new()
            .with_page("A.pdf", 800.0, 600.0)
            .failing("A.pdf", Failure::Render);
        let modal = presenter(engine);

        let state = modal.show(content("A.pdf", "A")).await.unwrap();

        assert_eq!(state, Some(ModalState::Error));
        assert_eq!(modal.session().unwrap().state, ModalState::Error);
        assert_eq!(
            modal.view().events().last(),
            Some(&ModalEvent::Fallback("A.pdf".to_string(), ModalFallback::Failed))
        );
    }

    #[tokio::test]
    async fn test_content_click_keeps_modal_open() {
        let engine = MockEngine::new().with_page("A.pdf", 800.0, 600.0);
        let modal = presenter(engine);
        modal.show(content("A.pdf", "A")).await.unwrap();

        assert!(!modal.handle_click(ClickTarget::Content).unwrap());
        assert!(modal.is_open());
        assert!(modal.view().visible.get());

        assert!(modal.handle_click(ClickTarget::Backdrop).unwrap());
        assert!(!modal.is_open());
        assert!(!modal.view().visible.get());
    }

    #[tokio::test]
    async fn test_close_control_closes() {
        let engine = MockEngine::new().with_page("A.pdf", 800.0, 600.0);
        let modal = presenter(engine);
        modal.show(content("A.pdf", "A")).await.unwrap();

        assert!(modal.handle_click(ClickTarget::CloseControl).unwrap());
        assert!(modal.session().is_none());
    }

    #[test]
    fn test_clicks_on_closed_modal_do_nothing() {
        let modal = presenter(MockEngine::new());
        assert!(!modal.handle_click(ClickTarget::Backdrop).unwrap());
        modal.close().unwrap();
        assert!(modal.view().events().is_empty());
    }
}
