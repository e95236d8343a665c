//! Certificate gallery for browsers.
//!
//! Renders each certificate's first page with pdf.js into the page's
//! certificate grid, and shows an enlarged copy in the certificate modal.
//! Without pdf.js on the page every card and the modal fall back to links.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CertificateGallery } from 'certificate-gallery-wasm';
//!
//! document.addEventListener('DOMContentLoaded', async () => {
//!     await init();
//!
//!     const gallery = new CertificateGallery({
//!         certificate_dir: '../certificates',
//!         strategy: 'sequential',
//!     });
//!     const summary = await gallery.load();
//!     console.log(`${summary.rendered} of ${summary.total} previews rendered`);
//! });
//! ```
//!
//! The grid and the modal overlay each get one delegated click listener,
//! removed again when the gallery is freed. The modal listener is attached
//! when the gallery is created. The grid listener is attached to whatever
//! element matches the grid selector at creation and again on every `load()`,
//! so a grid added or replaced later still gets one. "View Certificate"
//! buttons open the modal, fallback placeholders open the PDF in a new tab,
//! and the modal closes from its backdrop or close control.

use certificate_gallery_core::{
    modal_content, ClickTarget, Gallery, GalleryConfig, GalleryError, LoadReport, ModalPresenter,
    ModalState,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Element, Event, EventTarget, Window};

pub mod dom;
pub mod pdfjs;

pub use dom::{DomGridView, DomModalView};
pub use pdfjs::PdfJs;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    info!("certificate-gallery-wasm initialized");
}

/// Errors raised at the JavaScript boundary.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("No window")]
    NoWindow,

    #[error("No document")]
    NoDocument,

    #[error("Invalid gallery config: {0}")]
    Config(String),

    #[error("No certificate at position {0}")]
    UnknownCertificate(usize),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Outcome of a load, as handed to JavaScript.
#[derive(Serialize)]
struct LoadSummary {
    total: usize,
    rendered: usize,
    fallbacks: usize,
    errors: usize,
    superseded: bool,
}

impl From<&LoadReport> for LoadSummary {
    fn from(report: &LoadReport) -> Self {
        Self {
            total: report.cards.len(),
            rendered: report.rendered(),
            fallbacks: report.fallbacks(),
            errors: report.errors(),
            superseded: report.superseded,
        }
    }
}

struct Inner {
    window: Window,
    gallery: Gallery<PdfJs, DomGridView>,
    modal: ModalPresenter<PdfJs, DomModalView>,
    has_library: bool,
    grid_listener: RefCell<Option<ClickListener>>,
}

impl Inner {
    /// Make sure the element currently matching the grid selector carries
    /// the grid click listener. Replaces the listener if the grid element
    /// changed since it was attached.
    fn attach_grid_listener(self: &Rc<Self>) -> Result<(), JsValue> {
        let selector = &self.gallery.config().dom.grid_selector;
        let Some(element) = self
            .window
            .document()
            .and_then(|doc| doc.query_selector(selector).ok().flatten())
        else {
            debug!("Certificates grid '{}' not on the page yet", selector);
            return Ok(());
        };

        let target: &EventTarget = element.as_ref();
        let mut slot = self.grid_listener.borrow_mut();
        if slot.as_ref().is_some_and(|l| l.target == *target) {
            return Ok(());
        }

        let handler: Weak<Self> = Rc::downgrade(self);
        *slot = Some(ClickListener::attach(target.clone(), move |event: Event| {
            if let Some(inner) = handler.upgrade() {
                inner.handle_grid_click(&event);
            }
        })?);
        Ok(())
    }

    async fn open_modal(&self, index: usize) -> Result<Option<ModalState>, WebError> {
        let entry = self
            .gallery
            .catalog()
            .get(index)
            .ok_or(WebError::UnknownCertificate(index))?;
        let content = modal_content(entry, self.gallery.config());
        Ok(self.modal.show(content).await?)
    }

    /// Clicks inside the grid: "View Certificate" buttons and fallback
    /// placeholders.
    fn handle_grid_click(self: &Rc<Self>, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };

        if let Some(button) = target.closest(".viewCertificate").ok().flatten() {
            let Some(index) = button
                .get_attribute(dom::INDEX_ATTR)
                .and_then(|v| v.parse::<usize>().ok())
            else {
                return;
            };
            let inner = Rc::clone(self);
            spawn_local(async move {
                if let Err(e) = inner.open_modal(index).await {
                    error!("Failed to open certificate {}: {}", index, e);
                }
            });
        } else if let Some(placeholder) = target.closest(".certificatePlaceholder").ok().flatten() {
            if let Some(path) = placeholder.get_attribute(dom::PATH_ATTR) {
                if let Err(e) = self.window.open_with_url_and_target(&path, "_blank") {
                    warn!("Failed to open {}: {}", path, pdfjs::js_message(&e));
                }
            }
        }
    }

    /// Clicks on the modal overlay. Only the overlay itself counts as the
    /// backdrop, never one of its descendants.
    fn handle_modal_click(&self, root: &Element, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        let click = if root.is_same_node(Some(&*target)) {
            ClickTarget::Backdrop
        } else if target.matches(".closeModal").unwrap_or(false) {
            ClickTarget::CloseControl
        } else {
            ClickTarget::Content
        };
        if let Err(e) = self.modal.handle_click(click) {
            error!("Failed to close modal: {}", e);
        }
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// A click listener removed again when dropped.
struct ClickListener {
    target: EventTarget,
    closure: Closure<dyn FnMut(Event)>,
}

impl ClickListener {
    fn attach(target: EventTarget, handler: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        Ok(Self { target, closure })
    }
}

impl Drop for ClickListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback("click", self.closure.as_ref().unchecked_ref());
    }
}

/// The certificate gallery bound to the current page.
#[wasm_bindgen]
pub struct CertificateGallery {
    inner: Rc<Inner>,
    _listeners: Vec<ClickListener>,
}

#[wasm_bindgen]
impl CertificateGallery {
    /// Create a gallery from a config object. Missing fields take their
    /// defaults; `undefined` uses the default config.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CertificateGallery, JsValue> {
        let config = parse_config(config)?;
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;

        let engine = PdfJs::detect();
        if let (Some(lib), Some(src)) = (&engine, &config.worker_src) {
            if let Err(e) = lib.set_worker_src(src) {
                warn!("Failed to set pdf.js worker: {}", pdfjs::js_message(&e));
            }
        }
        let has_library = engine.is_some();
        let engine = engine.map(Rc::new);

        let grid = DomGridView::new(document.clone(), &config.dom);
        let modal_view = DomModalView::new(window.clone(), document, &config.dom);
        let modal_root = modal_view.root();
        let modal = ModalPresenter::new(config.modal.clone(), engine.clone(), modal_view);
        let gallery = Gallery::new(config, engine, grid).map_err(WebError::from)?;

        let inner = Rc::new(Inner {
            window,
            gallery,
            modal,
            has_library,
            grid_listener: RefCell::new(None),
        });

        inner.attach_grid_listener()?;
        let mut listeners = Vec::with_capacity(1);
        match modal_root {
            Some(root) => {
                let handler = Rc::clone(&inner);
                let target = root.clone();
                listeners.push(ClickListener::attach(target.into(), move |event: Event| {
                    handler.handle_modal_click(&root, &event)
                })?);
            }
            None => warn!("Certificate modal not found, modal clicks are not handled"),
        }

        Ok(CertificateGallery {
            inner,
            _listeners: listeners,
        })
    }

    /// Build every card. Resolves with
    /// `{ total, rendered, fallbacks, errors, superseded }`; rejects only when
    /// the grid is missing. A load overtaken by a later `load()` stops early
    /// and resolves with `superseded: true`.
    pub fn load(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            if let Err(e) = inner.attach_grid_listener() {
                warn!("Failed to attach grid click listener: {}", pdfjs::js_message(&e));
            }
            let report = inner.gallery.load().await.map_err(WebError::from)?;
            serde_wasm_bindgen::to_value(&LoadSummary::from(&report))
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
        })
    }

    /// Open the modal for the certificate at 1-based `index`. Resolves with
    /// the final state, or `undefined` when another open or a close
    /// superseded it.
    pub fn open_modal(&self, index: usize) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let state = inner.open_modal(index).await?;
            Ok(match state {
                Some(state) => JsValue::from_str(state_name(state)),
                None => JsValue::UNDEFINED,
            })
        })
    }

    pub fn close_modal(&self) -> Result<(), JsValue> {
        self.inner.modal.close().map_err(WebError::from)?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn modal_open(&self) -> bool {
        self.inner.modal.is_open()
    }

    /// Whether pdf.js was found on the page.
    #[wasm_bindgen(getter)]
    pub fn has_pdf_library(&self) -> bool {
        self.inner.has_library
    }

    #[wasm_bindgen(getter)]
    pub fn certificate_count(&self) -> usize {
        self.inner.gallery.catalog().len()
    }
}

fn parse_config(value: JsValue) -> Result<GalleryConfig, WebError> {
    if value.is_undefined() || value.is_null() {
        return Ok(GalleryConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| WebError::Config(e.to_string()))
}

fn state_name(state: ModalState) -> &'static str {
    match state {
        ModalState::Loading => "loading",
        ModalState::Rendered => "rendered",
        ModalState::FallbackLink => "fallback",
        ModalState::Error => "error",
    }
}
