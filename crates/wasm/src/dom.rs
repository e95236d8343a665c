//! DOM-backed grid and modal.
//!
//! All markup is built node by node with text content, so file names and
//! titles never pass through `innerHTML`.

use crate::pdfjs::js_message;
use certificate_gallery_core::{
    CardContent, DomConfig, GalleryError, GalleryView, ModalContent, ModalFallback, ModalView,
    Result, ScaleFit,
};
use std::cell::RefCell;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, Window};

/// Attribute carrying a card's 1-based index on its "View Certificate" button.
pub const INDEX_ATTR: &str = "data-index";

/// Attribute carrying the PDF path on a fallback placeholder.
pub const PATH_ATTR: &str = "data-path";

pub fn dom_error(value: JsValue) -> GalleryError {
    GalleryError::Dom(js_message(&value))
}

fn create(document: &Document, tag: &str, class: &str) -> Result<Element> {
    let element = document.create_element(tag).map_err(dom_error)?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    Ok(element)
}

fn create_text(document: &Document, tag: &str, class: &str, text: &str) -> Result<Element> {
    let element = create(document, tag, class)?;
    element.set_text_content(Some(text));
    Ok(element)
}

fn append(parent: &Element, child: &Element) -> Result<()> {
    parent.append_child(child).map_err(dom_error)?;
    Ok(())
}

fn set_display(element: &Element, value: &str) -> Result<()> {
    if let Some(element) = element.dyn_ref::<HtmlElement>() {
        element
            .style()
            .set_property("display", value)
            .map_err(dom_error)?;
    }
    Ok(())
}

fn by_id(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| GalleryError::Dom(format!("Element '{}' not found", id)))
}

/// Spinner plus "Loading Certificate..." text.
fn loader(document: &Document, class: &str) -> Result<Element> {
    let loader = create(document, "div", class)?;
    append(&loader, &create(document, "div", "loading-spinner")?)?;
    append(&loader, &create_text(document, "p", "", "Loading Certificate...")?)?;
    Ok(loader)
}

fn link(document: &Document, class: &str, path: &str, text: &str) -> Result<Element> {
    let a = create_text(document, "a", class, text)?;
    a.set_attribute("href", path).map_err(dom_error)?;
    a.set_attribute("target", "_blank").map_err(dom_error)?;
    Ok(a)
}

fn card_id(index: usize) -> String {
    format!("certificate-{}", index)
}

fn loader_id(index: usize) -> String {
    format!("loader-{}", index)
}

fn canvas_id(index: usize) -> String {
    format!("pdf-canvas-{}", index)
}

// ============================================================================
// Grid
// ============================================================================

/// The certificate grid, looked up by selector on every reset.
pub struct DomGridView {
    document: Document,
    selector: String,
    grid: RefCell<Option<Element>>,
}

impl DomGridView {
    pub fn new(document: Document, dom: &DomConfig) -> Self {
        Self {
            document,
            selector: dom.grid_selector.clone(),
            grid: RefCell::new(None),
        }
    }

    fn grid(&self) -> Result<Element> {
        self.grid
            .borrow()
            .clone()
            .ok_or_else(|| GalleryError::GridMissing {
                selector: self.selector.clone(),
            })
    }

    fn overlay(&self, card: &CardContent) -> Result<Element> {
        let doc = &self.document;
        let overlay = create(doc, "div", "certificateOverlay")?;
        let content = create(doc, "div", "certificateOverlayContent")?;
        append(&content, &create_text(doc, "h3", "", &card.title)?)?;
        append(
            &content,
            &create_text(doc, "p", "", &format!("Issued by: {}", card.issuer))?,
        )?;
        append(&content, &create_text(doc, "p", "", &card.category)?)?;

        let button = create_text(doc, "button", "viewCertificate", "View Certificate")?;
        button
            .set_attribute(INDEX_ATTR, &card.index.to_string())
            .map_err(dom_error)?;
        append(&content, &button)?;

        append(&overlay, &content)?;
        Ok(overlay)
    }
}

impl GalleryView for DomGridView {
    type Surface = HtmlCanvasElement;

    fn reset(&self) -> Result<()> {
        let grid = self
            .document
            .query_selector(&self.selector)
            .map_err(dom_error)?
            .ok_or_else(|| GalleryError::GridMissing {
                selector: self.selector.clone(),
            })?;
        grid.set_inner_html("");
        *self.grid.borrow_mut() = Some(grid);
        Ok(())
    }

    fn append_card(&self, card: &CardContent) -> Result<HtmlCanvasElement> {
        let doc = &self.document;
        let grid = self.grid()?;

        let element = create(doc, "div", "certificateCard")?;
        element.set_id(&card_id(card.index));

        let container = create(doc, "div", "certificateImageContainer")?;
        let spinner = loader(doc, "certificateLoader")?;
        spinner.set_id(&loader_id(card.index));
        append(&container, &spinner)?;

        let canvas = create(doc, "canvas", "certificateCanvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GalleryError::Dom("Element is not a canvas".to_string()))?;
        canvas.set_id(&canvas_id(card.index));
        set_display(&canvas, "none")?;
        append(&container, &canvas)?;

        append(&container, &self.overlay(card)?)?;
        append(&element, &container)?;
        append(&grid, &element)?;
        Ok(canvas)
    }

    fn show_preview(&self, index: usize, canvas: &HtmlCanvasElement, fit: &ScaleFit) -> Result<()> {
        canvas.set_class_name(&format!("certificateCanvas {}", fit.orientation.css_class()));
        if let Some(loader) = self.document.get_element_by_id(&loader_id(index)) {
            set_display(&loader, "none")?;
        }
        set_display(canvas, "block")
    }

    fn show_fallback(&self, index: usize, path: &str) -> Result<()> {
        let doc = &self.document;
        if let Some(loader) = doc.get_element_by_id(&loader_id(index)) {
            set_display(&loader, "none")?;
        }

        let placeholder = create(doc, "div", "certificatePlaceholder")?;
        placeholder.set_attribute(PATH_ATTR, path).map_err(dom_error)?;
        let content = create(doc, "div", "placeholderContent")?;
        append(&content, &create_text(doc, "i", "pdf-icon", "📄")?)?;
        append(&content, &create_text(doc, "h4", "", "PDF Certificate")?)?;
        append(&content, &create_text(doc, "p", "", "Click to view PDF")?)?;
        append(&placeholder, &content)?;

        let canvas = by_id(doc, &canvas_id(index))?;
        canvas.replace_with_with_node_1(&placeholder).map_err(dom_error)
    }

    fn show_error_card(&self, index: usize, file_name: &str) -> Result<()> {
        let doc = &self.document;
        let card = create(doc, "div", "certificateCard error-card")?;
        card.set_id(&card_id(index));
        let container = create(doc, "div", "certificateImageContainer")?;
        let body = create(doc, "div", "certificateError")?;
        append(&body, &create_text(doc, "h3", "", "Error Loading Certificate")?)?;
        append(&body, &create_text(doc, "p", "", file_name)?)?;
        append(&body, &create_text(doc, "p", "", "Please check if the file exists")?)?;
        append(&container, &body)?;
        append(&card, &container)?;

        match doc.get_element_by_id(&card_id(index)) {
            Some(existing) => existing.replace_with_with_node_1(&card).map_err(dom_error),
            None => append(&self.grid()?, &card),
        }
    }
}

// ============================================================================
// Modal
// ============================================================================

/// The modal overlay, looked up by id when opened.
pub struct DomModalView {
    window: Window,
    document: Document,
    modal_id: String,
    content_selector: String,
}

impl DomModalView {
    pub fn new(window: Window, document: Document, dom: &DomConfig) -> Self {
        Self {
            window,
            document,
            modal_id: dom.modal_id.clone(),
            content_selector: dom.content_selector.clone(),
        }
    }

    /// The overlay element, if it is on the page.
    pub fn root(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.modal_id)
    }

    fn require_root(&self) -> Result<Element> {
        self.root().ok_or_else(|| GalleryError::ModalRootMissing {
            id: self.modal_id.clone(),
        })
    }

    fn content(&self) -> Result<Element> {
        self.require_root()?
            .query_selector(&self.content_selector)
            .map_err(dom_error)?
            .ok_or_else(|| {
                GalleryError::Dom(format!("Modal content '{}' not found", self.content_selector))
            })
    }

    fn modal_loader(&self) -> Result<Element> {
        self.content()?
            .query_selector(".modalLoader")
            .map_err(dom_error)?
            .ok_or_else(|| GalleryError::Dom("Modal loader not found".to_string()))
    }

    fn info(&self, content: &ModalContent) -> Result<Element> {
        let doc = &self.document;
        let info = create(doc, "div", "modalCertificateInfo")?;
        append(&info, &create_text(doc, "h3", "", &content.title)?)?;
        append(
            &info,
            &create_text(doc, "p", "", &format!("Issued by: {}", content.organization))?,
        )?;
        append(
            &info,
            &create_text(doc, "p", "", &format!("Date: {}", content.date))?,
        )?;
        append(
            &info,
            &link(doc, "downloadCertificate", &content.path, "Download PDF")?,
        )?;
        Ok(info)
    }
}

impl ModalView for DomModalView {
    type Surface = HtmlCanvasElement;

    fn window_size(&self) -> (f64, f64) {
        let read = |name: &str, value: std::result::Result<JsValue, JsValue>| {
            match value.map(|v| v.as_f64()) {
                Ok(Some(size)) => size,
                Ok(None) => {
                    warn!("Window {} is not a number, fitting the modal to 0", name);
                    0.0
                }
                Err(e) => {
                    warn!("Failed to read window {}: {}", name, js_message(&e));
                    0.0
                }
            }
        };
        (
            read("width", self.window.inner_width()),
            read("height", self.window.inner_height()),
        )
    }

    fn open(&self, content: &ModalContent) -> Result<()> {
        let doc = &self.document;
        let root = self.require_root()?;
        let body = self.content()?;
        body.set_inner_html("");

        append(&body, &create_text(doc, "span", "closeModal", "\u{00d7}")?)?;
        append(&body, &loader(doc, "modalLoader")?)?;
        append(&body, &self.info(content)?)?;

        set_display(&root, "block")
    }

    fn create_surface(&self) -> Result<HtmlCanvasElement> {
        create(&self.document, "canvas", "")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GalleryError::Dom("Element is not a canvas".to_string()))
    }

    fn show_page(&self, canvas: &HtmlCanvasElement, _fit: &ScaleFit) -> Result<()> {
        canvas.set_class_name("modalCertificateImage");
        self.modal_loader()?
            .replace_with_with_node_1(canvas)
            .map_err(dom_error)
    }

    fn show_fallback(&self, path: &str, reason: ModalFallback) -> Result<()> {
        let doc = &self.document;
        let loader = self.modal_loader()?;
        loader.set_inner_html("");

        let body = match reason {
            ModalFallback::Unavailable => {
                let body = create(doc, "div", "modalFallback")?;
                append(&body, &create_text(doc, "i", "pdf-icon", "📄")?)?;
                append(&body, &create_text(doc, "p", "", "PDF Preview not available")?)?;
                body
            }
            ModalFallback::Failed => {
                let body = create(doc, "div", "modalError")?;
                append(&body, &create_text(doc, "p", "", "Error loading certificate")?)?;
                body
            }
        };
        append(&body, &link(doc, "viewPdfButton", path, "Open PDF in New Tab")?)?;
        append(&loader, &body)
    }

    fn close(&self) -> Result<()> {
        match self.root() {
            Some(root) => set_display(&root, "none"),
            None => Ok(()),
        }
    }
}
