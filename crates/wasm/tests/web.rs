//! Browser tests for certificate-gallery-wasm.
//!
//! pdf.js is not loaded in the test page, so these cover the fallback
//! paths and the DOM wiring.
//!
//! Run with: wasm-pack test --headless --chrome crates/wasm

use certificate_gallery_core::GalleryConfig;
use certificate_gallery_wasm::CertificateGallery;
use js_sys::{Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r#"
    <div class="certificatesGrid"></div>
    <div id="certificateModal" class="modal" style="display: none;">
        <div class="modalContent"></div>
    </div>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn fresh_page(markup: &str) -> Document {
    let document = document();
    document.body().unwrap().set_inner_html(markup);
    document
}

fn select(document: &Document, selector: &str) -> Element {
    document
        .query_selector(selector)
        .unwrap()
        .unwrap_or_else(|| panic!("{} not found", selector))
}

fn count(document: &Document, selector: &str) -> u32 {
    document.query_selector_all(selector).unwrap().length()
}

fn display(element: &Element) -> String {
    element
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value("display")
        .unwrap()
}

fn field(value: &JsValue, name: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(name)).unwrap()
}

/// Let spawned tasks and pending microtasks run.
async fn tick() {
    let promise = Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback(&resolve)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn config(files: &[&str]) -> JsValue {
    serde_wasm_bindgen::to_value(&GalleryConfig::with_files(files.iter().copied())).unwrap()
}

#[wasm_bindgen_test]
async fn test_load_without_pdfjs_shows_placeholders() {
    let document = fresh_page(PAGE);
    let gallery = CertificateGallery::new(JsValue::UNDEFINED).unwrap();
    assert!(!gallery.has_pdf_library());
    assert_eq!(gallery.certificate_count(), 4);

    let summary = JsFuture::from(gallery.load()).await.unwrap();

    assert_eq!(field(&summary, "total").as_f64(), Some(4.0));
    assert_eq!(field(&summary, "fallbacks").as_f64(), Some(4.0));
    assert_eq!(count(&document, ".certificatesGrid > .certificateCard"), 4);
    assert_eq!(count(&document, ".certificatePlaceholder"), 4);
    assert_eq!(count(&document, "canvas"), 0);

    let placeholder = select(&document, "#certificate-2 .certificatePlaceholder");
    assert_eq!(
        placeholder.get_attribute("data-path").as_deref(),
        Some("../certificates/Introduction to Artificial Intelligence.pdf")
    );
    assert_eq!(display(&select(&document, "#loader-2")), "none");

    let title = select(&document, "#certificate-1 h3");
    assert_eq!(
        title.text_content().as_deref(),
        Some("Agile  Scrum in  Practice")
    );
    let button = select(&document, "#certificate-1 .viewCertificate");
    assert_eq!(button.get_attribute("data-index").as_deref(), Some("1"));
}

#[wasm_bindgen_test]
async fn test_reload_replaces_previous_cards() {
    let document = fresh_page(PAGE);
    let gallery = CertificateGallery::new(config(&["A.pdf", "B.pdf"])).unwrap();

    JsFuture::from(gallery.load()).await.unwrap();
    JsFuture::from(gallery.load()).await.unwrap();

    assert_eq!(count(&document, ".certificateCard"), 2);
}

#[wasm_bindgen_test]
async fn test_load_rejects_without_grid() {
    let document = fresh_page("<div class=\"somethingElse\"></div>");
    let gallery = CertificateGallery::new(JsValue::UNDEFINED).unwrap();

    let result = JsFuture::from(gallery.load()).await;

    assert!(result.is_err());
    assert_eq!(count(&document, ".certificateCard"), 0);
}

#[wasm_bindgen_test]
fn test_invalid_config_is_rejected() {
    fresh_page(PAGE);
    let bad = js_sys::Object::new();
    Reflect::set(&bad, &"strategy".into(), &"sideways".into()).unwrap();

    assert!(CertificateGallery::new(bad.into()).is_err());
}

#[wasm_bindgen_test]
async fn test_modal_fallback_and_close() {
    let document = fresh_page(PAGE);
    let gallery = CertificateGallery::new(config(&["DataScience.pdf"])).unwrap();
    JsFuture::from(gallery.load()).await.unwrap();

    let state = JsFuture::from(gallery.open_modal(1)).await.unwrap();

    assert_eq!(state.as_string().as_deref(), Some("fallback"));
    assert!(gallery.modal_open());
    let modal = select(&document, "#certificateModal");
    assert_eq!(display(&modal), "block");
    assert_eq!(
        select(&document, ".modalCertificateInfo h3").text_content().as_deref(),
        Some("Data Science")
    );
    assert_eq!(
        select(&document, ".modalFallback p").text_content().as_deref(),
        Some("PDF Preview not available")
    );
    assert_eq!(
        select(&document, ".modalFallback .viewPdfButton")
            .get_attribute("href")
            .as_deref(),
        Some("../certificates/DataScience.pdf")
    );

    gallery.close_modal().unwrap();
    assert!(!gallery.modal_open());
    assert_eq!(display(&modal), "none");
}

#[wasm_bindgen_test]
async fn test_open_unknown_certificate_rejects() {
    fresh_page(PAGE);
    let gallery = CertificateGallery::new(config(&["A.pdf"])).unwrap();

    assert!(JsFuture::from(gallery.open_modal(5)).await.is_err());
    assert!(!gallery.modal_open());
}

#[wasm_bindgen_test]
async fn test_clicks_open_and_close_modal() {
    let document = fresh_page(PAGE);
    let gallery = CertificateGallery::new(config(&["A.pdf", "B.pdf"])).unwrap();
    JsFuture::from(gallery.load()).await.unwrap();

    let button = select(&document, "#certificate-2 .viewCertificate");
    button.dyn_ref::<HtmlElement>().unwrap().click();
    tick().await;

    assert!(gallery.modal_open());
    assert_eq!(
        select(&document, ".modalCertificateInfo h3").text_content().as_deref(),
        Some("B")
    );

    // Clicks inside the content leave it open.
    select(&document, ".modalCertificateInfo h3")
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .click();
    assert!(gallery.modal_open());

    select(&document, ".closeModal")
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .click();
    assert!(!gallery.modal_open());

    button.dyn_ref::<HtmlElement>().unwrap().click();
    tick().await;
    assert!(gallery.modal_open());

    select(&document, "#certificateModal")
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .click();
    assert!(!gallery.modal_open());
}

#[wasm_bindgen_test]
async fn test_grid_added_after_creation_handles_clicks() {
    let document = fresh_page(
        r#"<div id="certificateModal" class="modal" style="display: none;">
            <div class="modalContent"></div>
        </div>"#,
    );
    let gallery = CertificateGallery::new(config(&["A.pdf", "B.pdf"])).unwrap();

    let grid = document.create_element("div").unwrap();
    grid.set_class_name("certificatesGrid");
    document.body().unwrap().append_child(&grid).unwrap();
    JsFuture::from(gallery.load()).await.unwrap();

    select(&document, "#certificate-1 .viewCertificate")
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .click();
    tick().await;

    assert!(gallery.modal_open());
    assert_eq!(
        select(&document, ".modalCertificateInfo h3").text_content().as_deref(),
        Some("A")
    );
}

#[wasm_bindgen_test]
async fn test_overlapping_loads_leave_one_card_per_entry() {
    let document = fresh_page(PAGE);
    let gallery = CertificateGallery::new(config(&["A.pdf", "B.pdf", "C.pdf"])).unwrap();

    let first = gallery.load();
    let second = gallery.load();
    let first = JsFuture::from(first).await.unwrap();
    let second = JsFuture::from(second).await.unwrap();

    assert!(field(&first, "superseded").as_bool().is_some());
    assert_eq!(field(&second, "superseded").as_bool(), Some(false));
    assert_eq!(field(&second, "fallbacks").as_f64(), Some(3.0));
    assert_eq!(count(&document, ".certificateCard"), 3);
}
