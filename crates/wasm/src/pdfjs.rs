//! pdf.js bindings.
//!
//! The library is expected as the global `pdfjsLib`, loaded by a script
//! tag before the gallery starts. Only the calls the gallery needs are
//! bound here.

use certificate_gallery_core::engine::{load_error, page_error, render_error};
use certificate_gallery_core::{PdfDocument, PdfEngine, PdfPage, Result, Viewport};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[wasm_bindgen]
extern "C" {
    /// The `pdfjsLib` namespace object.
    pub type PdfJsLib;

    #[wasm_bindgen(method, catch, js_name = getDocument)]
    fn get_document(this: &PdfJsLib, src: &str) -> std::result::Result<PdfLoadingTask, JsValue>;

    type PdfLoadingTask;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &PdfLoadingTask) -> js_sys::Promise;

    type PdfDocumentProxy;

    #[wasm_bindgen(method, catch, js_name = getPage)]
    fn get_page(this: &PdfDocumentProxy, number: u32) -> std::result::Result<js_sys::Promise, JsValue>;

    type PdfPageProxy;

    #[wasm_bindgen(method, catch, js_name = getViewport)]
    fn get_viewport(this: &PdfPageProxy, params: &Object) -> std::result::Result<PageViewport, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn render(this: &PdfPageProxy, params: &Object) -> std::result::Result<RenderTask, JsValue>;

    type RenderTask;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &RenderTask) -> js_sys::Promise;

    type PageViewport;

    #[wasm_bindgen(method, getter)]
    fn width(this: &PageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    fn height(this: &PageViewport) -> f64;
}

/// Best-effort text for a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn object(entries: &[(&str, &JsValue)]) -> std::result::Result<Object, JsValue> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj)
}

/// pdf.js, found on the page.
pub struct PdfJs {
    lib: PdfJsLib,
}

impl PdfJs {
    /// Look up the global `pdfjsLib`. Returns `None` when the script is not
    /// loaded.
    pub fn detect() -> Option<Self> {
        let lib = Reflect::get(&js_sys::global(), &JsValue::from_str("pdfjsLib")).ok()?;
        if lib.is_undefined() || lib.is_null() {
            return None;
        }
        Some(Self {
            lib: lib.unchecked_into(),
        })
    }

    /// Point pdf.js at its worker script.
    pub fn set_worker_src(&self, src: &str) -> std::result::Result<(), JsValue> {
        let options = Reflect::get(&self.lib, &JsValue::from_str("GlobalWorkerOptions"))?;
        if options.is_undefined() {
            return Err(JsValue::from_str("pdfjsLib.GlobalWorkerOptions is missing"));
        }
        Reflect::set(&options, &JsValue::from_str("workerSrc"), &JsValue::from_str(src))?;
        Ok(())
    }
}

/// A loaded document.
pub struct PdfJsDocument {
    path: String,
    proxy: PdfDocumentProxy,
}

/// A fetched page.
pub struct PdfJsPage {
    path: String,
    proxy: PdfPageProxy,
}

impl PdfJsPage {
    fn js_viewport(&self, scale: f64) -> std::result::Result<PageViewport, JsValue> {
        let params = object(&[("scale", &JsValue::from_f64(scale))])?;
        self.proxy.get_viewport(&params)
    }
}

impl PdfEngine for PdfJs {
    type Document = PdfJsDocument;

    async fn load_document(&self, path: &str) -> Result<PdfJsDocument> {
        let task = self
            .lib
            .get_document(path)
            .map_err(|e| load_error(path, js_message(&e)))?;
        let proxy = JsFuture::from(task.promise())
            .await
            .map_err(|e| load_error(path, js_message(&e)))?;

        Ok(PdfJsDocument {
            path: path.to_string(),
            proxy: proxy.unchecked_into(),
        })
    }
}

impl PdfDocument for PdfJsDocument {
    type Page = PdfJsPage;

    async fn page(&self, number: u32) -> Result<PdfJsPage> {
        let promise = self
            .proxy
            .get_page(number)
            .map_err(|e| page_error(&self.path, number, js_message(&e)))?;
        let proxy = JsFuture::from(promise)
            .await
            .map_err(|e| page_error(&self.path, number, js_message(&e)))?;

        Ok(PdfJsPage {
            path: self.path.clone(),
            proxy: proxy.unchecked_into(),
        })
    }
}

impl PdfPage for PdfJsPage {
    type Surface = HtmlCanvasElement;

    fn viewport(&self, scale: f64) -> Result<Viewport> {
        let viewport = self
            .js_viewport(scale)
            .map_err(|e| render_error(&self.path, js_message(&e)))?;
        Ok(Viewport {
            scale,
            width: viewport.width(),
            height: viewport.height(),
        })
    }

    async fn render(&self, canvas: &HtmlCanvasElement, viewport: &Viewport) -> Result<()> {
        let fail = |e: JsValue| render_error(&self.path, js_message(&e));

        let js_viewport = self.js_viewport(viewport.scale).map_err(fail)?;
        canvas.set_width(viewport.width as u32);
        canvas.set_height(viewport.height as u32);

        let context = canvas
            .get_context("2d")
            .map_err(fail)?
            .ok_or_else(|| render_error(&self.path, "No 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| render_error(&self.path, "Failed to cast to CanvasRenderingContext2d"))?;

        let context = JsValue::from(context);
        let js_viewport = JsValue::from(js_viewport);
        let params = object(&[("canvasContext", &context), ("viewport", &js_viewport)]).map_err(fail)?;
        let task = self.proxy.render(&params).map_err(fail)?;
        JsFuture::from(task.promise()).await.map_err(fail)?;
        Ok(())
    }
}
