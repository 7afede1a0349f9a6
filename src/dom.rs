use crate::constants::*;
use anyhow::anyhow;
use portal_fx_core::{DeviceProfile, DeviceSignals, FxConfig};
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Snapshot of the signals the device profile is derived from.
pub fn device_signals() -> DeviceSignals {
    let Some(w) = web::window() else {
        return DeviceSignals::default();
    };
    let px = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    let touch_capable = js_sys::Reflect::has(&w, &"ontouchstart".into()).unwrap_or(false)
        || w.navigator().max_touch_points() > 0;
    let reduced_motion = w
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);
    DeviceSignals {
        inner_width: px(w.inner_width()),
        inner_height: px(w.inner_height()),
        device_pixel_ratio: w.device_pixel_ratio(),
        touch_capable,
        reduced_motion,
    }
}

#[inline]
pub fn device_profile() -> DeviceProfile {
    DeviceProfile::from_signals(&device_signals())
}

pub fn current_route() -> String {
    web::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Layer configuration from `<body data-fx-config="...">`, or defaults.
pub fn body_config() -> FxConfig {
    let raw = window_document()
        .and_then(|d| d.body())
        .and_then(|b| b.get_attribute(ATTR_CONFIG));
    match raw {
        Some(json) => parse_config(&json),
        None => FxConfig::default(),
    }
}

pub fn parse_config(json: &str) -> FxConfig {
    FxConfig::from_json(json).unwrap_or_else(|e| {
        log::warn!("[fx] ignoring config: {}", e);
        FxConfig::default()
    })
}

#[inline]
pub fn query_marker(document: &web::Document, attr: &str) -> Option<web::Element> {
    document.query_selector(&marker_selector(attr)).ok().flatten()
}

/// Nearest ancestor (or self) of the event target carrying `attr`.
pub fn closest_marker(target: Option<web::EventTarget>, attr: &str) -> Option<web::Element> {
    let el = target?.dyn_into::<web::Element>().ok()?;
    el.closest(&marker_selector(attr)).ok().flatten()
}

/// How a canvas is laid over the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasLayer {
    /// Fills its container (absolute) or the viewport (fixed) under content.
    Background { fixed: bool },
    /// Fixed over the whole viewport, above everything.
    Overlay,
}

pub fn create_layer_canvas(
    container: &web::Element,
    layer: CanvasLayer,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow!("{:?}", e))?;
    let (position, z, kind) = match layer {
        CanvasLayer::Background { fixed: true } => ("fixed", BACKGROUND_Z_INDEX, "background"),
        CanvasLayer::Background { fixed: false } => ("absolute", BACKGROUND_Z_INDEX, "background"),
        CanvasLayer::Overlay => ("fixed", CURSOR_Z_INDEX, "overlay"),
    };
    let style = canvas.style();
    for (k, v) in [
        ("position", position),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("pointer-events", "none"),
        ("display", "block"),
    ] {
        style.set_property(k, v).map_err(|e| anyhow!("{:?}", e))?;
    }
    style
        .set_property("z-index", &z.to_string())
        .map_err(|e| anyhow!("{:?}", e))?;
    canvas.set_attribute("aria-hidden", "true").ok();
    canvas.set_attribute(ATTR_LAYER, kind).ok();
    container
        .append_child(&canvas)
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(canvas)
}

/// Match the canvas backing store to its CSS box times the capped DPR.
/// Returns the CSS size.
pub fn sync_canvas_backing_size(
    canvas: &web::HtmlCanvasElement,
    profile: &DeviceProfile,
) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let (w_px, h_px) = profile.backing_size(rect.width(), rect.height());
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    (rect.width(), rect.height())
}

/// Hides the system pointer for as long as it lives.
pub struct SystemCursorGuard {
    style: web::HtmlStyleElement,
}

impl SystemCursorGuard {
    pub fn install() -> Option<Self> {
        let document = window_document()?;
        if let Some(stale) = document.get_element_by_id(CURSOR_HIDE_STYLE_ID) {
            stale.remove();
        }
        let style: web::HtmlStyleElement = document.create_element("style").ok()?.dyn_into().ok()?;
        style.set_id(CURSOR_HIDE_STYLE_ID);
        style.set_text_content(Some(CURSOR_HIDE_CSS));
        document.head()?.append_child(&style).ok()?;
        Some(Self { style })
    }
}

impl Drop for SystemCursorGuard {
    fn drop(&mut self) {
        self.style.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn cursor_guard_removes_its_style_on_drop() {
        let document = window_document().unwrap();
        let guard = SystemCursorGuard::install().unwrap();
        assert!(document.get_element_by_id(CURSOR_HIDE_STYLE_ID).is_some());
        drop(guard);
        assert!(document.get_element_by_id(CURSOR_HIDE_STYLE_ID).is_none());
    }

    #[wasm_bindgen_test]
    fn second_guard_replaces_the_first_style() {
        let document = window_document().unwrap();
        let first = SystemCursorGuard::install().unwrap();
        let second = SystemCursorGuard::install().unwrap();
        let styles = document
            .query_selector_all(&format!("#{CURSOR_HIDE_STYLE_ID}"))
            .unwrap();
        assert_eq!(styles.length(), 1);
        drop(second);
        drop(first);
        assert!(document.get_element_by_id(CURSOR_HIDE_STYLE_ID).is_none());
    }

    #[wasm_bindgen_test]
    fn overlay_canvas_is_tagged_and_ignores_pointer() {
        let document = window_document().unwrap();
        let container = document.create_element("div").unwrap();
        let canvas = create_layer_canvas(&container, CanvasLayer::Overlay).unwrap();
        assert_eq!(canvas.get_attribute(ATTR_LAYER).as_deref(), Some("overlay"));
        assert_eq!(canvas.get_attribute("aria-hidden").as_deref(), Some("true"));
        let style = canvas.style();
        assert_eq!(style.get_property_value("pointer-events").unwrap(), "none");
        assert_eq!(style.get_property_value("position").unwrap(), "fixed");
        assert_eq!(
            style.get_property_value("z-index").unwrap(),
            CURSOR_Z_INDEX.to_string()
        );
        assert_eq!(container.child_element_count(), 1);
    }
}
