#![cfg(target_arch = "wasm32")]
use portal_fx_core::profile::{should_mount_background, should_mount_cursor};
use portal_fx_core::{DeviceProfile, FxConfig};
use wasm_bindgen::prelude::*;
use web_sys as web;

mod background;
mod constants;
mod cursor;
mod dom;
mod events;
mod frame;
mod loader;
mod parallax;
mod render;

use background::BackgroundEffect;
use cursor::CursorEffect;
use parallax::ParallaxHook;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("portal-fx starting");
    Ok(())
}

/// Everything the decorative layer mounted for one page.
///
/// Mounting never throws; effects the route or device rule out are simply
/// absent. Dropping the layer (or `unmount`) tears every effect down.
#[wasm_bindgen]
pub struct DecorationLayer {
    background: Option<BackgroundEffect>,
    cursor: Option<CursorEffect>,
    parallax: Vec<ParallaxHook>,
}

#[wasm_bindgen]
impl DecorationLayer {
    /// Mount for `path` (defaults to `location.pathname`) using the config
    /// on `<body data-fx-config>`, if any.
    pub fn mount(path: Option<String>) -> DecorationLayer {
        Self::mount_inner(path, dom::body_config())
    }

    #[wasm_bindgen(js_name = mountWithConfig)]
    pub fn mount_with_config(path: Option<String>, config_json: &str) -> DecorationLayer {
        Self::mount_inner(path, dom::parse_config(config_json))
    }

    pub fn unmount(self) {
        log::info!("[fx] unmounting");
    }

    #[wasm_bindgen(getter, js_name = hasBackground)]
    pub fn has_background(&self) -> bool {
        self.background.as_ref().is_some_and(BackgroundEffect::is_active)
    }

    #[wasm_bindgen(getter, js_name = hasCursor)]
    pub fn has_cursor(&self) -> bool {
        self.cursor.as_ref().is_some_and(CursorEffect::is_active)
    }

    #[wasm_bindgen(getter, js_name = parallaxCount)]
    pub fn parallax_count(&self) -> usize {
        self.parallax.len()
    }
}

impl DecorationLayer {
    fn mount_inner(path: Option<String>, cfg: FxConfig) -> DecorationLayer {
        let route = path.unwrap_or_else(dom::current_route);
        Self::mount_for(&route, dom::device_profile(), cfg)
    }

    fn mount_for(route: &str, profile: DeviceProfile, cfg: FxConfig) -> DecorationLayer {
        log::info!(
            "[fx] mount route={} low_power={} touch={} reduced_motion={}",
            route,
            profile.low_power,
            profile.touch_only,
            profile.reduced_motion
        );
        let background = should_mount_background(&profile, route, &cfg.floating.routes)
            .then(|| BackgroundEffect::mount(profile, &cfg))
            .flatten();
        let cursor = should_mount_cursor(&profile, route, &cfg.cursor.routes)
            .then(|| CursorEffect::mount(profile, &cfg))
            .flatten();
        let parallax = dom::window_document()
            .map(|d| parallax::attach_marked(&d, &profile, cfg.parallax))
            .unwrap_or_default();
        DecorationLayer {
            background,
            cursor,
            parallax,
        }
    }
}

/// Handle for a parallax hook attached from script.
#[wasm_bindgen]
pub struct ParallaxHandle {
    hook: Option<ParallaxHook>,
}

#[wasm_bindgen]
impl ParallaxHandle {
    /// Current CSS transform; `""` while the hook is disabled or untouched.
    pub fn transform(&self) -> String {
        self.hook
            .as_ref()
            .map(ParallaxHook::transform)
            .unwrap_or_default()
    }

    pub fn element(&self) -> Option<web::HtmlElement> {
        self.hook.as_ref().map(|h| h.element().clone())
    }

    pub fn detach(&mut self) {
        self.hook.take();
    }
}

#[wasm_bindgen(js_name = attachParallax)]
pub fn attach_parallax(element: web::HtmlElement, intensity: Option<f32>) -> ParallaxHandle {
    let cfg = dom::body_config().parallax;
    let profile: DeviceProfile = dom::device_profile();
    let intensity = intensity
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(cfg.default_intensity);
    ParallaxHandle {
        hook: Some(ParallaxHook::attach(element, intensity, &profile, cfg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{marker_selector, ATTR_LAYER, CURSOR_HIDE_STYLE_ID};
    use portal_fx_core::DeviceSignals;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// Resolve after `ms` of wall time, letting rAF and spawned tasks run.
    pub(crate) async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            if let Some(w) = web::window() {
                _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
        });
        _ = JsFuture::from(promise).await;
    }

    pub(crate) fn layer_canvas_count() -> u32 {
        dom::window_document()
            .and_then(|d| {
                d.query_selector_all(&marker_selector(ATTR_LAYER))
                    .ok()
            })
            .map(|nodes| nodes.length())
            .unwrap_or(0)
    }

    #[wasm_bindgen_test]
    async fn narrow_viewport_mounts_no_canvas() {
        sleep(500).await;
        let before = layer_canvas_count();
        let narrow = DeviceProfile::from_signals(&DeviceSignals {
            inner_width: 500.0,
            ..Default::default()
        });
        let layer = DecorationLayer::mount_for("/", narrow, FxConfig::default());
        assert!(!layer.has_background());
        assert!(!layer.has_cursor());
        sleep(200).await;
        assert_eq!(layer_canvas_count(), before);
        let document = dom::window_document().unwrap();
        assert!(document.get_element_by_id(CURSOR_HIDE_STYLE_ID).is_none());
        layer.unmount();
    }

    #[wasm_bindgen_test]
    fn excluded_route_mounts_nothing() {
        let desktop = DeviceProfile::from_signals(&DeviceSignals::default());
        let layer = DecorationLayer::mount_for("/settings/billing", desktop, FxConfig::default());
        assert!(layer.background.is_none());
        assert!(layer.cursor.is_none());
    }
}
