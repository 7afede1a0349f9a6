use crate::constants::ATTR_PARALLAX;
use crate::events::{self, EventListener};
use crate::frame::FrameRequest;
use glam::Vec2;
use portal_fx_core::{CleanupRegistry, DeviceProfile, ParallaxConfig, ParallaxTracker, Rect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Pointer-driven 3D tilt on one element, at most one style write per frame.
pub struct ParallaxHook {
    element: web::HtmlElement,
    tracker: Rc<RefCell<ParallaxTracker>>,
    _cleanup: CleanupRegistry,
}

impl ParallaxHook {
    /// The device check happens here, once. A disabled hook registers nothing.
    pub fn attach(
        element: web::HtmlElement,
        intensity: f32,
        profile: &DeviceProfile,
        cfg: ParallaxConfig,
    ) -> Self {
        let tracker = Rc::new(RefCell::new(ParallaxTracker::new(
            profile.allows_hover_effects(),
            intensity,
            cfg,
        )));
        let mut cleanup = CleanupRegistry::new();
        if !tracker.borrow().enabled() {
            return Self {
                element,
                tracker,
                _cleanup: cleanup,
            };
        }

        let frame = {
            let tracker = tracker.clone();
            let el = element.clone();
            Rc::new(FrameRequest::new(move || {
                let r = el.get_bounding_client_rect();
                let rect = Rect {
                    left: r.left() as f32,
                    top: r.top() as f32,
                    width: r.width() as f32,
                    height: r.height() as f32,
                };
                if let Some(css) = tracker.borrow_mut().flush(rect) {
                    _ = el.style().set_property("transform", css);
                }
            }))
        };

        let (t, f) = (tracker.clone(), frame.clone());
        let moved = EventListener::listen(&element, "pointermove", move |ev: web::PointerEvent| {
            let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
            if t.borrow_mut().on_pointer_move(client) {
                f.request();
            }
        });
        events::hold(&mut cleanup, "parallax pointermove", moved);

        let (t, f, el) = (tracker.clone(), frame.clone(), element.clone());
        let left = EventListener::listen(&element, "pointerleave", move |_: web::PointerEvent| {
            let mut t = t.borrow_mut();
            if t.on_pointer_leave() {
                f.cancel();
            }
            _ = el.style().set_property("transform", t.transform());
        });
        events::hold(&mut cleanup, "parallax pointerleave", left);
        cleanup.push("parallax frame", move || frame.cancel());

        Self {
            element,
            tracker,
            _cleanup: cleanup,
        }
    }

    #[inline]
    pub fn element(&self) -> &web::HtmlElement {
        &self.element
    }

    pub fn transform(&self) -> String {
        self.tracker.borrow().transform().to_string()
    }
}

impl Drop for ParallaxHook {
    fn drop(&mut self) {
        if self.tracker.borrow().enabled() {
            _ = self.element.style().remove_property("transform");
        }
    }
}

/// Hook every `[data-parallax]` element; the attribute value is the intensity.
pub fn attach_marked(
    document: &web::Document,
    profile: &DeviceProfile,
    cfg: ParallaxConfig,
) -> Vec<ParallaxHook> {
    let Ok(list) = document.query_selector_all(&crate::constants::marker_selector(ATTR_PARALLAX))
    else {
        return Vec::new();
    };
    let hooks: Vec<ParallaxHook> = (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web::HtmlElement>().ok())
        .map(|el| {
            let intensity = parse_intensity(el.get_attribute(ATTR_PARALLAX).as_deref(), &cfg);
            ParallaxHook::attach(el, intensity, profile, cfg)
        })
        .collect();
    if !hooks.is_empty() {
        log::info!(
            "[parallax] {} elements hooked (enabled={})",
            hooks.len(),
            profile.allows_hover_effects()
        );
    }
    hooks
}

fn parse_intensity(raw: Option<&str>, cfg: &ParallaxConfig) -> f32 {
    raw.and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(cfg.default_intensity)
}
