use crate::constants::ATTR_BACKGROUND;
use crate::dom::{self, CanvasLayer};
use crate::events::{self, EventListener};
use crate::frame::AnimationLoop;
use crate::loader::load_decorative_asset;
use crate::render::{GpuObject, RenderHost};
use portal_fx_core::{
    Camera, CleanupRegistry, DeviceProfile, FloatingField, FloatingSlot, FrameGate, FxConfig,
    MaterialParams, SceneObject,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// A slot's object, pending until the asset resolves, and its GPU copy.
struct Instance {
    object: SceneObject,
    gpu: Option<GpuObject>,
}

struct BackgroundState {
    field: FloatingField,
    instances: Vec<Instance>,
    host: Option<RenderHost>,
    gate: FrameGate,
    disabled: bool,
}

impl BackgroundState {
    fn frame(&mut self, now_ms: f64) -> bool {
        if self.disabled {
            return false;
        }
        if !self.gate.ready(now_ms) {
            return true;
        }
        self.field.step(now_ms);
        let Some(host) = self.host.as_mut() else {
            return true;
        };
        for (slot, instance) in self.field.slots().iter().zip(self.instances.iter_mut()) {
            instance.object.transform.position = slot.position;
            instance.object.transform.rotation = slot.rotation;
            if let Some(gpu) = &instance.gpu {
                host.write_object(gpu, &instance.object);
            }
        }
        let draw: Vec<&GpuObject> = self
            .instances
            .iter()
            .filter(|i| i.object.is_drawable())
            .filter_map(|i| i.gpu.as_ref())
            .collect();
        host.render(&draw);
        true
    }

    fn attach_host(&mut self, host: RenderHost) {
        self.host = Some(host);
        self.on_resize();
    }

    fn on_resize(&mut self) {
        if let Some(host) = self.host.as_mut() {
            host.resize();
            let half = band_half_height(host.camera(), self.field.slots());
            self.field.set_half_height(half);
        }
    }

    /// Settle every pending slot object on the resolved asset and start it floating.
    fn populate(&mut self, template: SceneObject) {
        let Some(host) = self.host.as_ref() else {
            return;
        };
        for (i, instance) in self.instances.iter_mut().enumerate() {
            let Some(slot) = self.field.slot_mut(i) else {
                continue;
            };
            instance.object.settle(template.clone());
            instance.object.transform.position = slot.position;
            instance.object.transform.rotation = slot.rotation;
            let gpu = host.upload(&instance.object);
            host.write_object(&gpu, &instance.object);
            instance.gpu = Some(gpu);
            slot.activate();
        }
        log::info!("[background] {} instances active", self.instances.len());
    }
}

/// Largest visible half-height over the slot depths, so no slot wraps while
/// still on screen.
fn band_half_height(camera: &Camera, slots: &[FloatingSlot]) -> f32 {
    slots
        .iter()
        .map(|s| camera.visible_half_height(s.spec.base_position.z))
        .fold(0.0, f32::max)
}

/// Floating logo instances drifting behind the page content.
pub struct BackgroundEffect {
    state: Rc<RefCell<BackgroundState>>,
    _frame_loop: AnimationLoop,
    _cleanup: CleanupRegistry,
}

impl BackgroundEffect {
    pub fn mount(profile: DeviceProfile, cfg: &FxConfig) -> Option<Self> {
        let document = dom::window_document()?;
        let (container, fixed): (web::Element, bool) =
            match dom::query_marker(&document, ATTR_BACKGROUND) {
                Some(el) => (el, false),
                None => (document.body()?.into(), true),
            };

        let camera_spec = cfg.background_camera();
        let signals = dom::device_signals();
        let provisional = Camera::new(
            camera_spec,
            signals.inner_width as f32,
            signals.inner_height as f32,
        );
        let now = instant::now();
        let mut field = FloatingField::new(cfg.wheel, cfg.floating.clone(), 0.0, now, now.to_bits());
        field.set_half_height(band_half_height(&provisional, field.slots()));
        let instances = field
            .slots()
            .iter()
            .map(|_| Instance {
                object: SceneObject::pending(MaterialParams::fallback(&profile)),
                gpu: None,
            })
            .collect();

        let state = Rc::new(RefCell::new(BackgroundState {
            field,
            instances,
            host: None,
            gate: FrameGate::for_profile(&profile),
            disabled: false,
        }));

        let mut cleanup = CleanupRegistry::new();
        if let Some(window) = events::window_target() {
            let s = state.clone();
            let wheel = EventListener::listen(&window, "wheel", move |ev: web::WheelEvent| {
                s.borrow_mut().field.on_wheel(ev.delta_y(), instant::now());
            });
            events::hold(&mut cleanup, "background wheel", wheel);
            let s = state.clone();
            let resize = EventListener::listen(&window, "resize", move |_: web::Event| {
                s.borrow_mut().on_resize();
            });
            events::hold(&mut cleanup, "background resize", resize);
        }

        let s = state.clone();
        let frame_loop = AnimationLoop::start(move |now_ms| s.borrow_mut().frame(now_ms));

        let weak = Rc::downgrade(&state);
        let assets = cfg.assets.clone();
        spawn_local(async move {
            let host = match RenderHost::new(
                &container,
                CanvasLayer::Background { fixed },
                profile,
                camera_spec,
            )
            .await
            {
                Ok(host) => host,
                Err(e) => {
                    log::warn!("[background] no render context, skipping: {:?}", e);
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().disabled = true;
                    }
                    return;
                }
            };
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().attach_host(host);
            drop(state);

            let outcome =
                load_decorative_asset(&assets.logo_path, &assets.logo_spec(), &profile).await;
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().populate(outcome.into_object());
            }
        });

        log::info!("[background] mounted");
        Some(Self {
            state,
            _frame_loop: frame_loop,
            _cleanup: cleanup,
        })
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.state.borrow().disabled
    }
}

impl Drop for BackgroundEffect {
    fn drop(&mut self) {
        log::info!("[background] unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{layer_canvas_count, sleep};
    use portal_fx_core::DeviceSignals;
    use wasm_bindgen_test::*;

    fn desktop() -> DeviceProfile {
        DeviceProfile::from_signals(&DeviceSignals::default())
    }

    #[wasm_bindgen_test]
    async fn unmount_releases_listeners_and_loop() {
        let effect = BackgroundEffect::mount(desktop(), &FxConfig::default()).unwrap();
        let weak = Rc::downgrade(&effect.state);
        drop(effect);
        assert!(weak.upgrade().is_none());
        sleep(500).await;
    }

    #[wasm_bindgen_test]
    async fn unmount_leaves_no_canvas_behind() {
        sleep(500).await;
        let before = layer_canvas_count();
        let effect = BackgroundEffect::mount(desktop(), &FxConfig::default()).unwrap();
        sleep(300).await;
        drop(effect);
        sleep(1000).await;
        assert_eq!(layer_canvas_count(), before);
    }

    #[wasm_bindgen_test]
    fn wheel_before_render_context_still_drives_the_field() {
        let effect = BackgroundEffect::mount(desktop(), &FxConfig::default()).unwrap();
        let window = events::window_target().unwrap();
        let init = web::WheelEventInit::new();
        init.set_delta_y(120.0);
        let ev = web::WheelEvent::new_with_event_init_dict("wheel", &init).unwrap();
        window.dispatch_event(&ev).unwrap();
        assert!(effect.state.borrow().field.wheel().is_active());
    }
}
