use crate::constants::{ATTR_CURSOR_ACTION, ATTR_CURSOR_PULSE, PRESS_CLASS};
use crate::dom::{self, CanvasLayer, SystemCursorGuard};
use crate::events::{self, EventListener};
use crate::frame::AnimationLoop;
use crate::loader::load_decorative_asset;
use crate::render::{GpuObject, RenderHost};
use glam::Vec2;
use portal_fx_core::{
    CleanupRegistry, CursorConfig, CursorState, DeviceProfile, FrameGate, FxConfig,
    MaterialParams, PulseChange, SceneObject,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

struct CursorEffectState {
    cursor: CursorState<web::Element>,
    cfg: CursorConfig,
    pointer_inside: bool,
    host: Option<RenderHost>,
    object: SceneObject,
    gpu: Option<GpuObject>,
    pulse_target: Option<web::Element>,
    system_cursor: Option<SystemCursorGuard>,
    gate: FrameGate,
    disabled: bool,
}

impl CursorEffectState {
    fn on_pointer_move(&mut self, ev: &web::PointerEvent) {
        let pos = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
        let hovered = dom::closest_marker(ev.target(), ATTR_CURSOR_ACTION);
        self.cursor.on_pointer_move(pos, hovered, instant::now());
        self.pointer_inside = true;
    }

    fn on_pointer_leave(&mut self) {
        self.cursor.on_pointer_leave();
        self.pointer_inside = false;
    }

    fn frame(&mut self, now_ms: f64) -> bool {
        if self.disabled {
            return false;
        }
        if !self.gate.ready(now_ms) {
            return true;
        }
        match self.cursor.step(now_ms, &self.cfg) {
            Some(PulseChange::Started) => self.start_pulse(),
            Some(PulseChange::Ended) => self.end_pulse(),
            None => {}
        }
        let Some(host) = self.host.as_mut() else {
            return true;
        };
        let object = &mut self.object;
        let Some(gpu) = self.gpu.as_mut().filter(|_| object.is_drawable()) else {
            return true;
        };
        gpu.visible = self.pointer_inside && self.cursor.has_pointer();
        if gpu.visible {
            let viewport = host.css_size();
            if let Some(anchor) = host
                .camera()
                .screen_to_plane(self.cursor.smoothed(), viewport, 0.0)
            {
                object.transform.position = anchor;
            }
            object.transform.scale = self.cursor.press_scale(now_ms, &self.cfg);
            host.write_object(gpu, object);
        }
        host.render(&[&*gpu]);
        true
    }

    fn start_pulse(&mut self) {
        self.end_pulse();
        let target = dom::window_document().and_then(|d| dom::query_marker(&d, ATTR_CURSOR_PULSE));
        match target {
            Some(el) => {
                _ = el.class_list().add_1(PRESS_CLASS);
                self.pulse_target = Some(el);
            }
            None => log::debug!("[cursor] press without a pulse target"),
        }
    }

    fn end_pulse(&mut self) {
        if let Some(el) = self.pulse_target.take() {
            _ = el.class_list().remove_1(PRESS_CLASS);
        }
    }

    fn disable(&mut self) {
        self.disabled = true;
        self.end_pulse();
        self.system_cursor = None;
    }

    fn attach_host(&mut self, host: RenderHost) {
        self.host = Some(host);
        self.on_resize();
    }

    fn on_resize(&mut self) {
        if let Some(host) = self.host.as_mut() {
            host.resize();
        }
    }

    fn populate(&mut self, resolved: SceneObject) {
        if let Some(host) = self.host.as_ref() {
            self.object.settle(resolved);
            self.gpu = Some(host.upload(&self.object));
        }
    }
}

/// A 3D pointer following the mouse, with the dwell-to-press heuristic.
pub struct CursorEffect {
    state: Rc<RefCell<CursorEffectState>>,
    _frame_loop: AnimationLoop,
    _cleanup: CleanupRegistry,
}

impl CursorEffect {
    pub fn mount(profile: DeviceProfile, cfg: &FxConfig) -> Option<Self> {
        let document = dom::window_document()?;
        let body: web::Element = document.body()?.into();
        let root = document.document_element()?;

        let state = Rc::new(RefCell::new(CursorEffectState {
            cursor: CursorState::new(),
            cfg: cfg.cursor.clone(),
            pointer_inside: false,
            host: None,
            object: SceneObject::pending(MaterialParams::fallback(&profile)),
            gpu: None,
            pulse_target: None,
            system_cursor: SystemCursorGuard::install(),
            gate: FrameGate::for_profile(&profile),
            disabled: false,
        }));

        let mut cleanup = CleanupRegistry::new();
        if let Some(window) = events::window_target() {
            let s = state.clone();
            let moved = EventListener::listen(&window, "pointermove", move |ev: web::PointerEvent| {
                if ev.pointer_type() != "touch" {
                    s.borrow_mut().on_pointer_move(&ev);
                }
            });
            events::hold(&mut cleanup, "cursor pointermove", moved);
            let s = state.clone();
            let resize = EventListener::listen(&window, "resize", move |_: web::Event| {
                s.borrow_mut().on_resize();
            });
            events::hold(&mut cleanup, "cursor resize", resize);
        }
        let s = state.clone();
        let left = EventListener::listen(&root, "pointerleave", move |_: web::PointerEvent| {
            s.borrow_mut().on_pointer_leave();
        });
        events::hold(&mut cleanup, "cursor pointerleave", left);

        let s = state.clone();
        let frame_loop = AnimationLoop::start(move |now_ms| s.borrow_mut().frame(now_ms));

        let weak = Rc::downgrade(&state);
        let camera_spec = cfg.cursor_camera();
        let assets = cfg.assets.clone();
        spawn_local(async move {
            let host = match RenderHost::new(&body, CanvasLayer::Overlay, profile, camera_spec).await {
                Ok(host) => host,
                Err(e) => {
                    log::warn!("[cursor] no render context, keeping the system cursor: {:?}", e);
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().disable();
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
                load_decorative_asset(&assets.cursor_path, &assets.cursor_spec(), &profile).await;
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().populate(outcome.into_object());
            }
        });

        log::info!("[cursor] mounted");
        Some(Self {
            state,
            _frame_loop: frame_loop,
            _cleanup: cleanup,
        })
    }

    /// False once the render context failed; the system cursor is back.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.state.borrow().disabled
    }
}

impl Drop for CursorEffect {
    fn drop(&mut self) {
        self.state.borrow_mut().disable();
        log::info!("[cursor] unmounted");
    }
}
