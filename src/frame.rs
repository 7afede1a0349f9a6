use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A `requestAnimationFrame` loop owned by one effect.
///
/// The callback receives the frame timestamp in milliseconds and returns
/// `false` to stop rescheduling. Dropping the loop cancels any pending frame
/// and releases the callback.
pub struct AnimationLoop {
    tick: Tick,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start(mut frame: impl FnMut(f64) -> bool + 'static) -> Self {
        let tick: Tick = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));
        let tick_weak = Rc::downgrade(&tick);
        let handle_tick = handle.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
            handle_tick.set(None);
            if !frame(now_ms) {
                return;
            }
            if let Some(tick) = tick_weak.upgrade() {
                handle_tick.set(request_frame(&tick));
            }
        }) as Box<dyn FnMut(f64)>));
        handle.set(request_frame(&tick));
        Self { tick, handle }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        self.tick.borrow_mut().take();
    }
}

fn request_frame(tick: &Tick) -> Option<i32> {
    let w = web::window()?;
    let cb = tick.borrow();
    let id = w
        .request_animation_frame(cb.as_ref()?.as_ref().unchecked_ref())
        .ok();
    id
}

/// A single deferred callback, scheduled at most once per frame.
pub struct FrameRequest {
    callback: Closure<dyn FnMut()>,
    handle: Rc<Cell<Option<i32>>>,
}

impl FrameRequest {
    pub fn new(mut on_frame: impl FnMut() + 'static) -> Self {
        let handle = Rc::new(Cell::new(None));
        let handle_cb = handle.clone();
        let callback = Closure::wrap(Box::new(move || {
            handle_cb.set(None);
            on_frame();
        }) as Box<dyn FnMut()>);
        Self { callback, handle }
    }

    /// Schedule the callback unless one is already pending.
    pub fn request(&self) {
        if self.handle.get().is_some() {
            return;
        }
        if let Some(w) = web::window() {
            self.handle.set(
                w.request_animation_frame(self.callback.as_ref().unchecked_ref())
                    .ok(),
            );
        }
    }

    pub fn cancel(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sleep;
    use wasm_bindgen_test::*;

    fn ticking(keep_going: bool) -> (Rc<Cell<u32>>, impl FnMut(f64) -> bool + 'static) {
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        (ticks, move |_| {
            t.set(t.get() + 1);
            keep_going
        })
    }

    #[wasm_bindgen_test]
    async fn loop_runs_until_dropped() {
        let (ticks, frame) = ticking(true);
        let frame_loop = AnimationLoop::start(frame);
        sleep(150).await;
        assert!(ticks.get() > 0);
        drop(frame_loop);
        let seen = ticks.get();
        sleep(150).await;
        assert_eq!(ticks.get(), seen);
    }

    #[wasm_bindgen_test]
    async fn drop_cancels_the_pending_frame() {
        let (ticks, frame) = ticking(true);
        let frame_loop = AnimationLoop::start(frame);
        assert!(frame_loop.handle.get().is_some());
        drop(frame_loop);
        sleep(150).await;
        assert_eq!(ticks.get(), 0);
    }

    #[wasm_bindgen_test]
    async fn loop_stops_when_callback_declines() {
        let (ticks, frame) = ticking(false);
        let frame_loop = AnimationLoop::start(frame);
        sleep(150).await;
        assert_eq!(ticks.get(), 1);
        assert!(frame_loop.handle.get().is_none());
    }

    #[wasm_bindgen_test]
    async fn frame_request_coalesces_and_cancels() {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();
        let request = FrameRequest::new(move || c.set(c.get() + 1));
        request.request();
        request.request();
        request.request();
        sleep(150).await;
        assert_eq!(calls.get(), 1);

        request.request();
        request.cancel();
        sleep(150).await;
        assert_eq!(calls.get(), 1);
    }
}
