use portal_fx_core::CleanupRegistry;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A registered DOM listener; removing it is tied to Drop.
pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    /// Listen for `event` on `target`, handing the handler the typed event.
    /// Events that don't cast to `E` are ignored.
    pub fn listen<E, F>(target: &web::EventTarget, event: &'static str, mut handler: F) -> Option<Self>
    where
        E: JsCast,
        F: FnMut(E) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Ok(ev) = ev.dyn_into::<E>() {
                handler(ev);
            }
        }) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(true);
        match target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &opts,
        ) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                callback,
            }),
            Err(e) => {
                log::warn!("[fx] addEventListener({}) failed: {:?}", event, e);
                None
            }
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

#[inline]
pub fn window_target() -> Option<web::EventTarget> {
    web::window().map(Into::into)
}

/// Keep `listener` registered until `cleanup` runs.
pub fn hold(cleanup: &mut CleanupRegistry, label: &'static str, listener: Option<EventListener>) {
    if let Some(listener) = listener {
        cleanup.push(label, move || drop(listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    fn detached_target() -> web::EventTarget {
        crate::dom::window_document()
            .unwrap()
            .create_element("div")
            .unwrap()
            .into()
    }

    fn fire(target: &web::EventTarget, event: &str) {
        target
            .dispatch_event(&web::Event::new(event).unwrap())
            .unwrap();
    }

    fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        (hits.clone(), hits)
    }

    #[wasm_bindgen_test]
    fn dropping_listener_unregisters_it() {
        let target = detached_target();
        let (hits, h) = counter();
        let listener = EventListener::listen(&target, "fx-ping", move |_: web::Event| {
            h.set(h.get() + 1);
        });
        assert!(listener.is_some());
        fire(&target, "fx-ping");
        assert_eq!(hits.get(), 1);
        drop(listener);
        fire(&target, "fx-ping");
        assert_eq!(hits.get(), 1);
    }

    #[wasm_bindgen_test]
    fn held_listener_lives_until_cleanup_runs() {
        let target = detached_target();
        let (hits, h) = counter();
        let mut cleanup = CleanupRegistry::new();
        let listener = EventListener::listen(&target, "fx-ping", move |_: web::Event| {
            h.set(h.get() + 1);
        });
        hold(&mut cleanup, "ping", listener);
        fire(&target, "fx-ping");
        assert_eq!(hits.get(), 1);
        drop(cleanup);
        fire(&target, "fx-ping");
        assert_eq!(hits.get(), 1);
    }

    #[wasm_bindgen_test]
    fn events_of_another_type_are_skipped() {
        let target = detached_target();
        let (hits, h) = counter();
        let _listener = EventListener::listen(&target, "fx-ping", move |_: web::WheelEvent| {
            h.set(h.get() + 1);
        });
        fire(&target, "fx-ping");
        assert_eq!(hits.get(), 0);
    }
}
