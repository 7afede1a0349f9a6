/// Teardown callbacks owned by one mounted effect.
///
/// Listener removals, loop cancellation and DOM restores are pushed as they
/// are registered and run once, newest first, when the registry is dropped or
/// `run_all` is called.
#[derive(Default)]
pub struct CleanupRegistry {
    tasks: Vec<(&'static str, Box<dyn FnOnce()>)>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &'static str, task: impl FnOnce() + 'static) {
        self.tasks.push((label, Box::new(task)));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn run_all(&mut self) {
        while let Some((label, task)) = self.tasks.pop() {
            log::debug!("[cleanup] {}", label);
            task();
        }
    }
}

impl Drop for CleanupRegistry {
    fn drop(&mut self) {
        self.run_all();
    }
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tasks.iter().map(|(label, _)| label))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_newest_first_exactly_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut reg = CleanupRegistry::new();
            for name in ["loop", "resize", "wheel"] {
                let log = log.clone();
                reg.push(name, move || log.borrow_mut().push(name));
            }
            assert_eq!(reg.len(), 3);
            reg.run_all();
            assert!(reg.is_empty());
        }
        assert_eq!(*log.borrow(), vec!["wheel", "resize", "loop"]);
    }

    #[test]
    fn drop_runs_pending_tasks() {
        let hits = Rc::new(RefCell::new(0));
        {
            let mut reg = CleanupRegistry::new();
            let h = hits.clone();
            reg.push("count", move || *h.borrow_mut() += 1);
        }
        assert_eq!(*hits.borrow(), 1);
    }
}
