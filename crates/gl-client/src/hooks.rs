//! Host event subscriptions
//!
//! Hosts bind callbacks to the four notifications the client raises.
//! Callbacks run synchronously on the client's own task, in registration
//! order, and receive the event that triggered them.

use std::fmt;

use gl_core::HostEvent;

/// Callback invoked when a bound event is raised
pub type HookFn = Box<dyn FnMut(HostEvent) + Send>;

/// Handle returned by [`EventHooks::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

struct Hook {
    id: HookId,
    /// `None` matches every event
    filter: Option<HostEvent>,
    callback: HookFn,
}

/// Registry of host callbacks
#[derive(Default)]
pub struct EventHooks {
    hooks: Vec<Hook>,
    last_id: u64,
}

impl EventHooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callback` to one event
    pub fn on<F>(&mut self, event: HostEvent, callback: F) -> HookId
    where
        F: FnMut(HostEvent) + Send + 'static,
    {
        self.insert(Some(event), Box::new(callback))
    }

    /// Bind `callback` to every event
    pub fn on_any<F>(&mut self, callback: F) -> HookId
    where
        F: FnMut(HostEvent) + Send + 'static,
    {
        self.insert(None, Box::new(callback))
    }

    /// Remove a binding; returns false if it was already gone
    pub fn off(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|hook| hook.id != id);
        self.hooks.len() != before
    }

    /// Invoke every callback bound to `event`
    pub fn emit(&mut self, event: HostEvent) {
        tracing::trace!(%event, "Raising host event");
        for hook in &mut self.hooks {
            if hook.filter.map_or(true, |f| f == event) {
                (hook.callback)(event);
            }
        }
    }

    /// Whether there are no bindings
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    fn insert(&mut self, filter: Option<HostEvent>, callback: HookFn) -> HookId {
        self.last_id += 1;
        let id = HookId(self.last_id);
        self.hooks.push(Hook {
            id,
            filter,
            callback,
        });
        id
    }
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("bindings", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<HostEvent>>>, impl FnMut(HostEvent) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event| sink.lock().unwrap().push(event))
    }

    #[test]
    fn test_on_filters_by_event() {
        let mut hooks = EventHooks::new();
        let (seen, callback) = recorder();
        hooks.on(HostEvent::Message, callback);

        hooks.emit(HostEvent::Connect);
        hooks.emit(HostEvent::Message);
        hooks.emit(HostEvent::Close);

        assert_eq!(*seen.lock().unwrap(), vec![HostEvent::Message]);
    }

    #[test]
    fn test_on_any_sees_everything_in_order() {
        let mut hooks = EventHooks::new();
        let (seen, callback) = recorder();
        hooks.on_any(callback);

        hooks.emit(HostEvent::Connect);
        hooks.emit(HostEvent::Error);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![HostEvent::Connect, HostEvent::Error]
        );
    }

    #[test]
    fn test_off_removes_binding() {
        let mut hooks = EventHooks::new();
        let (seen, callback) = recorder();
        let id = hooks.on(HostEvent::Close, callback);

        assert!(hooks.off(id));
        assert!(!hooks.off(id));
        assert!(hooks.is_empty());

        hooks.emit(HostEvent::Close);
        assert!(seen.lock().unwrap().is_empty());
    }
}
