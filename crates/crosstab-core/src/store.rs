//! The shared store and change-notification boundary.
//!
//! The store is the only medium between contexts: a process-wide key-value
//! association plus an event that fires when a key changes. Matching the
//! platform contract for such stores, change notifications reach every
//! context *except* the one that made the change; the channel layers
//! self-delivery on top.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A change observed on the shared store. `new_value: None` means the key
/// was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Handle for a registered change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Injection point for the shared store. A real deployment backs this with
/// the platform store; tests and the demo use [`MemoryHub`].
pub trait SharedStore {
    /// Current value under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`. Other contexts' listeners observe the change;
    /// this context's listeners do not.
    fn write(&self, key: &str, value: &str);

    /// Remove `key`. Other contexts observe a change with `new_value: None`
    /// when the key existed.
    fn clear(&self, key: &str);

    /// Register a listener for changes made by other contexts.
    fn on_change(&self, handler: Box<dyn Fn(&ChangeEvent)>) -> ListenerId;

    /// Remove a previously registered listener; unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

struct HubListener {
    id: u64,
    context: u64,
    handler: Rc<dyn Fn(&ChangeEvent)>,
}

#[derive(Default)]
struct HubState {
    values: HashMap<String, String>,
    listeners: Vec<HubListener>,
    next_listener: u64,
    next_context: u64,
}

/// In-memory shared store for any number of simulated contexts.
///
/// One hub stands in for the platform store; each [`MemoryHub::context`]
/// handle is one context's view of it. Writes through one handle notify the
/// listeners of every *other* handle, synchronously. Handler dispatch
/// happens after internal borrows are released, so a handler is free to
/// write to the hub in turn.
///
/// Nothing stops a handle from writing arbitrary bytes under any key; that
/// is the fault-injection surface for exercising how consumers cope with
/// tampered store content.
#[derive(Clone, Default)]
pub struct MemoryHub {
    state: Rc<RefCell<HubState>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new context's handle onto this hub.
    pub fn context(&self) -> MemoryStore {
        let mut state = self.state.borrow_mut();
        let context = state.next_context;
        state.next_context += 1;
        MemoryStore {
            hub: self.clone(),
            context,
        }
    }

    /// Inspect the stored value under `key` without going through a context.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.borrow().values.get(key).cloned()
    }

    fn notify_others(&self, origin: u64, event: &ChangeEvent) {
        let handlers: Vec<Rc<dyn Fn(&ChangeEvent)>> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.context != origin)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }
}

/// One context's handle onto a [`MemoryHub`].
#[derive(Clone)]
pub struct MemoryStore {
    hub: MemoryHub,
    context: u64,
}

impl SharedStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.hub.state.borrow().values.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.hub
            .state
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
        self.hub.notify_others(
            self.context,
            &ChangeEvent {
                key: key.to_string(),
                new_value: Some(value.to_string()),
            },
        );
    }

    fn clear(&self, key: &str) {
        let existed = self.hub.state.borrow_mut().values.remove(key).is_some();
        if existed {
            self.hub.notify_others(
                self.context,
                &ChangeEvent {
                    key: key.to_string(),
                    new_value: None,
                },
            );
        }
    }

    fn on_change(&self, handler: Box<dyn Fn(&ChangeEvent)>) -> ListenerId {
        let mut state = self.hub.state.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push(HubListener {
            id,
            context: self.context,
            handler: Rc::from(handler),
        });
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.hub
            .state
            .borrow_mut()
            .listeners
            .retain(|l| l.id != id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting_listener(store: &MemoryStore) -> (ListenerId, Rc<RefCell<Vec<ChangeEvent>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let id = {
            let seen = Rc::clone(&seen);
            store.on_change(Box::new(move |event| seen.borrow_mut().push(event.clone())))
        };
        (id, seen)
    }

    #[test]
    fn write_is_visible_to_every_handle() {
        let hub = MemoryHub::new();
        let a = hub.context();
        let b = hub.context();

        a.write("k", "v");
        assert_eq!(a.read("k").as_deref(), Some("v"));
        assert_eq!(b.read("k").as_deref(), Some("v"));
        assert_eq!(hub.value("k").as_deref(), Some("v"));
    }

    #[test]
    fn write_notifies_other_contexts_only() {
        let hub = MemoryHub::new();
        let a = hub.context();
        let b = hub.context();
        let (_, seen_a) = collecting_listener(&a);
        let (_, seen_b) = collecting_listener(&b);

        a.write("k", "v");

        assert!(seen_a.borrow().is_empty());
        let events = seen_b.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "k");
        assert_eq!(events[0].new_value.as_deref(), Some("v"));
    }

    #[test]
    fn clear_fires_none_only_when_key_existed() {
        let hub = MemoryHub::new();
        let a = hub.context();
        let b = hub.context();
        let (_, seen_b) = collecting_listener(&b);

        a.clear("absent");
        assert!(seen_b.borrow().is_empty());

        a.write("k", "v");
        a.clear("k");
        let events = seen_b.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].new_value, None);
        assert_eq!(a.read("k"), None);
    }

    #[test]
    fn remove_listener_is_idempotent() {
        let hub = MemoryHub::new();
        let a = hub.context();
        let b = hub.context();
        let (id, seen_b) = collecting_listener(&b);

        b.remove_listener(id);
        b.remove_listener(id);

        a.write("k", "v");
        assert!(seen_b.borrow().is_empty());
    }

    #[test]
    fn handler_may_write_back() {
        let hub = MemoryHub::new();
        let a = hub.context();
        let b = hub.context();

        let echo = b.clone();
        b.on_change(Box::new(move |event| {
            if event.key == "ping" {
                echo.write("pong", "ack");
            }
        }));

        a.write("ping", "1");
        assert_eq!(a.read("pong").as_deref(), Some("ack"));
    }
}
