//! # Watch Listeners
//!
//! Synchronous observers of value changes. A listener registered with a
//! path only hears about mutations of that path, its ancestors, or its
//! descendants; a listener without a path hears every mutation.

use pform_core::FieldPath;
use serde_json::Value;

/// What caused a watch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// Input change routed through a registration.
    Change,
    /// Imperative `set_value`.
    Set,
    /// Field array insert/remove/reorder/update.
    ArrayAction,
    /// The whole form was reset.
    Reset,
}

/// Notification passed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct WatchEvent<'a> {
    /// Mutated path; `None` for whole-form events.
    pub name: Option<&'a FieldPath>,
    /// Cause of the mutation.
    pub kind: WatchKind,
    /// Full value tree after the mutation.
    pub values: &'a Value,
}

impl<'a> WatchEvent<'a> {
    /// Current value at `path`.
    pub fn value_at(&self, path: &FieldPath) -> Option<&'a Value> {
        path.get(self.values)
    }
}

/// Handle returned by `watch`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

type Listener = Box<dyn FnMut(&WatchEvent<'_>)>;

/// Registered listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<(WatchHandle, Option<FieldPath>, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, filter: Option<FieldPath>, listener: Listener) -> WatchHandle {
        let handle = WatchHandle(self.next);
        self.next += 1;
        self.entries.push((handle, filter, listener));
        handle
    }

    pub(crate) fn remove(&mut self, handle: WatchHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _, _)| *h != handle);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, name: Option<&FieldPath>, kind: WatchKind, values: &Value) {
        let event = WatchEvent { name, kind, values };
        for (_, filter, listener) in &mut self.entries {
            let interested = match (filter.as_ref(), name) {
                (None, _) | (Some(_), None) => true,
                (Some(f), Some(n)) => f.is_related(n),
            };
            if interested {
                listener(&event);
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn p(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_filtered_listener_hears_related_paths_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut listeners = Listeners::default();
        listeners.add(
            Some(p("addresses")),
            Box::new(move |e: &WatchEvent<'_>| sink.borrow_mut().push(e.name.map(ToString::to_string))),
        );

        let values = json!({});
        listeners.notify(Some(&p("firstName")), WatchKind::Change, &values);
        listeners.notify(Some(&p("addresses.0.city")), WatchKind::Change, &values);
        listeners.notify(None, WatchKind::Reset, &values);

        assert_eq!(
            *seen.borrow(),
            vec![Some("addresses.0.city".to_string()), None]
        );
    }

    #[test]
    fn test_remove_listener() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let mut listeners = Listeners::default();
        let handle = listeners.add(None, Box::new(move |_: &WatchEvent<'_>| *sink.borrow_mut() += 1));

        listeners.notify(None, WatchKind::Reset, &json!({}));
        assert!(listeners.remove(handle));
        assert!(!listeners.remove(handle));
        listeners.notify(None, WatchKind::Reset, &json!({}));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_event_value_at() {
        let values = json!({"firstName": "Ada"});
        let event = WatchEvent {
            name: None,
            kind: WatchKind::Set,
            values: &values,
        };
        assert_eq!(event.value_at(&p("firstName")), Some(&json!("Ada")));
    }
}
