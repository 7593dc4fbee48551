// Copyright (c) 2024 Mike Tsao

use core::{
    cell::{Cell, RefCell},
    fmt,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use synonym::Synonym;

/// Returned by `subscribe()`; hand it back to `unsubscribe()`.
#[derive(Synonym, Serialize, Deserialize)]
pub struct SubscriptionId(pub usize);

type SharedListener<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// A registry of listeners for events of type `E`.
///
/// [Observers::notify()] walks a snapshot of the registry, so listeners may
/// subscribe or unsubscribe while an event is in flight. A listener that is
/// already running when the same registry fires again is skipped for the
/// nested event.
pub struct Observers<E: 'static> {
    next_id: Cell<usize>,
    listeners: RefCell<Vec<(SubscriptionId, SharedListener<E>)>>,
}
impl<E: 'static> Default for Observers<E> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            listeners: Default::default(),
        }
    }
}
impl<E: 'static> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}
impl<E: 'static> Observers<E> {
    /// Adds a listener.
    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let listener: SharedListener<E> = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it wasn't registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(i, _)| *i != id);
        listeners.len() != before
    }

    /// Delivers `event` to every listener.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<SharedListener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            match listener.try_borrow_mut() {
                Ok(mut listener) => (&mut *listener)(event),
                Err(_) => log::trace!("skipping listener that is already running"),
            }
        }
    }

    /// The number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every listener.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_notify_unsubscribe() {
        let o = Observers::<i32>::default();
        let seen = Rc::new(RefCell::new(Vec::default()));

        let s = Rc::clone(&seen);
        let id = o.subscribe(move |e| s.borrow_mut().push(*e));
        assert_eq!(o.len(), 1);

        o.notify(&3);
        o.notify(&4);
        assert_eq!(*seen.borrow(), vec![3, 4]);

        assert!(o.unsubscribe(id));
        assert!(!o.unsubscribe(id), "second unsubscribe is a no-op");
        o.notify(&5);
        assert_eq!(*seen.borrow(), vec![3, 4]);
        assert!(o.is_empty());
    }

    #[test]
    fn nested_notify_skips_running_listener() {
        let o = Rc::new(Observers::<i32>::default());
        let count = Rc::new(Cell::new(0));

        let o2 = Rc::clone(&o);
        let c = Rc::clone(&count);
        o.subscribe(move |e| {
            c.set(c.get() + 1);
            if *e == 0 {
                o2.notify(&1);
            }
        });
        o.notify(&0);
        assert_eq!(count.get(), 1, "the nested event should not re-enter");
    }

    #[test]
    fn listener_may_unsubscribe_during_notify() {
        let o = Rc::new(Observers::<()>::default());
        let o2 = Rc::clone(&o);
        let id = Rc::new(Cell::new(SubscriptionId(0)));
        let id2 = Rc::clone(&id);
        id.set(o.subscribe(move |_| {
            o2.unsubscribe(id2.get());
        }));
        o.notify(&());
        assert!(o.is_empty());
    }
}
