// Copyright (c) 2024 Mike Tsao

use super::Key;
use crate::{
    types::{KeyUid, Value},
    util::{Observers, SubscriptionId},
};
use strum_macros::IntoStaticStr;

/// What a [KeyLine] tells its listeners.
#[derive(Clone, Copy, Debug, PartialEq, IntoStaticStr)]
pub enum KeyLineEvent {
    /// A key was inserted, replaced, or removed.
    Changed,
    /// Something decided that this key should go away. The owning param
    /// removes it in
    /// [Param::remove_marked_keys()](crate::params::Param::remove_marked_keys()).
    KeyNeedsRemove(KeyUid),
}

/// The keys of one param, kept sorted by time, at most one per time.
#[derive(Debug, Default)]
pub struct KeyLine {
    keys: Vec<Key>,
    marked: Vec<KeyUid>,
    observers: Observers<KeyLineEvent>,
}
impl KeyLine {
    /// Inserts `key` in time order. If a key already sits at exactly that
    /// time, it is replaced and returned.
    pub fn add_key(&mut self, key: Key) -> Option<Key> {
        let index = self.lower_bound(key.time());
        let displaced = if self
            .keys
            .get(index)
            .is_some_and(|k| k.time() == key.time())
        {
            Some(core::mem::replace(&mut self.keys[index], key))
        } else {
            self.keys.insert(index, key);
            None
        };
        self.observers.notify(&KeyLineEvent::Changed);
        displaced
    }

    /// Removes the key with the given uid. Returns [None] (and stays quiet)
    /// if there is no such key.
    pub fn remove_key(&mut self, uid: KeyUid) -> Option<Key> {
        let index = self.keys.iter().position(|k| k.uid() == uid)?;
        let key = self.keys.remove(index);
        self.marked.retain(|m| *m != uid);
        self.observers.notify(&KeyLineEvent::Changed);
        Some(key)
    }

    /// The key at exactly `time`.
    pub fn key_by_time(&self, time: f64) -> Option<&Key> {
        let index = self.lower_bound(time);
        self.keys.get(index).filter(|k| k.time() == time)
    }

    /// Sets the value of the key at exactly `time`, keeping its identity and
    /// easing. Returns the updated key, or [None] if there is no key there.
    pub fn set_value_at(&mut self, time: f64, value: Value) -> Option<Key> {
        let index = self.lower_bound(time);
        let key = self.keys.get_mut(index).filter(|k| k.time() == time)?;
        key.set_value(value);
        let key = key.clone();
        self.observers.notify(&KeyLineEvent::Changed);
        Some(key)
    }

    #[allow(missing_docs)]
    pub fn key(&self, uid: KeyUid) -> Option<&Key> {
        self.keys.iter().find(|k| k.uid() == uid)
    }

    /// The closest key strictly before `time`.
    pub fn prev_key(&self, time: f64) -> Option<&Key> {
        let index = self.lower_bound(time);
        index.checked_sub(1).and_then(|i| self.keys.get(i))
    }

    /// The closest key strictly after `time`.
    pub fn next_key(&self, time: f64) -> Option<&Key> {
        let index = self.keys.partition_point(|k| k.time() <= time);
        self.keys.get(index)
    }

    /// Every key time, ascending.
    pub fn key_times(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.time()).collect()
    }

    /// Visits the keys in ascending time order.
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    #[allow(missing_docs)]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Flags a key for removal by its owner and tells listeners about it.
    pub fn mark_for_removal(&mut self, uid: KeyUid) {
        if self.key(uid).is_some() && !self.marked.contains(&uid) {
            self.marked.push(uid);
            self.observers.notify(&KeyLineEvent::KeyNeedsRemove(uid));
        }
    }

    pub(crate) fn take_marked(&mut self) -> Vec<KeyUid> {
        core::mem::take(&mut self.marked)
    }

    #[allow(missing_docs)]
    pub fn subscribe(&self, listener: impl FnMut(&KeyLineEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    #[allow(missing_docs)]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Index of the first key at or after `time`.
    fn lower_bound(&self, time: f64) -> usize {
        self.keys.partition_point(|k| k.time() < time)
    }
}
