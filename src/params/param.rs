// Copyright (c) 2024 Mike Tsao

use super::{InputView, ParamParent};
use crate::{
    easing::linear,
    error::{EngineError, Result},
    history::{CommandTarget, HistorySink, KeyAction, ParamCommand},
    keys::{Key, KeyLine, KeyLineEvent, KeyOptions, KeySave},
    orchestration::TimeSource,
    types::{interpolate, KeyUid, ParamUid, Value},
    util::{Observers, ParamSettings, SubscriptionId},
};
use core::cell::{Cell, RefCell};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    rc::{Rc, Weak},
};
use strum_macros::IntoStaticStr;

/// Which navigation affordances apply at the current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyIndicator {
    /// A key sits exactly at the current time.
    pub has_key: bool,
    /// There is a key strictly before the current time.
    pub has_prev: bool,
    /// There is a key strictly after the current time.
    pub has_next: bool,
}

/// What a [Param] tells its listeners.
#[derive(Clone, Debug, PartialEq, IntoStaticStr)]
pub enum ParamEvent {
    /// Something about the param's keys or value changed.
    Changed,
    #[allow(missing_docs)]
    KeyAdded { uid: KeyUid, time: f64 },
    #[allow(missing_docs)]
    KeyRemoved { uid: KeyUid, time: f64 },
    /// The param was hidden or shown.
    HeightChanged,
    /// The param was attached to a track or group.
    ParentSet,
    #[allow(missing_docs)]
    NameChanged,
    #[allow(missing_docs)]
    KeyIndicatorChanged(KeyIndicator),
}

/// How to create a [Param].
#[derive(Clone, Debug, Builder)]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct ParamOptions {
    /// The animated property, such as `opacity` or `left`.
    #[builder(setter(into))]
    pub name: String,
    /// The value shown when there are no keys. Falls back to
    /// [ParamSettings::default_value].
    #[builder(default, setter(into, strip_option))]
    pub default_value: Option<Value>,
    /// Whether the param's row starts out collapsed.
    #[builder(default)]
    pub hidden: bool,
    /// Keys to start with.
    #[builder(default, setter(each(name = "key")))]
    pub keys: Vec<KeySave>,
}
impl ParamOptionsBuilder {
    /// Builds the [ParamOptions].
    pub fn build(&self) -> core::result::Result<ParamOptions, ParamOptionsBuilderError> {
        let options = self.build_from_builder()?;
        if options.name.trim().is_empty() {
            return Err(ParamOptionsBuilderError::ValidationError(
                "a param needs a name".to_string(),
            ));
        }
        Ok(options)
    }
}
impl ParamOptions {
    /// Options for a visible param with no keys.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
            hidden: false,
            keys: Vec::default(),
        }
    }
}

/// The persisted form of a [Param].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamSave {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    #[serde(default)]
    pub hidden: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub keys: Vec<KeySave>,
}

struct AttachedInput {
    view: Rc<dyn InputView>,
    subscription: SubscriptionId,
}

#[derive(Debug)]
struct TimeSubscription {
    source: Weak<dyn TimeSource>,
    id: SubscriptionId,
}

/// One animatable property and its keys.
///
/// A param is shared as `Rc<Param>` among its parent, its input views'
/// listeners, and the host. All methods take `&self`, and no internal
/// borrow is held while listeners, views, the timeline, or the history run,
/// so any of them may call back into the param.
///
/// A param evaluates at the time of the timeline that its parent exposes.
/// Until it has a parent, [Param::value()] fails with
/// [EngineError::NoTimeline], though [Param::value_at()] works at any time.
pub struct Param {
    uid: ParamUid,
    name: RefCell<String>,
    hidden: Cell<bool>,
    line_height: f64,
    default_value: Value,
    key_line: RefCell<KeyLine>,
    key_line_events: Rc<RefCell<VecDeque<KeyLineEvent>>>,
    parent: RefCell<Option<ParamParent>>,
    inputs: RefCell<Vec<AttachedInput>>,
    indicator: Cell<KeyIndicator>,
    time_subscription: RefCell<Option<TimeSubscription>>,
    history: Rc<dyn HistorySink>,
    observers: Observers<ParamEvent>,
    me: Weak<Param>,
}
impl Param {
    /// Creates a param. Keys listed in `options` are loaded without touching
    /// `history`.
    pub fn new(
        options: ParamOptions,
        settings: &ParamSettings,
        history: Rc<dyn HistorySink>,
    ) -> Result<Rc<Self>> {
        let ParamOptions {
            name,
            default_value,
            hidden,
            keys,
        } = options;
        // The key line notifies while it is mutably borrowed, so its events
        // wait here until the param has let go of it.
        let key_line = KeyLine::default();
        let key_line_events: Rc<RefCell<VecDeque<KeyLineEvent>>> = Default::default();
        let queue = Rc::clone(&key_line_events);
        key_line.subscribe(move |event| queue.borrow_mut().push_back(*event));
        let param = Rc::new_cyclic(|me| Self {
            uid: ParamUid::mint(),
            name: RefCell::new(name.clone()),
            hidden: Cell::new(hidden),
            line_height: settings.line_height,
            default_value: default_value.unwrap_or_else(|| settings.default_value.clone()),
            key_line: RefCell::new(key_line),
            key_line_events,
            parent: Default::default(),
            inputs: Default::default(),
            indicator: Default::default(),
            time_subscription: Default::default(),
            history,
            observers: Default::default(),
            me: me.clone(),
        });
        param.use_save(ParamSave { name, hidden, keys })?;
        log::debug!("created param '{}' ({})", param.name(), param.uid);
        Ok(param)
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> ParamUid {
        self.uid
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Renames the param. Fails if another param in the same track or group
    /// already has that name.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if *self.name.borrow() == name {
            return Ok(());
        }
        let parent = self.parent();
        if parent.is_some_and(|p| p.has_other_param(&name, self.uid)) {
            return Err(EngineError::NameTaken { name });
        }
        *self.name.borrow_mut() = name;
        self.observers.notify(&ParamEvent::NameChanged);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn hidden(&self) -> bool {
        self.hidden.get()
    }

    /// Hides or shows the param's row.
    pub fn set_hidden(&self, hidden: bool) {
        if self.hidden.replace(hidden) != hidden {
            self.observers.notify(&ParamEvent::HeightChanged);
        }
    }

    /// The height of the param's row. Zero while hidden.
    pub fn height(&self) -> f64 {
        if self.hidden() {
            0.0
        } else {
            self.line_height
        }
    }

    /// The value shown when there are no keys at all.
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// The track or group this param belongs to.
    pub fn parent(&self) -> Option<ParamParent> {
        self.parent.borrow().clone()
    }

    /// Binds the param to its container. This happens once; the param then
    /// follows the container's timeline.
    pub fn set_parent(&self, parent: ParamParent) -> Result<()> {
        {
            let mut slot = self.parent.borrow_mut();
            if slot.is_some() {
                return Err(EngineError::ParentAlreadySet {
                    param: self.name(),
                });
            }
            *slot = Some(parent);
        }
        self.observers.notify(&ParamEvent::ParentSet);

        if let Ok(timeline) = self.timeline() {
            let me = self.me.clone();
            let id = timeline.subscribe(Box::new(move |_| {
                if let Some(param) = me.upgrade() {
                    param.on_change_time();
                }
            }));
            *self.time_subscription.borrow_mut() = Some(TimeSubscription {
                source: Rc::downgrade(&timeline),
                id,
            });
            self.on_change_time();
        }
        Ok(())
    }

    /// The timeline this param evaluates against, found through its parent.
    pub fn timeline(&self) -> Result<Rc<dyn TimeSource>> {
        self.parent
            .borrow()
            .as_ref()
            .and_then(|p| p.timeline())
            .ok_or_else(|| EngineError::NoTimeline {
                param: self.name(),
            })
    }

    fn curr_time(&self) -> Result<f64> {
        Ok(self.timeline()?.curr_time())
    }

    /// The value at the timeline's current time.
    pub fn value(&self) -> Result<Value> {
        Ok(self.value_at(self.curr_time()?))
    }

    /// The value at `time`. A key exactly at `time` wins. Between two keys,
    /// the later key's easing shapes the blend. Outside the keyed range the
    /// nearest key holds, and with no keys the default value shows.
    pub fn value_at(&self, time: f64) -> Value {
        let key_line = self.key_line.borrow();
        if let Some(key) = key_line.key_by_time(time) {
            return key.value().clone();
        }
        match (key_line.prev_key(time), key_line.next_key(time)) {
            (Some(before), Some(after)) => {
                let progress = (time - before.time()) / (after.time() - before.time());
                let ratio = after.easing().ratio(progress);
                interpolate(after.value(), before.value(), ratio)
            }
            (Some(before), None) => before.value().clone(),
            (None, Some(after)) => after.value().clone(),
            (None, None) => self.default_value.clone(),
        }
    }

    /// Adds a key, or sets the value of the key already at that time.
    ///
    /// A new key with no value captures [Param::value_at()] its time. An
    /// existing key keeps its identity and easing; only its value changes,
    /// and only if the options carry one. Unless `skip_history` is set, the
    /// edit is recorded so that it can be undone. Value edits that
    /// immediately follow a key's creation undo together with it.
    pub fn add_key(&self, options: KeyOptions, skip_history: bool) -> Result<Key> {
        let KeyOptions {
            time,
            value,
            easing,
        } = options;
        if !time.is_finite() {
            return Err(EngineError::InvalidTime(time));
        }

        let existing = self.key_line.borrow().key_by_time(time).cloned();
        let key = match existing {
            Some(existing) => match value {
                Some(value) if existing.value() == &value => return Ok(existing),
                Some(value) => {
                    if !skip_history {
                        self.history.save_chain(
                            existing.uid(),
                            ParamCommand::restore(self.uid, &existing),
                            ParamCommand::add(
                                self.uid,
                                time,
                                Some(value.clone()),
                                Some(existing.easing().clone()),
                            ),
                            "edit key",
                        );
                    }
                    log::debug!("{}: key at {time} set to {value}", self.name());
                    let updated = self.key_line.borrow_mut().set_value_at(time, value);
                    updated.unwrap_or(existing)
                }
                None => return Ok(existing),
            },
            None => {
                let value = match value {
                    Some(value) => value,
                    None => self.value_at(time),
                };
                let key = Key::new(time, value, easing.unwrap_or_else(linear));
                self.key_line.borrow_mut().add_key(key.clone());
                if !skip_history {
                    self.history.close_chain(key.uid());
                    self.history.save_chain(
                        key.uid(),
                        ParamCommand::remove(self.uid, time),
                        ParamCommand::restore(self.uid, &key),
                        "add key",
                    );
                }
                log::debug!("{}: added key {key}", self.name());
                self.observers.notify(&ParamEvent::KeyAdded {
                    uid: key.uid(),
                    time,
                });
                key
            }
        };

        self.refresh_inputs();
        self.refresh_key_indicator();
        self.drain_key_line_events();
        Ok(key)
    }

    /// Removes a key. Returns [None], and does nothing else, if the param
    /// has no such key.
    pub fn remove_key(&self, uid: KeyUid, skip_history: bool) -> Option<Key> {
        let key = self.key_line.borrow_mut().remove_key(uid)?;
        if !skip_history {
            self.history.save(
                ParamCommand::restore(self.uid, &key),
                ParamCommand::remove(self.uid, key.time()),
                "remove key",
            );
        }
        log::debug!("{}: removed key {key}", self.name());
        self.observers.notify(&ParamEvent::KeyRemoved {
            uid: key.uid(),
            time: key.time(),
        });
        self.refresh_inputs();
        self.refresh_key_indicator();
        self.drain_key_line_events();
        Some(key)
    }

    /// Removes the key at exactly `time`, if there is one.
    pub fn remove_key_at(&self, time: f64, skip_history: bool) -> Option<Key> {
        let uid = self.key_line.borrow().key_by_time(time).map(|k| k.uid())?;
        self.remove_key(uid, skip_history)
    }

    /// The key at exactly `time`.
    pub fn key_at(&self, time: f64) -> Option<Key> {
        self.key_line.borrow().key_by_time(time).cloned()
    }

    #[allow(missing_docs)]
    pub fn key(&self, uid: KeyUid) -> Option<Key> {
        self.key_line.borrow().key(uid).cloned()
    }

    /// The closest key strictly before `time`.
    pub fn prev_key(&self, time: f64) -> Option<Key> {
        self.key_line.borrow().prev_key(time).cloned()
    }

    /// The closest key strictly after `time`.
    pub fn next_key(&self, time: f64) -> Option<Key> {
        self.key_line.borrow().next_key(time).cloned()
    }

    /// Every key time, ascending.
    pub fn key_times(&self) -> Vec<f64> {
        self.key_line.borrow().key_times()
    }

    #[allow(missing_docs)]
    pub fn key_count(&self) -> usize {
        self.key_line.borrow().key_count()
    }

    /// Copies of all keys, ascending by time.
    pub fn keys(&self) -> Vec<Key> {
        self.key_line.borrow().iter().cloned().collect()
    }

    /// Adds a key at `time` (default: now) if there is none, or removes the
    /// one that is there.
    pub fn toggle_key(&self, time: Option<f64>) -> Result<()> {
        let time = match time {
            Some(time) => time,
            None => self.curr_time()?,
        };
        let existing = self.key_line.borrow().key_by_time(time).map(|k| k.uid());
        match existing {
            Some(uid) => {
                self.remove_key(uid, false);
            }
            None => {
                self.add_key(KeyOptions::at(time), false)?;
            }
        }
        Ok(())
    }

    /// Moves the timeline to the closest key before `time` (default: now).
    /// Returns the new time, or [None] if there was no earlier key.
    pub fn goto_prev_key(&self, time: Option<f64>) -> Result<Option<f64>> {
        let timeline = self.timeline()?;
        let time = time.unwrap_or_else(|| timeline.curr_time());
        let target = self.key_line.borrow().prev_key(time).map(|k| k.time());
        if let Some(target) = target {
            timeline.set_curr_time(target);
        }
        Ok(target)
    }

    /// Moves the timeline to the closest key after `time` (default: now).
    /// Returns the new time, or [None] if there was no later key.
    pub fn goto_next_key(&self, time: Option<f64>) -> Result<Option<f64>> {
        let timeline = self.timeline()?;
        let time = time.unwrap_or_else(|| timeline.curr_time());
        let target = self.key_line.borrow().next_key(time).map(|k| k.time());
        if let Some(target) = target {
            timeline.set_curr_time(target);
        }
        Ok(target)
    }

    /// A param is worth exporting once it has at least one key.
    pub fn is_valid(&self) -> bool {
        self.key_count() > 0
    }

    /// Connects a view. The view immediately shows the current value (if
    /// there is a timeline), follows the timeline from then on, and its
    /// edits key the param at the current time. Attaching a view twice
    /// replaces the earlier attachment.
    pub fn attach_input(&self, view: Rc<dyn InputView>) {
        self.detach_input(&view);
        let me = self.me.clone();
        let subscription = view.subscribe_change(Box::new(move |value: &Value| {
            if let Some(param) = me.upgrade() {
                if let Err(e) = param.handle_input_change(value) {
                    log::warn!("{}: dropped input {value}: {e}", param.name());
                }
            }
        }));
        self.inputs.borrow_mut().push(AttachedInput {
            view: Rc::clone(&view),
            subscription,
        });
        if let Ok(value) = self.value() {
            view.set_value(&value);
        }
    }

    /// Disconnects a view. Returns false if it wasn't attached.
    pub fn detach_input(&self, view: &Rc<dyn InputView>) -> bool {
        let attached = {
            let mut inputs = self.inputs.borrow_mut();
            match inputs.iter().position(|a| Rc::ptr_eq(&a.view, view)) {
                Some(index) => inputs.remove(index),
                None => return false,
            }
        };
        attached.view.unsubscribe_change(attached.subscription);
        true
    }

    /// The number of attached views.
    pub fn input_count(&self) -> usize {
        self.inputs.borrow().len()
    }

    /// Keys `value` at the current time, unless it reads the same as what
    /// the param already shows.
    pub fn handle_input_change(&self, value: &Value) -> Result<()> {
        let current = self.value()?;
        if value.to_string() == current.to_string() {
            return Ok(());
        }
        let time = self.curr_time()?;
        self.add_key(KeyOptions::with_value(time, value.clone()), false)?;
        Ok(())
    }

    pub(crate) fn on_change_time(&self) {
        self.refresh_inputs();
        self.refresh_key_indicator();
    }

    fn refresh_inputs(&self) {
        let views: Vec<Rc<dyn InputView>> = self
            .inputs
            .borrow()
            .iter()
            .map(|a| Rc::clone(&a.view))
            .collect();
        if views.is_empty() {
            return;
        }
        match self.value() {
            Ok(value) => {
                for view in views {
                    view.set_value(&value);
                }
            }
            Err(e) => log::trace!("not refreshing inputs: {e}"),
        }
    }

    fn refresh_key_indicator(&self) {
        let Ok(time) = self.curr_time() else {
            return;
        };
        let indicator = {
            let key_line = self.key_line.borrow();
            KeyIndicator {
                has_key: key_line.key_by_time(time).is_some(),
                has_prev: key_line.prev_key(time).is_some(),
                has_next: key_line.next_key(time).is_some(),
            }
        };
        if self.indicator.replace(indicator) != indicator {
            self.observers
                .notify(&ParamEvent::KeyIndicatorChanged(indicator));
        }
    }

    /// The indicator state as of the last key edit or time change.
    pub fn key_indicator(&self) -> KeyIndicator {
        self.indicator.get()
    }

    /// Flags a key for removal. The key line announces the flag, and the
    /// param removes the key in response.
    pub fn mark_key_for_removal(&self, uid: KeyUid) {
        self.key_line.borrow_mut().mark_for_removal(uid);
        self.drain_key_line_events();
    }

    /// Handles what the key line announced since the last drain. Runs with
    /// no borrow of the key line held.
    fn drain_key_line_events(&self) {
        loop {
            let event = self.key_line_events.borrow_mut().pop_front();
            match event {
                Some(KeyLineEvent::Changed) => self.observers.notify(&ParamEvent::Changed),
                Some(KeyLineEvent::KeyNeedsRemove(uid)) => {
                    log::debug!("{}: key {uid} asked to be removed", self.name());
                    self.remove_key(uid, false);
                }
                None => break,
            }
        }
    }

    /// Removes every key that was flagged for removal but not yet removed.
    /// Returns how many went away.
    pub fn remove_marked_keys(&self) -> usize {
        let marked = self.key_line.borrow_mut().take_marked();
        marked
            .into_iter()
            .filter(|uid| self.remove_key(*uid, false).is_some())
            .count()
    }

    #[allow(missing_docs)]
    pub fn subscribe(&self, listener: impl FnMut(&ParamEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    #[allow(missing_docs)]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// A snapshot suitable for persisting.
    pub fn get_save(&self) -> ParamSave {
        ParamSave {
            name: self.name(),
            hidden: self.hidden(),
            keys: self.key_line.borrow().iter().map(|k| k.get_save()).collect(),
        }
    }

    /// Loads `save` on top of the current state. Keys are added without
    /// recording history.
    pub fn use_save(&self, save: ParamSave) -> Result<()> {
        self.set_name(save.name)?;
        self.set_hidden(save.hidden);
        for key in save.keys {
            self.add_key(key.into(), true)?;
        }
        Ok(())
    }

    /// Carries out an undo or redo step without recording it.
    pub fn apply_command(&self, command: &ParamCommand) -> Result<()> {
        if let Some(options) = command.action.key_options() {
            self.add_key(options, true)?;
        } else if let KeyAction::Remove { time } = command.action {
            self.remove_key_at(time, true);
        }
        Ok(())
    }

    /// Detaches every view, stops following the timeline, and drops all
    /// listeners.
    pub fn dispose(&self) {
        let inputs = core::mem::take(&mut *self.inputs.borrow_mut());
        for input in inputs {
            input.view.unsubscribe_change(input.subscription);
        }
        let subscription = self.time_subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            if let Some(source) = subscription.source.upgrade() {
                source.unsubscribe(subscription.id);
            }
        }
        self.observers.clear();
    }
}
impl core::fmt::Debug for Param {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Param")
            .field("uid", &self.uid)
            .field("name", &self.name.borrow())
            .field("hidden", &self.hidden.get())
            .field("key_line", &self.key_line.borrow())
            .field("inputs", &self.inputs.borrow().len())
            .field("indicator", &self.indicator.get())
            .finish()
    }
}
impl Drop for Param {
    fn drop(&mut self) {
        self.dispose();
    }
}
impl CommandTarget for Param {
    fn apply(&self, command: &ParamCommand) -> Result<()> {
        if command.param != self.uid {
            return Err(EngineError::UnknownParam(command.param));
        }
        self.apply_command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        easing::{EaseMode, Power},
        history::{History, NoHistory},
        params::InputField,
        orchestration::{Timeline, Track},
    };
    use float_cmp::approx_eq;

    fn loose_param(name: &str) -> Rc<Param> {
        Param::new(
            ParamOptions::named(name),
            &ParamSettings::default(),
            Rc::new(NoHistory),
        )
        .unwrap()
    }

    fn number(param: &Param, time: f64) -> f64 {
        param.value_at(time).as_number().unwrap()
    }

    #[test]
    fn evaluates_without_parent() {
        let p = loose_param("opacity");
        assert_eq!(p.value_at(3.0), Value::Number(0.0));
        assert!(matches!(p.value(), Err(EngineError::NoTimeline { .. })));

        p.add_key(KeyOptions::with_value(0.0, 0.0), false).unwrap();
        p.add_key(KeyOptions::with_value(10.0, 1.0), false).unwrap();
        assert!(approx_eq!(f64, number(&p, 5.0), 0.5));
        assert_eq!(number(&p, -1.0), 0.0, "first key holds before the range");
        assert_eq!(number(&p, 11.0), 1.0, "last key holds after the range");
        assert_eq!(number(&p, 10.0), 1.0);
    }

    #[test]
    fn later_key_easing_shapes_segment() {
        let p = loose_param("x");
        p.add_key(KeyOptions::with_value(0.0, 0.0), true).unwrap();
        p.add_key(
            KeyOptions::with_value(10.0, 100.0).eased(Rc::new(Power::new(2.0, EaseMode::In))),
            true,
        )
        .unwrap();
        assert!(approx_eq!(f64, number(&p, 5.0), 25.0));
    }

    #[test]
    fn new_key_captures_current_value() {
        let p = loose_param("left");
        p.add_key(KeyOptions::with_value(0.0, "0px"), true).unwrap();
        p.add_key(KeyOptions::with_value(10.0, "100px"), true).unwrap();
        let before = p.value_at(2.5);
        let key = p.add_key(KeyOptions::at(2.5), true).unwrap();
        assert_eq!(key.value(), &before);
        assert_eq!(p.value_at(2.5), before);
    }

    #[test]
    fn overwrite_keeps_identity_and_easing() {
        let p = loose_param("top");
        let easing: crate::easing::EasingRef = Rc::new(Power::new(3.0, EaseMode::Out));
        let first = p
            .add_key(KeyOptions::with_value(1.0, 1.0).eased(easing), true)
            .unwrap();
        let second = p.add_key(KeyOptions::with_value(1.0, 2.0), true).unwrap();
        assert_eq!(first.uid(), second.uid());
        assert_eq!(p.key_count(), 1);
        assert_eq!(second.value(), &Value::Number(2.0));
        assert!(approx_eq!(f64, second.easing().ratio(0.5), 0.875));
    }

    #[test]
    fn rejects_non_finite_time() {
        let p = loose_param("x");
        assert!(matches!(
            p.add_key(KeyOptions::at(f64::INFINITY), false),
            Err(EngineError::InvalidTime(_))
        ));
        assert_eq!(p.key_count(), 0);
    }

    #[test]
    fn remove_missing_key_is_quiet() {
        let p = loose_param("x");
        let events = Rc::new(RefCell::new(0));
        let e = Rc::clone(&events);
        p.subscribe(move |_| *e.borrow_mut() += 1);
        assert!(p.remove_key(KeyUid(usize::MAX), false).is_none());
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn hidden_param_has_no_height() {
        let p = loose_param("x");
        let events = Rc::new(RefCell::new(Vec::default()));
        let e = Rc::clone(&events);
        p.subscribe(move |event| e.borrow_mut().push(event.clone()));

        assert!(approx_eq!(f64, p.height(), ParamSettings::default().line_height));
        p.set_hidden(true);
        p.set_hidden(true);
        assert_eq!(p.height(), 0.0);
        assert_eq!(*events.borrow(), vec![ParamEvent::HeightChanged]);
    }

    #[test]
    fn undo_restores_created_key_with_edits() {
        let history = Rc::new(History::default());
        let p = Param::new(
            ParamOptions::named("x"),
            &ParamSettings::default(),
            Rc::clone(&history) as Rc<dyn HistorySink>,
        )
        .unwrap();
        p.add_key(KeyOptions::with_value(1.0, 1.0), false).unwrap();
        p.add_key(KeyOptions::with_value(1.0, 2.0), false).unwrap();
        p.add_key(KeyOptions::with_value(1.0, 3.0), false).unwrap();
        assert_eq!(history.len(), 1, "edits coalesce into the creation");

        assert!(history.undo(p.as_ref()).unwrap());
        assert_eq!(p.key_count(), 0);
        assert!(history.redo(p.as_ref()).unwrap());
        assert_eq!(p.key_at(1.0).unwrap().value(), &Value::Number(3.0));
    }

    #[test]
    fn undo_of_removal_restores_key() {
        let history = Rc::new(History::default());
        let p = Param::new(
            ParamOptions::named("x"),
            &ParamSettings::default(),
            Rc::clone(&history) as Rc<dyn HistorySink>,
        )
        .unwrap();
        let key = p
            .add_key(
                KeyOptions::with_value(2.0, "5px").eased(Rc::new(Power::new(2.0, EaseMode::In))),
                false,
            )
            .unwrap();
        p.remove_key(key.uid(), false).unwrap();
        assert_eq!(p.key_count(), 0);

        history.undo(p.as_ref()).unwrap();
        let restored = p.key_at(2.0).unwrap();
        assert_eq!(restored.value(), &Value::from("5px"));
        assert!(approx_eq!(f64, restored.easing().ratio(0.5), 0.25));
    }

    #[test]
    fn commands_for_other_params_are_refused() {
        let p = loose_param("x");
        let command = ParamCommand::remove(ParamUid(usize::MAX), 0.0);
        assert!(matches!(
            p.apply(&command),
            Err(EngineError::UnknownParam(_))
        ));
    }

    #[test]
    fn initial_keys_load_silently() {
        let history = Rc::new(History::default());
        let options = ParamOptionsBuilder::default()
            .name("width")
            .key(KeySave {
                time: 0.0,
                value: Value::from("10px"),
                easing: linear(),
            })
            .key(KeySave {
                time: 4.0,
                value: Value::from("20px"),
                easing: linear(),
            })
            .build()
            .unwrap();
        let p = Param::new(options, &ParamSettings::default(), history.clone()).unwrap();
        assert_eq!(p.key_times(), vec![0.0, 4.0]);
        assert!(history.is_empty());
        assert_eq!(p.value_at(2.0), Value::from("15px"));
    }

    #[test]
    fn builder_requires_a_name() {
        assert!(ParamOptionsBuilder::default().build().is_err());
        assert!(ParamOptionsBuilder::default().name("  ").build().is_err());
        let o = ParamOptionsBuilder::default()
            .name("opacity")
            .default_value(1.0)
            .build()
            .unwrap();
        assert_eq!(o.default_value, Some(Value::Number(1.0)));
    }

    #[test]
    fn follows_timeline_and_inputs() {
        let timeline = Rc::new(Timeline::default());
        let track = Track::new("box", timeline.clone(), Rc::new(NoHistory));
        let p = track.add_param(ParamOptions::named("left")).unwrap();
        p.add_key(KeyOptions::with_value(0.0, "0px"), false).unwrap();
        p.add_key(KeyOptions::with_value(10.0, "100px"), false).unwrap();

        let field = Rc::new(InputField::default());
        p.attach_input(field.clone());
        assert_eq!(field.value(), Value::from("0px"));
        assert_eq!(
            p.key_indicator(),
            KeyIndicator {
                has_key: true,
                has_prev: false,
                has_next: true
            }
        );

        timeline.set_curr_time(5.0);
        assert_eq!(field.value(), Value::from("50px"));
        assert!(!p.key_indicator().has_key);

        field.edit("70px");
        assert_eq!(p.key_times(), vec![0.0, 5.0, 10.0]);
        assert_eq!(p.value().unwrap(), Value::from("70px"));

        field.edit("70px");
        assert_eq!(p.key_count(), 3, "same value is not a new edit");

        assert_eq!(p.goto_next_key(None).unwrap(), Some(10.0));
        assert_eq!(field.value(), Value::from("100px"));
        assert_eq!(p.goto_next_key(None).unwrap(), None);
        assert_eq!(p.goto_prev_key(None).unwrap(), Some(5.0));
        assert!(p.key_indicator().has_key);

        p.dispose();
        assert_eq!(field.listener_count(), 0);
        assert_eq!(timeline.listener_count(), 0);
    }

    #[test]
    fn parent_is_set_once() {
        let timeline = Rc::new(Timeline::default());
        let a = Track::new("a", timeline.clone(), Rc::new(NoHistory));
        let b = Track::new("b", timeline, Rc::new(NoHistory));
        let p = a.add_param(ParamOptions::named("x")).unwrap();
        assert!(matches!(
            p.set_parent(ParamParent::Track(Rc::downgrade(&b))),
            Err(EngineError::ParentAlreadySet { .. })
        ));
    }

    #[test]
    fn marked_key_is_removed_through_the_key_line() {
        let history = Rc::new(History::default());
        let p = Param::new(
            ParamOptions::named("x"),
            &ParamSettings::default(),
            Rc::clone(&history) as Rc<dyn HistorySink>,
        )
        .unwrap();
        let key = p.add_key(KeyOptions::with_value(1.0, 1.0), true).unwrap();
        p.add_key(KeyOptions::with_value(2.0, 2.0), true).unwrap();
        let events = Rc::new(RefCell::new(Vec::default()));
        let e = Rc::clone(&events);
        p.subscribe(move |event| e.borrow_mut().push(event.clone()));

        p.mark_key_for_removal(key.uid());
        assert_eq!(p.key_times(), vec![2.0]);
        assert_eq!(
            *events.borrow(),
            vec![
                ParamEvent::KeyRemoved {
                    uid: key.uid(),
                    time: 1.0
                },
                ParamEvent::Changed
            ]
        );
        assert_eq!(history.undo_label().as_deref(), Some("remove key"));
        assert_eq!(p.remove_marked_keys(), 0);

        p.mark_key_for_removal(key.uid());
        assert_eq!(events.borrow().len(), 2, "unknown keys are ignored");
    }

    #[test]
    fn key_line_changes_reach_param_listeners() {
        let p = loose_param("x");
        let changes = Rc::new(RefCell::new(0));
        let c = Rc::clone(&changes);
        p.subscribe(move |event| {
            if *event == ParamEvent::Changed {
                *c.borrow_mut() += 1;
            }
        });
        let key = p.add_key(KeyOptions::with_value(1.0, 1.0), true).unwrap();
        p.add_key(KeyOptions::with_value(1.0, 2.0), true).unwrap();
        p.remove_key(key.uid(), true).unwrap();
        assert_eq!(*changes.borrow(), 3);
    }

    #[test]
    fn rewriting_the_same_value_is_a_no_op() {
        let history = Rc::new(History::default());
        let p = Param::new(
            ParamOptions::named("x"),
            &ParamSettings::default(),
            Rc::clone(&history) as Rc<dyn HistorySink>,
        )
        .unwrap();
        p.add_key(KeyOptions::with_value(1.0, "4px"), false).unwrap();
        p.add_key(KeyOptions::with_value(3.0, "8px"), false).unwrap();
        let events = Rc::new(RefCell::new(0));
        let e = Rc::clone(&events);
        p.subscribe(move |_| *e.borrow_mut() += 1);

        let key = p.add_key(KeyOptions::with_value(1.0, "4px"), false).unwrap();
        assert_eq!(key.value(), &Value::from("4px"));
        p.add_key(KeyOptions::at(1.0), false).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn names_stay_unique_within_a_container() {
        let track = Track::new("box", Rc::new(Timeline::default()), Rc::new(NoHistory));
        let left = track.add_param(ParamOptions::named("left")).unwrap();
        let top = track.add_param(ParamOptions::named("top")).unwrap();
        assert!(matches!(
            top.set_name("left"),
            Err(EngineError::NameTaken { .. })
        ));
        assert_eq!(top.name(), "top");
        assert!(top
            .use_save(ParamSave {
                name: "left".to_string(),
                ..Default::default()
            })
            .is_err());

        top.set_name("top").unwrap();
        top.set_name("bottom").unwrap();
        assert_eq!(track.param("bottom").map(|p| p.uid()), Some(top.uid()));
        assert_eq!(track.param("left").map(|p| p.uid()), Some(left.uid()));

        let border = track.add_group("border");
        let width = border.add_param(ParamOptions::named("border-width")).unwrap();
        width.set_name("left").unwrap();
        assert!(border
            .add_param(ParamOptions::named("border-color"))
            .unwrap()
            .set_name("left")
            .is_err());
    }
}
