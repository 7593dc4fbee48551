// Copyright (c) 2024 Mike Tsao

use super::{GroupSave, ParamGroup, TimeSource};
use crate::{
    error::{EngineError, Result},
    history::{CommandTarget, HistorySink, ParamCommand},
    params::{ExportMode, Param, ParamOptions, ParamParent, ParamSave, ParamScript},
    types::ParamUid,
    util::{Observers, ParamSettings, SubscriptionId},
};
use core::cell::RefCell;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};
use strum_macros::IntoStaticStr;
use synonym::Synonym;

/// Newtype for track title string.
#[derive(Synonym, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct TrackTitle(#[derivative(Default(value = "\"Untitled\".to_string()"))] pub String);

/// What a [Track] tells its listeners.
#[derive(Clone, Debug, PartialEq, IntoStaticStr)]
pub enum TrackEvent {
    #[allow(missing_docs)]
    ParamAdded(ParamUid),
    #[allow(missing_docs)]
    GroupAdded(String),
    #[allow(missing_docs)]
    TitleChanged,
}

/// The persisted form of a [Track].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrackSave {
    #[allow(missing_docs)]
    #[serde(default)]
    pub title: TrackTitle,
    #[allow(missing_docs)]
    #[serde(default)]
    pub params: Vec<ParamSave>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub groups: Vec<GroupSave>,
}
impl TrackSave {
    /// Parses a save from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the save as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The animated properties of one target element, arranged as loose params
/// and named groups. A track hands its timeline and history to every param
/// it creates.
pub struct Track {
    title: RefCell<TrackTitle>,
    timeline: Rc<dyn TimeSource>,
    history: Rc<dyn HistorySink>,
    settings: ParamSettings,
    params: RefCell<Vec<Rc<Param>>>,
    groups: RefCell<Vec<Rc<ParamGroup>>>,
    observers: Observers<TrackEvent>,
    me: Weak<Track>,
}
impl Track {
    /// Creates a track whose params use default [ParamSettings].
    pub fn new(
        title: &str,
        timeline: Rc<dyn TimeSource>,
        history: Rc<dyn HistorySink>,
    ) -> Rc<Self> {
        Self::new_with(title, timeline, history, ParamSettings::default())
    }

    #[allow(missing_docs)]
    pub fn new_with(
        title: &str,
        timeline: Rc<dyn TimeSource>,
        history: Rc<dyn HistorySink>,
        settings: ParamSettings,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            title: RefCell::new(TrackTitle(title.to_string())),
            timeline,
            history,
            settings,
            params: Default::default(),
            groups: Default::default(),
            observers: Default::default(),
            me: me.clone(),
        })
    }

    #[allow(missing_docs)]
    pub fn title(&self) -> TrackTitle {
        self.title.borrow().clone()
    }

    #[allow(missing_docs)]
    pub fn set_title(&self, title: TrackTitle) {
        if self.title.replace(title.clone()) != title {
            self.observers.notify(&TrackEvent::TitleChanged);
        }
    }

    /// The timeline that this track's params evaluate against.
    pub fn timeline(&self) -> Rc<dyn TimeSource> {
        Rc::clone(&self.timeline)
    }

    /// The history sink that this track's params record into.
    pub fn history(&self) -> Rc<dyn HistorySink> {
        Rc::clone(&self.history)
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &ParamSettings {
        &self.settings
    }

    /// Returns the loose param with the options' name, creating it (and
    /// parenting it to this track) if there isn't one.
    pub fn add_param(&self, options: ParamOptions) -> Result<Rc<Param>> {
        if let Some(existing) = self.own_param(&options.name) {
            return Ok(existing);
        }
        let param = Param::new(options, &self.settings, Rc::clone(&self.history))?;
        param.set_parent(ParamParent::Track(self.me.clone()))?;
        self.params.borrow_mut().push(Rc::clone(&param));
        self.observers.notify(&TrackEvent::ParamAdded(param.uid()));
        Ok(param)
    }

    fn own_param(&self, name: &str) -> Option<Rc<Param>> {
        self.params
            .borrow()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Finds a param by name, looking at loose params first and then inside
    /// groups.
    pub fn param(&self, name: &str) -> Option<Rc<Param>> {
        self.own_param(name).or_else(|| {
            self.groups()
                .iter()
                .find_map(|group| group.param(name))
        })
    }

    /// The loose params, in creation order.
    pub fn params(&self) -> Vec<Rc<Param>> {
        self.params.borrow().clone()
    }

    /// Loose params followed by every group's params.
    pub fn all_params(&self) -> Vec<Rc<Param>> {
        let mut params = self.params();
        for group in self.groups() {
            params.extend(group.params());
        }
        params
    }

    /// Finds a param by uid anywhere in the track.
    pub fn find_param(&self, uid: ParamUid) -> Option<Rc<Param>> {
        self.all_params().into_iter().find(|p| p.uid() == uid)
    }

    /// Returns the named group, creating it if there isn't one.
    pub fn add_group(&self, name: &str) -> Rc<ParamGroup> {
        if let Some(existing) = self.group(name) {
            return existing;
        }
        let group = ParamGroup::new(name, self.me.clone());
        self.groups.borrow_mut().push(Rc::clone(&group));
        self.observers
            .notify(&TrackEvent::GroupAdded(name.to_string()));
        group
    }

    #[allow(missing_docs)]
    pub fn group(&self, name: &str) -> Option<Rc<ParamGroup>> {
        self.groups
            .borrow()
            .iter()
            .find(|g| g.name() == name)
            .cloned()
    }

    #[allow(missing_docs)]
    pub fn groups(&self) -> Vec<Rc<ParamGroup>> {
        self.groups.borrow().clone()
    }

    /// True if any of the named params has a key at exactly `time`. This is
    /// what lights up a key button that stands for several properties at
    /// once, like the four sides of a border.
    pub fn has_key_at(&self, names: &[&str], time: f64) -> bool {
        names
            .iter()
            .filter_map(|name| self.param(name))
            .any(|p| p.key_at(time).is_some())
    }

    /// Exports every param that has keys.
    pub fn export(&self, mode: ExportMode) -> Result<Vec<ParamScript>> {
        self.all_params()
            .iter()
            .filter(|p| p.is_valid())
            .map(|p| p.export(mode))
            .collect()
    }

    /// A snapshot suitable for persisting.
    pub fn get_save(&self) -> TrackSave {
        TrackSave {
            title: self.title(),
            params: self.params().iter().map(|p| p.get_save()).collect(),
            groups: self.groups().iter().map(|g| g.get_save()).collect(),
        }
    }

    /// Loads `save` on top of the current contents, creating params and
    /// groups as needed. Nothing is recorded in the history.
    pub fn use_save(&self, save: TrackSave) -> Result<()> {
        self.set_title(save.title);
        for param_save in save.params {
            let param = self.add_param(ParamOptions::named(param_save.name.clone()))?;
            param.use_save(param_save)?;
        }
        for group_save in save.groups {
            self.add_group(&group_save.name).use_save(group_save)?;
        }
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn subscribe(&self, listener: impl FnMut(&TrackEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    #[allow(missing_docs)]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
impl core::fmt::Debug for Track {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Track")
            .field("title", &self.title.borrow())
            .field("params", &self.params.borrow())
            .field("groups", &self.groups.borrow())
            .finish()
    }
}
impl CommandTarget for Track {
    fn apply(&self, command: &ParamCommand) -> Result<()> {
        match self.find_param(command.param) {
            Some(param) => param.apply(command),
            None => Err(EngineError::UnknownParam(command.param)),
        }
    }
}
