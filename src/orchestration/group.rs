// Copyright (c) 2024 Mike Tsao

use super::{TimeSource, Track};
use crate::{
    error::{EngineError, Result},
    history::{CommandTarget, ParamCommand},
    params::{Param, ParamOptions, ParamParent, ParamSave},
    types::ParamUid,
};
use core::cell::RefCell;
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};

/// The persisted form of a [ParamGroup].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupSave {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    #[serde(default)]
    pub params: Vec<ParamSave>,
}

/// A named set of related params inside a [Track], such as the four sides
/// of a margin. Params in a group borrow the track's timeline, history,
/// and settings.
#[derive(Debug)]
pub struct ParamGroup {
    name: String,
    track: Weak<Track>,
    params: RefCell<Vec<Rc<Param>>>,
    me: Weak<ParamGroup>,
}
impl ParamGroup {
    pub(crate) fn new(name: &str, track: Weak<Track>) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            name: name.to_string(),
            track,
            params: Default::default(),
            me: me.clone(),
        })
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning track, if it still exists.
    pub fn track(&self) -> Option<Rc<Track>> {
        self.track.upgrade()
    }

    /// The owning track's timeline.
    pub fn timeline(&self) -> Option<Rc<dyn TimeSource>> {
        self.track().map(|t| t.timeline())
    }

    /// Returns the param with the options' name, creating it (and parenting
    /// it to this group) if there isn't one.
    pub fn add_param(&self, options: ParamOptions) -> Result<Rc<Param>> {
        if let Some(existing) = self.param(&options.name) {
            return Ok(existing);
        }
        let track = self.track().ok_or_else(|| EngineError::NoTimeline {
            param: options.name.clone(),
        })?;
        let param = Param::new(options, track.settings(), track.history())?;
        param.set_parent(ParamParent::Group(self.me.clone()))?;
        self.params.borrow_mut().push(Rc::clone(&param));
        Ok(param)
    }

    #[allow(missing_docs)]
    pub fn param(&self, name: &str) -> Option<Rc<Param>> {
        self.params
            .borrow()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// The group's params, in creation order.
    pub fn params(&self) -> Vec<Rc<Param>> {
        self.params.borrow().clone()
    }

    /// True if any param in the group has a key at exactly `time`.
    pub fn has_key_at(&self, time: f64) -> bool {
        self.params().iter().any(|p| p.key_at(time).is_some())
    }

    /// Hides or shows every param in the group.
    pub fn set_hidden(&self, hidden: bool) {
        for param in self.params() {
            param.set_hidden(hidden);
        }
    }

    #[allow(missing_docs)]
    pub fn get_save(&self) -> GroupSave {
        GroupSave {
            name: self.name.clone(),
            params: self.params().iter().map(|p| p.get_save()).collect(),
        }
    }

    /// Loads `save` on top of the current contents without recording
    /// history. The group keeps its own name.
    pub fn use_save(&self, save: GroupSave) -> Result<()> {
        for param_save in save.params {
            let param = self.add_param(ParamOptions::named(param_save.name.clone()))?;
            param.use_save(param_save)?;
        }
        Ok(())
    }

    fn find_param(&self, uid: ParamUid) -> Option<Rc<Param>> {
        self.params().into_iter().find(|p| p.uid() == uid)
    }
}
impl CommandTarget for ParamGroup {
    fn apply(&self, command: &ParamCommand) -> Result<()> {
        match self.find_param(command.param) {
            Some(param) => param.apply(command),
            None => Err(EngineError::UnknownParam(command.param)),
        }
    }
}
