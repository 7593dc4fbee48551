// Copyright (c) 2024 Mike Tsao

//! A [Param] is one animatable property of a target, holding a
//! [KeyLine](crate::keys::KeyLine) and evaluating it at the current time of
//! its parent's timeline.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ExportMode, InputField, InputView, Param, ParamEvent, ParamOptions,
        ParamOptionsBuilder, ParamParent, ParamSave,
    };
}

pub use export::{ExportMode, ParamScript, ScriptEase, ScriptKey, ScriptOptions};
pub use input::{InputField, InputView};
pub use param::{
    KeyIndicator, Param, ParamEvent, ParamOptions, ParamOptionsBuilder,
    ParamOptionsBuilderError, ParamSave,
};

mod export;
mod input;
mod param;

use crate::{
    orchestration::{ParamGroup, TimeSource, Track},
    types::ParamUid,
};
use std::rc::{Rc, Weak};

/// The container a param belongs to. Params don't keep their container
/// alive.
#[derive(Clone, Debug)]
pub enum ParamParent {
    #[allow(missing_docs)]
    Track(Weak<Track>),
    #[allow(missing_docs)]
    Group(Weak<ParamGroup>),
}
impl ParamParent {
    /// The container's timeline, if the container still exists.
    pub fn timeline(&self) -> Option<Rc<dyn TimeSource>> {
        match self {
            ParamParent::Track(track) => track.upgrade().map(|t| t.timeline()),
            ParamParent::Group(group) => group.upgrade().and_then(|g| g.timeline()),
        }
    }

    /// True if a param other than `uid` in this container is called `name`.
    pub fn has_other_param(&self, name: &str, uid: ParamUid) -> bool {
        let params = match self {
            ParamParent::Track(track) => track.upgrade().map(|t| t.params()),
            ParamParent::Group(group) => group.upgrade().map(|g| g.params()),
        };
        params
            .unwrap_or_default()
            .iter()
            .any(|p| p.uid() != uid && p.name() == name)
    }
}
