// Copyright (c) 2024 Mike Tsao

//! Containers that host params: a [Track] per animated element, optional
//! [ParamGroup]s inside it, and the [TimeSource] they all follow.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ParamGroup, TimeSource, Timeline, Track, TrackTitle};
}

pub use {
    group::{GroupSave, ParamGroup},
    timeline::{TimeSource, Timeline},
    track::{Track, TrackEvent, TrackSave, TrackTitle},
};

mod group;
mod timeline;
mod track;
