// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Tweenline is the keyframe engine behind a CSS timeline editor.
//!
//! Each animated property of an element is a [Param](params::Param). A
//! param owns a time-ordered line of [Key](keys::Key)s and answers "what is
//! my value at time t?" by easing between the keys around t. Values are
//! CSS-ish: plain numbers, dimensions like `10px`, space-separated lists
//! like `10px 0 5em`, or anything else as text. When two keys disagree on
//! units, the engine hands the blend to the browser as a `calc()`
//! expression instead of guessing.
//!
//! Params live in a [Track](orchestration::Track), optionally inside a
//! [ParamGroup](orchestration::ParamGroup). The track supplies the
//! [TimeSource](orchestration::TimeSource) whose current time the params
//! follow and the [HistorySink](history::HistorySink) that records every
//! key edit for undo and redo. Editor widgets connect to a param through
//! the [InputView](params::InputView) trait: the param keeps them showing
//! the current value, and their edits become keys.
//!
//! ```
//! use std::rc::Rc;
//! use tweenline::prelude::*;
//!
//! let timeline = Rc::new(Timeline::default());
//! let track = Track::new("box", timeline.clone(), Rc::new(History::default()));
//! let left = track.add_param(ParamOptions::named("left")).unwrap();
//! left.add_key(KeyOptions::with_value(0.0, "0px"), false).unwrap();
//! left.add_key(KeyOptions::with_value(10.0, "100px"), false).unwrap();
//!
//! timeline.set_curr_time(2.5);
//! assert_eq!(left.value().unwrap().to_string(), "25px");
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// tweenline::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        easing::prelude::*, error::EngineError, history::prelude::*, keys::prelude::*,
        orchestration::prelude::*, params::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    error::{EngineError, Result},
    history::History,
    orchestration::{Timeline, Track},
    params::Param,
    types::Value,
};

pub mod easing;
pub mod error;
pub mod history;
pub mod keys;
pub mod orchestration;
pub mod params;
pub mod types;
pub mod util;
