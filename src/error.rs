// Copyright (c) 2024 Mike Tsao

//! The crate's error type.

use crate::types::ParamUid;
use thiserror::Error;

/// Everything that can go wrong while driving the engine. Most edits
/// normalize silently instead of failing; these are the integration errors
/// that a host has to hear about.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The param has no parent yet, so it has no timeline to read the
    /// current time from.
    #[error("no timeline bound to param '{param}'")]
    NoTimeline {
        #[allow(missing_docs)]
        param: String,
    },
    /// A param's parent is assigned exactly once.
    #[error("param '{param}' already has a parent")]
    ParentAlreadySet {
        #[allow(missing_docs)]
        param: String,
    },
    /// Param names are unique within their track or group.
    #[error("a param named '{name}' already exists here")]
    NameTaken {
        #[allow(missing_docs)]
        name: String,
    },
    /// Keys must sit at finite times.
    #[error("key time {0} is not a finite number")]
    InvalidTime(f64),
    /// A command was routed to a host that doesn't own the target param.
    #[error("no param with uid {0}")]
    UnknownParam(ParamUid),
    /// Save data or an easing descriptor failed to (de)serialize.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Shorthand for results produced by this crate.
pub type Result<T> = core::result::Result<T, EngineError>;
