// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{interpolate, KeyUid, ParamUid, Value};
}

pub use {
    uid::{IsUid, KeyUid, ParamUid, UidFactory},
    value::{interpolate, Value},
};

mod uid;
mod value;
