// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{EngineSettings, Observers, SubscriptionId};
}

pub use observers::{Observers, SubscriptionId};
pub use settings::{EngineSettings, HistorySettings, ParamSettings};

mod observers;
mod settings;
