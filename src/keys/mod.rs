// Copyright (c) 2024 Mike Tsao

//! Keys are the authored samples of a param, and a [KeyLine] is the
//! time-ordered set of them that belongs to one param.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Key, KeyLine, KeyOptions, KeyOptionsBuilder, KeySave};
}

pub use key::{Key, KeyOptions, KeyOptionsBuilder, KeyOptionsBuilderError, KeySave};
pub use key_line::{KeyLine, KeyLineEvent};

mod key;
mod key_line;
