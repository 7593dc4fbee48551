// Copyright (c) 2024 Mike Tsao

use crate::util::{Observers, SubscriptionId};
use core::cell::Cell;
use delegate::delegate;

/// The authoring cursor that params read as "now", and that tells them when
/// it moves.
pub trait TimeSource {
    /// The current time.
    fn curr_time(&self) -> f64;

    /// Moves the cursor. Listeners hear about it only if the time actually
    /// changed.
    fn set_curr_time(&self, time: f64);

    /// Registers a listener for time changes. It receives the new time.
    fn subscribe(&self, listener: Box<dyn FnMut(&f64)>) -> SubscriptionId;

    #[allow(missing_docs)]
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// The stock [TimeSource].
#[derive(Debug, Default)]
pub struct Timeline {
    curr_time: Cell<f64>,
    observers: Observers<f64>,
}
impl TimeSource for Timeline {
    fn curr_time(&self) -> f64 {
        self.curr_time.get()
    }

    fn set_curr_time(&self, time: f64) {
        if time == self.curr_time.get() {
            return;
        }
        self.curr_time.set(time);
        log::trace!("timeline moved to {time}");
        self.observers.notify(&time);
    }

    delegate! {
        to self.observers {
            fn subscribe(&self, listener: Box<dyn FnMut(&f64)>) -> SubscriptionId;
            fn unsubscribe(&self, id: SubscriptionId) -> bool;
        }
    }
}
impl Timeline {
    /// A timeline whose cursor starts at `time`.
    pub fn new_with(time: f64) -> Self {
        Self {
            curr_time: Cell::new(time),
            observers: Default::default(),
        }
    }

    /// The number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }
}
