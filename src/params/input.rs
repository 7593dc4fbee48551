// Copyright (c) 2024 Mike Tsao

use crate::{
    types::Value,
    util::{Observers, SubscriptionId},
};
use core::cell::RefCell;
use delegate::delegate;

/// A view that mirrors a param's value and reports user edits, like a text
/// box in an inspector panel.
///
/// A view may or may not report a change when
/// [set_value()](InputView::set_value()) is called. Either is fine: a param
/// ignores reported values equal to what it already shows.
pub trait InputView {
    /// Displays `value`.
    fn set_value(&self, value: &Value);

    /// Registers a listener for values the user enters.
    fn subscribe_change(&self, listener: Box<dyn FnMut(&Value)>) -> SubscriptionId;

    #[allow(missing_docs)]
    fn unsubscribe_change(&self, id: SubscriptionId) -> bool;
}

/// An [InputView] with no widget behind it. Hosts can wrap one around their
/// own widget, and tests use it to play the user.
#[derive(Debug, Default)]
pub struct InputField {
    value: RefCell<Value>,
    observers: Observers<Value>,
}
impl InputView for InputField {
    fn set_value(&self, value: &Value) {
        *self.value.borrow_mut() = value.clone();
    }

    delegate! {
        to self.observers {
            #[call(subscribe)]
            fn subscribe_change(&self, listener: Box<dyn FnMut(&Value)>) -> SubscriptionId;
            #[call(unsubscribe)]
            fn unsubscribe_change(&self, id: SubscriptionId) -> bool;
        }
    }
}
impl InputField {
    /// What the field currently shows.
    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Acts as if the user typed `value`.
    pub fn edit(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.value.borrow_mut() = value.clone();
        self.observers.notify(&value);
    }

    /// The number of params listening to this field.
    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }
}
