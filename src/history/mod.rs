// Copyright (c) 2024 Mike Tsao

//! Undo and redo.
//!
//! Params report every structural edit to a [HistorySink] as a pair of
//! [ParamCommand]s: one that reverses the edit, and one that performs it
//! again. [History] is the sink that ships with the crate.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{CommandTarget, History, HistorySink, KeyAction, NoHistory, ParamCommand};
}

pub use commands::{CommandTarget, KeyAction, ParamCommand};

mod commands;

use crate::{error::Result, types::KeyUid, util::HistorySettings};
use core::cell::RefCell;
use std::collections::HashMap;

/// Where params record their edits. Methods take `&self` because the sink
/// is shared by every param in a project.
pub trait HistorySink {
    /// Records a standalone step. Any open chain is closed first.
    fn save(&self, undo: ParamCommand, redo: ParamCommand, label: &str);

    /// Records a step that may coalesce with earlier steps anchored to the
    /// same key. If the chain for `anchor` is open and still the most recent
    /// step, the step keeps its original undo and takes the new redo.
    /// Otherwise a new step starts the chain.
    fn save_chain(&self, anchor: KeyUid, undo: ParamCommand, redo: ParamCommand, label: &str);

    /// Ends the chain for `anchor`, so the next chained step starts fresh.
    fn close_chain(&self, anchor: KeyUid);
}

/// A sink that drops everything. For hosts that don't offer undo.
#[derive(Debug, Default)]
pub struct NoHistory;
impl HistorySink for NoHistory {
    fn save(&self, _: ParamCommand, _: ParamCommand, _: &str) {}

    fn save_chain(&self, _: KeyUid, _: ParamCommand, _: ParamCommand, _: &str) {}

    fn close_chain(&self, _: KeyUid) {}
}

#[derive(Clone, Debug)]
struct HistoryStep {
    label: String,
    undo: ParamCommand,
    redo: ParamCommand,
}

#[derive(Debug, Default)]
struct HistoryState {
    undo_stack: Vec<HistoryStep>,
    redo_stack: Vec<HistoryStep>,
    open_chains: HashMap<KeyUid, usize>,
}

/// An in-memory undo log.
#[derive(Debug, Default)]
pub struct History {
    settings: HistorySettings,
    state: RefCell<HistoryState>,
}
impl HistorySink for History {
    fn save(&self, undo: ParamCommand, redo: ParamCommand, label: &str) {
        let mut state = self.state.borrow_mut();
        state.open_chains.clear();
        self.push(&mut state, HistoryStep {
            label: label.to_string(),
            undo,
            redo,
        });
    }

    fn save_chain(&self, anchor: KeyUid, undo: ParamCommand, redo: ParamCommand, label: &str) {
        let mut state = self.state.borrow_mut();
        let top = state.undo_stack.len().checked_sub(1);
        if top.is_some() && state.open_chains.get(&anchor).copied() == top {
            if let Some(step) = state.undo_stack.last_mut() {
                log::trace!("coalescing '{label}' into '{}'", step.label);
                step.redo = redo;
                state.redo_stack.clear();
                return;
            }
        }
        self.push(&mut state, HistoryStep {
            label: label.to_string(),
            undo,
            redo,
        });
        let index = state.undo_stack.len() - 1;
        state.open_chains.insert(anchor, index);
    }

    fn close_chain(&self, anchor: KeyUid) {
        self.state.borrow_mut().open_chains.remove(&anchor);
    }
}
impl History {
    #[allow(missing_docs)]
    pub fn new_with(settings: HistorySettings) -> Self {
        Self {
            settings,
            state: Default::default(),
        }
    }

    fn push(&self, state: &mut HistoryState, step: HistoryStep) {
        state.redo_stack.clear();
        state.undo_stack.push(step);
        let max_depth = self.settings.max_depth.max(1);
        if state.undo_stack.len() > max_depth {
            let excess = state.undo_stack.len() - max_depth;
            state.undo_stack.drain(..excess);
            // Chain indexes shift down with the stack.
            state.open_chains = state
                .open_chains
                .drain()
                .filter_map(|(anchor, i)| i.checked_sub(excess).map(|i| (anchor, i)))
                .collect();
        }
    }

    /// Reverses the most recent step. Returns false if there was nothing to
    /// undo.
    pub fn undo(&self, target: &dyn CommandTarget) -> Result<bool> {
        let step = {
            let mut state = self.state.borrow_mut();
            state.open_chains.clear();
            match state.undo_stack.pop() {
                Some(step) => step,
                None => return Ok(false),
            }
        };
        log::debug!("undo '{}'", step.label);
        if let Err(e) = target.apply(&step.undo) {
            self.state.borrow_mut().undo_stack.push(step);
            return Err(e);
        }
        self.state.borrow_mut().redo_stack.push(step);
        Ok(true)
    }

    /// Performs the most recently undone step again. Returns false if there
    /// was nothing to redo.
    pub fn redo(&self, target: &dyn CommandTarget) -> Result<bool> {
        let step = {
            let mut state = self.state.borrow_mut();
            state.open_chains.clear();
            match state.redo_stack.pop() {
                Some(step) => step,
                None => return Ok(false),
            }
        };
        log::debug!("redo '{}'", step.label);
        if let Err(e) = target.apply(&step.redo) {
            self.state.borrow_mut().redo_stack.push(step);
            return Err(e);
        }
        self.state.borrow_mut().undo_stack.push(step);
        Ok(true)
    }

    #[allow(missing_docs)]
    pub fn can_undo(&self) -> bool {
        !self.state.borrow().undo_stack.is_empty()
    }

    #[allow(missing_docs)]
    pub fn can_redo(&self) -> bool {
        !self.state.borrow().redo_stack.is_empty()
    }

    /// The number of steps that can be undone.
    pub fn len(&self) -> usize {
        self.state.borrow().undo_stack.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The label of the step [History::undo()] would reverse.
    pub fn undo_label(&self) -> Option<String> {
        self.state
            .borrow()
            .undo_stack
            .last()
            .map(|s| s.label.clone())
    }

    /// The label of the step [History::redo()] would perform.
    pub fn redo_label(&self) -> Option<String> {
        self.state
            .borrow()
            .redo_stack
            .last()
            .map(|s| s.label.clone())
    }

    /// Forgets everything.
    pub fn clear(&self) {
        *self.state.borrow_mut() = Default::default();
    }
}
