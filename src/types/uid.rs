// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for params and keys, and factories that help ensure
//! they are in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Identifies a [Param](crate::params::Param) for as long as the process
/// lives. History commands address params by this value.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct ParamUid(pub usize);
impl IsUid for ParamUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}
impl ParamUid {
    /// Mints a [ParamUid] that no other param in this process has.
    pub fn mint() -> Self {
        PARAM_UIDS.mint_next()
    }
}

/// Identifies a [Key](crate::keys::Key). Survives value edits, so it serves
/// as the anchor for coalescing history chains.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct KeyUid(pub usize);
impl IsUid for KeyUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}
impl KeyUid {
    /// Mints a [KeyUid] that no other key in this process has.
    pub fn mint() -> Self {
        KEY_UIDS.mint_next()
    }
}

static PARAM_UIDS: Lazy<UidFactory<ParamUid>> = Lazy::new(|| UidFactory::new(1));
static KEY_UIDS: Lazy<UidFactory<KeyUid>> = Lazy::new(|| UidFactory::new(1));

/// An optional Uid trait.
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

/// Generates unique uids.
#[derive(Debug)]
pub struct UidFactory<U: IsUid> {
    pub(crate) next_uid_value: AtomicUsize,
    pub(crate) _phantom: PhantomData<U>,
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }
}
