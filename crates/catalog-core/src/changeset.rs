//! Staged changes to one store
//!
//! A change set is computed from the collection as read, inspected or
//! printed, and only then applied. Application builds the complete new
//! collection in memory; nothing touches disk here.

use crate::{Error, Record, Result};
use std::collections::HashSet;

/// One staged mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Append a record whose id is not yet in the collection
    Add(T),

    /// Replace the record at `index` (position in the collection as read)
    Update { index: usize, record: T },

    /// Rearrange the collection: slot `i` receives the record read at `positions[i]`
    Reorder(Vec<usize>),
}

/// Staged diff for one store
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<T> {
    changes: Vec<Change<T>>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<T: Record + Clone> ChangeSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: T) {
        self.changes.push(Change::Add(record));
    }

    pub fn update(&mut self, index: usize, record: T) {
        self.changes.push(Change::Update { index, record });
    }

    pub fn reorder(&mut self, positions: Vec<usize>) {
        self.changes.push(Change::Reorder(positions));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change<T>] {
        &self.changes
    }

    /// Records staged for appending
    pub fn added(&self) -> impl Iterator<Item = &T> {
        self.changes.iter().filter_map(|c| match c {
            Change::Add(record) => Some(record),
            _ => None,
        })
    }

    /// Records staged for replacement
    pub fn updated(&self) -> impl Iterator<Item = &T> {
        self.changes.iter().filter_map(|c| match c {
            Change::Update { record, .. } => Some(record),
            _ => None,
        })
    }

    /// Build the collection that results from applying every change to `current`
    ///
    /// Updates are applied first (their indices refer to `current`), then
    /// reorders, then appends. An append whose id is already present fails
    /// with [`Error::AlreadyExists`] and leaves `current` untouched.
    pub fn apply(&self, current: &[T]) -> Result<Vec<T>> {
        let mut records = current.to_vec();

        for change in &self.changes {
            if let Change::Update { index, record } = change {
                let slot = records.get_mut(*index).ok_or_else(|| {
                    Error::Other(format!(
                        "update targets position {} but the store holds {} records",
                        index,
                        current.len()
                    ))
                })?;
                *slot = record.clone();
            }
        }

        for change in &self.changes {
            if let Change::Reorder(positions) = change {
                records = permute(records, positions)?;
            }
        }

        let mut ids: HashSet<String> = records.iter().map(|r| r.id().to_string()).collect();
        for change in &self.changes {
            if let Change::Add(record) = change {
                if !ids.insert(record.id().to_string()) {
                    return Err(Error::AlreadyExists(record.id().to_string()));
                }
                records.push(record.clone());
            }
        }

        Ok(records)
    }
}

fn permute<T>(records: Vec<T>, positions: &[usize]) -> Result<Vec<T>> {
    let len = records.len();
    let mut seen = vec![false; len];
    let valid = positions.len() == len
        && positions
            .iter()
            .all(|&p| p < len && !std::mem::replace(&mut seen[p], true));
    if !valid {
        return Err(Error::Other(format!(
            "reorder of {} positions does not match a store of {} records",
            positions.len(),
            len
        )));
    }

    let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();
    Ok(positions
        .iter()
        .filter_map(|&p| slots[p].take())
        .collect())
}
