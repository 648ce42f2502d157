//! Path-addressed change tracking over a plain JSON document.
//!
//! [`Store`] owns a [`serde_json::Value`] tree plus a registry of tracked
//! paths built by walking the tree once at construction:
//! - every key of a plain object becomes a tracked cell,
//! - a non-empty array becomes a tracked sequence, and its elements are
//!   not walked,
//! - an empty array registers as a cell, because the walk decides by
//!   length at observation time.
//!
//! Cell writes through [`Store::set`] or a [`CellHandle`] report the
//! incoming value to the [`Host`] first and store it second, and writes
//! that would not change the stored value are suppressed. Sequence
//! mutations through a [`SeqHandle`] apply the edit first and then report
//! the whole sequence exactly once, whether or not the edit changed
//! anything. Writes to paths the walk never registered land silently.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use json_observe_path::{
    is_child_expr, is_valid_index, join_key, parse_dot_path, split_last, value_at, value_at_expr,
    value_at_mut,
};

mod events;
mod order;

pub use events::{ChangeRecord, RecordingHost};
pub use order::cmp_values;

/// How the construction-time walk classified a tracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Accessor-style slot: writes are compared, reported, then stored.
    Cell,
    /// Instrumented array: mutations report coarsely with the whole value.
    Seq,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("path is empty")]
    EmptyPath,
    #[error("path not found")]
    PathNotFound,
    #[error("path is not tracked")]
    NotTracked,
    #[error("path is not a tracked cell")]
    NotACell,
    #[error("path is not a tracked sequence")]
    NotASequence,
    #[error("path does not point into a container")]
    NotContainer,
    #[error("invalid array index")]
    InvalidIndex,
}

/// Change sink a [`Store`] reports into.
///
/// The store owns its host, so an `update` implementation has no way to
/// reach back into the store that is calling it.
pub trait Host {
    /// Receives one reported change: the path written and the value now
    /// reported for that path.
    fn update(&mut self, path: &str, value: &Value);
}

/// Adapts a closure to the [`Host`] contract.
pub struct FnHost<F>(pub F);

impl<F: FnMut(&str, &Value)> Host for FnHost<F> {
    fn update(&mut self, path: &str, value: &Value) {
        (self.0)(path, value)
    }
}

/// Change-tracking wrapper around one JSON document.
pub struct Store<H: Host> {
    doc: Value,
    tracked: IndexMap<String, TrackKind>,
    root_keys: Vec<String>,
    host: H,
}

/// Write handle for one tracked cell.
pub struct CellHandle<'a, H: Host> {
    store: &'a mut Store<H>,
    path: String,
}

/// Mutation handle for one tracked sequence.
///
/// Every mutating method applies its edit and then reports the whole
/// sequence to the host once, even when the edit was a no-op (for example
/// popping an empty sequence).
pub struct SeqHandle<'a, H: Host> {
    store: &'a mut Store<H>,
    path: String,
}

/// Key-level facade over the document's top level.
///
/// The proxy serves exactly the keys the root object had when the store
/// was constructed. Keys added later are readable through [`Store::get`]
/// but stay invisible here.
pub struct DataProxy<'a, H: Host> {
    store: &'a mut Store<H>,
}

impl<H: Host> Store<H> {
    /// Builds a store over `data`, walking it once to register tracked
    /// paths and capturing the top-level key list for [`Store::proxy`].
    pub fn new(host: H, data: Value) -> Store<H> {
        let mut tracked = IndexMap::new();
        observe_value(&mut tracked, &data, "");
        let root_keys = match &data {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        Store {
            doc: data,
            tracked,
            root_keys,
            host,
        }
    }

    /// Current document.
    pub fn view(&self) -> &Value {
        &self.doc
    }

    /// Reads the value under a path expression. The empty expression
    /// resolves to the document root.
    pub fn get(&self, expr: &str) -> Option<&Value> {
        value_at_expr(&self.doc, expr)
    }

    /// Writes a value under a path expression.
    ///
    /// What happens depends on how the walk classified the path:
    /// - tracked cell: a write that would leave the stored value unchanged
    ///   is suppressed; otherwise the host hears `(expr, value)` while the
    ///   document still holds the previous value, registry entries under
    ///   the path are dropped, the incoming value is walked for fresh
    ///   registrations, and the document is updated;
    /// - tracked sequence: the slot is overwritten silently and the path
    ///   is struck from the registry, leaving the replacement untracked;
    /// - untracked: the write lands silently when the parent exists, and
    ///   may add a new object key or append at an array's end.
    pub fn set(&mut self, expr: &str, value: Value) -> Result<(), StoreError> {
        if expr.is_empty() {
            return Err(StoreError::EmptyPath);
        }
        match self.tracked.get(expr).copied() {
            Some(TrackKind::Cell) => self.set_tracked_cell(expr, value),
            Some(TrackKind::Seq) => self.replace_sequence(expr, value),
            None => self.set_untracked(expr, value),
        }
    }

    /// Borrows a write handle for a tracked cell path.
    pub fn cell(&mut self, expr: &str) -> Result<CellHandle<'_, H>, StoreError> {
        match self.tracked.get(expr).copied() {
            Some(TrackKind::Cell) => {}
            Some(TrackKind::Seq) => return Err(StoreError::NotACell),
            None => return Err(StoreError::NotTracked),
        }
        Ok(CellHandle {
            path: expr.to_string(),
            store: self,
        })
    }

    /// Borrows a mutation handle for a tracked sequence path.
    pub fn seq(&mut self, expr: &str) -> Result<SeqHandle<'_, H>, StoreError> {
        match self.tracked.get(expr).copied() {
            Some(TrackKind::Seq) => {}
            Some(TrackKind::Cell) => return Err(StoreError::NotASequence),
            None => return Err(StoreError::NotTracked),
        }
        Ok(SeqHandle {
            path: expr.to_string(),
            store: self,
        })
    }

    /// Borrows the top-level key facade.
    pub fn proxy(&mut self) -> DataProxy<'_, H> {
        DataProxy { store: self }
    }

    pub fn is_tracked(&self, expr: &str) -> bool {
        self.tracked.contains_key(expr)
    }

    pub fn tracked_kind(&self, expr: &str) -> Option<TrackKind> {
        self.tracked.get(expr).copied()
    }

    /// Registered paths in registration order.
    pub fn tracked_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracked.keys().map(String::as_str)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn set_tracked_cell(&mut self, expr: &str, value: Value) -> Result<(), StoreError> {
        let path = parse_dot_path(expr);
        let current = value_at(&self.doc, &path).ok_or(StoreError::PathNotFound)?;
        if *current == value {
            return Ok(());
        }
        // The host hears about the write while the document still holds
        // the previous value.
        self.host.update(expr, &value);
        // Registrations under the replaced slot are gone; the slot itself
        // stays a cell.
        self.tracked.retain(|p, _| !is_child_expr(expr, p));
        observe_value(&mut self.tracked, &value, expr);
        let slot = value_at_mut(&mut self.doc, &path).ok_or(StoreError::PathNotFound)?;
        *slot = value;
        Ok(())
    }

    fn replace_sequence(&mut self, expr: &str, value: Value) -> Result<(), StoreError> {
        // No accessor sits on a sequence slot: the write lands silently
        // and the replacement value is left untracked.
        let path = parse_dot_path(expr);
        let slot = value_at_mut(&mut self.doc, &path).ok_or(StoreError::PathNotFound)?;
        *slot = value;
        self.tracked.shift_remove(expr);
        Ok(())
    }

    fn set_untracked(&mut self, expr: &str, value: Value) -> Result<(), StoreError> {
        let path = parse_dot_path(expr);
        let (head, last) = match split_last(&path) {
            Some(parts) => parts,
            None => return Err(StoreError::EmptyPath),
        };
        let parent = value_at_mut(&mut self.doc, head).ok_or(StoreError::PathNotFound)?;
        match parent {
            Value::Object(map) => {
                map.insert(last.to_string(), value);
                Ok(())
            }
            Value::Array(items) => {
                if !is_valid_index(last) {
                    return Err(StoreError::InvalidIndex);
                }
                let index: usize = last.parse().map_err(|_| StoreError::InvalidIndex)?;
                if index < items.len() {
                    items[index] = value;
                } else if index == items.len() {
                    items.push(value);
                } else {
                    return Err(StoreError::InvalidIndex);
                }
                Ok(())
            }
            _ => Err(StoreError::NotContainer),
        }
    }
}

/// Walks a plain keyed object, registering each key under `prefix`.
/// Arrays that are non-empty at walk time register as sequences and their
/// elements are left alone; any other value registers as a cell and is
/// walked in turn. Non-object nodes register nothing.
fn observe_value(tracked: &mut IndexMap<String, TrackKind>, node: &Value, prefix: &str) {
    let entries = match node {
        Value::Object(map) => map,
        _ => return,
    };
    for (key, value) in entries {
        let path = join_key(prefix, key);
        match value {
            Value::Array(items) if !items.is_empty() => {
                tracked.insert(path, TrackKind::Seq);
            }
            _ => {
                tracked.insert(path.clone(), TrackKind::Cell);
                observe_value(tracked, value, &path);
            }
        }
    }
}

impl<'a, H: Host> CellHandle<'a, H> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current value under the cell, cloned out of the document.
    pub fn get(&self) -> Option<Value> {
        value_at_expr(&self.store.doc, &self.path).cloned()
    }

    /// Writes through [`Store::set`] with this handle's path.
    pub fn set(&mut self, value: Value) -> Result<(), StoreError> {
        self.store.set(&self.path, value)
    }
}

impl<'a, H: Host> SeqHandle<'a, H> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Appends one value. Returns the new length.
    pub fn push(&mut self, value: Value) -> Result<usize, StoreError> {
        self.with_items(|items| {
            items.push(value);
            items.len()
        })
    }

    /// Appends every value in order. Returns the new length.
    pub fn push_all(&mut self, values: Vec<Value>) -> Result<usize, StoreError> {
        self.with_items(|items| {
            items.extend(values);
            items.len()
        })
    }

    /// Removes and returns the last value, if any.
    pub fn pop(&mut self) -> Result<Option<Value>, StoreError> {
        self.with_items(|items| items.pop())
    }

    /// Removes and returns the first value, if any.
    pub fn shift(&mut self) -> Result<Option<Value>, StoreError> {
        self.with_items(|items| {
            if items.is_empty() {
                None
            } else {
                Some(items.remove(0))
            }
        })
    }

    /// Prepends one value. Returns the new length.
    pub fn unshift(&mut self, value: Value) -> Result<usize, StoreError> {
        self.with_items(|items| {
            items.insert(0, value);
            items.len()
        })
    }

    /// Prepends every value, keeping their order. Returns the new length.
    pub fn unshift_all(&mut self, values: Vec<Value>) -> Result<usize, StoreError> {
        self.with_items(|items| {
            items.splice(0..0, values);
            items.len()
        })
    }

    /// Removes `delete_count` values starting at `start` and inserts
    /// `items` in their place. Both `start` and the deletion range clamp
    /// to the sequence's bounds. Returns the removed values.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        values: Vec<Value>,
    ) -> Result<Vec<Value>, StoreError> {
        self.with_items(|items| {
            let start = start.min(items.len());
            let end = start.saturating_add(delete_count).min(items.len());
            items.splice(start..end, values).collect()
        })
    }

    /// Sorts under the canonical order of [`cmp_values`]. The sort is
    /// stable.
    pub fn sort(&mut self) -> Result<(), StoreError> {
        self.with_items(|items| items.sort_by(cmp_values))
    }

    /// Sorts with a caller-supplied comparison. The sort is stable.
    pub fn sort_by(
        &mut self,
        mut compare: impl FnMut(&Value, &Value) -> std::cmp::Ordering,
    ) -> Result<(), StoreError> {
        self.with_items(|items| items.sort_by(|a, b| compare(a, b)))
    }

    /// Reverses the sequence in place.
    pub fn reverse(&mut self) -> Result<(), StoreError> {
        self.with_items(|items| items.reverse())
    }

    pub fn len(&self) -> usize {
        value_at_expr(&self.store.doc, &self.path)
            .and_then(Value::as_array)
            .map(|items| items.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, cloned out of the document.
    pub fn get(&self, index: usize) -> Option<Value> {
        value_at_expr(&self.store.doc, &self.path)
            .and_then(Value::as_array)
            .and_then(|items| items.get(index))
            .cloned()
    }

    fn with_items<R>(&mut self, edit: impl FnOnce(&mut Vec<Value>) -> R) -> Result<R, StoreError> {
        let path = parse_dot_path(&self.path);
        let slot = value_at_mut(&mut self.store.doc, &path).ok_or(StoreError::PathNotFound)?;
        let items = slot.as_array_mut().ok_or(StoreError::NotASequence)?;
        let out = edit(items);
        // One coarse report per mutation, after the edit has landed.
        let current = value_at(&self.store.doc, &path).ok_or(StoreError::PathNotFound)?;
        self.store.host.update(&self.path, current);
        Ok(out)
    }
}

impl<'a, H: Host> DataProxy<'a, H> {
    /// Keys served by the proxy, in the root object's original order.
    pub fn keys(&self) -> &[String] {
        &self.store.root_keys
    }

    pub fn len(&self) -> usize {
        self.store.root_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.root_keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.root_keys.iter().any(|k| k == key)
    }

    /// Pass-through read of one top-level key.
    pub fn get(&self, key: &str) -> Result<Value, StoreError> {
        if !self.contains(key) {
            return Err(StoreError::NotTracked);
        }
        Ok(self.store.doc.get(key).cloned().unwrap_or(Value::Null))
    }

    /// Writes one top-level key through [`Store::set`]. The key is taken
    /// literally; escaping is handled here.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        if !self.contains(key) {
            return Err(StoreError::NotTracked);
        }
        let expr = join_key("", key);
        self.store.set(&expr, value)
    }
}
