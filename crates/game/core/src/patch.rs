//! Field-level document updates.
//!
//! A [`Patch`] is the unit of atomic mutation against a session document: an
//! ordered list of `/`-separated field paths, each either set to a JSON value
//! or deleted. Every validated command plans exactly one patch, and the store
//! applies it in a single step so observers never see half of an operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error raised when a patch addresses an unusable field path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("invalid field path `{0}`")]
    InvalidPath(String),
}

/// One field assignment. `value: None` deletes the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub path: String,
    pub value: Option<Value>,
}

/// Ordered set of field updates applied atomically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    updates: Vec<FieldUpdate>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment.
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_set(path, value);
        self
    }

    /// Builder-style deletion.
    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.push_delete(path);
        self
    }

    pub fn push_set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.updates.push(FieldUpdate {
            path: path.into(),
            value: Some(value.into()),
        });
    }

    pub fn push_delete(&mut self, path: impl Into<String>) {
        self.updates.push(FieldUpdate {
            path: path.into(),
            value: None,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn updates(&self) -> &[FieldUpdate] {
        &self.updates
    }

    /// Looks up the value assigned to `path`, if this patch sets it.
    pub fn value_of(&self, path: &str) -> Option<&Value> {
        self.updates
            .iter()
            .rev()
            .find(|update| update.path == path)
            .and_then(|update| update.value.as_ref())
    }

    /// Checks every path before anything is written.
    pub fn validate(&self) -> Result<(), PatchError> {
        for update in &self.updates {
            if update.path.is_empty() || update.path.split('/').any(str::is_empty) {
                return Err(PatchError::InvalidPath(update.path.clone()));
            }
        }
        Ok(())
    }

    /// Applies all updates to `document` in order.
    ///
    /// Paths are validated up front, so either every update lands or none
    /// does. Intermediate objects are created for assignments; a non-object
    /// value standing in the way is replaced, matching last-writer-wins
    /// semantics. Deleting a missing field is a no-op.
    pub fn apply(&self, document: &mut Value) -> Result<(), PatchError> {
        self.validate()?;
        for update in &self.updates {
            let segments: Vec<&str> = update.path.split('/').collect();
            apply_update(document, &segments, update.value.as_ref());
        }
        Ok(())
    }

    /// Appends all updates from `other` after this patch's updates.
    pub fn extend(&mut self, other: Patch) {
        self.updates.extend(other.updates);
    }
}

fn apply_update(root: &mut Value, segments: &[&str], value: Option<&Value>) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        node = match value {
            Some(_) => as_object_mut(node)
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            None => match node.get_mut(*segment) {
                Some(child) => child,
                None => return,
            },
        };
    }

    match value {
        Some(value) => {
            as_object_mut(node).insert((*last).to_string(), value.clone());
        }
        None => {
            if let Value::Object(map) = node {
                map.remove(*last);
            }
        }
    }
}

fn as_object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
