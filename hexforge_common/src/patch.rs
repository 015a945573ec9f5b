// Copyright 2025 Justin Hu
//
// This file is part of Hexforge.
//
// Hexforge is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Hexforge is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Hexforge. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON Patch (RFC 6902) operations for incremental state updates
//!
//! Patches apply atomically: either every operation succeeds, or the document
//! is left untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoStaticStr;
use thiserror::Error;

/// A single patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "op", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PatchOperation {
    /// Insert into an object or array, or replace the whole document
    Add {
        /// JSON pointer to the new value
        path: String,
        /// Value to insert
        value: Value,
    },
    /// Remove an existing value
    Remove {
        /// JSON pointer to the value
        path: String,
    },
    /// Overwrite an existing value
    Replace {
        /// JSON pointer to the value
        path: String,
        /// New value
        value: Value,
    },
    /// Remove a value and add it elsewhere
    Move {
        /// JSON pointer to the value to move
        from: String,
        /// JSON pointer to the destination
        path: String,
    },
    /// Add a copy of a value elsewhere
    Copy {
        /// JSON pointer to the value to copy
        from: String,
        /// JSON pointer to the destination
        path: String,
    },
    /// Fail the patch unless a value equals the given one
    Test {
        /// JSON pointer to the value
        path: String,
        /// Expected value
        value: Value,
    },
}

/// Reasons a patch can't be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Pointer was neither empty nor started with '/'
    #[error("'{0}' is not a JSON pointer")]
    InvalidPointer(String),
    /// Nothing at the pointer (or its parent, for insertions)
    #[error("nothing at '{0}'")]
    PathNotFound(String),
    /// Array index was malformed or out of range
    #[error("bad array index in '{0}'")]
    InvalidIndex(String),
    /// Tried to index into a scalar
    #[error("'{0}' does not point into an object or array")]
    NotAContainer(String),
    /// The whole document can't be removed
    #[error("can't remove the document root")]
    RemoveRoot,
    /// A value can't be moved inside itself
    #[error("can't move '{from}' into its own child '{path}'")]
    MoveIntoChild {
        /// Source pointer
        from: String,
        /// Destination pointer
        path: String,
    },
    /// A test operation found a different value
    #[error("test at '{0}' failed")]
    TestFailed(String),
    /// Patch failed at this operation
    #[error("operation {index} ({op}) failed: {source}")]
    Operation {
        /// Position in the patch
        index: usize,
        /// Operation name
        op: &'static str,
        /// What went wrong
        #[source]
        source: Box<PatchError>,
    },
}

/// Apply every operation to the document, or none of them
pub fn apply(document: &mut Value, operations: &[PatchOperation]) -> Result<(), PatchError> {
    let mut scratch = document.clone();
    for (index, operation) in operations.iter().enumerate() {
        apply_one(&mut scratch, operation).map_err(|source| PatchError::Operation {
            index,
            op: operation.into(),
            source: Box::new(source),
        })?;
    }
    *document = scratch;
    Ok(())
}

fn apply_one(document: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(document, path, value.clone()),
        PatchOperation::Remove { path } => remove(document, path).map(|_| ()),
        PatchOperation::Replace { path, value } => {
            *resolve_mut(document, path)? = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if from == path {
                // still has to exist
                resolve(document, from)?;
                return Ok(());
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(document, from)?;
            add(document, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = resolve(document, from)?.clone();
            add(document, path, value)
        }
        PatchOperation::Test { path, value } => {
            if resolve(document, path)? == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

fn add(document: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *document = value;
        return Ok(());
    }
    let (parent, token) = split(path)?;
    match resolve_mut(document, parent)? {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(array) => {
            if token == "-" {
                array.push(value);
                return Ok(());
            }
            let index = array_index(&token, path)?;
            if index > array.len() {
                return Err(PatchError::InvalidIndex(path.to_owned()));
            }
            array.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::NotAContainer(path.to_owned())),
    }
}

fn remove(document: &mut Value, path: &str) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::RemoveRoot);
    }
    let (parent, token) = split(path)?;
    match resolve_mut(document, parent)? {
        Value::Object(map) => map
            .remove(&token)
            .ok_or_else(|| PatchError::PathNotFound(path.to_owned())),
        Value::Array(array) => {
            let index = array_index(&token, path)?;
            if index >= array.len() {
                return Err(PatchError::InvalidIndex(path.to_owned()));
            }
            Ok(array.remove(index))
        }
        _ => Err(PatchError::NotAContainer(path.to_owned())),
    }
}

fn resolve<'a>(document: &'a Value, path: &str) -> Result<&'a Value, PatchError> {
    check_pointer(path)?;
    document
        .pointer(path)
        .ok_or_else(|| PatchError::PathNotFound(path.to_owned()))
}

fn resolve_mut<'a>(document: &'a mut Value, path: &str) -> Result<&'a mut Value, PatchError> {
    check_pointer(path)?;
    document
        .pointer_mut(path)
        .ok_or_else(|| PatchError::PathNotFound(path.to_owned()))
}

fn check_pointer(path: &str) -> Result<(), PatchError> {
    if path.is_empty() || path.starts_with('/') {
        Ok(())
    } else {
        Err(PatchError::InvalidPointer(path.to_owned()))
    }
}

/// Split a non-empty pointer into its (still escaped) parent and unescaped last token
fn split(path: &str) -> Result<(&str, String), PatchError> {
    check_pointer(path)?;
    let Some((parent, last)) = path.rsplit_once('/') else {
        return Err(PatchError::InvalidPointer(path.to_owned()));
    };
    Ok((parent, last.replace("~1", "/").replace("~0", "~")))
}

fn array_index(token: &str, path: &str) -> Result<usize, PatchError> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|byte| byte.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !well_formed {
        return Err(PatchError::InvalidIndex(path.to_owned()));
    }
    token
        .parse()
        .map_err(|_| PatchError::InvalidIndex(path.to_owned()))
}
