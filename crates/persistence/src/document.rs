// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Keys, versions and field-level write operations for JSON documents.

use crate::error::PersistenceError;
use serde_json::{Map, Value};
use staffing_domain::{ApplicationId, PostingId};

/// A named set of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Staffing requests.
    Postings,
    /// Applications to postings.
    Applications,
    /// Records materialized from confirmed cells.
    WorkRecords,
}

impl Collection {
    /// Converts this collection to its stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postings => "postings",
            Self::Applications => "applications",
            Self::WorkRecords => "workRecords",
        }
    }
}

/// Addresses one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    /// The collection.
    pub collection: Collection,
    /// The document id within the collection.
    pub id: String,
}

impl DocumentKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(collection: Collection, id: &str) -> Self {
        Self {
            collection,
            id: id.to_string(),
        }
    }

    /// Key of a posting document.
    #[must_use]
    pub fn posting(id: &PostingId) -> Self {
        Self::new(Collection::Postings, id.value())
    }

    /// Key of an application document.
    #[must_use]
    pub fn application(id: &ApplicationId) -> Self {
        Self::new(Collection::Applications, id.value())
    }

    /// Key of a work record document.
    #[must_use]
    pub fn work_record(id: &str) -> Self {
        Self::new(Collection::WorkRecords, id)
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection.as_str(), self.id)
    }
}

/// A value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Monotonic per-document version, bumped by every write.
    pub version: u64,
    /// The document body.
    pub value: T,
}

/// A write to one field of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Replace the field.
    Set(Value),
    /// Append each value not already present in the array.
    ArrayUnion(Vec<Value>),
    /// Remove every element equal to one of the values.
    ArrayRemove(Vec<Value>),
    /// Remove every element whose `keys` fields equal those of one of the
    /// values. Other fields are ignored; an absent field equals `null`.
    ArrayRemoveMatching {
        /// Fields that identify an element.
        keys: Vec<String>,
        /// Elements to remove.
        values: Vec<Value>,
    },
    /// Remove the field.
    Delete,
}

/// Field writes against one document, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPatch {
    /// The document to patch.
    pub key: DocumentKey,
    /// `(field, op)` pairs.
    pub ops: Vec<(String, FieldOp)>,
    /// Whether a missing document is created as an empty object first.
    /// Otherwise patching a missing document fails with `NotFound`.
    pub create: bool,
}

impl DocumentPatch {
    /// Field writes against an existing document.
    #[must_use]
    pub const fn update(key: DocumentKey, ops: Vec<(String, FieldOp)>) -> Self {
        Self {
            key,
            ops,
            create: false,
        }
    }

    /// Writes a whole new document, one `Set` per top-level field.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidDocument` if `body` is not an object.
    pub fn insert(key: DocumentKey, body: Value) -> Result<Self, PersistenceError> {
        let Value::Object(fields) = body else {
            return Err(PersistenceError::InvalidDocument(format!(
                "new document {key} is not an object"
            )));
        };
        Ok(Self {
            key,
            ops: fields
                .into_iter()
                .map(|(field, value)| (field, FieldOp::Set(value)))
                .collect(),
            create: true,
        })
    }
}

/// The version a transaction observed for a document.
///
/// `None` means the document did not exist when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadGuard {
    /// The document read.
    pub key: DocumentKey,
    /// The observed version.
    pub version: Option<u64>,
}

/// Applies field operations to a document body.
///
/// Array operations on a field that is absent or not an array treat it as
/// an empty array.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidDocument` if the body is not a JSON object.
pub fn apply_ops(body: &mut Value, ops: &[(String, FieldOp)]) -> Result<(), PersistenceError> {
    let Value::Object(fields) = body else {
        return Err(PersistenceError::InvalidDocument(String::from(
            "document body is not an object",
        )));
    };

    for (field, op) in ops {
        apply_op(fields, field, op);
    }
    Ok(())
}

fn apply_op(fields: &mut Map<String, Value>, field: &str, op: &FieldOp) {
    match op {
        FieldOp::Set(value) => {
            fields.insert(field.to_string(), value.clone());
        }
        FieldOp::Delete => {
            fields.remove(field);
        }
        FieldOp::ArrayUnion(values) => update_array(fields, field, |array| {
            for value in values {
                if !array.contains(value) {
                    array.push(value.clone());
                }
            }
        }),
        FieldOp::ArrayRemove(values) => update_array(fields, field, |array| {
            array.retain(|element| !values.contains(element));
        }),
        FieldOp::ArrayRemoveMatching { keys, values } => update_array(fields, field, |array| {
            array.retain(|element| !values.iter().any(|value| same_keys(element, value, keys)));
        }),
    }
}

fn key_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|field| !field.is_null())
}

fn same_keys(element: &Value, value: &Value, keys: &[String]) -> bool {
    element.is_object()
        && keys
            .iter()
            .all(|key| key_field(element, key) == key_field(value, key))
}

fn update_array(
    fields: &mut Map<String, Value>,
    field: &str,
    update: impl FnOnce(&mut Vec<Value>),
) {
    let mut array: Vec<Value> = match fields.remove(field) {
        Some(Value::Array(array)) => array,
        _ => Vec::new(),
    };
    update(&mut array);
    fields.insert(field.to_string(), Value::Array(array));
}
