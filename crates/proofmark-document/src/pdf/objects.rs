// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object-graph helpers: reference resolution and page-tree inheritance.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Reference chains longer than this are treated as broken.
const MAX_REFERENCE_HOPS: usize = 16;

/// Page-tree depth limit when walking /Parent links.
const MAX_TREE_DEPTH: usize = 64;

/// Follow indirect references until a direct object is reached.
///
/// A dangling reference resolves to itself, which callers then fail to
/// interpret as whatever type they expected.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    let mut current = object;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Resolve to a dictionary (a stream's dictionary counts).
pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, object) {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up `key` in `dict` and resolve the value.
pub(crate) fn entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|value| resolve(doc, value))
}

pub(crate) fn entry_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|value| resolve_dict(doc, value))
}

pub(crate) fn entry_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f32> {
    entry(doc, dict, key).and_then(crate::geometry::matrix::number)
}

/// Look up a page attribute, walking up the page tree via /Parent.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(value) = entry(doc, dict, key) {
            return Some(value);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => dict = doc.get_dictionary(*parent_id).ok()?,
            _ => return None,
        }
    }
    None
}

/// A name object's bytes.
pub(crate) fn name(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}
