// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Import another document's page as a reusable form XObject.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use proofmark_core::error::{ProofmarkError, Result};
use tracing::{debug, instrument, warn};

use super::objects::inherited;
use super::page::PageBox;
use crate::content::page_content_bytes;

/// Convert the first page of `source` into a form XObject stored in `target`.
///
/// The form's /BBox is the page's media box and its resources are copied
/// along with everything they reference.
#[instrument(skip_all)]
pub fn import_first_page_as_form(source: &Document, target: &mut Document) -> Result<ObjectId> {
    let page_id = source
        .get_pages()
        .into_values()
        .next()
        .ok_or_else(|| ProofmarkError::PdfError("overlay document has no pages".to_string()))?;

    let bbox = PageBox::of(source, page_id).media_box;
    let content = page_content_bytes(source, page_id)?;

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "FormType" => 1,
        "BBox" => vec![
            Object::Real(bbox.left()),
            Object::Real(bbox.bottom()),
            Object::Real(bbox.right()),
            Object::Real(bbox.top()),
        ],
    };
    if let Some(resources) = inherited(source, page_id, b"Resources") {
        let mut copier = ObjectCopier::new(source);
        dict.set("Resources", copier.copy(target, resources));
        debug!(objects = copier.copied.len(), "overlay resources copied");
    }

    let mut stream = Stream::new(dict, content);
    if let Err(err) = stream.compress() {
        debug!(%err, "form content left uncompressed");
    }
    Ok(target.add_object(stream))
}

/// Copies objects between documents, following references.
///
/// Each source object is copied once, so shared objects stay shared and
/// reference cycles terminate. /Parent links are dropped.
struct ObjectCopier<'s> {
    source: &'s Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'s> ObjectCopier<'s> {
    fn new(source: &'s Document) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    fn copy(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dict(target, dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy(target, item)).collect())
            }
            Object::Reference(id) => {
                if let Some(new_id) = self.copied.get(id) {
                    return Object::Reference(*new_id);
                }
                match self.source.get_object(*id) {
                    Ok(referenced) => {
                        let new_id = target.new_object_id();
                        self.copied.insert(*id, new_id);
                        let cloned = self.copy(target, referenced);
                        target.objects.insert(new_id, cloned);
                        Object::Reference(new_id)
                    }
                    Err(err) => {
                        warn!(ref_id = ?id, %err, "Cannot resolve reference, using Null");
                        Object::Null
                    }
                }
            }
            Object::Stream(stream) => {
                Object::Stream(Stream::new(self.copy_dict(target, &stream.dict), stream.content.clone()))
            }
            other => other.clone(),
        }
    }

    fn copy_dict(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            new_dict.set(key.clone(), self.copy(target, value));
        }
        new_dict
    }
}
