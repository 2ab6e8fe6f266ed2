// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas: collects drawing operations and appends them to a page as a
// new content stream, leaving the existing streams and resources in place.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use proofmark_core::error::{ProofmarkError, Result};
use tracing::debug;

use super::objects::{inherited, resolve_dict};
use super::page::PageBox;
use crate::geometry::{Matrix, Point, Rect};

/// RGB triple with components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Drawing surface for one page.
///
/// Nothing touches the document until [`PageCanvas::finish`], apart from
/// resource registration.
#[derive(Debug)]
pub struct PageCanvas {
    page_id: ObjectId,
    operations: Vec<Operation>,
    font: Option<Vec<u8>>,
    /// Closing `Q` owed for a leading counter-rotation.
    restore: bool,
}

impl PageCanvas {
    /// Canvas in the page's own coordinate system.
    pub fn native(page_id: ObjectId) -> Self {
        Self {
            page_id,
            operations: Vec::new(),
            font: None,
            restore: false,
        }
    }

    /// Canvas in the orientation the page is displayed in, ignoring /Rotate.
    ///
    /// On a rotated page the existing content is isolated in `q`/`Q` and the
    /// canvas's own operations run under the inverse rotation.
    pub fn logical(doc: &mut Document, page_id: ObjectId) -> Result<Self> {
        let page = PageBox::of(doc, page_id);
        let mut canvas = Self::native(page_id);
        if page.rotation != 0 {
            wrap_existing_content(doc, page_id)?;
            canvas.push("q", vec![]);
            canvas.push("cm", page.logical_orientation().to_operands());
            canvas.restore = true;
        }
        Ok(canvas)
    }

    /// Paint the form XObject `form_id` with its origin at `origin`, unscaled.
    pub fn draw_form(&mut self, doc: &mut Document, form_id: ObjectId, origin: Point) -> Result<()> {
        let name = register_resource(doc, self.page_id, b"XObject", "PmForm", Object::Reference(form_id))?;
        self.push("q", vec![]);
        self.push("cm", Matrix::translation(origin.x, origin.y).to_operands());
        self.push("Do", vec![Object::Name(name)]);
        self.push("Q", vec![]);
        Ok(())
    }

    /// Outline `rect` in a solid colour.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb) {
        self.push("q", vec![]);
        self.push("RG", color.iter().map(|c| Object::Real(*c)).collect());
        self.push(
            "re",
            vec![
                Object::Real(rect.x),
                Object::Real(rect.y),
                Object::Real(rect.width),
                Object::Real(rect.height),
            ],
        );
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    /// Place `text` in Helvetica with its baseline origin at `origin`.
    pub fn show_text(
        &mut self,
        doc: &mut Document,
        text: &str,
        origin: Point,
        size: f32,
        color: Rgb,
    ) -> Result<()> {
        let font = match &self.font {
            Some(font) => font.clone(),
            None => {
                let font_id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                });
                let font = register_resource(doc, self.page_id, b"Font", "PmFont", Object::Reference(font_id))?;
                self.font = Some(font.clone());
                font
            }
        };

        self.push("q", vec![]);
        self.push("rg", color.iter().map(|c| Object::Real(*c)).collect());
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(font), Object::Real(size)]);
        self.push("Td", vec![Object::Real(origin.x), Object::Real(origin.y)]);
        self.push("Tj", vec![Object::string_literal(text)]);
        self.push("ET", vec![]);
        self.push("Q", vec![]);
        Ok(())
    }

    /// Encode the collected operations and append them to the page.
    pub fn finish(mut self, doc: &mut Document) -> Result<()> {
        if self.operations.is_empty() {
            return Ok(());
        }
        if self.restore {
            self.push("Q", vec![]);
        }
        let bytes = Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|err| ProofmarkError::PdfError(format!("cannot encode overlay content: {}", err)))?;
        debug!(page = ?self.page_id, bytes = bytes.len(), "appending content stream");
        append_content(doc, self.page_id, bytes)
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }
}

/// Append a content stream after the page's existing ones.
pub(crate) fn append_content(doc: &mut Document, page_id: ObjectId, bytes: Vec<u8>) -> Result<()> {
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
    edit_contents(doc, page_id, |streams| streams.push(Object::Reference(stream_id)))
}

/// Bracket the page's existing content in `q` ... `Q`.
pub(crate) fn wrap_existing_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    edit_contents(doc, page_id, |streams| {
        if !streams.is_empty() {
            streams.insert(0, Object::Reference(save_id));
            streams.push(Object::Reference(restore_id));
        }
    })
}

/// Rewrite /Contents as a direct array of stream references and edit it.
fn edit_contents(
    doc: &mut Document,
    page_id: ObjectId,
    edit: impl FnOnce(&mut Vec<Object>),
) -> Result<()> {
    let mut streams = {
        let page = page_dict(doc, page_id)?;
        match page.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            _ => Vec::new(),
        }
    };
    edit(&mut streams);
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(streams));
    Ok(())
}

/// Add `value` under a fresh name in the page's `category` resources.
///
/// The page receives its own direct copy of its effective resources, so
/// inherited or shared resource dictionaries are never modified.
pub(crate) fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    prefix: &str,
    value: Object,
) -> Result<Vec<u8>> {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|r| resolve_dict(doc, r))
        .cloned()
        .unwrap_or_else(Dictionary::new);
    let mut entries = resources
        .get(category)
        .ok()
        .and_then(|e| resolve_dict(doc, e))
        .cloned()
        .unwrap_or_else(Dictionary::new);

    let name = unused_name(&entries, prefix);
    entries.set(name.clone(), value);
    resources.set(category.to_vec(), Object::Dictionary(entries));
    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(name)
}

fn unused_name(entries: &Dictionary, prefix: &str) -> Vec<u8> {
    let mut index = 1;
    loop {
        let candidate = format!("{}{}", prefix, index).into_bytes();
        if !entries.has(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    doc.get_dictionary(page_id)
        .map_err(|err| ProofmarkError::PdfError(format!("cannot read page {:?}: {}", page_id, err)))
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_dictionary_mut(page_id)
        .map_err(|err| ProofmarkError::PdfError(format!("cannot edit page {:?}: {}", page_id, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::page_content_bytes;
    use crate::fixtures;

    #[test]
    fn appended_stream_follows_existing_content() {
        let (mut doc, page_id) = fixtures::single_page_doc(vec![Operation::new("n", vec![])]);
        let mut canvas = PageCanvas::native(page_id);
        canvas.stroke_rect(Rect::new(1.0, 2.0, 3.0, 4.0), [0.0, 1.0, 0.0]);
        canvas.finish(&mut doc).expect("finish");

        let bytes = page_content_bytes(&doc, page_id).expect("content");
        let content = Content::decode(&bytes).expect("decode");
        let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["n", "q", "RG", "re", "S", "Q"]);
    }

    #[test]
    fn empty_canvas_leaves_page_untouched() {
        let (mut doc, page_id) = fixtures::single_page_doc(vec![]);
        PageCanvas::native(page_id).finish(&mut doc).expect("finish");
        let page = doc.get_dictionary(page_id).expect("page");
        assert!(matches!(page.get(b"Contents"), Ok(Object::Reference(_))));
    }

    #[test]
    fn registered_names_do_not_collide() {
        let (mut doc, page_id) = fixtures::single_page_doc(vec![]);
        let first = register_resource(&mut doc, page_id, b"XObject", "PmForm", Object::Null).expect("first");
        let second = register_resource(&mut doc, page_id, b"XObject", "PmForm", Object::Null).expect("second");
        assert_eq!(first, b"PmForm1".to_vec());
        assert_eq!(second, b"PmForm2".to_vec());
    }

    #[test]
    fn inherited_resources_are_copied_not_shared() {
        let (mut doc, page_id) = fixtures::inherited_box_doc(595.0, 842.0, 0);
        let parent_id = match doc.get_dictionary(page_id).expect("page").get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            other => panic!("expected parent reference, got {:?}", other),
        };
        register_resource(&mut doc, page_id, b"XObject", "PmForm", Object::Null).expect("register");

        let parent = doc.get_dictionary(parent_id).expect("parent");
        let parent_resources = parent.get(b"Resources").expect("resources").as_dict().expect("dict");
        assert!(!parent_resources.has(b"XObject"));
        let page = doc.get_dictionary(page_id).expect("page");
        assert!(page.get(b"Resources").expect("own resources").as_dict().expect("dict").has(b"XObject"));
    }

    #[test]
    fn logical_canvas_on_rotated_page_wraps_and_counter_rotates() {
        let (mut doc, page_id) = fixtures::inherited_box_doc(842.0, 595.0, 90);
        fixtures::set_page_content(&mut doc, page_id, b"0 0 m 10 0 l S".to_vec());
        let mut canvas = PageCanvas::logical(&mut doc, page_id).expect("canvas");
        canvas.stroke_rect(Rect::new(0.0, 0.0, 5.0, 5.0), [0.0, 0.0, 1.0]);
        canvas.finish(&mut doc).expect("finish");

        let bytes = page_content_bytes(&doc, page_id).expect("content");
        let content = Content::decode(&bytes).expect("decode");
        let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators[..5], ["q", "m", "l", "S", "Q"]);
        assert_eq!(operators[5..7], ["q", "cm"]);
        assert_eq!(
            Matrix::from_operands(&content.operations[6].operands),
            Some(Matrix::new(0.0, 1.0, -1.0, 0.0, 842.0, 0.0))
        );
        assert_eq!(operators.last(), Some(&"Q"));
    }
}
