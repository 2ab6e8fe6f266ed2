// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process PDF builders shared by the unit tests.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::geometry::Matrix;

pub(crate) const A4: (f32, f32) = (595.0, 842.0);

/// A document whose pages share one resource dictionary holding a
/// Helvetica font named `F1`.
pub(crate) fn document(page_contents: Vec<Vec<u8>>, size: (f32, f32)) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(helvetica());
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in page_contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), size.0.into(), size.1.into()],
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub(crate) fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialise fixture");
    out
}

pub(crate) fn write(doc: &mut Document, path: &Path) {
    std::fs::write(path, to_bytes(doc)).expect("write fixture");
}

pub(crate) fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().get(&1).expect("fixture has a first page")
}

pub(crate) fn encode(ops: Vec<Operation>) -> Vec<u8> {
    Content { operations: ops }.encode().expect("encode fixture content")
}

pub(crate) fn single_page_doc(ops: Vec<Operation>) -> (Document, ObjectId) {
    let doc = document(vec![encode(ops)], A4);
    let page_id = first_page(&doc);
    (doc, page_id)
}

pub(crate) fn overlay_doc(content: Vec<u8>) -> Document {
    document(vec![content], A4)
}

pub(crate) fn blank_pages_pdf(count: usize, width: f32, height: f32) -> Vec<u8> {
    to_bytes(&mut document(vec![Vec::new(); count], (width, height)))
}

/// Page placing a 1x1 image XObject `Im1` under `ctm`.
pub(crate) fn page_with_image(ctm: Matrix) -> (Document, ObjectId) {
    let mut ops = vec![Operation::new("q", vec![])];
    ops.push(Operation::new("cm", ctm.to_operands()));
    ops.push(Operation::new("Do", vec!["Im1".into()]));
    ops.push(Operation::new("Q", vec![]));
    let (mut doc, page_id) = single_page_doc(ops);

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0],
    );
    add_xobject(&mut doc, page_id, "Im1", image);
    (doc, page_id)
}

/// Page painting form `Fm1`, whose /Matrix translates a red 50pt line by
/// `(tx, ty)`.
pub(crate) fn page_with_red_form(tx: f32, ty: f32) -> (Document, ObjectId) {
    let (mut doc, page_id) = single_page_doc(vec![Operation::new("Do", vec!["Fm1".into()])]);
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Matrix" => Matrix::translation(tx, ty).to_operands(),
        },
        b"1 0 0 RG 0 0 m 50 0 l S".to_vec(),
    );
    add_xobject(&mut doc, page_id, "Fm1", form);
    (doc, page_id)
}

fn add_xobject(doc: &mut Document, page_id: ObjectId, name: &str, stream: Stream) {
    let xobject_id = doc.add_object(stream);
    let resources_id = match doc.get_dictionary(page_id).expect("page").get(b"Resources") {
        Ok(Object::Reference(id)) => *id,
        other => panic!("fixture resources should be indirect, got {:?}", other),
    };
    let resources = doc.get_dictionary_mut(resources_id).expect("resources");
    let mut xobjects = Dictionary::new();
    xobjects.set(name, xobject_id);
    resources.set("XObject", xobjects);
}

/// One page that inherits /MediaBox, /Rotate and /Resources from its parent.
pub(crate) fn inherited_box_doc(width: f32, height: f32, rotate: i64) -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(helvetica());
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Rotate" => rotate,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    (doc, page_id)
}

pub(crate) fn set_page_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) {
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    doc.get_dictionary_mut(page_id)
        .expect("page")
        .set("Contents", content_id);
}

fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    }
}
