// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Effective page box and rotation, following page-tree inheritance.

use lopdf::{Document, Object, ObjectId};
use tracing::warn;

use super::objects::{inherited, resolve};
use crate::geometry::matrix::number;
use crate::geometry::{Matrix, Point, Rect};

/// Used when a page carries no usable /MediaBox (A4).
const FALLBACK_MEDIA_BOX: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 595.0,
    height: 842.0,
};

/// A page's media box and its /Rotate normalised to 0, 90, 180 or 270.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub media_box: Rect,
    pub rotation: u16,
}

impl PageBox {
    /// Read the effective box of `page_id`.
    pub fn of(doc: &Document, page_id: ObjectId) -> Self {
        let media_box = match inherited(doc, page_id, b"MediaBox") {
            Some(Object::Array(values)) => rect_from_array(doc, values),
            _ => None,
        }
        .unwrap_or_else(|| {
            warn!(page = ?page_id, "page has no usable MediaBox, assuming A4");
            FALLBACK_MEDIA_BOX
        });

        let rotation = inherited(doc, page_id, b"Rotate")
            .and_then(|value| value.as_i64().ok())
            .map(normalise_rotation)
            .unwrap_or(0);

        Self {
            media_box,
            rotation,
        }
    }

    /// (width, height) as displayed, i.e. swapped for quarter turns.
    pub fn rotated_size(&self) -> (f32, f32) {
        let (w, h) = (self.media_box.width, self.media_box.height);
        if self.rotation % 180 == 90 { (h, w) } else { (w, h) }
    }

    /// Matrix that lets content drawn in the displayed orientation land
    /// upright on the rotated page.
    pub fn logical_orientation(&self) -> Matrix {
        let right = self.media_box.right();
        let top = self.media_box.top();
        match self.rotation {
            90 => Matrix::new(0.0, 1.0, -1.0, 0.0, right, 0.0),
            180 => Matrix::new(-1.0, 0.0, 0.0, -1.0, right, top),
            270 => Matrix::new(0.0, -1.0, 1.0, 0.0, 0.0, top),
            _ => Matrix::IDENTITY,
        }
    }
}

fn normalise_rotation(degrees: i64) -> u16 {
    let snapped = degrees.rem_euclid(360) / 90 * 90;
    snapped as u16
}

fn rect_from_array(doc: &Document, values: &[Object]) -> Option<Rect> {
    let coords: Vec<f32> = values
        .iter()
        .filter_map(|value| number(resolve(doc, value)))
        .collect();
    match coords.as_slice() {
        [x1, y1, x2, y2] => Some(Rect::from_corners(Point::new(*x1, *y1), Point::new(*x2, *y2))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn quarter_turns_swap_the_displayed_size() {
        let page = PageBox {
            media_box: Rect::new(0.0, 0.0, 842.0, 595.0),
            rotation: 90,
        };
        assert_eq!(page.rotated_size(), (595.0, 842.0));
        let upside_down = PageBox { rotation: 180, ..page };
        assert_eq!(upside_down.rotated_size(), (842.0, 595.0));
    }

    #[test]
    fn rotation_is_normalised() {
        assert_eq!(normalise_rotation(-90), 270);
        assert_eq!(normalise_rotation(450), 90);
        assert_eq!(normalise_rotation(0), 0);
    }

    #[test]
    fn media_box_and_rotate_are_inherited_from_the_page_tree() {
        let (doc, page_id) = fixtures::inherited_box_doc(842.0, 595.0, 270);
        let page = PageBox::of(&doc, page_id);
        assert_eq!(page.media_box, Rect::new(0.0, 0.0, 842.0, 595.0));
        assert_eq!(page.rotation, 270);
        assert_eq!(page.rotated_size(), (595.0, 842.0));
    }

    #[test]
    fn logical_orientation_maps_displayed_origin_to_the_page_corner() {
        let page = PageBox {
            media_box: Rect::new(0.0, 0.0, 842.0, 595.0),
            rotation: 90,
        };
        // Displayed bottom-left sits at the media box's bottom-right for /Rotate 90.
        let origin = page.logical_orientation().transform(Point::new(0.0, 0.0));
        assert_eq!(origin, Point::new(842.0, 0.0));
        let unrotated = PageBox { rotation: 0, ..page };
        assert_eq!(unrotated.logical_orientation(), Matrix::IDENTITY);
    }
}
