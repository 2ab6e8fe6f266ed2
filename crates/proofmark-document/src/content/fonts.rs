// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Just enough font metrics to size text runs: glyph advances plus the
// ascent and descent from the font descriptor.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::geometry::matrix::number;
use crate::pdf::objects::{entry, entry_dict, entry_number, name, resolve, resolve_dict};

/// Helvetica's AFM values, used when a font carries no descriptor.
const DEFAULT_ASCENT: f32 = 718.0;
const DEFAULT_DESCENT: f32 = -207.0;

const DEFAULT_SIMPLE_WIDTH: f32 = 500.0;
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Two-byte codes never exceed this.
const MAX_CID: u32 = 0xFFFF;

/// Metrics in glyph space (thousandths of the font size).
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    widths: HashMap<u32, f32>,
    default_width: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Type0 fonts use two-byte character codes.
    two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            widths: HashMap::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            two_byte: false,
        }
    }
}

impl FontMetrics {
    /// Read metrics from a font dictionary. Missing pieces fall back to
    /// defaults rather than failing.
    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let is_type0 = entry(doc, font, b"Subtype").and_then(name) == Some(b"Type0".as_slice());
        if is_type0 {
            Self::from_type0(doc, font)
        } else {
            Self::from_simple(doc, font)
        }
    }

    fn from_simple(doc: &Document, font: &Dictionary) -> Self {
        let mut metrics = Self::default();
        let descriptor = entry_dict(doc, font, b"FontDescriptor");

        if let Some(width) = descriptor.and_then(|d| entry_number(doc, d, b"MissingWidth")) {
            metrics.default_width = width;
        }
        let first_char = entry_number(doc, font, b"FirstChar").unwrap_or(0.0) as u32;
        if let Some(Object::Array(widths)) = entry(doc, font, b"Widths") {
            for (offset, width) in widths.iter().enumerate() {
                let Some(code) = u32::try_from(offset)
                    .ok()
                    .and_then(|offset| first_char.checked_add(offset))
                else {
                    break;
                };
                if let Some(w) = number(resolve(doc, width)) {
                    metrics.widths.insert(code, w);
                }
            }
        }
        metrics.apply_descriptor(doc, descriptor);
        metrics
    }

    fn from_type0(doc: &Document, font: &Dictionary) -> Self {
        let mut metrics = Self {
            default_width: DEFAULT_CID_WIDTH,
            two_byte: true,
            ..Self::default()
        };
        let descendant = match entry(doc, font, b"DescendantFonts") {
            Some(Object::Array(fonts)) => fonts.first().and_then(|f| resolve_dict(doc, f)),
            _ => None,
        };
        let Some(descendant) = descendant else {
            return metrics;
        };

        if let Some(width) = entry_number(doc, descendant, b"DW") {
            metrics.default_width = width;
        }
        if let Some(Object::Array(w)) = entry(doc, descendant, b"W") {
            metrics.widths = parse_cid_widths(doc, w);
        }
        metrics.apply_descriptor(doc, entry_dict(doc, descendant, b"FontDescriptor"));
        metrics
    }

    fn apply_descriptor(&mut self, doc: &Document, descriptor: Option<&Dictionary>) {
        let Some(descriptor) = descriptor else {
            return;
        };
        let ascent = entry_number(doc, descriptor, b"Ascent").unwrap_or(0.0);
        let descent = entry_number(doc, descriptor, b"Descent").unwrap_or(0.0);
        // Some producers write zeros; keep the defaults then.
        if ascent != 0.0 || descent != 0.0 {
            self.ascent = ascent;
            self.descent = descent;
        }
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Advance of `code` in thousandths of the font size.
    pub fn width(&self, code: u32) -> f32 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    /// Word spacing applies to the single-byte code 32 only.
    pub fn is_word_space(&self, code: u32) -> bool {
        !self.two_byte && code == 32
    }
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_cid_widths(doc: &Document, array: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < array.len() {
        let Some(first) = number(resolve(doc, &array[i])) else {
            break;
        };
        let first = first as u32;
        match array.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    let cid = first.saturating_add(offset.try_into().unwrap_or(u32::MAX));
                    if cid > MAX_CID {
                        break;
                    }
                    if let Some(w) = number(resolve(doc, w)) {
                        widths.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    array.get(i + 2).and_then(|o| number(resolve(doc, o))),
                ) else {
                    break;
                };
                for cid in first..=(last as u32).min(MAX_CID) {
                    widths.insert(cid, w);
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_font_widths_start_at_first_char() {
        let doc = Document::with_version("1.5");
        let font = Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"TrueType".to_vec())),
            ("FirstChar", Object::Integer(65)),
            (
                "Widths",
                Object::Array(vec![Object::Integer(600), Object::Integer(700)]),
            ),
        ]);
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.width(65), 600.0);
        assert_eq!(metrics.width(66), 700.0);
        assert_eq!(metrics.width(67), DEFAULT_SIMPLE_WIDTH);
        assert_eq!(metrics.ascent, DEFAULT_ASCENT);
        assert_eq!(metrics.codes(b"AB"), vec![65, 66]);
    }

    #[test]
    fn descriptor_overrides_ascent_and_descent() {
        let mut doc = Document::with_version("1.5");
        let descriptor = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("Ascent", Object::Integer(900)),
            ("Descent", Object::Integer(-250)),
            ("MissingWidth", Object::Integer(300)),
        ]));
        let font = Dictionary::from_iter([
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("FontDescriptor", Object::Reference(descriptor)),
        ]);
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.ascent, 900.0);
        assert_eq!(metrics.descent, -250.0);
        assert_eq!(metrics.width(10), 300.0);
    }

    #[test]
    fn type0_uses_two_byte_codes_and_w_array() {
        let mut doc = Document::with_version("1.5");
        let descendant = doc.add_object(Dictionary::from_iter([
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("DW", Object::Integer(1000)),
            (
                "W",
                Object::Array(vec![
                    Object::Integer(3),
                    Object::Array(vec![Object::Integer(250), Object::Integer(260)]),
                    Object::Integer(10),
                    Object::Integer(12),
                    Object::Integer(555),
                ]),
            ),
        ]));
        let font = Dictionary::from_iter([
            ("Subtype", Object::Name(b"Type0".to_vec())),
            (
                "DescendantFonts",
                Object::Array(vec![Object::Reference(descendant)]),
            ),
        ]);
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.codes(&[0x00, 0x03, 0x00, 0x0B]), vec![3, 11]);
        assert_eq!(metrics.width(3), 250.0);
        assert_eq!(metrics.width(4), 260.0);
        assert_eq!(metrics.width(11), 555.0);
        assert_eq!(metrics.width(13), 1000.0);
        assert!(!metrics.is_word_space(32));
    }

    #[test]
    fn first_char_at_the_top_of_the_code_space_does_not_overflow() {
        let doc = Document::with_version("1.5");
        let font = Dictionary::from_iter([
            ("Subtype", Object::Name(b"TrueType".to_vec())),
            ("FirstChar", Object::Integer(i64::from(u32::MAX))),
            (
                "Widths",
                Object::Array(vec![Object::Integer(600), Object::Integer(700)]),
            ),
        ]);
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.width(u32::MAX), 600.0);
        assert_eq!(metrics.width(0), DEFAULT_SIMPLE_WIDTH);
    }

    #[test]
    fn cid_ranges_stop_at_the_two_byte_limit() {
        let widths = parse_cid_widths(
            &Document::with_version("1.5"),
            &[
                Object::Integer(0xFFF0),
                Object::Integer(i64::from(u32::MAX)),
                Object::Integer(500),
                Object::Integer(0xFFFE),
                Object::Array(vec![
                    Object::Integer(1),
                    Object::Integer(2),
                    Object::Integer(3),
                ]),
            ],
        );
        assert_eq!(widths.len(), 16);
        assert_eq!(widths[&0xFFFE], 1.0);
        assert_eq!(widths[&0xFFFF], 2.0);
        assert!(!widths.contains_key(&0x1_0000));
    }
}
