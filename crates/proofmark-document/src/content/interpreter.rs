// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-stream interpreter. Tracks the graphics state (CTM, stroke colour,
// text state) and reports images, shown strings and stroked paths to a
// `RenderListener`. Fill-only paths, shading and clipping are ignored: the
// preflight checks only care about what ink lands where.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use proofmark_core::error::{ProofmarkError, Result};
use tracing::{debug, instrument, warn};

use super::events::{
    ImagePlacement, LineSegment, PathStroke, RenderEvent, RenderListener, Segment, StrokeColor,
    Subpath, TextRun,
};
use super::fonts::FontMetrics;
use crate::geometry::matrix::number;
use crate::geometry::{Matrix, Point};
use crate::pdf::objects::{entry, entry_dict, inherited, name, resolve, resolve_dict};

/// Nested form XObjects deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 8;

/// Interpret one page's content and feed every render event to `listener`.
#[instrument(skip(doc, listener), fields(page = ?page_id))]
pub fn interpret_page(
    doc: &Document,
    page_id: ObjectId,
    listener: &mut dyn RenderListener,
) -> Result<()> {
    let bytes = page_content_bytes(doc, page_id)?;
    let content = Content::decode(&bytes).map_err(|err| {
        ProofmarkError::PdfError(format!("cannot decode content of page {:?}: {}", page_id, err))
    })?;
    let resources = inherited(doc, page_id, b"Resources").and_then(|r| resolve_dict(doc, r));

    let mut interpreter = ContentInterpreter::new(doc);
    interpreter.run(
        &content.operations,
        resources,
        GraphicsState::default(),
        listener,
        0,
    )
}

/// Concatenated, decompressed bytes of every stream in the page's /Contents.
pub fn page_content_bytes(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc.get_dictionary(page_id).map_err(|err| {
        ProofmarkError::PdfError(format!("cannot read page {:?}: {}", page_id, err))
    })?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let streams: Vec<&Stream> = match resolve(doc, contents) {
        Object::Stream(stream) => vec![stream],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| match resolve(doc, item) {
                Object::Stream(stream) => Some(stream),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut out = Vec::new();
    for stream in streams {
        let bytes = stream_bytes(stream)?;
        if !out.is_empty() {
            out.push(b'\n');
        }
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

/// Stream payload, decompressed when a /Filter is present.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|err| ProofmarkError::PdfError(format!("cannot decompress stream: {}", err)))
    } else {
        Ok(stream.content.clone())
    }
}

// -- State --------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TextState {
    font: Rc<FontMetrics>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Rc::new(FontMetrics::default()),
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    stroke_color: StrokeColor,
    text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            stroke_color: StrokeColor::black(),
            text: TextState::default(),
        }
    }
}

/// Path under construction, already in page space.
#[derive(Debug, Default)]
struct PathBuilder {
    subpaths: Vec<Subpath>,
    current: Option<Subpath>,
    start: Point,
    point: Point,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.flush();
        self.current = Some(Subpath::default());
        self.start = p;
        self.point = p;
    }

    fn line_to(&mut self, p: Point) {
        let start = self.point;
        self.push(Segment::Line(LineSegment { start, end: p }), p);
    }

    fn curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        let start = self.point;
        self.push(
            Segment::Curve {
                start,
                control1,
                control2,
                end,
            },
            end,
        );
    }

    /// Drawing after a close starts a fresh subpath at the closed one's start.
    fn push(&mut self, segment: Segment, end: Point) {
        if self.current.as_ref().is_none_or(|sub| sub.closed) {
            self.flush();
            self.current = Some(Subpath::default());
        }
        if let Some(sub) = self.current.as_mut() {
            sub.segments.push(segment);
        }
        self.point = end;
    }

    fn close(&mut self) {
        if let Some(sub) = self.current.as_mut() {
            sub.closed = true;
        }
        self.point = self.start;
    }

    /// `re`: three explicit edges, the fourth implied by the close.
    fn rectangle(&mut self, corners: [Point; 4]) {
        self.move_to(corners[0]);
        for corner in &corners[1..] {
            self.line_to(*corner);
        }
        self.close();
    }

    fn flush(&mut self) {
        if let Some(sub) = self.current.take() {
            if !sub.segments.is_empty() {
                self.subpaths.push(sub);
            }
        }
    }

    fn take(&mut self) -> Vec<Subpath> {
        self.flush();
        std::mem::take(&mut self.subpaths)
    }

    fn clear(&mut self) {
        self.current = None;
        self.subpaths.clear();
    }
}

// -- Interpreter --------------------------------------------------------------

struct ContentInterpreter<'a> {
    doc: &'a Document,
    /// Parsed font metrics by font object id.
    fonts: HashMap<ObjectId, Rc<FontMetrics>>,
}

impl<'a> ContentInterpreter<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fonts: HashMap::new(),
        }
    }

    fn run(
        &mut self,
        operations: &[Operation],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState,
        listener: &mut dyn RenderListener,
        depth: usize,
    ) -> Result<()> {
        let mut gs = initial;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                // Graphics state
                "q" => stack.push(gs.clone()),
                "Q" => match stack.pop() {
                    Some(saved) => gs = saved,
                    None => debug!("unbalanced Q ignored"),
                },
                "cm" => match Matrix::from_operands(operands) {
                    Some(m) => gs.ctm = m.then(&gs.ctm),
                    None => debug!(?operands, "malformed cm operands"),
                },

                // Stroke colour
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    gs.stroke_color = StrokeColor(operands.iter().filter_map(number).collect());
                }
                "CS" => gs.stroke_color = initial_color(operands.first().and_then(name)),

                // Path construction
                "m" => {
                    if let Some(p) = point_at(operands, 0) {
                        path.move_to(gs.ctm.transform(p));
                    }
                }
                "l" => {
                    if let Some(p) = point_at(operands, 0) {
                        path.line_to(gs.ctm.transform(p));
                    }
                }
                "c" => {
                    if let (Some(c1), Some(c2), Some(end)) = (
                        point_at(operands, 0),
                        point_at(operands, 2),
                        point_at(operands, 4),
                    ) {
                        let ctm = gs.ctm;
                        path.curve_to(ctm.transform(c1), ctm.transform(c2), ctm.transform(end));
                    }
                }
                "v" => {
                    if let (Some(c2), Some(end)) = (point_at(operands, 0), point_at(operands, 2)) {
                        let c1 = path.point;
                        path.curve_to(c1, gs.ctm.transform(c2), gs.ctm.transform(end));
                    }
                }
                "y" => {
                    if let (Some(c1), Some(end)) = (point_at(operands, 0), point_at(operands, 2)) {
                        let end = gs.ctm.transform(end);
                        path.curve_to(gs.ctm.transform(c1), end, end);
                    }
                }
                "h" => path.close(),
                "re" => {
                    if let (Some(origin), Some(size)) = (point_at(operands, 0), point_at(operands, 2)) {
                        let corners = [
                            origin,
                            Point::new(origin.x + size.x, origin.y),
                            Point::new(origin.x + size.x, origin.y + size.y),
                            Point::new(origin.x, origin.y + size.y),
                        ]
                        .map(|corner| gs.ctm.transform(corner));
                        path.rectangle(corners);
                    }
                }

                // Path painting
                "S" | "B" | "B*" => emit_stroke(&mut path, &gs, listener),
                "s" | "b" | "b*" => {
                    path.close();
                    emit_stroke(&mut path, &gs, listener);
                }
                "f" | "F" | "f*" | "n" => path.clear(),

                // Text objects and state
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(font_name) = operands.first().and_then(name) {
                        gs.text.font = self.load_font(resources, font_name);
                    }
                    if let Some(size) = operands.get(1).and_then(number) {
                        gs.text.font_size = size;
                    }
                }
                "Tc" => set_number(operands, &mut gs.text.char_spacing),
                "Tw" => set_number(operands, &mut gs.text.word_spacing),
                "TL" => set_number(operands, &mut gs.text.leading),
                "Ts" => set_number(operands, &mut gs.text.rise),
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(number) {
                        gs.text.horizontal_scaling = scale / 100.0;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "Td" | "TD" => {
                    if let Some(offset) = point_at(operands, 0) {
                        if op.operator == "TD" {
                            gs.text.leading = -offset.y;
                        }
                        tlm = Matrix::translation(offset.x, offset.y).then(&tlm);
                        tm = tlm;
                    }
                }
                "T*" => next_line(&mut tm, &mut tlm, gs.text.leading),

                // Text showing
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        show_text(bytes, &mut tm, &gs, listener);
                    }
                }
                "'" => {
                    next_line(&mut tm, &mut tlm, gs.text.leading);
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        show_text(bytes, &mut tm, &gs, listener);
                    }
                }
                "\"" => {
                    set_number(operands, &mut gs.text.word_spacing);
                    if let Some(spacing) = operands.get(1).and_then(number) {
                        gs.text.char_spacing = spacing;
                    }
                    next_line(&mut tm, &mut tlm, gs.text.leading);
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        show_text(bytes, &mut tm, &gs, listener);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    show_text(bytes, &mut tm, &gs, listener)
                                }
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * gs.text.font_size
                                            * gs.text.horizontal_scaling;
                                        tm = Matrix::translation(tx, 0.0).then(&tm);
                                    }
                                }
                            }
                        }
                    }
                }

                // External and inline objects
                "Do" => {
                    if let Some(xobject_name) = operands.first().and_then(name) {
                        self.paint_xobject(xobject_name, resources, &gs, listener, depth)?;
                    }
                }
                "BI" => listener.on_event(RenderEvent::Image(ImagePlacement { ctm: gs.ctm })),

                _ => {}
            }
        }
        Ok(())
    }

    fn load_font(&mut self, resources: Option<&'a Dictionary>, font_name: &[u8]) -> Rc<FontMetrics> {
        let doc = self.doc;
        let raw = resources
            .and_then(|r| entry_dict(doc, r, b"Font"))
            .and_then(|fonts| fonts.get(font_name).ok());
        let Some(raw) = raw else {
            debug!(font = %String::from_utf8_lossy(font_name), "font not in resources, using defaults");
            return Rc::new(FontMetrics::default());
        };

        if let Object::Reference(id) = raw {
            if let Some(cached) = self.fonts.get(id) {
                return Rc::clone(cached);
            }
        }
        let metrics = Rc::new(
            resolve_dict(doc, raw)
                .map(|dict| FontMetrics::from_dict(doc, dict))
                .unwrap_or_default(),
        );
        if let Object::Reference(id) = raw {
            self.fonts.insert(*id, Rc::clone(&metrics));
        }
        metrics
    }

    fn paint_xobject(
        &mut self,
        xobject_name: &[u8],
        resources: Option<&'a Dictionary>,
        gs: &GraphicsState,
        listener: &mut dyn RenderListener,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        let stream = match resources
            .and_then(|r| entry_dict(doc, r, b"XObject"))
            .and_then(|xobjects| entry(doc, xobjects, xobject_name))
        {
            Some(Object::Stream(stream)) => stream,
            _ => {
                debug!(xobject = %String::from_utf8_lossy(xobject_name), "XObject not found");
                return Ok(());
            }
        };

        match entry(doc, &stream.dict, b"Subtype").and_then(name) {
            Some(b"Image") => {
                listener.on_event(RenderEvent::Image(ImagePlacement { ctm: gs.ctm }));
            }
            Some(b"Form") => {
                if depth >= MAX_FORM_DEPTH {
                    warn!(depth, "form XObject nesting too deep, skipping");
                    return Ok(());
                }
                let matrix = match entry(doc, &stream.dict, b"Matrix") {
                    Some(Object::Array(values)) => {
                        Matrix::from_operands(values).unwrap_or(Matrix::IDENTITY)
                    }
                    _ => Matrix::IDENTITY,
                };
                let form_resources = entry_dict(doc, &stream.dict, b"Resources").or(resources);
                let content = Content::decode(&stream_bytes(stream)?).map_err(|err| {
                    ProofmarkError::PdfError(format!("cannot decode form XObject: {}", err))
                })?;

                let mut inner = gs.clone();
                inner.ctm = matrix.then(&gs.ctm);
                self.run(&content.operations, form_resources, inner, listener, depth + 1)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn emit_stroke(path: &mut PathBuilder, gs: &GraphicsState, listener: &mut dyn RenderListener) {
    let subpaths = path.take();
    if subpaths.is_empty() {
        return;
    }
    listener.on_event(RenderEvent::Path(PathStroke {
        subpaths,
        stroke_color: gs.stroke_color.clone(),
    }));
}

/// Emit one text run for `bytes` and advance the text matrix past it.
fn show_text(bytes: &[u8], tm: &mut Matrix, gs: &GraphicsState, listener: &mut dyn RenderListener) {
    let ts = &gs.text;
    let mut advance = 0.0;
    for code in ts.font.codes(bytes) {
        let mut spacing = ts.char_spacing;
        if ts.font.is_word_space(code) {
            spacing += ts.word_spacing;
        }
        advance += (ts.font.width(code) / 1000.0 * ts.font_size + spacing) * ts.horizontal_scaling;
    }

    let to_page = tm.then(&gs.ctm);
    let line_at = |y: f32| LineSegment {
        start: to_page.transform(Point::new(0.0, y)),
        end: to_page.transform(Point::new(advance, y)),
    };
    let ascent = ts.rise + ts.font.ascent / 1000.0 * ts.font_size;
    let descent = ts.rise + ts.font.descent / 1000.0 * ts.font_size;
    listener.on_event(RenderEvent::Text(TextRun {
        ascent: line_at(ascent),
        descent: line_at(descent),
    }));

    *tm = Matrix::translation(advance, 0.0).then(tm);
}

fn next_line(tm: &mut Matrix, tlm: &mut Matrix, leading: f32) {
    *tlm = Matrix::translation(0.0, -leading).then(tlm);
    *tm = *tlm;
}

fn point_at(operands: &[Object], index: usize) -> Option<Point> {
    let x = operands.get(index).and_then(number)?;
    let y = operands.get(index + 1).and_then(number)?;
    Some(Point::new(x, y))
}

fn set_number(operands: &[Object], slot: &mut f32) {
    if let Some(value) = operands.first().and_then(number) {
        *slot = value;
    }
}

/// Initial colour after `CS` selects a colour space.
fn initial_color(space: Option<&[u8]>) -> StrokeColor {
    match space {
        Some(b"DeviceRGB" | b"CalRGB" | b"RGB") => StrokeColor(vec![0.0, 0.0, 0.0]),
        Some(b"DeviceCMYK" | b"CMYK") => StrokeColor(vec![0.0, 0.0, 0.0, 1.0]),
        _ => StrokeColor::black(),
    }
}
