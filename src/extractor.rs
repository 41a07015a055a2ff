//! Positioned text extraction from PDF using lopdf
//!
//! Walks each page's content stream and turns every text-showing operator
//! into a [`Fragment`] carrying its font, size and origin. Pages are visited
//! in page order and fragments keep content-stream order within a page.

use crate::PdfError;
use log::{debug, warn};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A quantity rounded to one decimal place, stored as integer tenths.
///
/// Font sizes and coordinates are compared for exact equality after
/// rounding, so they are kept as integers to get `Eq` and `Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tenths(pub i32);

impl Tenths {
    /// Round a value to the nearest tenth (half away from zero)
    pub fn round(value: f32) -> Self {
        Tenths((value * 10.0).round() as i32)
    }

    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:.1}", self.as_f32()))
    }
}

/// A single run of text as laid out on a page
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Trimmed, non-empty text
    pub text: String,
    /// Rendered font size
    pub size: Tenths,
    /// Font name (subset tag removed)
    pub font: String,
    /// X of the text origin. Consecutive show operators advance x by an
    /// estimated width, since glyph widths are not read
    pub x: Tenths,
    /// Y of the text origin (PDF user space, origin at bottom-left)
    pub y: Tenths,
    /// Page index (0-indexed)
    pub page: u32,
}

impl Fragment {
    /// Build a fragment, rounding size and position.
    ///
    /// Returns `None` when the text is empty after trimming.
    pub fn new(text: &str, size: f32, font: &str, x: f32, y: f32, page: u32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Fragment {
            text: text.to_string(),
            size: Tenths::round(size),
            font: font.to_string(),
            x: Tenths::round(x),
            y: Tenths::round(y),
            page,
        })
    }
}

/// Load a PDF file and collect its fragments
pub fn extract_fragments<P: AsRef<Path>>(path: P) -> Result<Vec<Fragment>, PdfError> {
    let doc = Document::load(path)?;
    Ok(collect_fragments(&doc))
}

/// Load a PDF from memory and collect its fragments
pub fn extract_fragments_mem(buffer: &[u8]) -> Result<Vec<Fragment>, PdfError> {
    let doc = Document::load_mem(buffer)?;
    Ok(collect_fragments(&doc))
}

/// Collect the fragments of every page of a loaded document.
///
/// A page whose content cannot be read contributes nothing.
pub fn collect_fragments(doc: &Document) -> Vec<Fragment> {
    let pages = doc.get_pages();
    let mut all_fragments = Vec::new();

    for (index, &page_id) in pages.values().enumerate() {
        let page = index as u32;
        match collect_page_fragments(doc, page_id, page) {
            Ok(fragments) => {
                debug!("page {}: {} fragments", page, fragments.len());
                all_fragments.extend(fragments);
            }
            Err(e) => warn!("page {}: skipping unreadable content: {}", page, e),
        }
    }

    all_fragments
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// TJ adjustments (thousandths of an em) more negative than this become a space
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Estimated glyph advance in ems
const ESTIMATED_GLYPH_WIDTH: f32 = 0.5;

/// Graphics and text state needed to place text
#[derive(Debug, Clone)]
struct TextState {
    ctm: [f32; 6],
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    font_resource: Vec<u8>,
    font_size: f32,
    /// Explicit leading from TL/TD; None falls back to 1.2 x font size
    leading: Option<f32>,
    in_text_object: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_resource: Vec::new(),
            font_size: 12.0,
            leading: None,
            in_text_object: false,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.in_text_object = true;
        self.text_matrix = IDENTITY;
        self.line_matrix = IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading.unwrap_or(self.font_size * 1.2);
        self.move_line(0.0, -leading);
    }

    /// Move the text matrix past shown text of `width_em` ems
    fn advance(&mut self, width_em: f32) {
        let tx = width_em * self.font_size;
        self.text_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.text_matrix);
    }

    /// Text space to device space
    fn rendering_matrix(&self) -> [f32; 6] {
        multiply_matrices(&self.text_matrix, &self.ctm)
    }

    /// Font size scaled by the vertical scale of the text matrix and CTM.
    /// Horizontal stretching does not change the size.
    fn effective_font_size(&self) -> f32 {
        let m = self.rendering_matrix();
        let scale_y = (m[2].powi(2) + m[3].powi(2)).sqrt();
        self.font_size * scale_y
    }
}

/// Collect fragments from a single page
fn collect_page_fragments(
    doc: &Document,
    page_id: ObjectId,
    page: u32,
) -> Result<Vec<Fragment>, PdfError> {
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let content_data = doc.get_page_content(page_id)?;
    let content = Content::decode(&content_data)?;

    let mut state = TextState::default();
    let mut saved_states: Vec<TextState> = Vec::new();
    let mut fragments = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        let shown: Option<(String, f32)> = match op.operator.as_str() {
            "q" => {
                saved_states.push(state.clone());
                None
            }
            "Q" => {
                if let Some(saved) = saved_states.pop() {
                    // Text object boundaries are not part of the graphics state
                    let in_text_object = state.in_text_object;
                    let (text_matrix, line_matrix) = (state.text_matrix, state.line_matrix);
                    state = saved;
                    state.in_text_object = in_text_object;
                    state.text_matrix = text_matrix;
                    state.line_matrix = line_matrix;
                }
                None
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.ctm = multiply_matrices(&m, &state.ctm);
                }
                None
            }
            "BT" => {
                state.begin_text();
                None
            }
            "ET" => {
                state.in_text_object = false;
                None
            }
            "Tf" => {
                if operands.len() >= 2 {
                    if let Ok(name) = operands[0].as_name() {
                        state.font_resource = name.to_vec();
                    }
                    if let Some(size) = get_number(&operands[1]) {
                        state.font_size = size;
                    }
                }
                None
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    state.leading = Some(leading);
                }
                None
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = Some(-ty);
                    }
                    state.move_line(tx, ty);
                }
                None
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
                None
            }
            "T*" => {
                state.next_line();
                None
            }
            "Tj" => operands
                .first()
                .and_then(|o| decode_operand(o, doc, &fonts, &state.font_resource))
                .map(with_width),
            "TJ" => operands
                .first()
                .and_then(|o| o.as_array().ok())
                .map(|array| decode_array(array, doc, &fonts, &state.font_resource)),
            "'" => {
                state.next_line();
                operands
                    .first()
                    .and_then(|o| decode_operand(o, doc, &fonts, &state.font_resource))
                    .map(with_width)
            }
            "\"" => {
                state.next_line();
                operands
                    .get(2)
                    .and_then(|o| decode_operand(o, doc, &fonts, &state.font_resource))
                    .map(with_width)
            }
            _ => None,
        };

        if let Some((text, width_em)) = shown {
            if !state.in_text_object {
                continue;
            }
            let origin = state.rendering_matrix();
            let font = font_name(&fonts, &state.font_resource);
            if let Some(fragment) = Fragment::new(
                &text,
                state.effective_font_size(),
                &font,
                origin[4],
                origin[5],
                page,
            ) {
                fragments.push(fragment);
            }
            state.advance(width_em);
        }
    }

    Ok(fragments)
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Six numeric operands as a matrix (cm, Tm)
fn matrix_operand(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0f32; 6];
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = get_number(operand)?;
    }
    Some(m)
}

static SUBSET_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{6}\+").unwrap());

/// Resolve a font resource to its BaseFont name, without a subset tag
fn font_name(fonts: &BTreeMap<Vec<u8>, &Dictionary>, resource: &[u8]) -> String {
    fonts
        .get(resource)
        .and_then(|dict| dict.get(b"BaseFont").ok())
        .and_then(|obj| obj.as_name().ok())
        .map(|name| {
            let name = String::from_utf8_lossy(name);
            SUBSET_TAG.replace(&name, "").into_owned()
        })
        .unwrap_or_else(|| String::from_utf8_lossy(resource).into_owned())
}

/// Shown text paired with its estimated width in ems
fn with_width(text: String) -> (String, f32) {
    let width_em = text.chars().count() as f32 * ESTIMATED_GLYPH_WIDTH;
    (text, width_em)
}

/// Decode a TJ array, turning wide negative adjustments into spaces.
///
/// Also returns the estimated width in ems, adjustments included.
fn decode_array(
    array: &[Object],
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    resource: &[u8],
) -> (String, f32) {
    let mut combined_text = String::new();
    let mut width_em = 0.0;
    for item in array {
        if let Some(text) = decode_operand(item, doc, fonts, resource) {
            width_em += text.chars().count() as f32 * ESTIMATED_GLYPH_WIDTH;
            combined_text.push_str(&text);
        } else if let Some(adjustment) = get_number(item) {
            width_em -= adjustment / 1000.0;
            if adjustment < TJ_SPACE_THRESHOLD && !combined_text.ends_with(' ') {
                combined_text.push(' ');
            }
        }
    }
    (combined_text, width_em)
}

/// Decode a string operand using the current font's encoding
fn decode_operand(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    resource: &[u8],
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(resource) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    // Fallback: try UTF-16BE then Latin-1
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}
