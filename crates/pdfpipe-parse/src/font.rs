//! Fonts built from `/Font` resource dictionaries.
//!
//! Simple fonts map single bytes through an encoding (or a ToUnicode CMap)
//! and look widths up in `/Widths` or the built-in metrics. Composite
//! (Type0) fonts map CIDs through their ToUnicode CMap and read widths from
//! the descendant font's `/W` array.

use std::collections::HashMap;
use std::sync::Arc;

use pdfpipe_core::{Font, FontKind};

use crate::cmap::ToUnicodeCMap;
use crate::encoding::{BaseEncoding, DifferencesItem, Encoding, parse_differences};
use crate::error::InterpretError;
use crate::metrics::{self, BuiltinMetrics};
use crate::object::{Dictionary, Object};

const DEFAULT_ASCENT: f64 = 750.0;
const DEFAULT_DESCENT: f64 = -250.0;
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// A font with one-byte character codes.
#[derive(Debug, Clone)]
pub struct SimpleFont {
    name: String,
    encoding: Encoding,
    to_unicode: Option<ToUnicodeCMap>,
    first_char: u32,
    widths: Vec<f64>,
    builtin: Option<&'static BuiltinMetrics>,
    missing_width: f64,
    ascent: f64,
    descent: f64,
}

impl SimpleFont {
    /// Font using built-in metrics and a base encoding only.
    pub fn builtin(metrics: &'static BuiltinMetrics, base: BaseEncoding) -> Self {
        Self {
            name: metrics.name.to_string(),
            encoding: Encoding::from_base(base),
            to_unicode: None,
            first_char: 0,
            widths: Vec::new(),
            builtin: Some(metrics),
            missing_width: 0.0,
            ascent: metrics.ascent,
            descent: metrics.descent,
        }
    }
}

impl Font for SimpleFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FontKind {
        FontKind::Simple
    }

    fn character_for_code(&self, code: u32) -> Option<char> {
        if let Some(ch) = self.to_unicode.as_ref().and_then(|cmap| cmap.char_for(code)) {
            return Some(ch);
        }
        u8::try_from(code).ok().and_then(|b| self.encoding.decode(b))
    }

    fn advance_width(&self, code: u32) -> f64 {
        let explicit = code
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize));
        if let Some(&w) = explicit {
            return w;
        }
        match (self.builtin, u8::try_from(code)) {
            (Some(m), Ok(b)) if self.widths.is_empty() => m.width(b),
            _ => self.missing_width,
        }
    }

    fn ascent(&self) -> f64 {
        self.ascent
    }

    fn descent(&self) -> f64 {
        self.descent
    }

    fn average_width(&self) -> f64 {
        let nonzero: Vec<f64> = self.widths.iter().copied().filter(|w| *w > 0.0).collect();
        if !nonzero.is_empty() {
            return nonzero.iter().sum::<f64>() / nonzero.len() as f64;
        }
        self.builtin.map_or(500.0, BuiltinMetrics::average_width)
    }
}

/// A Type0 font with two-byte CIDs.
#[derive(Debug, Clone)]
pub struct CompositeFont {
    name: String,
    to_unicode: Option<ToUnicodeCMap>,
    widths: HashMap<u32, f64>,
    default_width: f64,
    ascent: f64,
    descent: f64,
}

impl Font for CompositeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FontKind {
        FontKind::Composite
    }

    fn character_for_code(&self, code: u32) -> Option<char> {
        self.to_unicode.as_ref().and_then(|cmap| cmap.char_for(code))
    }

    fn character_for_byte(&self, byte: u8) -> Option<char> {
        self.character_for_code(byte as u32)
            .or_else(|| BaseEncoding::WinAnsi.decode(byte))
    }

    fn advance_width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    fn ascent(&self) -> f64 {
        self.ascent
    }

    fn descent(&self) -> f64 {
        self.descent
    }

    fn average_width(&self) -> f64 {
        if self.widths.is_empty() {
            return self.default_width;
        }
        self.widths.values().sum::<f64>() / self.widths.len() as f64
    }
}

/// The font used when `Tf` names a missing font or text is shown before any
/// `Tf`: Helvetica metrics with WinAnsiEncoding.
pub fn default_font() -> Arc<dyn Font> {
    Arc::new(SimpleFont::builtin(&metrics::HELVETICA, BaseEncoding::WinAnsi))
}

/// Build a font from a `/Font` resource dictionary whose references have
/// been resolved.
///
/// # Errors
///
/// Returns [`InterpretError::Font`] when a required entry is malformed.
pub fn font_from_dict(dict: &Dictionary) -> Result<Arc<dyn Font>, InterpretError> {
    match dict.get_name("Subtype") {
        Some("Type0") => Ok(Arc::new(composite_font(dict)?)),
        _ => Ok(Arc::new(simple_font(dict)?)),
    }
}

fn font_error(message: impl Into<String>) -> InterpretError {
    InterpretError::Font(message.into())
}

fn base_font_name(dict: &Dictionary) -> String {
    dict.get_name("BaseFont")
        .map(|n| metrics::strip_subset_prefix(n).to_string())
        .unwrap_or_else(|| "Unnamed".to_string())
}

fn simple_font(dict: &Dictionary) -> Result<SimpleFont, InterpretError> {
    let name = base_font_name(dict);
    let builtin = metrics::lookup(&name);
    let subtype = dict.get_name("Subtype").unwrap_or("Type1");

    let default_base = match (subtype, builtin) {
        ("TrueType", _) | (_, Some(_)) => BaseEncoding::WinAnsi,
        _ => BaseEncoding::Standard,
    };
    let encoding = build_encoding(dict.get("Encoding"), default_base);

    let to_unicode = to_unicode(dict)?;
    let descriptor = dict.get("FontDescriptor").and_then(|d| d.as_dict().ok());

    let first_char = dict.get_f64("FirstChar").unwrap_or(0.0).max(0.0) as u32;
    let mut widths = match dict.get("Widths") {
        Some(w) => w
            .as_numbers()
            .map_err(|e| font_error(format!("{name}: /Widths {e}")))?,
        None => Vec::new(),
    };
    if subtype == "Type3" {
        // glyph space → text space through /FontMatrix
        let scale = dict
            .get("FontMatrix")
            .and_then(|m| m.as_numbers().ok())
            .and_then(|m| m.first().copied())
            .unwrap_or(0.001);
        for w in &mut widths {
            *w *= scale * 1000.0;
        }
    }

    let missing_width = descriptor.and_then(|d| d.get_f64("MissingWidth")).unwrap_or(0.0);
    let ascent = descriptor
        .and_then(|d| d.get_f64("Ascent"))
        .or(builtin.map(|m| m.ascent))
        .unwrap_or(DEFAULT_ASCENT);
    let descent = descriptor
        .and_then(|d| d.get_f64("Descent"))
        .or(builtin.map(|m| m.descent))
        .unwrap_or(DEFAULT_DESCENT);

    Ok(SimpleFont {
        name,
        encoding,
        to_unicode,
        first_char,
        widths,
        builtin,
        missing_width,
        ascent,
        descent,
    })
}

fn build_encoding(entry: Option<&Object>, default_base: BaseEncoding) -> Encoding {
    match entry {
        Some(Object::Name(name)) => {
            Encoding::from_base(BaseEncoding::from_name(name).unwrap_or(default_base))
        }
        Some(obj @ (Object::Dict(_) | Object::Stream(_))) => {
            let Ok(enc_dict) = obj.as_dict() else {
                return Encoding::from_base(default_base);
            };
            let base = enc_dict
                .get_name("BaseEncoding")
                .and_then(BaseEncoding::from_name)
                .unwrap_or(default_base);
            let mut encoding = Encoding::from_base(base);
            if let Some(Object::Array(items)) = enc_dict.get("Differences") {
                let items = items.iter().filter_map(|item| match item {
                    Object::Integer(c) => Some(DifferencesItem::Code(*c)),
                    Object::Real(c) => Some(DifferencesItem::Code(*c as i64)),
                    Object::Name(n) => Some(DifferencesItem::Name(n)),
                    _ => None,
                });
                encoding.apply_differences(&parse_differences(items));
            }
            encoding
        }
        _ => Encoding::from_base(default_base),
    }
}

fn to_unicode(dict: &Dictionary) -> Result<Option<ToUnicodeCMap>, InterpretError> {
    match dict.get("ToUnicode") {
        Some(Object::Stream(stream)) => Ok(Some(ToUnicodeCMap::parse(stream.content())?)),
        _ => Ok(None),
    }
}

fn composite_font(dict: &Dictionary) -> Result<CompositeFont, InterpretError> {
    let name = base_font_name(dict);
    let descendant = dict
        .get("DescendantFonts")
        .and_then(|d| match d {
            Object::Array(items) => items.first(),
            other => Some(other),
        })
        .and_then(|d| d.as_dict().ok())
        .ok_or_else(|| font_error(format!("{name}: missing /DescendantFonts")))?;

    let default_width = descendant.get_f64("DW").unwrap_or(DEFAULT_CID_WIDTH);
    let widths = match descendant.get("W") {
        Some(Object::Array(items)) => parse_cid_widths(items),
        Some(other) => {
            return Err(font_error(format!(
                "{name}: /W is a {}, expected array",
                other.type_name()
            )));
        }
        None => HashMap::new(),
    };
    let descriptor = descendant.get("FontDescriptor").and_then(|d| d.as_dict().ok());

    Ok(CompositeFont {
        name,
        to_unicode: to_unicode(dict)?,
        widths,
        default_width,
        ascent: descriptor
            .and_then(|d| d.get_f64("Ascent"))
            .unwrap_or(DEFAULT_ASCENT),
        descent: descriptor
            .and_then(|d| d.get_f64("Descent"))
            .unwrap_or(DEFAULT_DESCENT),
    })
}

/// Parse a CID `/W` array: `c [w1 w2 …]` and `c_first c_last w` entries.
pub fn parse_cid_widths(items: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < items.len() {
        let Ok(first) = items[i].as_f64() else {
            i += 1;
            continue;
        };
        let first = first.max(0.0) as u32;
        match items.get(i + 1) {
            Some(Object::Array(ws)) => {
                for (offset, w) in ws.iter().enumerate() {
                    let Some(cid) = u32::try_from(offset).ok().and_then(|o| first.checked_add(o)) else {
                        break;
                    };
                    if let Ok(w) = w.as_f64() {
                        widths.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(last) if last.is_number() => {
                let (Ok(last), Some(Ok(w))) = (last.as_f64(), items.get(i + 2).map(Object::as_f64))
                else {
                    break;
                };
                let last = (last.max(0.0) as u32).min(first.saturating_add(0xFFFF));
                for cid in first..=last {
                    widths.insert(cid, w);
                }
                i += 3;
            }
            _ => break,
        }
    }
    widths
}
