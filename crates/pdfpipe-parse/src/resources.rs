//! Typed view of a page's `/Resources` dictionary.
//!
//! Built once per page (or per Form XObject) from a dictionary whose
//! references have been resolved. Fonts are constructed eagerly and shared
//! through `Arc`, so a prepared page can be interpreted on any thread.

use std::collections::HashMap;
use std::sync::Arc;

use pdfpipe_core::{ColorSpace, Font, Matrix};
use tracing::warn;

use crate::font::font_from_dict;
use crate::graphics_state::GraphicsState;
use crate::object::{Dictionary, Object, Stream};

/// Image attributes carried on image events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInfo {
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub bits_per_component: Option<u8>,
    /// Color space family name.
    pub color_space: Option<String>,
    /// Filter names in application order.
    pub filters: Vec<String>,
}

impl ImageInfo {
    /// Read the image attributes of an image XObject or an expanded inline
    /// image dictionary. Missing or malformed entries are left empty.
    pub fn from_dict(dict: &Dictionary) -> Self {
        let dimension = |key: &str| {
            dict.get(key)
                .and_then(|o| o.as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
        };
        let color_space = dict.get("ColorSpace").and_then(|cs| match cs {
            Object::Name(name) => Some(name.clone()),
            Object::Array(items) => items.first().and_then(|o| o.as_name().ok()).map(String::from),
            _ => None,
        });
        let filters = match dict.get("Filter") {
            Some(Object::Name(name)) => vec![name.clone()],
            Some(Object::Array(items)) => items
                .iter()
                .filter_map(|o| o.as_name().ok())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            pixel_width: dimension("Width"),
            pixel_height: dimension("Height"),
            bits_per_component: dict
                .get("BitsPerComponent")
                .and_then(|o| o.as_i64().ok())
                .and_then(|v| u8::try_from(v).ok()),
            color_space,
            filters,
        }
    }
}

/// An image XObject: attributes plus the undecoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageXObject {
    pub info: ImageInfo,
    pub data: Arc<[u8]>,
}

/// A Form XObject: its own content stream, matrix and optional resources.
#[derive(Debug, Clone)]
pub struct FormXObject {
    pub matrix: Matrix,
    /// `None` when the form inherits the resources of the stream painting it.
    pub resources: Option<Arc<Resources>>,
    pub content: Arc<[u8]>,
}

/// An entry of `/Resources/XObject`.
#[derive(Debug, Clone)]
pub enum XObject {
    Image(ImageXObject),
    Form(FormXObject),
    PostScript,
}

impl XObject {
    /// Classify a stream by its `/Subtype`. Returns `None` for unknown subtypes.
    pub fn from_stream(stream: &Stream) -> Option<Self> {
        match stream.dict.get_name("Subtype")? {
            "Image" => Some(XObject::Image(ImageXObject {
                info: ImageInfo::from_dict(&stream.dict),
                data: stream.raw.clone(),
            })),
            "Form" => {
                let matrix = stream
                    .dict
                    .get("Matrix")
                    .and_then(|m| m.as_numbers().ok())
                    .and_then(|v| match v.as_slice() {
                        [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
                        _ => None,
                    })
                    .unwrap_or_default();
                let resources = stream
                    .dict
                    .get("Resources")
                    .and_then(|r| r.as_dict().ok())
                    .map(|d| Arc::new(Resources::from_dict(d)));
                let content = stream.decoded.clone().unwrap_or_else(|| stream.raw.clone());
                Some(XObject::Form(FormXObject {
                    matrix,
                    resources,
                    content,
                }))
            }
            "PS" => Some(XObject::PostScript),
            _ => None,
        }
    }
}

/// Parameters of an `/ExtGState` entry that the interpreter applies.
#[derive(Debug, Clone, Default)]
pub struct ExtGState {
    pub line_width: Option<f64>,
    pub line_cap: Option<i64>,
    pub line_join: Option<i64>,
    pub miter_limit: Option<f64>,
    pub dash: Option<(Vec<f64>, f64)>,
    pub rendering_intent: Option<String>,
    pub flatness: Option<f64>,
    pub font: Option<(Arc<dyn Font>, f64)>,
}

impl ExtGState {
    /// Read the supported entries; malformed entries are ignored.
    pub fn from_dict(dict: &Dictionary) -> Self {
        let dash = dict.get("D").and_then(|d| {
            let pattern = d.index(0).and_then(Object::as_numbers).ok()?;
            let phase = d.index(1).and_then(Object::as_f64).unwrap_or(0.0);
            Some((pattern, phase))
        });
        let font = dict.get("Font").and_then(|f| {
            let font_dict = f.index(0).ok()?.as_dict().ok()?;
            let size = f.index(1).ok()?.as_f64().ok()?;
            match font_from_dict(font_dict) {
                Ok(font) => Some((font, size)),
                Err(err) => {
                    warn!(error = %err, "ignoring ExtGState font");
                    None
                }
            }
        });
        Self {
            line_width: dict.get_f64("LW"),
            line_cap: dict.get_f64("LC").map(|v| v as i64),
            line_join: dict.get_f64("LJ").map(|v| v as i64),
            miter_limit: dict.get_f64("ML"),
            dash,
            rendering_intent: dict.get_name("RI").map(String::from),
            flatness: dict.get_f64("FL"),
            font,
        }
    }

    /// Copy every present parameter into the graphics state.
    pub fn apply(&self, gs: &mut GraphicsState) {
        if let Some(lw) = self.line_width {
            gs.line_width = lw;
        }
        if let Some(cap) = self.line_cap {
            gs.line_cap = cap;
        }
        if let Some(join) = self.line_join {
            gs.line_join = join;
        }
        if let Some(ml) = self.miter_limit {
            gs.miter_limit = ml;
        }
        if let Some((array, phase)) = &self.dash {
            gs.dash_array = array.clone();
            gs.dash_phase = *phase;
        }
        if let Some(ri) = &self.rendering_intent {
            gs.rendering_intent = ri.clone();
        }
        if let Some(fl) = self.flatness {
            gs.flatness = fl;
        }
        if let Some((font, size)) = &self.font {
            gs.text.font_name = Some(font.name().to_string());
            gs.text.font = Some(Arc::clone(font));
            gs.text.font_size = *size;
        }
    }
}

/// Resolve a `/ColorSpace` resource value: a family name or an array whose
/// first element is the family.
pub fn color_space_from_object(obj: &Object) -> Option<ColorSpace> {
    match obj {
        Object::Name(name) => ColorSpace::from_name(name),
        Object::Array(items) => {
            let family = items.first()?.as_name().ok()?;
            match family {
                "ICCBased" => {
                    let n = items
                        .get(1)
                        .and_then(|s| s.get("N").ok())
                        .and_then(|n| n.as_i64().ok())
                        .unwrap_or(3);
                    Some(ColorSpace::IccBased {
                        components: n.clamp(1, 4) as u8,
                    })
                }
                "DeviceN" => {
                    let n = items
                        .get(1)
                        .and_then(|names| names.as_array().ok())
                        .map_or(1, |names| names.len().clamp(1, 32));
                    Some(ColorSpace::DeviceN {
                        components: n as u8,
                    })
                }
                other => ColorSpace::from_name(other),
            }
        }
        _ => None,
    }
}

/// Entries of the sub-dictionary `key`, if present.
fn entries<'a>(dict: &'a Dictionary, key: &'static str) -> impl Iterator<Item = (&'a str, &'a Object)> {
    dict.get(key)
        .and_then(|o| o.as_dict().ok())
        .into_iter()
        .flat_map(|d| d.iter())
}

/// Fonts, XObjects, graphics state parameters, color spaces and property
/// lists available to a content stream.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    fonts: HashMap<String, Arc<dyn Font>>,
    font_errors: HashMap<String, String>,
    xobjects: HashMap<String, XObject>,
    ext_gstates: HashMap<String, ExtGState>,
    color_spaces: HashMap<String, ColorSpace>,
    properties: HashMap<String, Dictionary>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a resolved `/Resources` dictionary.
    ///
    /// Entries that cannot be used are dropped; a font that fails to build
    /// keeps its error message so `Tf` can report it.
    pub fn from_dict(dict: &Dictionary) -> Self {
        let mut resources = Resources::new();

        for (name, value) in entries(dict, "Font") {
            let built = value
                .as_dict()
                .map_err(|e| e.to_string())
                .and_then(|d| font_from_dict(d).map_err(|e| e.to_string()));
            match built {
                Ok(font) => {
                    resources.fonts.insert(name.to_string(), font);
                }
                Err(message) => {
                    warn!(font = name, error = %message, "font resource unusable");
                    resources.font_errors.insert(name.to_string(), message);
                }
            }
        }
        for (name, value) in entries(dict, "XObject") {
            if let Some(xobject) = value.as_stream().ok().and_then(XObject::from_stream) {
                resources.xobjects.insert(name.to_string(), xobject);
            }
        }
        for (name, value) in entries(dict, "ExtGState") {
            if let Ok(d) = value.as_dict() {
                resources
                    .ext_gstates
                    .insert(name.to_string(), ExtGState::from_dict(d));
            }
        }
        for (name, value) in entries(dict, "ColorSpace") {
            if let Some(space) = color_space_from_object(value) {
                resources.color_spaces.insert(name.to_string(), space);
            }
        }
        for (name, value) in entries(dict, "Properties") {
            if let Ok(d) = value.as_dict() {
                resources.properties.insert(name.to_string(), d.clone());
            }
        }
        resources
    }

    pub fn with_font(mut self, name: impl Into<String>, font: Arc<dyn Font>) -> Self {
        self.fonts.insert(name.into(), font);
        self
    }

    pub fn with_xobject(mut self, name: impl Into<String>, xobject: XObject) -> Self {
        self.xobjects.insert(name.into(), xobject);
        self
    }

    pub fn with_ext_gstate(mut self, name: impl Into<String>, ext: ExtGState) -> Self {
        self.ext_gstates.insert(name.into(), ext);
        self
    }

    pub fn with_color_space(mut self, name: impl Into<String>, space: ColorSpace) -> Self {
        self.color_spaces.insert(name.into(), space);
        self
    }

    pub fn with_properties(mut self, name: impl Into<String>, props: Dictionary) -> Self {
        self.properties.insert(name.into(), props);
        self
    }

    pub fn font(&self, name: &str) -> Option<&Arc<dyn Font>> {
        self.fonts.get(name)
    }

    /// Why the font resource `name` could not be built, if it failed.
    pub fn font_error(&self, name: &str) -> Option<&str> {
        self.font_errors.get(name).map(String::as_str)
    }

    pub fn xobject(&self, name: &str) -> Option<&XObject> {
        self.xobjects.get(name)
    }

    pub fn ext_gstate(&self, name: &str) -> Option<&ExtGState> {
        self.ext_gstates.get(name)
    }

    /// Color space for a `CS`/`cs` operand: device family names directly,
    /// anything else through `/ColorSpace`, then the remaining family names.
    pub fn color_space(&self, name: &str) -> Option<ColorSpace> {
        match name {
            "DeviceGray" | "DeviceRGB" | "DeviceCMYK" => ColorSpace::from_name(name),
            _ => self
                .color_spaces
                .get(name)
                .copied()
                .or_else(|| ColorSpace::from_name(name)),
        }
    }

    pub fn properties(&self, name: &str) -> Option<&Dictionary> {
        self.properties.get(name)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}
