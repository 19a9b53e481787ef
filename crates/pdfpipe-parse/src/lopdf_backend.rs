//! lopdf-based document access.
//!
//! Opens a PDF with the [lopdf](https://crates.io/crates/lopdf) crate and
//! turns each page into a [`MemoryPage`]: the inherited `/MediaBox`, the
//! inherited `/Resources` converted into the crate's own object model, and
//! the decoded, concatenated `/Contents`.

use std::collections::{HashMap, HashSet};

use pdfpipe_core::BBox;
use tracing::debug;

use crate::error::InterpretError;
use crate::object::{Dictionary, ObjRef, Object, Stream};
use crate::page::MemoryPage;
use crate::resources::Resources;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    /// The underlying lopdf document.
    inner: lopdf::Document,
    /// Page ObjectIds in page order (indexed by 0-based page number).
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse a document from bytes.
    ///
    /// # Errors
    ///
    /// Fails if lopdf cannot parse the file or the file is encrypted.
    pub fn open(bytes: &[u8]) -> Result<Self, InterpretError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| InterpretError::Backend(format!("failed to parse PDF: {e}")))?;
        Self::from_document(inner)
    }

    /// Wrap an already loaded lopdf document.
    ///
    /// # Errors
    ///
    /// Fails if the document is encrypted.
    pub fn from_document(inner: lopdf::Document) -> Result<Self, InterpretError> {
        if inner.is_encrypted() {
            return Err(InterpretError::Backend(
                "encrypted documents are not supported".to_string(),
            ));
        }
        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "opened document");
        Ok(Self { inner, page_ids })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Load one page into memory.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range or the page dictionary or its
    /// content streams are broken.
    pub fn page(&self, index: usize) -> Result<MemoryPage, InterpretError> {
        let Some(&page_id) = self.page_ids.get(index) else {
            return Err(InterpretError::Core(pdfpipe_core::PdfError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            }));
        };
        let doc = &self.inner;
        let page_dict = doc
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| InterpretError::Backend(format!("failed to get page dictionary: {e}")))?;

        let media_box = resolve_inherited(doc, page_id, b"MediaBox")?
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .and_then(|array| bbox_from_array(array));

        let mut converter = Converter::new(doc);
        let resources = match resolve_inherited(doc, page_id, b"Resources")? {
            Some(obj) => match converter.convert(obj) {
                Object::Dict(dict) => Resources::from_dict(&dict),
                _ => Resources::new(),
            },
            None => Resources::new(),
        };

        let content = page_content(doc, page_dict)?;
        debug!(
            page = index,
            bytes = content.len(),
            fonts = resources.font_count(),
            "loaded page"
        );

        let mut page = MemoryPage::new(content).with_resources(resources);
        page.media_box = media_box;
        Ok(page)
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, InterpretError> {
    let mut current_id = page_id;
    let mut seen = HashSet::new();
    loop {
        if !seen.insert(current_id) {
            return Ok(None);
        }
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| InterpretError::Backend(format!("failed to get page tree node: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj.as_reference().map_err(|e| {
                    InterpretError::Backend(format!("invalid /Parent reference: {e}"))
                })?;
            }
            Err(_) => return Ok(None),
        }
    }
}

/// Follow one level of indirection; unresolvable references stay as they are.
fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn number(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

fn bbox_from_array(array: &[lopdf::Object]) -> Option<BBox> {
    match array {
        [x0, y0, x1, y1] => Some(BBox::new(
            number(x0)?,
            number(y0)?,
            number(x1)?,
            number(y1)?,
        )),
        _ => None,
    }
}

/// Decoded bytes of `/Contents`, joining an array of streams with a space.
fn page_content(doc: &lopdf::Document, page_dict: &lopdf::Dictionary) -> Result<Vec<u8>, InterpretError> {
    let contents_obj = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    match resolve(doc, contents_obj) {
        lopdf::Object::Stream(stream) => decode_content_stream(stream),
        lopdf::Object::Array(arr) => {
            let mut content = Vec::new();
            for item in arr {
                let stream = resolve(doc, item).as_stream().map_err(|e| {
                    InterpretError::Backend(format!("/Contents array item is not a stream: {e}"))
                })?;
                let bytes = decode_content_stream(stream)?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        _ => Err(InterpretError::Backend(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}

/// Decode a content stream, decompressing if needed.
fn decode_content_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, InterpretError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| InterpretError::Backend(format!("failed to decompress content stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Converts lopdf objects into [`Object`]s, resolving references.
///
/// A reference met again while it is still being converted is left as
/// [`Object::Ref`], which breaks cycles such as a form listing itself in its
/// own resources.
struct Converter<'a> {
    doc: &'a lopdf::Document,
    cache: HashMap<ObjRef, Object>,
    in_progress: HashSet<ObjRef>,
}

impl<'a> Converter<'a> {
    fn new(doc: &'a lopdf::Document) -> Self {
        Self {
            doc,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn convert(&mut self, obj: &lopdf::Object) -> Object {
        match obj {
            lopdf::Object::Null => Object::Null,
            lopdf::Object::Boolean(b) => Object::Bool(*b),
            lopdf::Object::Integer(i) => Object::Integer(*i),
            lopdf::Object::Real(f) => Object::Real(*f as f64),
            lopdf::Object::Name(name) => Object::Name(String::from_utf8_lossy(name).into_owned()),
            lopdf::Object::String(bytes, _) => Object::string_from_bytes(bytes),
            lopdf::Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.convert(item)).collect())
            }
            lopdf::Object::Dictionary(dict) => Object::Dict(self.convert_dict(dict)),
            lopdf::Object::Stream(stream) => Object::Stream(self.convert_stream(stream)),
            lopdf::Object::Reference(id) => self.convert_reference(*id),
        }
    }

    fn convert_reference(&mut self, id: lopdf::ObjectId) -> Object {
        let key = ObjRef {
            num: id.0,
            generation: id.1,
        };
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        if !self.in_progress.insert(key) {
            return Object::Ref(key);
        }
        let converted = match self.doc.get_object(id) {
            Ok(target) => self.convert(target),
            Err(err) => {
                debug!(num = id.0, generation = id.1, error = %err, "dangling reference");
                Object::Null
            }
        };
        self.in_progress.remove(&key);
        self.cache.insert(key, converted.clone());
        converted
    }

    fn convert_dict(&mut self, dict: &lopdf::Dictionary) -> Dictionary {
        dict.iter()
            .map(|(key, value)| (String::from_utf8_lossy(key).into_owned(), self.convert(value)))
            .collect()
    }

    /// Image payloads stay encoded; every other stream is decoded when a
    /// filter is present and lopdf can apply it.
    fn convert_stream(&mut self, stream: &lopdf::Stream) -> Stream {
        let dict = self.convert_dict(&stream.dict);
        let is_image = dict.get_name("Subtype") == Some("Image");
        let mut converted = Stream::new(dict, stream.content.clone());
        if !is_image && stream.dict.get(b"Filter").is_ok() {
            match stream.decompressed_content() {
                Ok(decoded) => converted.decoded = Some(decoded.into()),
                Err(err) => debug!(error = %err, "stream left undecoded"),
            }
        }
        converted
    }
}
