//! Primitive value model for content-stream operands and resource dictionaries.

use std::sync::Arc;

use crate::error::ObjectError;

/// Indirect object reference `num gen R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    pub num: u32,
    pub generation: u16,
}

/// A PDF value.
///
/// Literal and hex strings stay distinct: a literal string keeps its raw
/// bytes with escapes unexpanded, a hex string keeps its hex digits
/// (normalized to an even count). [`Object::string_bytes`] decodes both.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`.
    Name(String),
    LiteralString(Vec<u8>),
    HexString(Vec<u8>),
    Array(Vec<Object>),
    Dict(Dictionary),
    Stream(Stream),
    Ref(ObjRef),
}

impl Object {
    /// Hex string object holding exactly `bytes`.
    pub fn string_from_bytes(bytes: &[u8]) -> Object {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let mut digits = Vec::with_capacity(bytes.len() * 2);
        for b in bytes {
            digits.push(HEX[(b >> 4) as usize]);
            digits.push(HEX[(b & 0x0F) as usize]);
        }
        Object::HexString(digits)
    }

    pub fn name(name: impl Into<String>) -> Object {
        Object::Name(name.into())
    }

    /// Variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Bool(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::Name(_) => "name",
            Object::LiteralString(_) => "literal string",
            Object::HexString(_) => "hex string",
            Object::Array(_) => "array",
            Object::Dict(_) => "dictionary",
            Object::Stream(_) => "stream",
            Object::Ref(_) => "reference",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ObjectError {
        ObjectError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ObjectError> {
        match self {
            Object::Bool(b) => Ok(*b),
            other => Err(other.mismatch("boolean")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, ObjectError> {
        match self {
            Object::Integer(i) => Ok(*i),
            other => Err(other.mismatch("integer")),
        }
    }

    /// Numeric value of an integer or a real.
    pub fn as_f64(&self) -> Result<f64, ObjectError> {
        match self {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Object::Integer(_) | Object::Real(_))
    }

    pub fn as_name(&self) -> Result<&str, ObjectError> {
        match self {
            Object::Name(n) => Ok(n),
            other => Err(other.mismatch("name")),
        }
    }

    pub fn as_array(&self) -> Result<&[Object], ObjectError> {
        match self {
            Object::Array(a) => Ok(a),
            other => Err(other.mismatch("array")),
        }
    }

    /// Dictionary of a dictionary or of a stream.
    pub fn as_dict(&self) -> Result<&Dictionary, ObjectError> {
        match self {
            Object::Dict(d) => Ok(d),
            Object::Stream(s) => Ok(&s.dict),
            other => Err(other.mismatch("dictionary")),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream, ObjectError> {
        match self {
            Object::Stream(s) => Ok(s),
            other => Err(other.mismatch("stream")),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Object::LiteralString(_) | Object::HexString(_))
    }

    /// Decoded bytes of a literal or hex string.
    pub fn string_bytes(&self) -> Result<Vec<u8>, ObjectError> {
        match self {
            Object::LiteralString(raw) => Ok(unescape_literal(raw)),
            Object::HexString(digits) => Ok(decode_hex_digits(digits)),
            other => Err(other.mismatch("string")),
        }
    }

    /// Element `index` of an array.
    pub fn index(&self, index: usize) -> Result<&Object, ObjectError> {
        let array = self.as_array()?;
        array.get(index).ok_or(ObjectError::IndexOutOfRange {
            index,
            len: array.len(),
        })
    }

    /// Entry `key` of a dictionary or stream dictionary.
    pub fn get(&self, key: &str) -> Result<&Object, ObjectError> {
        self.as_dict()?
            .get(key)
            .ok_or_else(|| ObjectError::MissingKey(key.to_string()))
    }

    /// Numbers of a numeric array, e.g. a matrix or a dash array.
    pub fn as_numbers(&self) -> Result<Vec<f64>, ObjectError> {
        self.as_array()?.iter().map(Object::as_f64).collect()
    }
}

/// Ordered name → value mapping. Later inserts of the same key replace the
/// earlier value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    entries: Vec<(String, Object)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Object) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: Object) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name value of `key`, if present and a name.
    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|o| o.as_name().ok())
    }

    /// Numeric value of `key`, if present and a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|o| o.as_f64().ok())
    }
}

impl FromIterator<(String, Object)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, Object)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// A stream: dictionary plus payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    /// Payload as stored in the file.
    pub raw: Arc<[u8]>,
    /// Payload after the filters were applied, when a decoder was available.
    pub decoded: Option<Arc<[u8]>>,
}

impl Stream {
    pub fn new(dict: Dictionary, raw: impl Into<Arc<[u8]>>) -> Self {
        Self {
            dict,
            raw: raw.into(),
            decoded: None,
        }
    }

    /// Decoded payload if available, else the raw payload.
    pub fn content(&self) -> &[u8] {
        self.decoded.as_deref().unwrap_or(&self.raw)
    }
}

/// Expand the escapes of a literal string's raw bytes.
///
/// Handles `\n \r \t \b \f \( \) \\`, octal `\ddd` (one to three digits),
/// backslash line continuations, and normalizes unescaped CR and CR LF line
/// ends to LF. An unknown escape yields the escaped byte.
pub fn unescape_literal(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        match b {
            b'\\' => {
                i += 1;
                let Some(&escaped) = raw.get(i) else {
                    break;
                };
                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'(' | b')' | b'\\' => out.push(escaped),
                    b'\r' => {
                        if raw.get(i + 1) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    b'\n' => {
                        if raw.get(i + 1) == Some(&b'\r') {
                            i += 1;
                        }
                    }
                    b'0'..=b'7' => {
                        let mut value: u32 = (escaped - b'0') as u32;
                        for _ in 0..2 {
                            match raw.get(i + 1) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + (d - b'0') as u32;
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        // high-order overflow is ignored
                        out.push((value & 0xFF) as u8);
                    }
                    other => out.push(other),
                }
                i += 1;
            }
            b'\r' => {
                out.push(b'\n');
                i += 1;
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

/// Decode pairs of hex digits. A trailing odd digit is treated as followed
/// by `0`; non-hex bytes are skipped.
pub fn decode_hex_digits(digits: &[u8]) -> Vec<u8> {
    let nybbles: Vec<u8> = digits
        .iter()
        .filter_map(|&d| (d as char).to_digit(16).map(|v| v as u8))
        .collect();
    nybbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}
