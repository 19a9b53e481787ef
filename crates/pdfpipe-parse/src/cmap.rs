//! ToUnicode CMap parsing.
//!
//! A ToUnicode stream is PostScript-like; its `bfchar` and `bfrange`
//! sections are plain operand runs, so the content stream lexer reads them
//! and everything outside those sections is ignored.

use std::collections::HashMap;

use crate::encoding::glyph_name_to_char;
use crate::error::InterpretError;
use crate::lexer::{Lexer, Token};
use crate::object::Object;

/// Largest `bfrange` that is expanded.
const MAX_RANGE: u32 = 0x1_0000;

/// Character code → Unicode mapping read from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    BfChar,
    BfRange,
}

impl ToUnicodeCMap {
    /// Parse the decoded bytes of a ToUnicode stream.
    ///
    /// # Errors
    ///
    /// Returns [`InterpretError::Lex`] if the stream cannot be tokenized.
    pub fn parse(data: &[u8]) -> Result<Self, InterpretError> {
        let mut cmap = ToUnicodeCMap::default();
        let mut section = Section::None;
        let mut operands: Vec<Object> = Vec::new();
        for token in Lexer::new(data) {
            match token? {
                Token::Operand(obj) if section != Section::None => operands.push(obj),
                Token::Unknown(keyword) => match keyword.as_str() {
                    "beginbfchar" => {
                        section = Section::BfChar;
                        operands.clear();
                    }
                    "beginbfrange" => {
                        section = Section::BfRange;
                        operands.clear();
                    }
                    "endbfchar" => {
                        cmap.add_bfchar(&operands);
                        section = Section::None;
                    }
                    "endbfrange" => {
                        cmap.add_bfrange(&operands);
                        section = Section::None;
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(cmap)
    }

    fn add_bfchar(&mut self, operands: &[Object]) {
        for pair in operands.chunks_exact(2) {
            let (Some(code), Some(text)) = (source_code(&pair[0]), destination(&pair[1])) else {
                continue;
            };
            self.mappings.insert(code, text);
        }
    }

    fn add_bfrange(&mut self, operands: &[Object]) {
        for triple in operands.chunks_exact(3) {
            let (Some(lo), Some(hi)) = (source_code(&triple[0]), source_code(&triple[1])) else {
                continue;
            };
            if hi < lo || hi - lo >= MAX_RANGE {
                continue;
            }
            match &triple[2] {
                Object::Array(items) => {
                    for (code, item) in (lo..=hi).zip(items) {
                        if let Some(text) = destination(item) {
                            self.mappings.insert(code, text);
                        }
                    }
                }
                dst => {
                    let Ok(bytes) = dst.string_bytes() else {
                        continue;
                    };
                    let mut units = utf16_units(&bytes);
                    if units.is_empty() {
                        continue;
                    }
                    for code in lo..=hi {
                        self.mappings.insert(code, String::from_utf16_lossy(&units));
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(1);
                        }
                    }
                }
            }
        }
    }

    /// Unicode text of a code; ligatures map to several characters.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// First Unicode scalar of a code's mapping.
    pub fn char_for(&self, code: u32) -> Option<char> {
        self.lookup(code).and_then(|s| s.chars().next())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn source_code(obj: &Object) -> Option<u32> {
    let bytes = obj.string_bytes().ok()?;
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    Some(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
}

fn destination(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => glyph_name_to_char(name).map(String::from),
        other => {
            let units = utf16_units(&other.string_bytes().ok()?);
            (!units.is_empty()).then(|| String::from_utf16_lossy(&units))
        }
    }
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => *single as u16,
            _ => 0,
        })
        .collect()
}
