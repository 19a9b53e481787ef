//! The font interface consumed by text-showing operators.
//!
//! Concrete fonts are built from resource dictionaries by the parse crate;
//! the core only needs the code → Unicode map and the advance widths.

use std::fmt;

/// How a font splits a shown string into character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// One byte per code.
    Simple,
    /// Two-byte codes first, falling back to one byte when unmapped.
    Composite,
}

/// A decoded glyph of a shown string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Character code as read from the string bytes.
    pub code: u32,
    /// Number of string bytes the code consumed (1 or 2).
    pub byte_len: usize,
    /// Unicode value; U+FFFD when the font has no mapping.
    pub ch: char,
    /// Advance width in 1/1000 text space units.
    pub width: f64,
}

impl Glyph {
    /// Whether word spacing applies: the single-byte code 32.
    pub fn is_space(&self) -> bool {
        self.byte_len == 1 && self.code == 32
    }
}

/// Capability set of a font resource.
///
/// Implementations are shared read-only between interpreters, possibly on
/// several threads, hence the `Send + Sync` bound.
pub trait Font: fmt::Debug + Send + Sync {
    /// Resource or base font name.
    fn name(&self) -> &str;

    fn kind(&self) -> FontKind;

    /// Unicode value for a character code, if the font maps it.
    fn character_for_code(&self, code: u32) -> Option<char>;

    /// Unicode value for a single byte. Composite fonts use this table when a
    /// two-byte lookup fails.
    fn character_for_byte(&self, byte: u8) -> Option<char> {
        self.character_for_code(byte as u32)
    }

    /// Advance width of a code in 1/1000 units of the font size.
    fn advance_width(&self, code: u32) -> f64;

    /// Ascent in 1/1000 units.
    fn ascent(&self) -> f64;

    /// Descent in 1/1000 units (negative below the baseline).
    fn descent(&self) -> f64;

    /// Average glyph width in 1/1000 units.
    fn average_width(&self) -> f64;

    /// Width of the space glyph in 1/1000 units, used to detect word gaps.
    fn space_width(&self) -> f64 {
        let w = self.advance_width(32);
        if w > 0.0 { w } else { self.average_width() / 2.0 }
    }

    /// Split string bytes into glyphs.
    fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        match self.kind() {
            FontKind::Simple => bytes
                .iter()
                .map(|&b| Glyph {
                    code: b as u32,
                    byte_len: 1,
                    ch: self
                        .character_for_code(b as u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER),
                    width: self.advance_width(b as u32),
                })
                .collect(),
            FontKind::Composite => decode_composite(self, bytes),
        }
    }
}

fn decode_composite<F: Font + ?Sized>(font: &F, bytes: &[u8]) -> Vec<Glyph> {
    let mut glyphs = Vec::with_capacity(bytes.len() / 2 + 1);
    let mut i = 0;
    while i < bytes.len() {
        if i + 1 < bytes.len() {
            let code = u32::from(bytes[i]) << 8 | u32::from(bytes[i + 1]);
            let mapped = font
                .character_for_code(code)
                .filter(|&ch| ch != char::REPLACEMENT_CHARACTER);
            if let Some(ch) = mapped {
                glyphs.push(Glyph {
                    code,
                    byte_len: 2,
                    ch,
                    width: font.advance_width(code),
                });
                i += 2;
                continue;
            }
        }
        let byte = bytes[i];
        glyphs.push(Glyph {
            code: byte as u32,
            byte_len: 1,
            ch: font
                .character_for_byte(byte)
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            width: font.advance_width(byte as u32),
        });
        i += 1;
    }
    glyphs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed-width font mapping ASCII codes to themselves.
    #[derive(Debug)]
    pub(crate) struct AsciiFont {
        pub width: f64,
    }

    impl Font for AsciiFont {
        fn name(&self) -> &str {
            "Ascii"
        }
        fn kind(&self) -> FontKind {
            FontKind::Simple
        }
        fn character_for_code(&self, code: u32) -> Option<char> {
            (code < 128).then(|| char::from(code as u8))
        }
        fn advance_width(&self, _code: u32) -> f64 {
            self.width
        }
        fn ascent(&self) -> f64 {
            750.0
        }
        fn descent(&self) -> f64 {
            -250.0
        }
        fn average_width(&self) -> f64 {
            self.width
        }
    }

    #[derive(Debug)]
    struct TwoByteFont {
        map: HashMap<u32, char>,
    }

    impl Font for TwoByteFont {
        fn name(&self) -> &str {
            "TwoByte"
        }
        fn kind(&self) -> FontKind {
            FontKind::Composite
        }
        fn character_for_code(&self, code: u32) -> Option<char> {
            self.map.get(&code).copied()
        }
        fn character_for_byte(&self, byte: u8) -> Option<char> {
            byte.is_ascii().then(|| char::from(byte))
        }
        fn advance_width(&self, code: u32) -> f64 {
            if code > 0xFF { 1000.0 } else { 500.0 }
        }
        fn ascent(&self) -> f64 {
            880.0
        }
        fn descent(&self) -> f64 {
            -120.0
        }
        fn average_width(&self) -> f64 {
            1000.0
        }
    }

    #[test]
    fn simple_font_decodes_one_glyph_per_byte() {
        let font = AsciiFont { width: 600.0 };
        let glyphs = font.decode(b"Hi \xff");
        assert_eq!(glyphs.len(), 4);
        assert_eq!(glyphs[0].ch, 'H');
        assert!(glyphs[2].is_space());
        assert_eq!(glyphs[3].ch, char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn composite_font_prefers_two_byte_codes() {
        let font = TwoByteFont {
            map: HashMap::from([(0x4E2D, '中')]),
        };
        let glyphs = font.decode(&[0x4E, 0x2D, b'A']);
        assert_eq!(glyphs.len(), 2);
        assert_eq!((glyphs[0].ch, glyphs[0].byte_len, glyphs[0].width), ('中', 2, 1000.0));
        assert_eq!((glyphs[1].ch, glyphs[1].byte_len, glyphs[1].width), ('A', 1, 500.0));
    }

    #[test]
    fn composite_font_falls_back_on_replacement_character() {
        let font = TwoByteFont {
            map: HashMap::from([(0x4142, char::REPLACEMENT_CHARACTER)]),
        };
        let text: String = font.decode(b"AB").iter().map(|g| g.ch).collect();
        assert_eq!(text, "AB");
    }

    #[test]
    fn space_width_prefers_code_32() {
        assert_eq!(AsciiFont { width: 250.0 }.space_width(), 250.0);
    }

    #[test]
    fn font_is_object_safe() {
        let font: Box<dyn Font> = Box::new(AsciiFont { width: 500.0 });
        assert_eq!(font.name(), "Ascii");
    }
}
