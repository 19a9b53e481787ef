//! Simple-font encodings: base encodings, `/Differences` and glyph names.

/// A named base encoding of a simple font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    WinAnsi,
    MacRoman,
    Standard,
}

impl BaseEncoding {
    /// Resolve an `/Encoding` or `/BaseEncoding` name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            "MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            "StandardEncoding" => Some(BaseEncoding::Standard),
            _ => None,
        }
    }

    /// Unicode value of a byte in this encoding.
    pub fn decode(&self, byte: u8) -> Option<char> {
        match self {
            BaseEncoding::WinAnsi => single_byte(encoding_rs::WINDOWS_1252, byte),
            BaseEncoding::MacRoman => single_byte(encoding_rs::MACINTOSH, byte),
            BaseEncoding::Standard => standard(byte),
        }
    }
}

fn single_byte(encoding: &'static encoding_rs::Encoding, byte: u8) -> Option<char> {
    let buf = [byte];
    let (text, _) = encoding.decode_without_bom_handling(&buf);
    text.chars()
        .next()
        .filter(|ch| !ch.is_control() && *ch != char::REPLACEMENT_CHARACTER)
}

/// Adobe StandardEncoding: ASCII with curly quotes plus a sparse upper half.
fn standard(byte: u8) -> Option<char> {
    match byte {
        0x27 => Some('\u{2019}'),
        0x60 => Some('\u{2018}'),
        0x20..=0x7E => Some(byte as char),
        _ => STANDARD_UPPER
            .iter()
            .find(|(code, _)| *code == byte)
            .map(|&(_, ch)| ch),
    }
}

static STANDARD_UPPER: &[(u8, char)] = &[
    (0xA1, '\u{00A1}'),
    (0xA2, '\u{00A2}'),
    (0xA3, '\u{00A3}'),
    (0xA4, '\u{2044}'),
    (0xA5, '\u{00A5}'),
    (0xA6, '\u{0192}'),
    (0xA7, '\u{00A7}'),
    (0xA8, '\u{00A4}'),
    (0xA9, '\''),
    (0xAA, '\u{201C}'),
    (0xAB, '\u{00AB}'),
    (0xAC, '\u{2039}'),
    (0xAD, '\u{203A}'),
    (0xAE, '\u{FB01}'),
    (0xAF, '\u{FB02}'),
    (0xB1, '\u{2013}'),
    (0xB2, '\u{2020}'),
    (0xB3, '\u{2021}'),
    (0xB4, '\u{00B7}'),
    (0xB6, '\u{00B6}'),
    (0xB7, '\u{2022}'),
    (0xB8, '\u{201A}'),
    (0xB9, '\u{201E}'),
    (0xBA, '\u{201D}'),
    (0xBB, '\u{00BB}'),
    (0xBC, '\u{2026}'),
    (0xBD, '\u{2030}'),
    (0xBF, '\u{00BF}'),
    (0xC1, '`'),
    (0xC2, '\u{00B4}'),
    (0xC3, '\u{02C6}'),
    (0xC4, '\u{02DC}'),
    (0xC5, '\u{00AF}'),
    (0xC6, '\u{02D8}'),
    (0xC7, '\u{02D9}'),
    (0xC8, '\u{00A8}'),
    (0xCA, '\u{02DA}'),
    (0xCB, '\u{00B8}'),
    (0xCD, '\u{02DD}'),
    (0xCE, '\u{02DB}'),
    (0xCF, '\u{02C7}'),
    (0xD0, '\u{2014}'),
    (0xE1, '\u{00C6}'),
    (0xE3, '\u{00AA}'),
    (0xE8, '\u{0141}'),
    (0xE9, '\u{00D8}'),
    (0xEA, '\u{0152}'),
    (0xEB, '\u{00BA}'),
    (0xF1, '\u{00E6}'),
    (0xF5, '\u{0131}'),
    (0xF8, '\u{0142}'),
    (0xF9, '\u{00F8}'),
    (0xFA, '\u{0153}'),
    (0xFB, '\u{00DF}'),
];

/// A 256-entry code → Unicode table: a base encoding with differences
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    table: [Option<char>; 256],
}

impl Encoding {
    pub fn from_base(base: BaseEncoding) -> Self {
        let mut table = [None; 256];
        for (code, slot) in table.iter_mut().enumerate() {
            *slot = base.decode(code as u8);
        }
        Self { table }
    }

    /// Override codes with the glyph names of a `/Differences` array.
    /// Unknown glyph names unmap the code.
    pub fn apply_differences(&mut self, differences: &[(u8, String)]) {
        for (code, name) in differences {
            self.table[*code as usize] = glyph_name_to_char(name);
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[code as usize]
    }
}

/// Flatten a `/Differences` array (`[code /name /name … code /name …]`)
/// into `(code, glyph name)` pairs. Codes past 255 are dropped.
pub fn parse_differences<'a, I>(items: I) -> Vec<(u8, String)>
where
    I: IntoIterator<Item = DifferencesItem<'a>>,
{
    let mut out = Vec::new();
    let mut code: Option<i64> = None;
    for item in items {
        match item {
            DifferencesItem::Code(c) => code = Some(c),
            DifferencesItem::Name(name) => {
                if let Some(c) = code {
                    if let Ok(byte) = u8::try_from(c) {
                        out.push((byte, name.to_string()));
                    }
                    code = Some(c + 1);
                }
            }
        }
    }
    out
}

/// One element of a `/Differences` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferencesItem<'a> {
    Code(i64),
    Name(&'a str),
}

/// Resolve an Adobe glyph name to its Unicode character.
///
/// Handles `uniXXXX`, `uXXXX`…`uXXXXXX`, suffixed names (`a.sc`) and a
/// table of common Latin names.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    let base = name.split('.').next().unwrap_or(name);
    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && is_hex(hex) {
            return u32::from_str_radix(&hex[..4], 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && is_hex(hex) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    let mut chars = base.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphabetic() {
            return Some(ch);
        }
    }
    GLYPH_NAMES
        .iter()
        .find(|(n, _)| *n == base)
        .map(|&(_, ch)| ch)
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

static GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("quoteright", '\u{2019}'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("minus", '\u{2212}'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("quoteleft", '\u{2018}'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("exclamdown", '\u{00A1}'),
    ("cent", '\u{00A2}'),
    ("sterling", '\u{00A3}'),
    ("currency", '\u{00A4}'),
    ("yen", '\u{00A5}'),
    ("brokenbar", '\u{00A6}'),
    ("section", '\u{00A7}'),
    ("dieresis", '\u{00A8}'),
    ("copyright", '\u{00A9}'),
    ("ordfeminine", '\u{00AA}'),
    ("guillemotleft", '\u{00AB}'),
    ("logicalnot", '\u{00AC}'),
    ("registered", '\u{00AE}'),
    ("macron", '\u{00AF}'),
    ("degree", '\u{00B0}'),
    ("plusminus", '\u{00B1}'),
    ("twosuperior", '\u{00B2}'),
    ("threesuperior", '\u{00B3}'),
    ("acute", '\u{00B4}'),
    ("mu", '\u{00B5}'),
    ("paragraph", '\u{00B6}'),
    ("periodcentered", '\u{00B7}'),
    ("cedilla", '\u{00B8}'),
    ("onesuperior", '\u{00B9}'),
    ("ordmasculine", '\u{00BA}'),
    ("guillemotright", '\u{00BB}'),
    ("onequarter", '\u{00BC}'),
    ("onehalf", '\u{00BD}'),
    ("threequarters", '\u{00BE}'),
    ("questiondown", '\u{00BF}'),
    ("Agrave", '\u{00C0}'),
    ("Aacute", '\u{00C1}'),
    ("Acircumflex", '\u{00C2}'),
    ("Atilde", '\u{00C3}'),
    ("Adieresis", '\u{00C4}'),
    ("Aring", '\u{00C5}'),
    ("AE", '\u{00C6}'),
    ("Ccedilla", '\u{00C7}'),
    ("Egrave", '\u{00C8}'),
    ("Eacute", '\u{00C9}'),
    ("Ecircumflex", '\u{00CA}'),
    ("Edieresis", '\u{00CB}'),
    ("Igrave", '\u{00CC}'),
    ("Iacute", '\u{00CD}'),
    ("Icircumflex", '\u{00CE}'),
    ("Idieresis", '\u{00CF}'),
    ("Eth", '\u{00D0}'),
    ("Ntilde", '\u{00D1}'),
    ("Ograve", '\u{00D2}'),
    ("Oacute", '\u{00D3}'),
    ("Ocircumflex", '\u{00D4}'),
    ("Otilde", '\u{00D5}'),
    ("Odieresis", '\u{00D6}'),
    ("multiply", '\u{00D7}'),
    ("Oslash", '\u{00D8}'),
    ("Ugrave", '\u{00D9}'),
    ("Uacute", '\u{00DA}'),
    ("Ucircumflex", '\u{00DB}'),
    ("Udieresis", '\u{00DC}'),
    ("Yacute", '\u{00DD}'),
    ("Thorn", '\u{00DE}'),
    ("germandbls", '\u{00DF}'),
    ("agrave", '\u{00E0}'),
    ("aacute", '\u{00E1}'),
    ("acircumflex", '\u{00E2}'),
    ("atilde", '\u{00E3}'),
    ("adieresis", '\u{00E4}'),
    ("aring", '\u{00E5}'),
    ("ae", '\u{00E6}'),
    ("ccedilla", '\u{00E7}'),
    ("egrave", '\u{00E8}'),
    ("eacute", '\u{00E9}'),
    ("ecircumflex", '\u{00EA}'),
    ("edieresis", '\u{00EB}'),
    ("igrave", '\u{00EC}'),
    ("iacute", '\u{00ED}'),
    ("icircumflex", '\u{00EE}'),
    ("idieresis", '\u{00EF}'),
    ("eth", '\u{00F0}'),
    ("ntilde", '\u{00F1}'),
    ("ograve", '\u{00F2}'),
    ("oacute", '\u{00F3}'),
    ("ocircumflex", '\u{00F4}'),
    ("otilde", '\u{00F5}'),
    ("odieresis", '\u{00F6}'),
    ("divide", '\u{00F7}'),
    ("oslash", '\u{00F8}'),
    ("ugrave", '\u{00F9}'),
    ("uacute", '\u{00FA}'),
    ("ucircumflex", '\u{00FB}'),
    ("udieresis", '\u{00FC}'),
    ("yacute", '\u{00FD}'),
    ("thorn", '\u{00FE}'),
    ("ydieresis", '\u{00FF}'),
    ("dotlessi", '\u{0131}'),
    ("Lslash", '\u{0141}'),
    ("lslash", '\u{0142}'),
    ("OE", '\u{0152}'),
    ("oe", '\u{0153}'),
    ("Scaron", '\u{0160}'),
    ("scaron", '\u{0161}'),
    ("Ydieresis", '\u{0178}'),
    ("Zcaron", '\u{017D}'),
    ("zcaron", '\u{017E}'),
    ("florin", '\u{0192}'),
    ("circumflex", '\u{02C6}'),
    ("caron", '\u{02C7}'),
    ("breve", '\u{02D8}'),
    ("dotaccent", '\u{02D9}'),
    ("ring", '\u{02DA}'),
    ("ogonek", '\u{02DB}'),
    ("tilde", '\u{02DC}'),
    ("hungarumlaut", '\u{02DD}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("quotesinglbase", '\u{201A}'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("quotedblbase", '\u{201E}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("bullet", '\u{2022}'),
    ("ellipsis", '\u{2026}'),
    ("perthousand", '\u{2030}'),
    ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203A}'),
    ("fraction", '\u{2044}'),
    ("Euro", '\u{20AC}'),
    ("trademark", '\u{2122}'),
    ("fi", '\u{FB01}'),
    ("fl", '\u{FB02}'),
    ("ff", '\u{FB00}'),
    ("ffi", '\u{FB03}'),
    ("ffl", '\u{FB04}'),
    ("nbspace", '\u{00A0}'),
    ("sfthyphen", '\u{00AD}'),
];
