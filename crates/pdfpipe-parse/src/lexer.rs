//! Content stream lexer.
//!
//! Turns decoded content stream bytes into a flat sequence of [`Token`]s:
//! operands, operators from the dispatch table, unrecognized keywords and
//! whole inline images. The processor keeps the operand stack; the lexer
//! only recognizes tokens.

use std::collections::VecDeque;

use crate::error::InterpretError;
use crate::object::{Dictionary, Object};
use crate::operators::{self, Op, OperatorSpec};

/// A lexical item of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operand(Object),
    Operator(&'static OperatorSpec),
    /// A keyword that is not a known operator.
    Unknown(String),
    /// A complete `BI … ID … EI` sequence.
    InlineImage(InlineImage),
}

/// An inline image with its abbreviations expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub dict: Dictionary,
    pub data: Vec<u8>,
}

/// Streaming lexer over one content stream.
///
/// After the first error the iterator is exhausted.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    pending: VecDeque<Token>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            pending: VecDeque::new(),
            failed: false,
        }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn next_token(&mut self) -> Result<Option<Token>, InterpretError> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(Some(token));
        }
        let input = self.input;
        let pos = &mut self.pos;
        loop {
            skip_whitespace_and_comments(input, pos);
            let Some(&b) = input.get(*pos) else {
                return Ok(None);
            };
            let token = match b {
                b'(' => Token::Operand(Object::LiteralString(lex_literal_string(input, pos)?)),
                b'<' if input.get(*pos + 1) == Some(&b'<') => {
                    Token::Operand(Object::Dict(lex_dictionary(input, pos)?))
                }
                b'<' => Token::Operand(Object::HexString(lex_hex_string(input, pos)?)),
                b'[' => Token::Operand(Object::Array(lex_array(input, pos)?)),
                b'/' => Token::Operand(Object::Name(lex_name(input, pos))),
                b'0'..=b'9' | b'+' | b'-' | b'.' => Token::Operand(lex_number(input, pos)),
                _ if is_regular(b) => {
                    let run = lex_keyword(input, pos);
                    match keyword_object(run) {
                        Some(obj) => Token::Operand(obj),
                        None => keyword_tokens(input, pos, &mut self.pending, run)?,
                    }
                }
                _ => {
                    // stray delimiter or non-printable byte
                    *pos += 1;
                    continue;
                }
            };
            return Ok(Some(token));
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, InterpretError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokens for an operator keyword run. Returns the first one and queues
/// the rest.
fn keyword_tokens(
    input: &[u8],
    pos: &mut usize,
    pending: &mut VecDeque<Token>,
    run: &[u8],
) -> Result<Token, InterpretError> {
    let unknown = || Token::Unknown(String::from_utf8_lossy(run).into_owned());
    let Some(ops) = operators::split_run(run) else {
        return Ok(unknown());
    };
    let mut tokens = Vec::with_capacity(ops.len());
    for spec in ops {
        if spec.op == Op::BeginInlineImage {
            tokens.push(Token::InlineImage(lex_inline_image(input, pos)?));
            // anything glued after BI belongs to the image dictionary
            break;
        }
        tokens.push(Token::Operator(spec));
    }
    let mut tokens = tokens.into_iter();
    let first = tokens.next();
    pending.extend(tokens);
    Ok(first.unwrap_or_else(unknown))
}

/// Lex a whole content stream.
///
/// # Errors
///
/// Returns [`InterpretError::Lex`] for an unterminated string, array,
/// dictionary or inline image.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, InterpretError> {
    Lexer::new(input).collect()
}

fn lex_error(offset: usize, message: &str) -> InterpretError {
    InterpretError::Lex {
        offset,
        message: message.to_string(),
    }
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

pub(crate) fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Printable, neither whitespace nor delimiter.
fn is_regular(b: u8) -> bool {
    (0x21..=0x7E).contains(&b) && !is_delimiter(b)
}

fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while let Some(&b) = input.get(*pos) {
        if is_whitespace(b) {
            *pos += 1;
        } else if b == b'%' {
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Raw bytes of a literal string, escapes left in place.
fn lex_literal_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, InterpretError> {
    let start = *pos;
    *pos += 1;
    let mut depth = 1u32;
    let mut raw = Vec::new();
    while let Some(&b) = input.get(*pos) {
        match b {
            b'\\' => {
                raw.push(b);
                *pos += 1;
                if let Some(&escaped) = input.get(*pos) {
                    raw.push(escaped);
                    *pos += 1;
                }
            }
            b'(' => {
                depth += 1;
                raw.push(b);
                *pos += 1;
            }
            b')' => {
                depth -= 1;
                *pos += 1;
                if depth == 0 {
                    return Ok(raw);
                }
                raw.push(b);
            }
            _ => {
                raw.push(b);
                *pos += 1;
            }
        }
    }
    Err(lex_error(start, "unterminated literal string"))
}

/// Hex digits of a hex string, whitespace dropped and padded to an even count.
fn lex_hex_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, InterpretError> {
    let start = *pos;
    *pos += 1;
    let mut digits = Vec::new();
    while let Some(&b) = input.get(*pos) {
        *pos += 1;
        if b == b'>' {
            if digits.len() % 2 == 1 {
                digits.push(b'0');
            }
            return Ok(digits);
        }
        if b.is_ascii_hexdigit() {
            digits.push(b);
        }
    }
    Err(lex_error(start, "unterminated hex string"))
}

fn lex_name(input: &[u8], pos: &mut usize) -> String {
    *pos += 1;
    let start = *pos;
    while *pos < input.len() && !is_whitespace(input[*pos]) && !is_delimiter(input[*pos]) {
        *pos += 1;
    }
    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            let hex = (raw[i + 1] as char).to_digit(16).zip((raw[i + 2] as char).to_digit(16));
            if let Some((hi, lo)) = hex {
                name.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }
    String::from_utf8_lossy(&name).into_owned()
}

/// Integer or real. A lone sign or dot reads as zero.
fn lex_number(input: &[u8], pos: &mut usize) -> Object {
    let start = *pos;
    if matches!(input.get(*pos), Some(b'+' | b'-')) {
        *pos += 1;
    }
    let mut has_dot = false;
    while let Some(&b) = input.get(*pos) {
        if b == b'.' && !has_dot {
            has_dot = true;
        } else if !b.is_ascii_digit() {
            break;
        }
        *pos += 1;
    }
    let text = std::str::from_utf8(&input[start..*pos]).unwrap_or("0");
    if !has_dot {
        if let Ok(i) = text.parse::<i64>() {
            return Object::Integer(i);
        }
    }
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return if has_dot { Object::Real(0.0) } else { Object::Integer(0) };
    }
    // forms like "5." and "-.5" parse fine; overflowing integers become reals
    let normalized = if text.ends_with('.') {
        format!("{text}0")
    } else {
        text.to_string()
    };
    Object::Real(normalized.parse().unwrap_or(0.0))
}

fn lex_keyword<'i>(input: &'i [u8], pos: &mut usize) -> &'i [u8] {
    let start = *pos;
    while *pos < input.len() && is_regular(input[*pos]) {
        *pos += 1;
    }
    &input[start..*pos]
}

fn keyword_object(run: &[u8]) -> Option<Object> {
    match run {
        b"true" => Some(Object::Bool(true)),
        b"false" => Some(Object::Bool(false)),
        b"null" => Some(Object::Null),
        _ => None,
    }
}

/// One value inside an array or dictionary.
fn lex_value(input: &[u8], pos: &mut usize) -> Result<Option<Object>, InterpretError> {
    let b = input[*pos];
    let value = match b {
        b'(' => Object::LiteralString(lex_literal_string(input, pos)?),
        b'<' if input.get(*pos + 1) == Some(&b'<') => Object::Dict(lex_dictionary(input, pos)?),
        b'<' => Object::HexString(lex_hex_string(input, pos)?),
        b'[' => Object::Array(lex_array(input, pos)?),
        b'/' => Object::Name(lex_name(input, pos)),
        b'0'..=b'9' | b'+' | b'-' | b'.' => lex_number(input, pos),
        _ if is_regular(b) => {
            let run = lex_keyword(input, pos);
            match keyword_object(run) {
                Some(obj) => obj,
                // operators have no meaning inside composite objects
                None => Object::Name(String::from_utf8_lossy(run).into_owned()),
            }
        }
        _ => {
            *pos += 1;
            return Ok(None);
        }
    };
    Ok(Some(value))
}

fn lex_array(input: &[u8], pos: &mut usize) -> Result<Vec<Object>, InterpretError> {
    let start = *pos;
    *pos += 1;
    let mut elements = Vec::new();
    loop {
        skip_whitespace_and_comments(input, pos);
        match input.get(*pos) {
            None => return Err(lex_error(start, "unterminated array")),
            Some(b']') => {
                *pos += 1;
                return Ok(elements);
            }
            Some(_) => {
                if let Some(value) = lex_value(input, pos)? {
                    elements.push(value);
                }
            }
        }
    }
}

fn lex_dictionary(input: &[u8], pos: &mut usize) -> Result<Dictionary, InterpretError> {
    let start = *pos;
    *pos += 2;
    let mut dict = Dictionary::new();
    loop {
        skip_whitespace_and_comments(input, pos);
        match input.get(*pos) {
            None => return Err(lex_error(start, "unterminated dictionary")),
            Some(b'>') if input.get(*pos + 1) == Some(&b'>') => {
                *pos += 2;
                return Ok(dict);
            }
            Some(b'/') => {
                let key = lex_name(input, pos);
                skip_whitespace_and_comments(input, pos);
                if *pos >= input.len() {
                    return Err(lex_error(start, "unterminated dictionary"));
                }
                if let Some(value) = lex_value(input, pos)? {
                    dict.insert(key, value);
                }
            }
            Some(_) => {
                // keys must be names; drop anything else
                lex_value(input, pos)?;
            }
        }
    }
}

/// `BI` has been consumed: read the abbreviated dictionary up to `ID`, then
/// the data up to `EI`.
fn lex_inline_image(input: &[u8], pos: &mut usize) -> Result<InlineImage, InterpretError> {
    let start = *pos;
    let mut dict = Dictionary::new();
    loop {
        skip_whitespace_and_comments(input, pos);
        let Some(&b) = input.get(*pos) else {
            return Err(lex_error(start, "inline image without ID"));
        };
        if input[*pos..].starts_with(b"ID")
            && input.get(*pos + 2).is_none_or(|&c| is_whitespace(c))
        {
            *pos += 2;
            // exactly one whitespace byte separates ID from the data
            if input.get(*pos).is_some_and(|&c| is_whitespace(c)) {
                *pos += 1;
            }
            break;
        }
        if b != b'/' {
            lex_value(input, pos)?;
            continue;
        }
        let key = expand_image_key(&lex_name(input, pos));
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(lex_error(start, "inline image without ID"));
        }
        if let Some(value) = lex_value(input, pos)? {
            dict.insert(key, expand_image_value(value));
        }
    }

    let data_start = *pos;
    let declared_len = dict.get("Length").and_then(|l| l.as_i64().ok());
    if let Some(len) = declared_len {
        let end = data_start.saturating_add(len.max(0) as usize);
        if end <= input.len() {
            let mut probe = end;
            skip_whitespace_and_comments(input, &mut probe);
            if input[probe..].starts_with(b"EI") {
                *pos = probe + 2;
                return Ok(InlineImage {
                    dict,
                    data: input[data_start..end].to_vec(),
                });
            }
        }
    }

    while *pos + 2 <= input.len() {
        let at_boundary = *pos == data_start || is_whitespace(input[*pos - 1]);
        let followed = input
            .get(*pos + 2)
            .is_none_or(|&c| is_whitespace(c) || is_delimiter(c));
        if at_boundary && followed && input[*pos..].starts_with(b"EI") {
            let mut end = *pos;
            if end > data_start && is_whitespace(input[end - 1]) {
                end -= 1;
            }
            let data = input[data_start..end].to_vec();
            *pos += 2;
            return Ok(InlineImage { dict, data });
        }
        *pos += 1;
    }
    Err(lex_error(start, "inline image without EI"))
}

fn expand_image_key(key: &str) -> String {
    match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        "L" => "Length",
        "W" => "Width",
        other => other,
    }
    .to_string()
}

fn expand_image_name(name: &str) -> &str {
    match name {
        "G" => "DeviceGray",
        "RGB" => "DeviceRGB",
        "CMYK" => "DeviceCMYK",
        "I" => "Indexed",
        "AHx" => "ASCIIHexDecode",
        "A85" => "ASCII85Decode",
        "LZW" => "LZWDecode",
        "Fl" => "FlateDecode",
        "RL" => "RunLengthDecode",
        "CCF" => "CCITTFaxDecode",
        "DCT" => "DCTDecode",
        other => other,
    }
}

fn expand_image_value(value: Object) -> Object {
    match value {
        Object::Name(n) => Object::Name(expand_image_name(&n).to_string()),
        Object::Array(items) => Object::Array(items.into_iter().map(expand_image_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        tokenize(input.as_bytes()).unwrap()
    }

    fn op(token: &Token) -> Option<Op> {
        match token {
            Token::Operator(spec) => Some(spec.op),
            _ => None,
        }
    }

    fn operand(token: &Token) -> &Object {
        match token {
            Token::Operand(obj) => obj,
            other => panic!("expected operand, got {other:?}"),
        }
    }

    #[test]
    fn numbers() {
        let tokens = lex("42 -7 3.14 .5 -.25 5. +3");
        let values: Vec<&Object> = tokens.iter().map(operand).collect();
        assert_eq!(
            values,
            vec![
                &Object::Integer(42),
                &Object::Integer(-7),
                &Object::Real(3.14),
                &Object::Real(0.5),
                &Object::Real(-0.25),
                &Object::Real(5.0),
                &Object::Integer(3),
            ]
        );
    }

    #[test]
    fn lone_sign_reads_as_zero() {
        assert_eq!(lex("-"), vec![Token::Operand(Object::Integer(0))]);
        assert_eq!(lex("."), vec![Token::Operand(Object::Real(0.0))]);
    }

    #[test]
    fn names() {
        assert_eq!(lex("/F1"), vec![Token::Operand(Object::name("F1"))]);
        assert_eq!(lex("/A#20B"), vec![Token::Operand(Object::name("A B"))]);
        assert_eq!(
            lex("/a/b"),
            vec![Token::Operand(Object::name("a")), Token::Operand(Object::name("b"))]
        );
    }

    #[test]
    fn literal_string_keeps_raw_escapes() {
        let tokens = lex(r"(a\)b(c)d)");
        assert_eq!(tokens, vec![Token::Operand(Object::LiteralString(br"a\)b(c)d".to_vec()))]);
        assert_eq!(operand(&tokens[0]).string_bytes().unwrap(), b"a)b(c)d");
    }

    #[test]
    fn hex_string_normalized() {
        assert_eq!(lex("<48 65 6c>"), vec![Token::Operand(Object::HexString(b"48656c".to_vec()))]);
        assert_eq!(lex("<ABC>"), vec![Token::Operand(Object::HexString(b"ABC0".to_vec()))]);
    }

    #[test]
    fn array_and_dictionary() {
        let tokens = lex("[(AB) -100 (CD)] << /MCID 3 /Nested << /X [1 2] >> >>");
        assert_eq!(
            operand(&tokens[0]),
            &Object::Array(vec![
                Object::LiteralString(b"AB".to_vec()),
                Object::Integer(-100),
                Object::LiteralString(b"CD".to_vec()),
            ])
        );
        let dict = operand(&tokens[1]).as_dict().unwrap();
        assert_eq!(dict.get_f64("MCID"), Some(3.0));
        let nested = dict.get("Nested").unwrap();
        assert_eq!(nested.get("X").unwrap().as_numbers().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn keywords_true_false_null() {
        assert_eq!(
            lex("true false null"),
            vec![
                Token::Operand(Object::Bool(true)),
                Token::Operand(Object::Bool(false)),
                Token::Operand(Object::Null),
            ]
        );
    }

    #[test]
    fn operators_longest_match() {
        let tokens = lex("BT BDC B* B T* TJ Tj sh d0");
        let ops: Vec<Option<Op>> = tokens.iter().map(op).collect();
        assert_eq!(
            ops,
            vec![
                Some(Op::BeginText),
                Some(Op::BeginMarkedContentProperties),
                Some(Op::FillStrokeEvenOdd),
                Some(Op::FillStroke),
                Some(Op::NextLine),
                Some(Op::ShowTextArray),
                Some(Op::ShowText),
                Some(Op::Shading),
                Some(Op::GlyphWidth),
            ]
        );
    }

    #[test]
    fn quote_operators() {
        let tokens = lex("(a) ' 1 2 (b) \"");
        assert_eq!(op(&tokens[1]), Some(Op::NextLineShowText));
        assert_eq!(op(&tokens[5]), Some(Op::SpacingNextLineShowText));
    }

    #[test]
    fn glued_operators_are_split() {
        let tokens = lex("ETQ");
        assert_eq!(tokens.iter().map(op).collect::<Vec<_>>(), vec![Some(Op::EndText), Some(Op::Restore)]);
    }

    #[test]
    fn unknown_keyword_is_one_token() {
        assert_eq!(lex("unknown_op"), vec![Token::Unknown("unknown_op".into())]);
        assert_eq!(lex("foo"), vec![Token::Unknown("foo".into())]);
    }

    #[test]
    fn operand_followed_by_operator_without_space() {
        let tokens = lex("1 0 0 1 10 20 cm(x)Tj");
        assert_eq!(op(&tokens[6]), Some(Op::Concat));
        assert_eq!(op(&tokens[8]), Some(Op::ShowText));
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = lex("q % save\nQ");
        assert_eq!(tokens.iter().map(op).collect::<Vec<_>>(), vec![Some(Op::Save), Some(Op::Restore)]);
    }

    #[test]
    fn stray_bytes_are_skipped() {
        let tokens = lex(") q } \u{7f} Q >");
        assert_eq!(tokens.iter().map(op).collect::<Vec<_>>(), vec![Some(Op::Save), Some(Op::Restore)]);
    }

    #[test]
    fn unterminated_literal_string_is_fatal() {
        let err = tokenize(b"BT (abc").unwrap_err();
        assert!(matches!(err, InterpretError::Lex { offset: 3, .. }));
    }

    #[test]
    fn unterminated_dictionary_is_fatal() {
        assert!(matches!(tokenize(b"<< /A 1"), Err(InterpretError::Lex { .. })));
        assert!(matches!(tokenize(b"[1 2"), Err(InterpretError::Lex { .. })));
        assert!(matches!(tokenize(b"<41"), Err(InterpretError::Lex { .. })));
    }

    #[test]
    fn lexer_stops_after_error() {
        let mut lexer = Lexer::new(b"q (open");
        assert!(matches!(lexer.next(), Some(Ok(Token::Operator(_)))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn inline_image() {
        let tokens = lex("q BI /W 2 /H 1 /CS /G /BPC 8 /F /AHx ID \x01\x02 EI Q");
        assert_eq!(tokens.len(), 3);
        let Token::InlineImage(image) = &tokens[1] else {
            panic!("expected inline image, got {:?}", tokens[1]);
        };
        assert_eq!(image.dict.get_f64("Width"), Some(2.0));
        assert_eq!(image.dict.get_f64("Height"), Some(1.0));
        assert_eq!(image.dict.get_name("ColorSpace"), Some("DeviceGray"));
        assert_eq!(image.dict.get_name("Filter"), Some("ASCIIHexDecode"));
        assert_eq!(image.data, vec![0x01, 0x02]);
        assert_eq!(op(&tokens[2]), Some(Op::Restore));
    }

    #[test]
    fn inline_image_with_length_may_contain_ei() {
        let tokens = lex("BI /W 4 /H 1 /L 4 ID a EI EI Q");
        let Token::InlineImage(image) = &tokens[0] else {
            panic!("expected inline image");
        };
        assert_eq!(image.data, b"a EI");
        assert_eq!(op(&tokens[1]), Some(Op::Restore));
    }

    #[test]
    fn inline_image_without_end_is_fatal() {
        assert!(tokenize(b"BI /W 1 ID abc").is_err());
    }
}
