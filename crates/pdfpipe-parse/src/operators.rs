//! The operator dispatch table.
//!
//! One flat record per mnemonic: its arity and the [`Op`] the processor
//! dispatches on. The lexer uses the same table for longest-match operator
//! recognition.

/// Every operator the interpreter knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // graphics state
    Save,
    Restore,
    Concat,
    LineWidth,
    LineCap,
    LineJoin,
    MiterLimit,
    Dash,
    Flatness,
    RenderingIntent,
    ExtGState,
    // path construction
    MoveTo,
    LineTo,
    CurveTo,
    CurveToV,
    CurveToY,
    Rectangle,
    ClosePath,
    // path painting
    Stroke,
    CloseStroke,
    Fill,
    FillEvenOdd,
    FillStroke,
    FillStrokeEvenOdd,
    CloseFillStroke,
    CloseFillStrokeEvenOdd,
    EndPath,
    Clip,
    ClipEvenOdd,
    Shading,
    // color
    StrokeGray,
    FillGray,
    StrokeRgb,
    FillRgb,
    StrokeCmyk,
    FillCmyk,
    StrokeColorSpace,
    FillColorSpace,
    StrokeColor,
    FillColor,
    StrokeColorN,
    FillColorN,
    // text objects and state
    BeginText,
    EndText,
    CharSpacing,
    WordSpacing,
    HorizontalScaling,
    Leading,
    SetFont,
    RenderMode,
    Rise,
    // text positioning
    MoveText,
    MoveTextSetLeading,
    SetTextMatrix,
    NextLine,
    // text showing
    ShowText,
    ShowTextArray,
    NextLineShowText,
    SpacingNextLineShowText,
    // Type3 glyph metrics
    GlyphWidth,
    GlyphWidthBBox,
    // XObjects and inline images
    PaintXObject,
    BeginInlineImage,
    InlineImageData,
    EndInlineImage,
    // marked content
    MarkPoint,
    MarkPointProperties,
    BeginMarkedContent,
    BeginMarkedContentProperties,
    EndMarkedContent,
    // compatibility
    BeginCompatibility,
    EndCompatibility,
}

/// Number of operands an operator pops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// Takes every operand on the stack (`SC`, `sc`, `SCN`, `scn`).
    Variadic,
}

/// One entry of the dispatch table.
#[derive(Debug, PartialEq, Eq)]
pub struct OperatorSpec {
    pub mnemonic: &'static str,
    pub arity: Arity,
    pub op: Op,
}

const fn spec(mnemonic: &'static str, arity: usize, op: Op) -> OperatorSpec {
    OperatorSpec {
        mnemonic,
        arity: Arity::Fixed(arity),
        op,
    }
}

const fn variadic(mnemonic: &'static str, op: Op) -> OperatorSpec {
    OperatorSpec {
        mnemonic,
        arity: Arity::Variadic,
        op,
    }
}

pub static OPERATORS: &[OperatorSpec] = &[
    spec("q", 0, Op::Save),
    spec("Q", 0, Op::Restore),
    spec("cm", 6, Op::Concat),
    spec("w", 1, Op::LineWidth),
    spec("J", 1, Op::LineCap),
    spec("j", 1, Op::LineJoin),
    spec("M", 1, Op::MiterLimit),
    spec("d", 2, Op::Dash),
    spec("i", 1, Op::Flatness),
    spec("ri", 1, Op::RenderingIntent),
    spec("gs", 1, Op::ExtGState),
    spec("m", 2, Op::MoveTo),
    spec("l", 2, Op::LineTo),
    spec("c", 6, Op::CurveTo),
    spec("v", 4, Op::CurveToV),
    spec("y", 4, Op::CurveToY),
    spec("re", 4, Op::Rectangle),
    spec("h", 0, Op::ClosePath),
    spec("S", 0, Op::Stroke),
    spec("s", 0, Op::CloseStroke),
    spec("f", 0, Op::Fill),
    spec("F", 0, Op::Fill),
    spec("f*", 0, Op::FillEvenOdd),
    spec("B", 0, Op::FillStroke),
    spec("B*", 0, Op::FillStrokeEvenOdd),
    spec("b", 0, Op::CloseFillStroke),
    spec("b*", 0, Op::CloseFillStrokeEvenOdd),
    spec("n", 0, Op::EndPath),
    spec("W", 0, Op::Clip),
    spec("W*", 0, Op::ClipEvenOdd),
    spec("sh", 1, Op::Shading),
    spec("G", 1, Op::StrokeGray),
    spec("g", 1, Op::FillGray),
    spec("RG", 3, Op::StrokeRgb),
    spec("rg", 3, Op::FillRgb),
    spec("K", 4, Op::StrokeCmyk),
    spec("k", 4, Op::FillCmyk),
    spec("CS", 1, Op::StrokeColorSpace),
    spec("cs", 1, Op::FillColorSpace),
    variadic("SC", Op::StrokeColor),
    variadic("sc", Op::FillColor),
    variadic("SCN", Op::StrokeColorN),
    variadic("scn", Op::FillColorN),
    spec("BT", 0, Op::BeginText),
    spec("ET", 0, Op::EndText),
    spec("Tc", 1, Op::CharSpacing),
    spec("Tw", 1, Op::WordSpacing),
    spec("Tz", 1, Op::HorizontalScaling),
    spec("TL", 1, Op::Leading),
    spec("Tf", 2, Op::SetFont),
    spec("Tr", 1, Op::RenderMode),
    spec("Ts", 1, Op::Rise),
    spec("Td", 2, Op::MoveText),
    spec("TD", 2, Op::MoveTextSetLeading),
    spec("Tm", 6, Op::SetTextMatrix),
    spec("T*", 0, Op::NextLine),
    spec("Tj", 1, Op::ShowText),
    spec("TJ", 1, Op::ShowTextArray),
    spec("'", 1, Op::NextLineShowText),
    spec("\"", 3, Op::SpacingNextLineShowText),
    spec("d0", 2, Op::GlyphWidth),
    spec("d1", 6, Op::GlyphWidthBBox),
    spec("Do", 1, Op::PaintXObject),
    spec("BI", 0, Op::BeginInlineImage),
    spec("ID", 0, Op::InlineImageData),
    spec("EI", 0, Op::EndInlineImage),
    spec("MP", 1, Op::MarkPoint),
    spec("DP", 2, Op::MarkPointProperties),
    spec("BMC", 1, Op::BeginMarkedContent),
    spec("BDC", 2, Op::BeginMarkedContentProperties),
    spec("EMC", 0, Op::EndMarkedContent),
    spec("BX", 0, Op::BeginCompatibility),
    spec("EX", 0, Op::EndCompatibility),
];

/// Table entry for an exact mnemonic.
pub fn lookup(mnemonic: &[u8]) -> Option<&'static OperatorSpec> {
    OPERATORS.iter().find(|s| s.mnemonic.as_bytes() == mnemonic)
}

/// Longest known mnemonic that `run` starts with.
pub fn longest_prefix(run: &[u8]) -> Option<&'static OperatorSpec> {
    OPERATORS
        .iter()
        .filter(|s| run.starts_with(s.mnemonic.as_bytes()))
        .max_by_key(|s| s.mnemonic.len())
}

/// Split a keyword run into the operators it is a concatenation of, taking
/// the longest match at each step. `None` if any part is not an operator.
pub fn split_run(run: &[u8]) -> Option<Vec<&'static OperatorSpec>> {
    let mut ops = Vec::new();
    let mut rest = run;
    while !rest.is_empty() {
        let spec = longest_prefix(rest)?;
        ops.push(spec);
        rest = &rest[spec.mnemonic.len()..];
    }
    Some(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mnemonics_are_unique() {
        let mut seen = HashSet::new();
        for spec in OPERATORS {
            assert!(seen.insert(spec.mnemonic), "duplicate {}", spec.mnemonic);
        }
    }

    #[test]
    fn exact_lookup() {
        assert_eq!(lookup(b"cm").map(|s| s.op), Some(Op::Concat));
        assert_eq!(lookup(b"cm").map(|s| s.arity), Some(Arity::Fixed(6)));
        assert_eq!(lookup(b"F").map(|s| s.op), Some(Op::Fill));
        assert_eq!(lookup(b"scn").map(|s| s.arity), Some(Arity::Variadic));
        assert!(lookup(b"xyz").is_none());
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(longest_prefix(b"BDC").map(|s| s.op), Some(Op::BeginMarkedContentProperties));
        assert_eq!(longest_prefix(b"B*").map(|s| s.op), Some(Op::FillStrokeEvenOdd));
        assert_eq!(longest_prefix(b"BT").map(|s| s.op), Some(Op::BeginText));
        assert_eq!(longest_prefix(b"T*").map(|s| s.op), Some(Op::NextLine));
        assert_eq!(longest_prefix(b"TJ").map(|s| s.op), Some(Op::ShowTextArray));
        assert_eq!(longest_prefix(b"sh").map(|s| s.op), Some(Op::Shading));
        assert_eq!(longest_prefix(b"d1").map(|s| s.op), Some(Op::GlyphWidthBBox));
    }

    #[test]
    fn split_concatenated_operators() {
        let ops: Vec<Op> = split_run(b"ETQ").unwrap().iter().map(|s| s.op).collect();
        assert_eq!(ops, vec![Op::EndText, Op::Restore]);
        let ops: Vec<Op> = split_run(b"Qq").unwrap().iter().map(|s| s.op).collect();
        assert_eq!(ops, vec![Op::Restore, Op::Save]);
    }

    #[test]
    fn split_rejects_unknown_runs() {
        assert!(split_run(b"foo").is_none());
        assert!(split_run(b"unknown_op").is_none());
    }
}
