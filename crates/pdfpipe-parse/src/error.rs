//! Error types for the lexer, the object model and the interpreter.

use pdfpipe_core::PdfError;
use thiserror::Error;

/// Typed failure when reading a value out of an [`Object`](crate::Object).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    /// The object has a different variant than the caller asked for.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Array index past the end.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Dictionary key not present.
    #[error("missing key /{0}")]
    MissingKey(String),
}

/// Error type for content stream interpretation and document access.
#[derive(Debug, Error)]
pub enum InterpretError {
    /// The content stream could not be tokenized; fatal for the page.
    #[error("lex error at byte {offset}: {message}")]
    Lex { offset: usize, message: String },

    /// An operator received missing or mistyped operands.
    #[error("operator {operator}: {message}")]
    Operand { operator: String, message: String },

    /// A typed object access failed.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// A font dictionary could not be turned into a font.
    #[error("font error: {0}")]
    Font(String),

    /// The document backend failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl InterpretError {
    pub(crate) fn operand(operator: &str, message: impl Into<String>) -> Self {
        InterpretError::Operand {
            operator: operator.to_string(),
            message: message.into(),
        }
    }
}

impl From<lopdf::Error> for InterpretError {
    fn from(err: lopdf::Error) -> Self {
        InterpretError::Backend(err.to_string())
    }
}

impl From<InterpretError> for PdfError {
    fn from(err: InterpretError) -> Self {
        match err {
            InterpretError::Lex { .. } => PdfError::LexError(err.to_string()),
            InterpretError::Operand { .. } | InterpretError::Object(_) => {
                PdfError::OperandError(err.to_string())
            }
            InterpretError::Font(msg) => PdfError::FontError(msg),
            InterpretError::Backend(msg) => PdfError::ParseError(msg),
            InterpretError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_error_display() {
        let err = ObjectError::TypeMismatch {
            expected: "name",
            found: "integer",
        };
        assert_eq!(err.to_string(), "expected name, found integer");
        assert_eq!(
            ObjectError::MissingKey("Subtype".into()).to_string(),
            "missing key /Subtype"
        );
    }

    #[test]
    fn lex_error_display() {
        let err = InterpretError::Lex {
            offset: 12,
            message: "unterminated literal string".into(),
        };
        assert_eq!(err.to_string(), "lex error at byte 12: unterminated literal string");
    }

    #[test]
    fn operand_error_converts_to_pdf_error() {
        let err = InterpretError::operand("Tf", "expected name");
        let pdf: PdfError = err.into();
        assert_eq!(
            pdf,
            PdfError::OperandError("operator Tf: expected name".into())
        );
    }

    #[test]
    fn object_error_wraps_transparently() {
        let err: InterpretError = ObjectError::IndexOutOfRange { index: 3, len: 1 }.into();
        assert_eq!(err.to_string(), "index 3 out of range for array of length 1");
        assert!(matches!(PdfError::from(err), PdfError::OperandError(_)));
    }

    #[test]
    fn core_error_round_trips() {
        let err: InterpretError = PdfError::FontError("bad widths".into()).into();
        assert_eq!(PdfError::from(err), PdfError::FontError("bad widths".into()));
    }

    #[test]
    fn backend_error_becomes_parse_error() {
        let pdf: PdfError = InterpretError::Backend("no trailer".into()).into();
        assert!(matches!(pdf, PdfError::ParseError(_)));
    }
}
