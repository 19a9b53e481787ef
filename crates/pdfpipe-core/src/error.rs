//! Error, warning and option types shared by every pdfpipe crate.
//!
//! [`PdfError`] is fatal for the current operation (usually one page),
//! [`ExtractWarning`] records a recoverable issue the interpreter skipped
//! over, and [`ExtractOptions`] bounds and tunes interpretation.

use std::fmt;

/// Fatal error types surfaced to embedders.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The document or one of its objects could not be parsed.
    ParseError(String),
    /// Content stream lexing failed (unterminated string, dictionary or array).
    LexError(String),
    /// An operator received operands of the wrong kind outside a compatibility section.
    OperandError(String),
    /// A font dictionary could not be turned into a font.
    FontError(String),
    /// A requested page does not exist.
    PageOutOfRange { index: usize, count: usize },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "parse error: {msg}"),
            PdfError::LexError(msg) => write!(f, "content stream error: {msg}"),
            PdfError::OperandError(msg) => write!(f, "operand error: {msg}"),
            PdfError::FontError(msg) => write!(f, "font error: {msg}"),
            PdfError::PageOutOfRange { index, count } => {
                write!(f, "page index {index} out of range (document has {count} pages)")
            }
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

/// Machine-readable category of an [`ExtractWarning`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// `Tf` or an ExtGState named a font missing from the resources.
    MissingFont,
    /// `Do`, `gs` or `cs` named a resource missing from the resources.
    MissingResource,
    /// An operator outside the dispatch table was skipped.
    UnsupportedOperator,
    /// An operator was skipped because of missing or mistyped operands.
    MalformedOperand,
    /// `Q` without matching `q`, nested `BT`, or a stray `ET`/`EMC`.
    UnbalancedState,
    /// A configured limit stopped part of the interpretation.
    ResourceLimitReached,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::MissingResource => "MISSING_RESOURCE",
            ExtractWarningCode::UnsupportedOperator => "UNSUPPORTED_OPERATOR",
            ExtractWarningCode::MalformedOperand => "MALFORMED_OPERAND",
            ExtractWarningCode::UnbalancedState => "UNBALANCED_STATE",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered while interpreting a content stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page index (0-based), if known.
    pub page: Option<usize>,
    /// Index of the operator in the content stream.
    pub operator_index: Option<usize>,
    /// Mnemonic of the operator being executed.
    pub operator: Option<String>,
    /// Font resource name associated with the warning.
    pub font_name: Option<String>,
}

impl ExtractWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
            operator: None,
            font_name: None,
        }
    }

    /// Create a warning with [`ExtractWarningCode::Other`].
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self::with_code(ExtractWarningCode::Other(desc.clone()), desc)
    }

    /// Attach the operator position and mnemonic.
    pub fn at_operator(mut self, index: usize, operator: impl Into<String>) -> Self {
        self.operator_index = Some(index);
        self.operator = Some(operator.into());
        self
    }

    /// Attach the page index.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a font resource name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }

    /// Convert this warning into a [`PdfError`] for strict mode.
    pub fn to_error(&self) -> PdfError {
        match self.code {
            ExtractWarningCode::MalformedOperand => PdfError::OperandError(self.to_string()),
            _ => PdfError::Other(self.to_string()),
        }
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        if let (Some(index), Some(op)) = (self.operator_index, &self.operator) {
            write!(f, " [operator #{index} {op}]")?;
        }
        Ok(())
    }
}

/// Options controlling interpretation limits and error behavior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractOptions {
    /// Maximum nesting of Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Stop a page after this many operators (default: no limit).
    pub max_operators_per_page: Option<usize>,
    /// Refuse decoded content streams larger than this (default: 100 MiB).
    pub max_stream_bytes: usize,
    /// Keep warnings for the caller; when false they are only logged (default: true).
    pub collect_warnings: bool,
    /// Escalate operand errors to page-fatal errors (default: false).
    pub strict_mode: bool,
    /// Interpret Form XObjects painted by `Do` (default: true).
    pub expand_form_xobjects: bool,
    /// Emit image events for `BI … ID … EI` inline images (default: true).
    pub emit_inline_images: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_operators_per_page: None,
            max_stream_bytes: 100 * 1024 * 1024,
            collect_warnings: true,
            strict_mode: false,
            expand_form_xobjects: true,
            emit_inline_images: true,
        }
    }
}
