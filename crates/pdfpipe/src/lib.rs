//! pdfpipe: interpret PDF page content and publish events to listeners.
//!
//! This is the public API facade. It re-exports the types of
//! `pdfpipe-core` and drives the `pdfpipe-parse` stream processor over the
//! pages of a document.
//!
//! # Architecture
//!
//! - **pdfpipe-core**: geometry, colors, fonts, events, the event pipe and
//!   the reference listeners
//! - **pdfpipe-parse**: content stream lexer, stream processor and the
//!   lopdf page loader
//! - **pdfpipe** (this crate): [`Document`], which ties both together
//!
//! # Example
//!
//! ```ignore
//! use pdfpipe::{Document, EventPipe, SimpleTextExtractor};
//!
//! let doc = Document::open(&bytes, None)?;
//! let mut text = SimpleTextExtractor::new();
//! let mut pipe = EventPipe::new().with(&mut text);
//! doc.process_all(&mut pipe)?;
//! drop(pipe);
//! println!("{}", text.text());
//! ```

pub use pdfpipe_core;
pub use pdfpipe_core::*;
pub use pdfpipe_parse;
pub use pdfpipe_parse::{
    InterpretError, LopdfDocument, MemoryPage, PageSource, Resources, StreamProcessor,
};

use tracing::debug;

/// An opened PDF document.
#[derive(Debug)]
pub struct Document {
    inner: LopdfDocument,
    options: ExtractOptions,
}

impl Document {
    /// Open a PDF document from bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Interpretation options. Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ParseError`] if the bytes are not a readable PDF.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let inner = LopdfDocument::open(bytes)?;
        Ok(Self {
            inner,
            options: options.unwrap_or_default(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Load a page (0-based) without interpreting it.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] for a bad index, or a parse
    /// error if the page cannot be loaded.
    pub fn page(&self, index: usize) -> Result<MemoryPage, PdfError> {
        Ok(self.inner.page(index)?)
    }

    /// Interpret one page, publishing its events to `pipe`.
    ///
    /// Returns the warnings raised on the page.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the page cannot be loaded or its content
    /// stream is fatally malformed.
    pub fn process_page(
        &self,
        index: usize,
        pipe: &mut EventPipe<'_>,
    ) -> Result<Vec<ExtractWarning>, PdfError> {
        let page = self.page(index)?;
        let mut processor = StreamProcessor::new(self.options.clone());
        Ok(processor.process_page(&page, index, pipe)?)
    }

    /// Interpret every page in order through one pipe.
    ///
    /// # Errors
    ///
    /// Stops at the first page that fails.
    pub fn process_all(&self, pipe: &mut EventPipe<'_>) -> Result<Vec<ExtractWarning>, PdfError> {
        let mut processor = StreamProcessor::new(self.options.clone());
        let mut warnings = Vec::new();
        for index in 0..self.page_count() {
            let page = self.page(index)?;
            warnings.extend(processor.process_page(&page, index, pipe)?);
        }
        debug!(pages = self.page_count(), warnings = warnings.len(), "processed document");
        Ok(warnings)
    }

    /// Reading-order text of one page.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the page cannot be interpreted.
    pub fn extract_text(&self, index: usize) -> Result<String, PdfError> {
        let page = self.page(index)?;
        page_text(&page, index, &self.options)
    }

    /// Search one page for a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Other`] for an invalid pattern, or a
    /// [`PdfError`] if the page cannot be interpreted.
    pub fn find(&self, index: usize, pattern: &str) -> Result<Vec<TextMatch>, PdfError> {
        let mut search =
            RegexExtractor::new(pattern).map_err(|e| PdfError::Other(format!("invalid pattern: {e}")))?;
        {
            let mut pipe = EventPipe::new().with(&mut search);
            self.process_page(index, &mut pipe)?;
        }
        Ok(search.matches().to_vec())
    }

    /// Text of every page, interpreted concurrently using rayon.
    ///
    /// Pages are loaded sequentially, then each worker runs its own
    /// [`StreamProcessor`]. The returned Vec is ordered by page index.
    #[cfg(feature = "parallel")]
    pub fn extract_text_parallel(&self) -> Vec<Result<String, PdfError>> {
        use rayon::prelude::*;

        let pages: Vec<Result<MemoryPage, PdfError>> =
            (0..self.page_count()).map(|i| self.page(i)).collect();
        pages
            .into_par_iter()
            .enumerate()
            .map(|(index, page)| page_text(&page?, index, &self.options))
            .collect()
    }
}

fn page_text(page: &MemoryPage, index: usize, options: &ExtractOptions) -> Result<String, PdfError> {
    let mut text = SimpleTextExtractor::new();
    {
        let mut pipe = EventPipe::new().with(&mut text);
        StreamProcessor::new(options.clone()).process_page(page, index, &mut pipe)?;
    }
    Ok(text.page_text(index).unwrap_or_default().to_string())
}
