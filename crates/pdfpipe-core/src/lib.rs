//! pdfpipe-core: backend-independent types for the pdfpipe interpreter.
//!
//! Geometry and matrices, the color model, the font interface, path
//! construction with curve flattening, the event model, the event pipe and
//! a library of reference listeners. Nothing here knows how a PDF file is
//! parsed; that lives in `pdfpipe-parse`.

pub mod color;
pub mod error;
pub mod event;
pub mod font;
pub mod geometry;
pub mod listeners;
pub mod path;
pub mod pipe;

pub use color::{Color, ColorSpace, X11Color};
pub use error::{ExtractOptions, ExtractWarning, ExtractWarningCode, PdfError};
pub use event::{
    Event, FillEvent, GlyphBox, ImageEvent, MarkedContent, PageInfo, StrokeEvent, TextEvent,
    TextRenderMode, text_span_geometry,
};
pub use font::{Font, FontKind, Glyph};
pub use geometry::{BBox, LineSegment, Matrix, Point};
pub use listeners::{
    ColorSpectrum, ImageCollector, LocationFilter, PageText, RegexExtractor, SimpleTextExtractor,
    SpectrumBucket, TextExtractorOptions, TextMatch,
};
pub use path::{CURVE_SEGMENTS, Path, PathBuffer, Subpath};
pub use pipe::{EventPipe, EventRecorder, Flow, Listener, WarningCollector};
