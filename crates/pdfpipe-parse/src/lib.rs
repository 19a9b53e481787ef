//! pdfpipe-parse: content stream lexer and stream processor.
//!
//! This crate turns page content into events. The [`Lexer`] tokenizes a
//! content stream, the [`StreamProcessor`] dispatches operators against a
//! graphics state stack and publishes text, image and shape events to a
//! [`pdfpipe_core::EventPipe`]. Pages come from any [`PageSource`]; the
//! [`LopdfDocument`] backend loads them from PDF files.

pub mod cmap;
pub mod encoding;
pub mod error;
pub mod font;
pub mod graphics_state;
pub mod lexer;
pub mod lopdf_backend;
pub mod metrics;
pub mod object;
pub mod operators;
pub mod page;
pub mod processor;
pub mod resources;
pub mod text;

pub use cmap::ToUnicodeCMap;
pub use encoding::{BaseEncoding, Encoding};
pub use error::{InterpretError, ObjectError};
pub use font::{CompositeFont, SimpleFont, default_font, font_from_dict};
pub use graphics_state::{GraphicsStack, GraphicsState, TextState};
pub use lexer::{InlineImage, Lexer, Token, tokenize};
pub use lopdf_backend::LopdfDocument;
pub use object::{Dictionary, ObjRef, Object, Stream};
pub use operators::{Arity, Op, OperatorSpec};
pub use page::{MemoryPage, PageSource};
pub use pdfpipe_core;
pub use processor::StreamProcessor;
pub use resources::{ExtGState, FormXObject, ImageInfo, ImageXObject, Resources, XObject};
