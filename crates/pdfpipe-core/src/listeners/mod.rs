//! Reference listeners built on the event pipe.

mod images;
mod location;
mod search;
mod spectrum;
mod text;

pub use images::ImageCollector;
pub use location::LocationFilter;
pub use search::{RegexExtractor, TextMatch};
pub use spectrum::{ColorSpectrum, SpectrumBucket};
pub use text::{PageText, SimpleTextExtractor, TextExtractorOptions};
