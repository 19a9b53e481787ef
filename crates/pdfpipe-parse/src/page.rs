//! The page view the stream processor reads from.

use std::borrow::Cow;
use std::sync::Arc;

use pdfpipe_core::BBox;

use crate::error::InterpretError;
use crate::resources::Resources;

/// Read-only access to one page: its resources and its decoded content.
///
/// Implementations decide how content is stored and decoded; the processor
/// only asks for the concatenated bytes of all content streams.
pub trait PageSource {
    /// `/MediaBox` of the page, if known.
    fn media_box(&self) -> Option<BBox>;

    fn resources(&self) -> &Resources;

    /// Decoded, concatenated bytes of the page's `/Contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be decoded.
    fn content(&self) -> Result<Cow<'_, [u8]>, InterpretError>;
}

/// A page held fully in memory.
///
/// Cheap to clone and `Send + Sync`, so prepared pages can be handed to
/// worker threads.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub media_box: Option<BBox>,
    pub resources: Arc<Resources>,
    pub content: Arc<[u8]>,
}

impl MemoryPage {
    /// A page with the given content and no resources.
    pub fn new(content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            media_box: None,
            resources: Arc::new(Resources::new()),
            content: content.into(),
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    pub fn with_media_box(mut self, media_box: BBox) -> Self {
        self.media_box = Some(media_box);
        self
    }
}

impl PageSource for MemoryPage {
    fn media_box(&self) -> Option<BBox> {
        self.media_box
    }

    fn resources(&self) -> &Resources {
        &self.resources
    }

    fn content(&self) -> Result<Cow<'_, [u8]>, InterpretError> {
        Ok(Cow::Borrowed(&self.content))
    }
}
