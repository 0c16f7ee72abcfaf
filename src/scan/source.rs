//! Page text retrieval.

use std::collections::HashMap;

use crate::entity::{Figure, FigureId};
use crate::error::FetchError;

/// Supplies the reference text for a figure's page.
///
/// The scanner is generic over this trait so tests and offline runs can
/// serve text from memory while production wires in a live fetcher.
pub trait PageTextSource: Send + Sync {
    /// Returns the full text of the page describing `figure`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the page cannot be retrieved. The
    /// scanner logs the failure, skips the figure, and keeps going.
    fn page_text(&self, figure: &Figure) -> Result<String, FetchError>;
}

/// In-memory page source keyed by figure id.
#[derive(Debug, Default, Clone)]
pub struct StaticPageSource {
    pages: HashMap<FigureId, String>,
}

impl StaticPageSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the page text for a figure.
    pub fn insert(&mut self, id: impl Into<FigureId>, text: impl Into<String>) {
        self.pages.insert(id.into(), text.into());
    }

    /// Number of registered pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no pages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageTextSource for StaticPageSource {
    fn page_text(&self, figure: &Figure) -> Result<String, FetchError> {
        self.pages
            .get(&figure.id)
            .cloned()
            .ok_or_else(|| FetchError::Missing {
                locator: figure.source_locator.clone(),
            })
    }
}
