use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{DeckProvider, DocumentError, Region, SlideDocument};

type SaveSink = Arc<Mutex<Vec<InMemoryDeck>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRegion {
    pub region: Region,
    pub text: String,
    pub word_wrap: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemorySlide {
    pub layout: Option<usize>,
    /// `Some` when the slide carries a title placeholder; holds its text.
    pub title_placeholder: Option<String>,
    pub regions: Vec<TextRegion>,
}

impl MemorySlide {
    pub fn with_title_placeholder() -> Self {
        Self {
            title_placeholder: Some(String::new()),
            ..Self::default()
        }
    }
}

/// Recording document used when no real package should be produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InMemoryDeck {
    pub layouts: usize,
    pub slides: Vec<MemorySlide>,
    pub saved_to: Option<PathBuf>,
    #[serde(skip)]
    sink: Option<SaveSink>,
}

impl InMemoryDeck {
    pub fn with_layouts(layouts: usize) -> Self {
        Self {
            layouts,
            ..Self::default()
        }
    }

    pub fn with_slide(mut self, slide: MemorySlide) -> Self {
        self.slides.push(slide);
        self
    }

    fn slide(&self, index: usize) -> Result<&MemorySlide, DocumentError> {
        self.slides.get(index).ok_or(DocumentError::SlideOutOfRange {
            index,
            count: self.slides.len(),
        })
    }

    fn slide_mut(&mut self, index: usize) -> Result<&mut MemorySlide, DocumentError> {
        let count = self.slides.len();
        self.slides
            .get_mut(index)
            .ok_or(DocumentError::SlideOutOfRange { index, count })
    }
}

impl SlideDocument for InMemoryDeck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn layout_count(&self) -> usize {
        self.layouts
    }

    fn add_slide(&mut self, layout_index: usize) -> Result<usize, DocumentError> {
        if layout_index >= self.layouts {
            return Err(DocumentError::LayoutOutOfRange {
                index: layout_index,
                count: self.layouts,
            });
        }
        self.slides.push(MemorySlide {
            layout: Some(layout_index),
            ..MemorySlide::default()
        });
        Ok(self.slides.len() - 1)
    }

    fn has_title_placeholder(&self, slide: usize) -> Result<bool, DocumentError> {
        Ok(self.slide(slide)?.title_placeholder.is_some())
    }

    fn set_title_text(&mut self, slide: usize, text: &str) -> Result<(), DocumentError> {
        let slide = self.slide_mut(slide)?;
        match slide.title_placeholder.as_mut() {
            Some(title) => {
                *title = text.to_string();
                Ok(())
            }
            None => Err(DocumentError::MissingTitlePlaceholder),
        }
    }

    fn add_text_region(
        &mut self,
        slide: usize,
        region: Region,
        text: &str,
        word_wrap: bool,
    ) -> Result<(), DocumentError> {
        self.slide_mut(slide)?.regions.push(TextRegion {
            region,
            text: text.to_string(),
            word_wrap,
        });
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        self.saved_to = Some(path.to_path_buf());
        if let Some(sink) = &self.sink {
            let mut saved = sink
                .lock()
                .map_err(|_| DocumentError::InvalidTemplate("save sink poisoned".to_string()))?;
            saved.push(self.clone());
        }
        Ok(())
    }
}

/// Hands out copies of a prototype deck and keeps every saved deck so callers
/// can inspect what a run produced.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeckProvider {
    prototype: InMemoryDeck,
    saved: SaveSink,
}

impl InMemoryDeckProvider {
    pub fn new(prototype: InMemoryDeck) -> Self {
        Self {
            prototype,
            saved: Arc::default(),
        }
    }

    pub fn saved(&self) -> Vec<InMemoryDeck> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }
}

impl DeckProvider for InMemoryDeckProvider {
    fn open(&self, _template: &Path) -> Result<Box<dyn SlideDocument>, DocumentError> {
        let mut deck = self.prototype.clone();
        deck.sink = Some(self.saved.clone());
        Ok(Box::new(deck))
    }
}
