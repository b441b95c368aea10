//! Slide-document handles and the engine that fills them from CV content.

mod engine;
mod memory;
mod pptx;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use engine::{
    blank_layout_index, FieldContent, PopulationEngine, PopulationOutcome, RuleApplication,
    SlideLayout, SlidePlan, BODY_FIELD, DEFAULT_TITLE, JOB_REQUIREMENTS_SECTION,
    PREFERRED_BLANK_LAYOUT, TITLE_FIELD,
};
pub use memory::{InMemoryDeck, InMemoryDeckProvider, MemorySlide, TextRegion};
pub use pptx::{PptxDeckProvider, PptxDocument};

pub const EMU_PER_INCH: i64 = 914_400;

/// Rectangle on a slide, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Region {
    pub const fn from_inches(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left: left * EMU_PER_INCH,
            top: top * EMU_PER_INCH,
            width: width * EMU_PER_INCH,
            height: height * EMU_PER_INCH,
        }
    }

    /// Cuts the region into `parts` horizontal bands of equal height.
    pub fn split_vertically(&self, parts: usize) -> Vec<Region> {
        if parts == 0 {
            return Vec::new();
        }
        let band = self.height / parts as i64;
        (0..parts as i64)
            .map(|index| Region {
                left: self.left,
                top: self.top + index * band,
                width: self.width,
                height: band,
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("presentation package error: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("invalid template structure: {0}")]
    InvalidTemplate(String),
    #[error("template has no slide layouts")]
    NoLayouts,
    #[error("layout index {index} out of range ({count} layouts)")]
    LayoutOutOfRange { index: usize, count: usize },
    #[error("slide index {index} out of range ({count} slides)")]
    SlideOutOfRange { index: usize, count: usize },
    #[error("slide has no title placeholder")]
    MissingTitlePlaceholder,
}

/// Mutable handle over an in-progress presentation.
pub trait SlideDocument: Debug {
    fn slide_count(&self) -> usize;
    fn layout_count(&self) -> usize;
    /// Appends a slide built from the given layout and returns its index.
    fn add_slide(&mut self, layout_index: usize) -> Result<usize, DocumentError>;
    fn has_title_placeholder(&self, slide: usize) -> Result<bool, DocumentError>;
    fn set_title_text(&mut self, slide: usize, text: &str) -> Result<(), DocumentError>;
    fn add_text_region(
        &mut self,
        slide: usize,
        region: Region,
        text: &str,
        word_wrap: bool,
    ) -> Result<(), DocumentError>;
    fn save(&mut self, path: &Path) -> Result<(), DocumentError>;
}

/// Opens a template and hands back a fresh handle for one run.
pub trait DeckProvider: Debug {
    fn open(&self, template: &Path) -> Result<Box<dyn SlideDocument>, DocumentError>;
}

/// Where a finished run wrote its presentation and report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifacts {
    pub presentation: PathBuf,
    pub traceability_report: PathBuf,
}
