use std::fmt::Debug;
use std::path::Path;

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CvSourceFormat {
    Text,
    Pdf,
    Docx,
    Other(String),
}

impl CvSourceFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "txt" => Self::Text,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Other(extension),
        }
    }
}

/// Text handed back by a CV reader. `format_supported` is false when the
/// text is a stand-in derived from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvSource {
    pub raw_text: String,
    pub format: CvSourceFormat,
    pub format_supported: bool,
}

impl CvSource {
    /// Stands in for a CV that was never read.
    pub fn empty() -> Self {
        Self {
            raw_text: String::new(),
            format: CvSourceFormat::Text,
            format_supported: true,
        }
    }
}

/// Turns a CV file into text. Implementations must not fail on formats they
/// cannot decode; they return a placeholder instead.
pub trait ContentExtractor: Debug {
    fn read(&self, path: &Path) -> Result<CvSource, std::io::Error>;
}

/// Reads plain-text CVs from disk and substitutes placeholders for PDF, DOCX,
/// and anything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileContentExtractor;

impl ContentExtractor for FileContentExtractor {
    fn read(&self, path: &Path) -> Result<CvSource, std::io::Error> {
        let format = CvSourceFormat::from_path(path);
        let name = display_name(path);

        let (raw_text, format_supported) = match &format {
            CvSourceFormat::Text => (std::fs::read_to_string(path)?, true),
            CvSourceFormat::Pdf | CvSourceFormat::Docx => {
                warn!(file = %name, "PDF/DOCX parsing not yet implemented, using file name only");
                (format!("CV from file: {name}"), false)
            }
            CvSourceFormat::Other(extension) => {
                warn!(file = %name, extension = %extension, "unsupported CV format");
                (format!("Unsupported format: {name}"), false)
            }
        };

        let source = CvSource {
            raw_text,
            format,
            format_supported,
        };

        Ok(source)
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
