pub mod loader;
pub mod recognizer;

pub use loader::{
    DocumentLoader, LoadError, MockPdfRenderer, PageImage, PdfPageRenderer, PdfiumRenderer,
};
pub use recognizer::{parse_tsv, MockBackend, OcrBackend, OcrError, OcrWord};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractBackend;
