use invox_core::{NormalizedBox, OUTSIDE};
use thiserror::Error;

/// Upper bound on model input positions. Fixed by the trained artifact, not
/// configurable.
pub const MAX_SEQ_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("words/boxes mismatch: {words} words vs {boxes} boxes")]
    LengthMismatch { words: usize, boxes: usize },
    #[error("Model file not found: {0}")]
    ModelNotFound(std::path::PathBuf),
    #[error("Model initialization failed: {0}")]
    ModelInit(String),
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
    #[error("Model inference failed: {0}")]
    Inference(String),
}

/// Assigns one label per word from the model's fixed B-/I-/O vocabulary.
///
/// Labels are word-granular — implementations reduce sub-token predictions by
/// taking each word's first sub-token. The result may be shorter than
/// `words` when tokenization overflowed [`MAX_SEQ_LEN`] positions and
/// trailing words were truncated away. An empty word sequence yields an empty
/// label sequence without touching the model.
pub trait SequenceTagger: Send + Sync {
    fn tag(&self, words: &[String], boxes: &[NormalizedBox]) -> Result<Vec<String>, TagError>;
}

/// Preset positional labels padded with `"O"` — lets the pipeline be tested
/// without a model artifact.
pub struct MockTagger {
    labels: Vec<String>,
}

impl MockTagger {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { labels: labels.into_iter().map(Into::into).collect() }
    }

    /// Tags every word `"O"` — a model that recognizes nothing.
    pub fn all_outside() -> Self {
        Self { labels: Vec::new() }
    }
}

impl SequenceTagger for MockTagger {
    fn tag(&self, words: &[String], boxes: &[NormalizedBox]) -> Result<Vec<String>, TagError> {
        if words.len() != boxes.len() {
            return Err(TagError::LengthMismatch { words: words.len(), boxes: boxes.len() });
        }
        Ok((0..words.len())
            .map(|i| self.labels.get(i).cloned().unwrap_or_else(|| OUTSIDE.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> (Vec<String>, Vec<NormalizedBox>) {
        let w: Vec<String> = texts.iter().map(|s| s.to_string()).collect();
        let b = vec![NormalizedBox::ZERO; w.len()];
        (w, b)
    }

    #[test]
    fn mock_returns_one_label_per_word() {
        let (w, b) = words(&["ABC", "Technologies", "2025-06-05"]);
        let tagger = MockTagger::new(["B-COMPANY", "I-COMPANY", "B-DATE"]);
        assert_eq!(tagger.tag(&w, &b).unwrap(), vec!["B-COMPANY", "I-COMPANY", "B-DATE"]);
    }

    #[test]
    fn mock_pads_missing_labels_with_outside() {
        let (w, b) = words(&["one", "two", "three"]);
        let tagger = MockTagger::new(["B-TOTAL"]);
        assert_eq!(tagger.tag(&w, &b).unwrap(), vec!["B-TOTAL", "O", "O"]);
    }

    #[test]
    fn mock_empty_input_yields_empty_labels() {
        let tagger = MockTagger::all_outside();
        assert!(tagger.tag(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn mock_rejects_length_mismatch() {
        let (w, _) = words(&["one", "two"]);
        let err = MockTagger::all_outside().tag(&w, &[NormalizedBox::ZERO]).unwrap_err();
        assert!(matches!(err, TagError::LengthMismatch { words: 2, boxes: 1 }));
    }
}
