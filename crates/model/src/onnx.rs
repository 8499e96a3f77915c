//! ONNX Runtime backend for the sequence tagger.
//!
//! Expects a model directory with three files:
//! - `model.onnx` — the exported token-classification weights
//! - `tokenizer.json` — HuggingFace tokenizer definition
//! - `config.json` — HF-style model config carrying `id2label`
//!
//! Loaded once, read-only afterwards. `ort::Session::run` takes `&mut self`,
//! so inference serializes through a `Mutex` while the trait stays `&self`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array2, Array3};
use ort::session::Session;
use ort::value::TensorRef;
use serde::Deserialize;
use tokenizers::Tokenizer;

use invox_core::{NormalizedBox, OUTSIDE};

use crate::encode::TokenSequence;
use crate::tagger::{SequenceTagger, TagError, MAX_SEQ_LEN};

/// The slice of `config.json` this backend cares about.
#[derive(Debug, Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
    #[serde(default)]
    pad_token_id: Option<i64>,
}

pub struct OnnxTagger {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// Label vocabulary indexed by label id.
    labels: Vec<String>,
    pad_id: i64,
}

impl OnnxTagger {
    pub fn load(model_dir: &Path) -> Result<Self, TagError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let config_path = model_dir.join("config.json");
        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                return Err(TagError::ModelNotFound(path.clone()));
            }
        }

        let session = Session::builder()
            .map_err(|e| TagError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| TagError::ModelInit(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| TagError::ModelInit(format!("ONNX load failed: {e}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TagError::ModelInit(format!("tokenizer load failed: {e}")))?;

        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| TagError::ModelInit(format!("config.json read failed: {e}")))?;
        let config: ModelConfig = serde_json::from_str(&raw)
            .map_err(|e| TagError::ModelInit(format!("config.json parse failed: {e}")))?;
        let labels = label_vocabulary(&config.id2label)?;

        tracing::info!(
            labels = labels.len(),
            "token-classification model loaded from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
            pad_id: config.pad_token_id.unwrap_or(0),
        })
    }

    /// Tokenize the word sequence in pre-tokenized mode and fit it to the
    /// model's fixed input length.
    fn encode(
        &self,
        words: &[String],
        boxes: &[NormalizedBox],
    ) -> Result<TokenSequence, TagError> {
        let encoding = self
            .tokenizer
            .encode(words.to_vec(), true)
            .map_err(|e| TagError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&v| i64::from(v)).collect();
        let type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&v| i64::from(v)).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&v| i64::from(v))
            .collect();
        let word_ids: Vec<Option<usize>> = encoding
            .get_word_ids()
            .iter()
            .map(|w| w.map(|v| v as usize))
            .collect();
        let token_boxes: Vec<[i64; 4]> = word_ids
            .iter()
            .map(|w| match w {
                Some(i) => boxes[*i].to_array(),
                None => NormalizedBox::ZERO.to_array(),
            })
            .collect();

        Ok(TokenSequence {
            input_ids,
            type_ids,
            attention_mask,
            boxes: token_boxes,
            word_ids,
        }
        .fit(MAX_SEQ_LEN, self.pad_id))
    }
}

impl SequenceTagger for OnnxTagger {
    fn tag(&self, words: &[String], boxes: &[NormalizedBox]) -> Result<Vec<String>, TagError> {
        if words.len() != boxes.len() {
            return Err(TagError::LengthMismatch { words: words.len(), boxes: boxes.len() });
        }
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let seq = self.encode(words, boxes)?;
        let len = seq.len();

        let ids = Array2::from_shape_vec((1, len), seq.input_ids.clone())
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let mask = Array2::from_shape_vec((1, len), seq.attention_mask.clone())
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let types = Array2::from_shape_vec((1, len), seq.type_ids.clone())
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let mut flat_boxes = Vec::with_capacity(len * 4);
        for b in &seq.boxes {
            flat_boxes.extend_from_slice(b);
        }
        let bbox = Array3::from_shape_vec((1, len, 4), flat_boxes)
            .map_err(|e| TagError::Inference(e.to_string()))?;

        let ids_tensor = TensorRef::from_array_view(&ids)
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let bbox_tensor = TensorRef::from_array_view(&bbox)
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let mask_tensor = TensorRef::from_array_view(&mask)
            .map_err(|e| TagError::Inference(e.to_string()))?;
        let types_tensor = TensorRef::from_array_view(&types)
            .map_err(|e| TagError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| TagError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "bbox" => bbox_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => types_tensor,
            ])
            .map_err(|e| TagError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| TagError::Inference(format!("logits extraction failed: {e}")))?;
        if shape.len() != 3 || shape[1] as usize != len {
            return Err(TagError::Inference(format!(
                "unexpected logits shape {shape:?}, expected [1, {len}, n_labels]"
            )));
        }
        let n_labels = shape[2] as usize;

        // Word-level reduction: the first sub-token of each word decides its
        // label, later sub-tokens and special/pad positions are skipped.
        let mut word_labels = Vec::new();
        let mut last_word: Option<usize> = None;
        for (pos, word_id) in seq.word_ids.iter().enumerate() {
            let Some(word) = word_id else { continue };
            if last_word == Some(*word) {
                continue;
            }
            last_word = Some(*word);
            let row = &logits[pos * n_labels..(pos + 1) * n_labels];
            let best = argmax(row);
            word_labels.push(
                self.labels
                    .get(best)
                    .cloned()
                    .unwrap_or_else(|| OUTSIDE.to_string()),
            );
        }
        tracing::debug!(words = words.len(), labeled = word_labels.len(), "sequence tagged");
        Ok(word_labels)
    }
}

/// Turn the HF `id2label` map (string ids) into a dense id-indexed table.
fn label_vocabulary(id2label: &HashMap<String, String>) -> Result<Vec<String>, TagError> {
    let mut labels = vec![OUTSIDE.to_string(); id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| TagError::ModelInit(format!("non-numeric label id {id:?}")))?;
        if index >= labels.len() {
            labels.resize(index + 1, OUTSIDE.to_string());
        }
        labels[index] = label.clone();
    }
    Ok(labels)
}

fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in row.iter().enumerate() {
        if *v > row[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_vocabulary_orders_by_id() {
        let map: HashMap<String, String> = [
            ("0", "O"),
            ("1", "B-COMPANY"),
            ("2", "I-COMPANY"),
            ("3", "B-DATE"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let labels = label_vocabulary(&map).unwrap();
        assert_eq!(labels, vec!["O", "B-COMPANY", "I-COMPANY", "B-DATE"]);
    }

    #[test]
    fn label_vocabulary_tolerates_sparse_ids() {
        let map: HashMap<String, String> =
            [("0".to_string(), "O".to_string()), ("4".to_string(), "B-TOTAL".to_string())]
                .into_iter()
                .collect();
        let labels = label_vocabulary(&map).unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[4], "B-TOTAL");
        assert_eq!(labels[2], "O");
    }

    #[test]
    fn label_vocabulary_rejects_garbage_ids() {
        let map: HashMap<String, String> =
            [("zero".to_string(), "O".to_string())].into_iter().collect();
        assert!(matches!(label_vocabulary(&map), Err(TagError::ModelInit(_))));
    }

    #[test]
    fn argmax_picks_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[-1.0]), 0);
    }

    #[test]
    fn missing_model_dir_errors_before_any_runtime_work() {
        let err = OnnxTagger::load(Path::new("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, TagError::ModelNotFound(_)));
    }
}
