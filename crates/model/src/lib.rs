#[cfg(any(test, feature = "onnx"))]
mod encode;
pub mod tagger;

#[cfg(feature = "onnx")]
mod onnx;

pub use tagger::{MockTagger, SequenceTagger, TagError, MAX_SEQ_LEN};

#[cfg(feature = "onnx")]
pub use onnx::OnnxTagger;
