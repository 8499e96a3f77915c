//! Invoice field extraction pipeline.
//!
//! Wires the document loader, OCR backend, and sequence tagger into one
//! extraction flow and projects the result onto the UI field shape.

pub mod aggregate;
pub mod config;
pub mod overrides;
pub mod pipeline;

pub use aggregate::aggregate;
pub use config::{ConfigError, PipelineConfig};
pub use overrides::resolve_override;
pub use pipeline::{InvoicePipeline, PipelineError, PipelineOptions};
