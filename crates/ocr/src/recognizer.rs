use invox_core::PixelBox;
use thiserror::Error;

use crate::loader::PageImage;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image encode error: {0}")]
    ImageEncode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// A recognized word: non-empty text, page-pixel box, confidence in (0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub bbox: PixelBox,
    pub confidence: f32,
}

/// Abstraction over an OCR engine that reports word-level boxes.
///
/// Implementations return words in the engine's detection order
/// (top-to-bottom, left-to-right) — that order is the basis for the final
/// field-string concatenation and must be preserved. Zero-confidence and
/// whitespace-only hits are dropped before a word is emitted; nothing else
/// is filtered.
pub trait OcrBackend: Send + Sync {
    fn extract_words(&self, page: &PageImage) -> Result<Vec<OcrWord>, OcrError>;
}

// ── TSV parsing (shared by the Tesseract backend, always compiled) ────────────

/// Parse Tesseract word-level TSV output.
///
/// Word rows have level 5; columns are
/// `level, page, block, par, line, word, left, top, width, height, conf, text`.
/// Rows with empty trimmed text or confidence <= 0 are dropped; row order is
/// preserved. Confidence is rescaled from Tesseract's 0–100 to 0–1.
pub fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();
    for line in tsv.lines() {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let Some(geometry) = parse_geometry(&cols[6..10]) else {
            continue;
        };
        let (left, top, width, height) = geometry;
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if conf <= 0.0 || text.is_empty() {
            continue;
        }
        words.push(OcrWord {
            text: text.to_string(),
            bbox: PixelBox::from_origin_size(left, top, width, height),
            confidence: conf / 100.0,
        });
    }
    words
}

fn parse_geometry(cols: &[&str]) -> Option<(u32, u32, u32, u32)> {
    let left = cols[0].parse().ok()?;
    let top = cols[1].parse().ok()?;
    let width = cols[2].parse().ok()?;
    let height = cols[3].parse().ok()?;
    Some((left, top, width, height))
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a preset word list, ignoring the page entirely.
pub struct MockBackend {
    words: Vec<OcrWord>,
}

impl MockBackend {
    pub fn new(words: Vec<OcrWord>) -> Self {
        Self { words }
    }

    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    /// Shorthand for tests: words with `(left, top, width, height)` boxes and
    /// full confidence.
    pub fn from_laid_out(entries: &[(&str, (u32, u32, u32, u32))]) -> Self {
        let words = entries
            .iter()
            .map(|(text, (l, t, w, h))| OcrWord {
                text: text.to_string(),
                bbox: PixelBox::from_origin_size(*l, *t, *w, *h),
                confidence: 1.0,
            })
            .collect();
        Self { words }
    }
}

impl OcrBackend for MockBackend {
    fn extract_words(&self, _page: &PageImage) -> Result<Vec<OcrWord>, OcrError> {
        Ok(self.words.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{parse_tsv, OcrBackend, OcrError, OcrWord};
    use crate::loader::PageImage;
    use leptess::LepTess;

    pub struct TesseractBackend {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractBackend {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractBackend {
        fn extract_words(&self, page: &PageImage) -> Result<Vec<OcrWord>, OcrError> {
            let png = page
                .to_png_bytes()
                .map_err(|e| OcrError::ImageEncode(e.to_string()))?;
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::ImageEncode(e.to_string()))?;
            let tsv = lt
                .get_tsv_text(0)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(parse_tsv(&tsv))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const SAMPLE_TSV: &str = "\
level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t\n\
4\t1\t1\t1\t1\t0\t40\t50\t300\t24\t-1\t\n\
5\t1\t1\t1\t1\t1\t40\t50\t90\t24\t96.5\tInvoice\n\
5\t1\t1\t1\t1\t2\t140\t50\t60\t24\t91.0\tNo.\n\
5\t1\t1\t1\t1\t3\t210\t50\t80\t24\t0\tghost\n\
5\t1\t1\t1\t1\t4\t300\t50\t40\t24\t88.0\t   \n\
5\t1\t1\t1\t2\t1\t40\t90\t120\t24\t79.5\t$495\n";

    fn blank_page() -> PageImage {
        PageImage::new(RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255])))
    }

    #[test]
    fn parse_tsv_keeps_only_confident_words() {
        let words = parse_tsv(SAMPLE_TSV);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Invoice", "No.", "$495"]);
    }

    #[test]
    fn parse_tsv_preserves_detection_order() {
        let words = parse_tsv(SAMPLE_TSV);
        assert_eq!(words[0].text, "Invoice");
        assert_eq!(words[2].text, "$495");
        assert!(words[0].bbox.y0 < words[2].bbox.y0);
    }

    #[test]
    fn parse_tsv_computes_corner_boxes() {
        let words = parse_tsv(SAMPLE_TSV);
        assert_eq!(words[0].bbox, PixelBox::new(40, 50, 130, 74));
    }

    #[test]
    fn parse_tsv_rescales_confidence() {
        let words = parse_tsv(SAMPLE_TSV);
        assert!((words[0].confidence - 0.965).abs() < 1e-6);
        assert!(words.iter().all(|w| w.confidence > 0.0));
    }

    #[test]
    fn parse_tsv_skips_header_and_non_word_rows() {
        // Only level-5 rows survive; the header row's level column is text.
        let words = parse_tsv("level\tx\n1\t2\n");
        assert!(words.is_empty());
    }

    #[test]
    fn parse_tsv_tolerates_malformed_rows() {
        let words = parse_tsv("5\t1\t1\t1\t1\t1\tNaN\t50\t90\t24\t96.5\tword\n5\ttoo\tshort\n");
        assert!(words.is_empty());
    }

    #[test]
    fn parse_tsv_survives_oversized_geometry() {
        let row = format!(
            "5\t1\t1\t1\t1\t1\t{max}\t{max}\t{max}\t{max}\t90.0\tword\n",
            max = u32::MAX
        );
        let words = parse_tsv(&row);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].bbox.x1, u32::MAX);
        assert_eq!(words[0].bbox.y1, u32::MAX);
    }

    #[test]
    fn mock_returns_preset_words() {
        let backend = MockBackend::from_laid_out(&[("Total", (10, 10, 50, 20))]);
        let words = backend.extract_words(&blank_page()).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Total");
        assert_eq!(words[0].bbox, PixelBox::new(10, 10, 60, 30));
    }

    #[test]
    fn mock_empty_yields_no_words() {
        let words = MockBackend::empty().extract_words(&blank_page()).unwrap();
        assert!(words.is_empty());
    }
}
