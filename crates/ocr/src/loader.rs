use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use pdfium_render::prelude::*;
use thiserror::Error;

/// Rendering resolution for PDF pages — matches the resolution the labeling
/// model's OCR inputs were produced at.
pub const RENDER_DPI: u32 = 300;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Guard against absurd page dimensions blowing up memory.
const MAX_DIMENSION_PX: u32 = 4096;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode document: {0}")]
    Unreadable(String),
    #[error("Document has no pages")]
    EmptyDocument,
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        LoadError::Unreadable(e.to_string())
    }
}

/// A single document page as an RGB raster. Consumed once by the OCR
/// extractor and not retained afterward.
#[derive(Debug)]
pub struct PageImage {
    rgb: RgbImage,
}

impl PageImage {
    pub fn new(rgb: RgbImage) -> Self {
        Self { rgb }
    }

    /// Convert any decoded raster to RGB, discarding alpha/palette.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        Self { rgb: img.to_rgb8() }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// PNG-encode for OCR engines that take encoded bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(self.rgb.clone())
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Seam over the PDF rasterizer so the loader is testable without the
/// PDFium binary.
pub trait PdfPageRenderer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, LoadError>;

    /// Render one page (0-based) to an RGB raster at the given DPI.
    fn render_page(&self, pdf_bytes: &[u8], page_index: usize, dpi: u32)
        -> Result<PageImage, LoadError>;
}

/// Turns an input path (PDF or raster image) into a single RGB page.
///
/// Pure, synchronous, single-attempt: any failure is fatal to the pipeline
/// invocation and propagates to the caller.
pub struct DocumentLoader {
    renderer: Box<dyn PdfPageRenderer>,
    dpi: u32,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::with_renderer(Box::new(PdfiumRenderer))
    }

    pub fn with_renderer(renderer: Box<dyn PdfPageRenderer>) -> Self {
        Self { renderer, dpi: RENDER_DPI }
    }

    /// Load the document's first page as an RGB raster.
    ///
    /// PDF inputs (by extension) render page 0 at the configured DPI and fail
    /// with [`LoadError::EmptyDocument`] when the document has zero pages;
    /// everything else is opened as a raster image and converted to RGB.
    pub fn load_first_page(&self, path: &Path) -> Result<PageImage, LoadError> {
        let bytes = std::fs::read(path)?;
        if has_pdf_extension(path) {
            if self.renderer.page_count(&bytes)? == 0 {
                return Err(LoadError::EmptyDocument);
            }
            let page = self.renderer.render_page(&bytes, 0, self.dpi)?;
            tracing::debug!(
                width = page.width(),
                height = page.height(),
                dpi = self.dpi,
                "rendered first PDF page"
            );
            Ok(page)
        } else {
            let img = image::load_from_memory(&bytes)?;
            Ok(PageImage::from_dynamic(img))
        }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

// ── PDFium renderer ───────────────────────────────────────────────────────────

/// Renders PDF pages via the PDFium dynamic library.
///
/// Stateless: the upstream `Pdfium` handle is `!Send`, so each call binds the
/// library anew — the OS caches `dlopen`, repeat loads are near-free.
pub struct PdfiumRenderer;

fn bind_pdfium() -> Result<Pdfium, LoadError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            LoadError::Unreadable(format!("failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }
    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        LoadError::Unreadable(format!(
            "PDFium library not found; set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Pixel dimensions for a page at the requested DPI, capped to
/// `MAX_DIMENSION_PX` with aspect ratio preserved.
fn render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, LoadError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| LoadError::Unreadable(format!("failed to load PDF: {e}")))?;
        Ok(document.pages().len() as usize)
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<PageImage, LoadError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| LoadError::Unreadable(format!("failed to load PDF: {e}")))?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(LoadError::EmptyDocument);
        }

        let index = u16::try_from(page_index)
            .map_err(|_| LoadError::Unreadable(format!("page index {page_index} out of range")))?;
        let page = pages.get(index).map_err(|_| {
            LoadError::Unreadable(format!(
                "page {page_index} out of range (document has {} pages)",
                pages.len()
            ))
        })?;

        let (target_w, target_h) =
            render_dimensions(page.width().value, page.height().value, dpi);
        if target_w == MAX_DIMENSION_PX || target_h == MAX_DIMENSION_PX {
            tracing::warn!(
                width = target_w,
                height = target_h,
                "page dimensions capped to {MAX_DIMENSION_PX}px"
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| LoadError::Unreadable(format!("PDF rendering failed: {e}")))?;

        Ok(PageImage::from_dynamic(bitmap.as_image()))
    }
}

// ── Mock renderer (always available, used for tests) ──────────────────────────

/// Renders a blank page of fixed dimensions for a configured page count,
/// ignoring the PDF bytes entirely.
pub struct MockPdfRenderer {
    pages: usize,
    width: u32,
    height: u32,
}

impl MockPdfRenderer {
    pub fn new(pages: usize) -> Self {
        Self { pages, width: 640, height: 480 }
    }

    pub fn with_dimensions(pages: usize, width: u32, height: u32) -> Self {
        Self { pages, width, height }
    }
}

impl PdfPageRenderer for MockPdfRenderer {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, LoadError> {
        Ok(self.pages)
    }

    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_index: usize,
        _dpi: u32,
    ) -> Result<PageImage, LoadError> {
        if page_index >= self.pages {
            return Err(LoadError::EmptyDocument);
        }
        let white = RgbImage::from_pixel(self.width, self.height, image::Rgb([255, 255, 255]));
        Ok(PageImage::new(white))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
