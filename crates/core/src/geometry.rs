use serde::{Deserialize, Serialize};

/// Both axes of the model's coordinate space span 0–1000.
pub const NORMALIZED_RANGE: u32 = 1000;

/// Axis-aligned rectangle in page pixel coordinates.
/// Invariant: `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBox {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from the `(left, top, width, height)` shape OCR engines report.
    /// Corners saturate at `u32::MAX` so garbage engine output cannot panic.
    pub fn from_origin_size(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            x0: left,
            y0: top,
            x1: left.saturating_add(width),
            y1: top.saturating_add(height),
        }
    }

    /// Rescale into the model's 0–1000 space relative to the page dimensions.
    ///
    /// Each coordinate becomes `coord * 1000 / dimension` with integer
    /// truncation, not rounding — the convention the labeling model was
    /// trained with. `page_width`/`page_height` must be the dimensions of the
    /// page this box was detected on; any other reference miscalibrates every
    /// downstream box.
    pub fn normalize(&self, page_width: u32, page_height: u32) -> NormalizedBox {
        let scale = |coord: u32, dim: u32| -> u32 {
            if dim == 0 {
                return 0;
            }
            (u64::from(coord) * u64::from(NORMALIZED_RANGE) / u64::from(dim)) as u32
        };
        NormalizedBox {
            x0: scale(self.x0, page_width),
            y0: scale(self.y0, page_height),
            x1: scale(self.x1, page_width),
            y1: scale(self.y1, page_height),
        }
    }
}

/// The same rectangle rescaled into `[0,1000] x [0,1000]` integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl NormalizedBox {
    /// Sentinel for padded sequence positions.
    pub const ZERO: NormalizedBox = NormalizedBox { x0: 0, y0: 0, x1: 0, y1: 0 };

    /// Layout as the model tensor expects it: `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [i64; 4] {
        [i64::from(self.x0), i64::from(self.y0), i64::from(self.x1), i64::from(self.y1)]
    }
}
