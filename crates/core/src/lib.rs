pub mod fields;
pub mod geometry;
pub mod labels;

pub use fields::{FieldMap, UiFields};
pub use geometry::{NormalizedBox, PixelBox};
pub use labels::{strip_tag_prefix, LabelTable, OUTSIDE};
