mod axis_alignment;
mod transform;

pub use axis_alignment::{AxisMapping, infer_axis_mapping};
pub use transform::{AffineTransform, ConcatenatedOperation, CoordinateOperation, concatenate, transform_corners};
