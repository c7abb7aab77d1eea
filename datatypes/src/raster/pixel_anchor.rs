use serde::{Deserialize, Serialize};

/// The part of a grid cell a transform's integer grid coordinate maps to.
///
/// `CellCenter` is the OGC coverage convention, `CellCorner` the raster /
/// GDAL convention (the origin sits on the upper-left corner of the first
/// cell). Conversion between the two is a fixed half-cell translation.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum PixelAnchor {
    #[default]
    CellCenter,
    CellCorner,
}

impl PixelAnchor {
    /// The grid-coordinate position of this anchor relative to the cell
    /// center, in cells.
    pub fn offset_from_center(self) -> f64 {
        match self {
            PixelAnchor::CellCenter => 0.0,
            PixelAnchor::CellCorner => -0.5,
        }
    }

    /// The grid-coordinate offset that re-anchors a transform from `self` to
    /// `other`: `T_other(g) = T_self(g + offset)`.
    pub fn offset_to(self, other: PixelAnchor) -> f64 {
        other.offset_from_center() - self.offset_from_center()
    }
}
