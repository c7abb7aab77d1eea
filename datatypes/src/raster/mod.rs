mod coverage_builder;
mod data_type;
mod grid;
mod grid_extent;
mod grid_geometry;
mod image_geometry;
mod pixel_anchor;
mod sample_dimension;

pub use self::coverage_builder::{CoverageBuilder, GridCoverage};
pub use self::data_type::{Pixel, RasterDataType, StaticRasterDataType};
pub use self::grid::{Grid, RasterSource};
pub use self::grid_extent::GridExtent;
pub use self::grid_geometry::GridGeometry;
pub use self::image_geometry::ImageGeometry;
pub use self::pixel_anchor::PixelAnchor;
pub use self::sample_dimension::SampleDimension;
