use snafu::Snafu;

use crate::spatial_reference::SpatialReference;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Invalid grid bounds: each element in {:?} must be <= the corresponding element in {:?}",
        low,
        high
    ))]
    InvalidGridBounds { low: Vec<isize>, high: Vec<isize> },

    #[snafu(display(
        "Dimension of `{}` does not match: {} ≠ {}",
        argument,
        expected,
        found
    ))]
    DimensionMismatch {
        argument: &'static str,
        expected: usize,
        found: usize,
    },

    #[snafu(display(
        "{:?} is not a valid index in the bounds {:?}, {:?}",
        index,
        min_index,
        max_index,
    ))]
    GridIndexOutOfBounds {
        index: Vec<isize>,
        min_index: Vec<isize>,
        max_index: Vec<isize>,
    },

    #[snafu(display(
        "Axis index {} is out of bounds for a {}-dimensional grid",
        index,
        dimension
    ))]
    GridDimensionOutOfBounds { index: usize, dimension: usize },

    #[snafu(display(
        "The conditions min[i] <= max[i] are not met by min:{:?} max:{:?}",
        min,
        max
    ))]
    InvalidEnvelope { min: Vec<f64>, max: Vec<f64> },

    #[snafu(display("The grid geometry has no grid extent and none can be derived"))]
    UnspecifiedGridExtent,

    #[snafu(display("The grid geometry has no grid-to-world transform"))]
    UnspecifiedTransform,

    #[snafu(display("The grid geometry has no spatial reference"))]
    UnspecifiedSpatialReference,

    #[snafu(display("The derived envelope is undefined on every axis"))]
    EmptyEnvelope,

    #[snafu(display("The operation requires an affine transform but the stored one is general"))]
    NonAffineTransform,

    #[snafu(display("The affine transform is singular and cannot be inverted"))]
    NonInvertibleTransform,

    #[snafu(display("Invalid spatial reference string: {}", spatial_reference_string))]
    InvalidSpatialReferenceString { spatial_reference_string: String },

    #[snafu(display("ParseU32: {}", source))]
    ParseU32 { source: std::num::ParseIntError },

    #[snafu(display("No definition known for spatial reference {}", spatial_reference))]
    UnknownSpatialReference { spatial_reference: SpatialReference },

    #[snafu(display(
        "Dimension capacity ≠ data capacity ({} ≠ {})",
        dimension_cap,
        data_cap
    ))]
    DimensionCapacityDoesNotMatchDataCapacity {
        dimension_cap: usize,
        data_cap: usize,
    },

    #[snafu(display("The coverage builder has no raster data to build from"))]
    UnspecifiedRasterData,

    #[snafu(display(
        "Raster shape {:?} does not match the extent spans {:?}",
        raster_shape,
        extent_spans
    ))]
    RasterGeometryMismatch {
        raster_shape: Vec<usize>,
        extent_spans: Vec<usize>,
    },

    #[snafu(display(
        "{} sample dimensions declared but the coverage has {} bands",
        declared,
        bands
    ))]
    SampleDimensionCountMismatch { declared: usize, bands: usize },
}
