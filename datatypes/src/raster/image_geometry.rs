use crate::error;
use crate::operations::{AffineTransform, CoordinateOperation};
use crate::primitives::{Coordinate2D, Envelope};
use crate::raster::{GridExtent, PixelAnchor};
use crate::spatial_reference::SpatialReferenceOption;
use crate::util::Result;
use crate::util::helpers::INTEGER_SNAP_ULPS;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// A lightweight pairing of a 2-D grid extent with an affine grid-to-world
/// transform, for plain raster work where no coordinate reference system is
/// involved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGeometry {
    extent: GridExtent,
    /// always normalized to the `CellCenter` anchor
    transform: AffineTransform,
}

impl ImageGeometry {
    /// Creates a new image geometry
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcover_datatypes::operations::AffineTransform;
    /// use gridcover_datatypes::raster::{GridExtent, ImageGeometry, PixelAnchor};
    ///
    /// let extent = GridExtent::from_shape(&[600, 400]);
    /// let transform = AffineTransform::from_scale_and_translation(
    ///     &[0.2, -0.2],
    ///     &[-60.0, 40.0],
    /// ).unwrap();
    ///
    /// let geometry = ImageGeometry::new(extent, PixelAnchor::CellCorner, transform).unwrap();
    ///
    /// let center = geometry.cell_center(0, 0);
    /// assert!(center.euclidean_distance(&(-59.9, 39.9).into()) < 1e-12);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails unless both the extent and the transform are two-dimensional.
    ///
    pub fn new(extent: GridExtent, anchor: PixelAnchor, transform: AffineTransform) -> Result<Self> {
        ensure!(
            extent.dimension() == 2,
            error::DimensionMismatchSnafu {
                argument: "extent",
                expected: 2_usize,
                found: extent.dimension(),
            }
        );
        ensure!(
            transform.source_dimension() == 2 && transform.target_dimension() == 2,
            error::DimensionMismatchSnafu {
                argument: "transform",
                expected: 2_usize,
                found: transform.source_dimension(),
            }
        );

        let offset = anchor.offset_to(PixelAnchor::CellCenter);
        let transform = transform.pre_translated(&[offset, offset])?;

        Ok(Self { extent, transform })
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// The grid-to-world transform re-anchored to `anchor`.
    pub fn grid_to_world(&self, anchor: PixelAnchor) -> AffineTransform {
        let offset = PixelAnchor::CellCenter.offset_to(anchor);
        if offset == 0.0 {
            return self.transform.clone();
        }
        self.transform
            .pre_translated(&[offset, offset])
            .expect("the transform is validated as 2-D at construction")
    }

    /// The world position of the center of cell `(column, row)`.
    pub fn cell_center(&self, column: isize, row: isize) -> Coordinate2D {
        let world = self.transform.apply_affine(&[column as f64, row as f64]);
        Coordinate2D::new(world[0], world[1])
    }

    /// The world bounds of the full extent, with near-integer bounds snapped.
    pub fn world_bounds(&self) -> Envelope {
        let corner = self.grid_to_world(PixelAnchor::CellCorner);

        let low_x = self.extent.lows()[0] as f64;
        let low_y = self.extent.lows()[1] as f64;
        let spans = self.extent.spans();
        let corners = [
            corner.apply_affine(&[low_x, low_y]),
            corner.apply_affine(&[low_x + spans[0] as f64, low_y]),
            corner.apply_affine(&[low_x, low_y + spans[1] as f64]),
            corner.apply_affine(&[low_x + spans[0] as f64, low_y + spans[1] as f64]),
        ];

        let mut min = corners[0].clone();
        let mut max = corners[0].clone();
        for image in &corners[1..] {
            for axis in 0..2 {
                min[axis] = min[axis].min(image[axis]);
                max[axis] = max[axis].max(image[axis]);
            }
        }

        Envelope::new_unchecked(min, max, SpatialReferenceOption::Unreferenced)
            .snapped_to_integers(INTEGER_SNAP_ULPS)
    }

    /// The grid cell containing a world position.
    pub fn world_to_grid(&self, coordinate: Coordinate2D) -> Result<[isize; 2]> {
        let inverse = self.grid_to_world(PixelAnchor::CellCorner).inverted()?;
        let grid = inverse.apply_affine(&[coordinate.x, coordinate.y]);
        Ok([grid[0].floor() as isize, grid[1].floor() as isize])
    }
}
