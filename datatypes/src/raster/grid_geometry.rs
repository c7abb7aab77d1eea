use crate::error;
use crate::operations::{
    AffineTransform, CoordinateOperation, concatenate, infer_axis_mapping, transform_corners,
};
use crate::primitives::Envelope;
use crate::raster::{GridExtent, PixelAnchor};
use crate::spatial_reference::{CrsDefinition, SpatialReferenceOption};
use crate::util::Result;
use crate::util::helpers::INTEGER_SNAP_ULPS;
use snafu::ensure;
use std::sync::{Arc, OnceLock};

/// Re-anchors a grid-to-world operation by a constant grid offset.
fn shift_anchor(
    operation: &Arc<dyn CoordinateOperation>,
    offset: f64,
) -> Result<Arc<dyn CoordinateOperation>> {
    if offset == 0.0 {
        return Ok(operation.clone());
    }

    let offsets = vec![offset; operation.source_dimension()];
    if let Some(affine) = operation.as_affine() {
        return Ok(Arc::new(affine.pre_translated(&offsets)?));
    }

    let translation: Arc<dyn CoordinateOperation> =
        Arc::new(AffineTransform::translation(&offsets));
    concatenate(translation, operation.clone())
}

/// The geometry of a grid coverage: grid extent, grid-to-world transform,
/// world envelope and coordinate reference system, each optionally present.
///
/// Whatever subset is supplied must be mutually dimension-consistent; the
/// remaining fields are derived lazily and cached. Instances are immutable,
/// so they are safe for unrestricted concurrent reads.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    extent: Option<GridExtent>,
    /// always normalized to the `CellCenter` anchor
    grid_to_world: Option<Arc<dyn CoordinateOperation>>,
    /// user-supplied envelope; never overwritten by derivation
    envelope: Option<Envelope>,
    crs: Option<CrsDefinition>,
    corner_transform: OnceLock<Arc<dyn CoordinateOperation>>,
    derived_envelope: OnceLock<Option<Envelope>>,
    resolution: OnceLock<Option<Vec<f64>>>,
}

impl GridGeometry {
    /// Bitmask flag for [`GridGeometry::is_defined`]: the coordinate
    /// reference system.
    pub const CRS: u8 = 1;
    /// Bitmask flag for [`GridGeometry::is_defined`]: the world envelope.
    pub const ENVELOPE: u8 = 2;
    /// Bitmask flag for [`GridGeometry::is_defined`]: the grid extent.
    pub const EXTENT: u8 = 4;
    /// Bitmask flag for [`GridGeometry::is_defined`]: the grid-to-world
    /// transform.
    pub const GRID_TO_CRS: u8 = 8;

    fn from_parts(
        extent: Option<GridExtent>,
        grid_to_world: Option<Arc<dyn CoordinateOperation>>,
        envelope: Option<Envelope>,
        crs: Option<CrsDefinition>,
    ) -> Self {
        Self {
            extent,
            grid_to_world,
            envelope,
            crs,
            corner_transform: OnceLock::new(),
            derived_envelope: OnceLock::new(),
            resolution: OnceLock::new(),
        }
    }

    /// Creates a grid geometry from an extent and a grid-to-world transform
    /// anchored at `anchor`. This is the fully deterministic construction
    /// path; nothing is guessed.
    ///
    /// # Errors
    ///
    /// Fails if the extent does not match the transform's source dimension or
    /// the CRS does not match its target dimension.
    pub fn new(
        extent: GridExtent,
        anchor: PixelAnchor,
        grid_to_world: Arc<dyn CoordinateOperation>,
        crs: Option<CrsDefinition>,
    ) -> Result<Self> {
        ensure!(
            extent.dimension() == grid_to_world.source_dimension(),
            error::DimensionMismatchSnafu {
                argument: "extent",
                expected: grid_to_world.source_dimension(),
                found: extent.dimension(),
            }
        );
        if let Some(crs) = &crs {
            ensure!(
                crs.dimension() == grid_to_world.target_dimension(),
                error::DimensionMismatchSnafu {
                    argument: "crs",
                    expected: grid_to_world.target_dimension(),
                    found: crs.dimension(),
                }
            );
        }

        let center = shift_anchor(&grid_to_world, anchor.offset_to(PixelAnchor::CellCenter))?;

        Ok(Self::from_parts(Some(extent), Some(center), None, crs))
    }

    /// Creates a grid geometry from a transform and a world envelope. The
    /// extent is back-computed by inverse-transforming the envelope and
    /// rounding each fractional grid bound to the nearest integer.
    ///
    /// Rounding to nearest, not floor/ceil, keeps floating-point noise from
    /// the inverse transform from growing the image by a cell on either side.
    pub fn from_envelope(
        anchor: PixelAnchor,
        grid_to_world: Arc<dyn CoordinateOperation>,
        envelope: Envelope,
    ) -> Result<Self> {
        ensure!(
            envelope.dimension() == grid_to_world.target_dimension(),
            error::DimensionMismatchSnafu {
                argument: "envelope",
                expected: grid_to_world.target_dimension(),
                found: envelope.dimension(),
            }
        );

        // the corner-anchored inverse maps envelope bounds onto cell edges
        let corner = shift_anchor(&grid_to_world, anchor.offset_to(PixelAnchor::CellCorner))?;
        let inverse = corner.inverse()?;
        let (grid_min, grid_max) = transform_corners(&*inverse, envelope.mins(), envelope.maxs())?;
        ensure!(
            grid_min
                .iter()
                .chain(&grid_max)
                .all(|bound| bound.is_finite()),
            error::EmptyEnvelopeSnafu
        );

        let low = grid_min.iter().map(|&bound| bound.round() as isize).collect();
        let high = grid_max.iter().map(|&bound| bound.round() as isize).collect();
        let extent = GridExtent::from_exclusive_bounds(low, high)?;

        let center = shift_anchor(&grid_to_world, anchor.offset_to(PixelAnchor::CellCenter))?;

        Ok(Self::from_parts(
            Some(extent),
            Some(center),
            Some(envelope),
            None,
        ))
    }

    /// Creates a grid geometry from an extent and a world envelope, guessing
    /// the transform with the default (east, north, ...) axis mapping.
    pub fn from_extent_and_envelope(extent: GridExtent, envelope: Envelope) -> Result<Self> {
        Self::with_inferred_transform(extent, envelope, None)
    }

    /// Like [`GridGeometry::from_extent_and_envelope`], but maps grid axes
    /// onto the axis order and directions of the given CRS.
    pub fn from_extent_and_envelope_with_crs(
        extent: GridExtent,
        envelope: Envelope,
        crs: CrsDefinition,
    ) -> Result<Self> {
        ensure!(
            crs.dimension() == envelope.dimension(),
            error::DimensionMismatchSnafu {
                argument: "crs",
                expected: envelope.dimension(),
                found: crs.dimension(),
            }
        );
        Self::with_inferred_transform(extent, envelope, Some(crs))
    }

    fn with_inferred_transform(
        extent: GridExtent,
        envelope: Envelope,
        crs: Option<CrsDefinition>,
    ) -> Result<Self> {
        ensure!(
            extent.dimension() == envelope.dimension(),
            error::DimensionMismatchSnafu {
                argument: "envelope",
                expected: extent.dimension(),
                found: envelope.dimension(),
            }
        );

        let dimension = extent.dimension();
        let default_directions;
        let directions = match &crs {
            Some(crs) => crs.axis_directions(),
            None => {
                default_directions = CrsDefinition::cartesian(dimension);
                default_directions.axis_directions()
            }
        };
        let mapping = infer_axis_mapping(directions);

        let mut coefficients = vec![0.0; dimension * (dimension + 1)];
        for grid_axis in 0..dimension {
            let world_axis = mapping.world_axis(grid_axis);
            let cells = extent.span(grid_axis)? as f64;
            ensure!(
                cells > 0.0,
                error::InvalidGridBoundsSnafu {
                    low: extent.lows().to_vec(),
                    high: extent.highs(),
                }
            );

            let scale = if mapping.is_flipped(grid_axis) {
                -envelope.span(world_axis)? / cells
            } else {
                envelope.span(world_axis)? / cells
            };
            let origin = if mapping.is_flipped(grid_axis) {
                envelope.max(world_axis)?
            } else {
                envelope.min(world_axis)?
            };

            coefficients[world_axis * (dimension + 1) + grid_axis] = scale;
            coefficients[world_axis * (dimension + 1) + dimension] =
                origin - scale * extent.low(grid_axis)? as f64;
        }

        let corner = AffineTransform::new(dimension, dimension, coefficients)?;
        let center = corner.pre_translated(&vec![
            PixelAnchor::CellCorner.offset_to(PixelAnchor::CellCenter);
            dimension
        ])?;

        tracing::debug!(
            "Synthesized a grid-to-world transform with scales {:?}",
            center.column_magnitudes()
        );

        Ok(Self::from_parts(
            Some(extent),
            Some(Arc::new(center)),
            Some(envelope),
            crs,
        ))
    }

    /// Creates a grid geometry that only defines its extent. Transform,
    /// envelope and CRS stay undefined.
    pub fn from_extent(extent: GridExtent) -> Self {
        Self::from_parts(Some(extent), None, None, None)
    }

    pub fn extent(&self) -> Result<&GridExtent> {
        self.extent
            .as_ref()
            .ok_or(error::Error::UnspecifiedGridExtent)
    }

    pub fn crs(&self) -> Result<&CrsDefinition> {
        self.crs
            .as_ref()
            .ok_or(error::Error::UnspecifiedSpatialReference)
    }

    /// The grid-to-world transform re-anchored to `anchor`. The corner
    /// variant is computed at most once and cached.
    pub fn grid_to_world(&self, anchor: PixelAnchor) -> Result<Arc<dyn CoordinateOperation>> {
        let center = self
            .grid_to_world
            .as_ref()
            .ok_or(error::Error::UnspecifiedTransform)?;

        match anchor {
            PixelAnchor::CellCenter => Ok(center.clone()),
            PixelAnchor::CellCorner => {
                if let Some(corner) = self.corner_transform.get() {
                    return Ok(corner.clone());
                }
                let corner = shift_anchor(
                    center,
                    PixelAnchor::CellCenter.offset_to(PixelAnchor::CellCorner),
                )?;
                Ok(self.corner_transform.get_or_init(|| corner).clone())
            }
        }
    }

    /// The affine view of the grid-to-world transform.
    ///
    /// # Errors
    ///
    /// Fails with `NonAffineTransform` if the stored operation is general.
    pub fn affine_grid_to_world(&self, anchor: PixelAnchor) -> Result<AffineTransform> {
        let operation = self.grid_to_world(anchor)?;
        operation
            .as_affine()
            .cloned()
            .ok_or(error::Error::NonAffineTransform)
    }

    /// The world envelope: the user-supplied one if present, otherwise
    /// derived from extent and transform (and then snapped to integers
    /// within a fixed ULP tolerance).
    pub fn envelope(&self) -> Result<Envelope> {
        if let Some(envelope) = &self.envelope {
            ensure!(!envelope.is_undefined(), error::EmptyEnvelopeSnafu);
            return Ok(envelope.clone());
        }

        match self
            .derived_envelope
            .get_or_init(|| self.compute_envelope())
        {
            Some(envelope) => Ok(envelope.clone()),
            None if self.extent.is_none() => Err(error::Error::UnspecifiedGridExtent),
            None if self.grid_to_world.is_none() => Err(error::Error::UnspecifiedTransform),
            None => Err(error::Error::EmptyEnvelope),
        }
    }

    fn compute_envelope(&self) -> Option<Envelope> {
        let extent = self.extent.as_ref()?;
        let center = self.grid_to_world.as_ref()?;
        let corner = shift_anchor(
            center,
            PixelAnchor::CellCenter.offset_to(PixelAnchor::CellCorner),
        )
        .ok()?;

        // the extent covers [low, low + span] in cell-corner coordinates
        let lower: Vec<f64> = extent.lows().iter().map(|&low| low as f64).collect();
        let upper: Vec<f64> = extent
            .lows()
            .iter()
            .zip(extent.spans())
            .map(|(&low, span)| low as f64 + span as f64)
            .collect();

        let (min, max) = transform_corners(&*corner, &lower, &upper).ok()?;

        let spatial_reference = self
            .crs
            .as_ref()
            .map_or(SpatialReferenceOption::Unreferenced, |crs| {
                crs.spatial_reference()
            });

        let envelope = Envelope::new_unchecked(min, max, spatial_reference)
            .snapped_to_integers(INTEGER_SNAP_ULPS);
        if envelope.is_undefined() {
            return None;
        }
        Some(envelope)
    }

    fn envelope_defined(&self) -> bool {
        if let Some(envelope) = &self.envelope {
            return !envelope.is_undefined();
        }
        self.derived_envelope
            .get_or_init(|| self.compute_envelope())
            .is_some()
    }

    /// True iff every property named in `bitmask` (a combination of
    /// [`GridGeometry::CRS`], [`GridGeometry::ENVELOPE`],
    /// [`GridGeometry::EXTENT`] and [`GridGeometry::GRID_TO_CRS`]) is
    /// defined, i.e. its getter would succeed.
    pub fn is_defined(&self, bitmask: u8) -> bool {
        (bitmask & Self::CRS == 0 || self.crs.is_some())
            && (bitmask & Self::ENVELOPE == 0 || self.envelope_defined())
            && (bitmask & Self::EXTENT == 0 || self.extent.is_some())
            && (bitmask & Self::GRID_TO_CRS == 0 || self.grid_to_world.is_some())
    }

    /// The cell size along each grid axis, when the transform is linear.
    /// `None` (not an error) for general transforms or when no transform is
    /// defined.
    pub fn resolution(&self) -> Option<&[f64]> {
        self.resolution
            .get_or_init(|| {
                self.grid_to_world
                    .as_ref()
                    .and_then(|operation| operation.as_affine())
                    .map(AffineTransform::column_magnitudes)
            })
            .as_deref()
    }

    /// The grid cell containing a world position.
    pub fn world_to_grid(&self, world: &[f64]) -> Result<Vec<isize>> {
        let corner = self.grid_to_world(PixelAnchor::CellCorner)?;
        let inverse = corner.inverse()?;
        let mut grid = vec![0.0; inverse.target_dimension()];
        inverse.apply(world, &mut grid)?;
        Ok(grid.iter().map(|&g| g.floor() as isize).collect())
    }

    /// Returns a copy of this geometry with the CRS replaced. Coordinates are
    /// not changed; use [`GridGeometry::reprojected`] for that. Derived caches
    /// start out empty on the copy.
    pub fn with_crs(&self, crs: CrsDefinition) -> Result<GridGeometry> {
        if let Some(transform) = &self.grid_to_world {
            ensure!(
                crs.dimension() == transform.target_dimension(),
                error::DimensionMismatchSnafu {
                    argument: "crs",
                    expected: transform.target_dimension(),
                    found: crs.dimension(),
                }
            );
        } else if let Some(envelope) = &self.envelope {
            ensure!(
                crs.dimension() == envelope.dimension(),
                error::DimensionMismatchSnafu {
                    argument: "crs",
                    expected: envelope.dimension(),
                    found: crs.dimension(),
                }
            );
        }

        Ok(Self::from_parts(
            self.extent.clone(),
            self.grid_to_world.clone(),
            self.envelope.clone(),
            Some(crs),
        ))
    }

    /// Rebuilds this geometry in another CRS by composing the grid-to-world
    /// transform with `operation` (a world-to-world coordinate change). The
    /// extent is preserved; the envelope is re-derived on demand.
    pub fn reprojected(
        &self,
        target_crs: CrsDefinition,
        operation: Arc<dyn CoordinateOperation>,
    ) -> Result<GridGeometry> {
        let center = self
            .grid_to_world
            .clone()
            .ok_or(error::Error::UnspecifiedTransform)?;
        ensure!(
            operation.source_dimension() == center.target_dimension(),
            error::DimensionMismatchSnafu {
                argument: "operation",
                expected: center.target_dimension(),
                found: operation.source_dimension(),
            }
        );
        let extent = self
            .extent
            .clone()
            .ok_or(error::Error::UnspecifiedGridExtent)?;

        tracing::debug!(
            "Rebuilding grid geometry for {}",
            target_crs.spatial_reference()
        );

        let composed = concatenate(center, operation)?;
        GridGeometry::new(extent, PixelAnchor::CellCenter, composed, Some(target_crs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::spatial_reference::{CrsResolver, SpatialReference, StaticCrsResolver};

    /// A deliberately non-linear operation for the general-transform paths.
    #[derive(Debug)]
    struct SquareOperation;

    impl CoordinateOperation for SquareOperation {
        fn source_dimension(&self) -> usize {
            2
        }

        fn target_dimension(&self) -> usize {
            2
        }

        fn apply(&self, source: &[f64], target: &mut [f64]) -> Result<()> {
            for (out, &s) in target.iter_mut().zip(source) {
                *out = s * s;
            }
            Ok(())
        }

        fn inverse(&self) -> Result<Arc<dyn CoordinateOperation>> {
            Err(crate::error::Error::NonInvertibleTransform)
        }
    }

    fn demo_extent() -> GridExtent {
        GridExtent::from_inclusive_bounds(vec![0, 0], vec![599, 399]).unwrap()
    }

    fn demo_envelope() -> Envelope {
        Envelope::new(
            vec![-60.0, -40.0],
            vec![60.0, 40.0],
            SpatialReferenceOption::Unreferenced,
        )
        .unwrap()
    }

    fn demo_transform() -> Arc<dyn CoordinateOperation> {
        // center-anchored: cell (0, 0) center sits at (-59.9, 39.9)
        Arc::new(
            AffineTransform::from_scale_and_translation(&[0.2, -0.2], &[-59.9, 39.9]).unwrap(),
        )
    }

    #[test]
    fn re_anchoring_twice_is_the_identity() {
        let geometry =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, demo_transform(), None)
                .unwrap();

        let center = geometry
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap();
        let corner = geometry
            .affine_grid_to_world(PixelAnchor::CellCorner)
            .unwrap();

        // T_corner(g + 0.5) == T_center(g)
        let round_trip = corner.pre_translated(&[0.5, 0.5]).unwrap();
        assert_approx_eq!(
            &round_trip.apply_affine(&[10.0, 20.0]),
            &center.apply_affine(&[10.0, 20.0])
        );
    }

    #[test]
    fn corner_transform_is_cached() {
        let geometry =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, demo_transform(), None)
                .unwrap();

        let first = geometry.grid_to_world(PixelAnchor::CellCorner).unwrap();
        let second = geometry.grid_to_world(PixelAnchor::CellCorner).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn corner_anchored_construction_normalizes_to_center() {
        let corner: Arc<dyn CoordinateOperation> = Arc::new(
            AffineTransform::from_scale_and_translation(&[0.2, -0.2], &[-60.0, 40.0]).unwrap(),
        );
        let geometry =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCorner, corner, None).unwrap();

        let center = geometry
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap();
        assert_approx_eq!(&center.apply_affine(&[0.0, 0.0]), &[-59.9, 39.9]);
    }

    #[test]
    fn heuristic_transform_matches_envelope() {
        let geometry =
            GridGeometry::from_extent_and_envelope(demo_extent(), demo_envelope()).unwrap();

        let corner = geometry
            .affine_grid_to_world(PixelAnchor::CellCorner)
            .unwrap();
        assert_eq!(corner.coefficient(0, 0), Some(0.2));
        assert_eq!(corner.coefficient(1, 1), Some(-0.2));

        let center = geometry
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap();
        assert_approx_eq!(&center.apply_affine(&[0.0, 0.0]), &[-59.9, 39.9]);
    }

    #[test]
    fn envelope_round_trips_through_the_derived_transform() {
        let heuristic =
            GridGeometry::from_extent_and_envelope(demo_extent(), demo_envelope()).unwrap();
        let transform = heuristic
            .grid_to_world(PixelAnchor::CellCenter)
            .unwrap();

        // rebuild without the explicit envelope, so it has to be derived
        let rebuilt =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, transform, None).unwrap();
        let envelope = rebuilt.envelope().unwrap();

        // integer snapping makes the round trip exact
        assert_eq!(envelope.mins(), demo_envelope().mins());
        assert_eq!(envelope.maxs(), demo_envelope().maxs());
    }

    #[test]
    fn latitude_longitude_crs_swaps_grid_axes() {
        let crs = StaticCrsResolver
            .resolve(SpatialReference::epsg_4326())
            .unwrap();
        let envelope = Envelope::new(
            vec![-40.0, -60.0], // axis 0 is latitude here
            vec![40.0, 60.0],
            SpatialReference::epsg_4326().into(),
        )
        .unwrap();

        let geometry =
            GridGeometry::from_extent_and_envelope_with_crs(demo_extent(), envelope, crs).unwrap();
        let corner = geometry
            .affine_grid_to_world(PixelAnchor::CellCorner)
            .unwrap();

        // grid x follows longitude (world axis 1), grid y runs against latitude
        assert_eq!(corner.coefficient(1, 0), Some(0.2));
        assert_eq!(corner.coefficient(0, 1), Some(-0.2));
        assert_eq!(corner.coefficient(0, 0), Some(0.0));
        assert_eq!(corner.coefficient(1, 1), Some(0.0));
    }

    #[test]
    fn extent_back_computation_rounds_to_nearest() {
        let corner: Arc<dyn CoordinateOperation> = Arc::new(
            AffineTransform::from_scale_and_translation(&[0.2, -0.2], &[-60.0, 40.0]).unwrap(),
        );

        // bounds carry float noise well below half a cell
        let envelope = Envelope::new(
            vec![-60.000_000_000_000_04, -40.000_000_000_000_04],
            vec![59.999_999_999_999_96, 39.999_999_999_999_96],
            SpatialReferenceOption::Unreferenced,
        )
        .unwrap();

        let geometry =
            GridGeometry::from_envelope(PixelAnchor::CellCorner, corner, envelope).unwrap();

        assert_eq!(geometry.extent().unwrap(), &demo_extent());
    }

    #[test]
    fn envelope_derivation_with_projected_crs() {
        let crs = StaticCrsResolver
            .resolve(SpatialReference::new(
                crate::spatial_reference::SpatialReferenceAuthority::Epsg,
                3395,
            ))
            .unwrap();
        let transform: Arc<dyn CoordinateOperation> = Arc::new(
            AffineTransform::from_scale_and_translation(&[1000.0, -1000.0], &[0.0, 0.0]).unwrap(),
        );

        let geometry = GridGeometry::new(
            demo_extent(),
            PixelAnchor::CellCenter,
            transform,
            Some(crs),
        )
        .unwrap();

        assert!(geometry.is_defined(GridGeometry::ENVELOPE));
        let envelope = geometry.envelope().unwrap();

        // the extent's cell coverage under the center-anchored transform
        assert_approx_eq!(envelope.mins(), &[-500.0, -399_500.0]);
        assert_approx_eq!(envelope.maxs(), &[599_500.0, 500.0]);
        assert_eq!(
            envelope.spatial_reference(),
            SpatialReference::new(crate::spatial_reference::SpatialReferenceAuthority::Epsg, 3395)
                .into()
        );
    }

    #[test]
    fn crs_dimension_mismatch_carries_both_values() {
        let crs = StaticCrsResolver
            .resolve(SpatialReference::new(
                crate::spatial_reference::SpatialReferenceAuthority::Epsg,
                4979,
            ))
            .unwrap();

        let result = GridGeometry::new(
            demo_extent(),
            PixelAnchor::CellCenter,
            demo_transform(),
            Some(crs),
        );

        assert!(matches!(
            result,
            Err(crate::error::Error::DimensionMismatch {
                argument: "crs",
                expected: 2,
                found: 3,
            })
        ));
    }

    #[test]
    fn extent_dimension_mismatch() {
        let extent_3d = GridExtent::from_inclusive_bounds(vec![0, 0, 0], vec![9, 9, 9]).unwrap();

        assert!(matches!(
            GridGeometry::new(extent_3d, PixelAnchor::CellCenter, demo_transform(), None),
            Err(crate::error::Error::DimensionMismatch {
                argument: "extent",
                expected: 2,
                found: 3,
            })
        ));
    }

    #[test]
    fn is_defined_mirrors_the_getters() {
        let full = GridGeometry::from_extent_and_envelope(demo_extent(), demo_envelope()).unwrap();
        let extent_only = GridGeometry::from_extent(demo_extent());
        let no_crs =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, demo_transform(), None)
                .unwrap();

        for geometry in [&full, &extent_only, &no_crs] {
            assert_eq!(
                geometry.is_defined(GridGeometry::EXTENT),
                geometry.extent().is_ok()
            );
            assert_eq!(
                geometry.is_defined(GridGeometry::ENVELOPE),
                geometry.envelope().is_ok()
            );
            assert_eq!(
                geometry.is_defined(GridGeometry::GRID_TO_CRS),
                geometry.grid_to_world(PixelAnchor::CellCenter).is_ok()
            );
            assert_eq!(
                geometry.is_defined(GridGeometry::CRS),
                geometry.crs().is_ok()
            );
        }

        assert!(full.is_defined(GridGeometry::EXTENT | GridGeometry::ENVELOPE));
        assert!(!extent_only.is_defined(GridGeometry::EXTENT | GridGeometry::GRID_TO_CRS));
    }

    #[test]
    fn clone_preserves_only_the_defined_fields() {
        let clone = GridGeometry::from_extent(demo_extent()).clone();

        assert!(clone.is_defined(GridGeometry::EXTENT));
        assert!(!clone.is_defined(GridGeometry::GRID_TO_CRS));
        assert!(!clone.is_defined(GridGeometry::ENVELOPE));
        assert!(!clone.is_defined(GridGeometry::CRS));
        assert!(matches!(
            clone.envelope(),
            Err(crate::error::Error::UnspecifiedTransform)
        ));
    }

    #[test]
    fn resolution_is_undefined_for_general_transforms() {
        let affine =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, demo_transform(), None)
                .unwrap();
        assert_approx_eq!(affine.resolution().unwrap(), &[0.2, 0.2]);

        let general = GridGeometry::new(
            demo_extent(),
            PixelAnchor::CellCenter,
            Arc::new(SquareOperation),
            None,
        )
        .unwrap();
        assert_eq!(general.resolution(), None);
        assert!(matches!(
            general.affine_grid_to_world(PixelAnchor::CellCenter),
            Err(crate::error::Error::NonAffineTransform)
        ));
    }

    #[test]
    fn world_to_grid_locates_cells() {
        let geometry =
            GridGeometry::from_extent_and_envelope(demo_extent(), demo_envelope()).unwrap();

        assert_eq!(geometry.world_to_grid(&[-59.9, 39.9]).unwrap(), vec![0, 0]);
        assert_eq!(
            geometry.world_to_grid(&[59.9, -39.9]).unwrap(),
            vec![599, 399]
        );
    }

    #[test]
    fn with_crs_produces_a_new_instance() {
        let geometry =
            GridGeometry::new(demo_extent(), PixelAnchor::CellCenter, demo_transform(), None)
                .unwrap();
        assert!(!geometry.is_defined(GridGeometry::CRS));

        let crs = StaticCrsResolver
            .resolve(SpatialReference::epsg_4326())
            .unwrap();
        let tagged = geometry.with_crs(crs).unwrap();

        assert!(tagged.is_defined(GridGeometry::CRS));
        assert!(!geometry.is_defined(GridGeometry::CRS));
        assert_eq!(
            tagged.envelope().unwrap().spatial_reference(),
            SpatialReference::epsg_4326().into()
        );

        let three_d = StaticCrsResolver
            .resolve(SpatialReference::new(
                crate::spatial_reference::SpatialReferenceAuthority::Epsg,
                4979,
            ))
            .unwrap();
        assert!(geometry.with_crs(three_d).is_err());
    }

    #[test]
    fn reprojection_composes_the_transform() {
        let source =
            GridGeometry::from_extent_and_envelope(demo_extent(), demo_envelope()).unwrap();
        let target_crs = StaticCrsResolver
            .resolve(SpatialReference::new(
                crate::spatial_reference::SpatialReferenceAuthority::Epsg,
                3857,
            ))
            .unwrap();
        // a stand-in for a real projection: uniform scaling
        let operation: Arc<dyn CoordinateOperation> = Arc::new(
            AffineTransform::from_scale_and_translation(&[100_000.0, 100_000.0], &[0.0, 0.0])
                .unwrap(),
        );

        let source_origin = source
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap()
            .apply_affine(&[0.0, 0.0]);

        let reprojected = source.reprojected(target_crs, operation).unwrap();

        assert_eq!(reprojected.extent().unwrap(), source.extent().unwrap());
        let center = reprojected
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap();
        assert_approx_eq!(
            &center.apply_affine(&[0.0, 0.0]),
            &[source_origin[0] * 100_000.0, source_origin[1] * 100_000.0]
        );
        assert!(reprojected.is_defined(GridGeometry::CRS));
    }
}
