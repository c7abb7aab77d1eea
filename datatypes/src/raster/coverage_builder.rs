use crate::error;
use crate::operations::{AffineTransform, CoordinateOperation};
use crate::primitives::Envelope;
use crate::raster::{
    GridExtent, GridGeometry, PixelAnchor, RasterDataType, RasterSource, SampleDimension,
};
use crate::spatial_reference::CrsDefinition;
use crate::util::Result;
use snafu::ensure;
use std::sync::Arc;

/// A fully assembled grid coverage: one consistent grid geometry, a validated
/// sample-dimension array and the backing raster.
#[derive(Clone, Debug)]
pub struct GridCoverage {
    name: String,
    grid_geometry: GridGeometry,
    sample_dimensions: Vec<SampleDimension>,
    raster: Arc<dyn RasterSource>,
}

impl GridCoverage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_geometry(&self) -> &GridGeometry {
        &self.grid_geometry
    }

    pub fn sample_dimensions(&self) -> &[SampleDimension] {
        &self.sample_dimensions
    }

    pub fn raster(&self) -> &Arc<dyn RasterSource> {
        &self.raster
    }
}

/// Assembles a [`GridCoverage`] from a partially specified configuration.
///
/// Every derivable property follows the same precedence chain: explicit
/// value, then a value computed from the most specific already-known inputs,
/// then a default. Setters that affect the geometry drop the cached resolved
/// geometry explicitly.
///
/// The builder is a single-owner, single-threaded configuration object; the
/// values it produces are immutable and shareable.
#[derive(Debug, Default)]
pub struct CoverageBuilder {
    name: Option<String>,
    crs: Option<CrsDefinition>,
    envelope: Option<Envelope>,
    extent: Option<GridExtent>,
    anchor: PixelAnchor,
    grid_to_world: Option<Arc<dyn CoordinateOperation>>,
    sample_dimensions: Vec<SampleDimension>,
    band_count: Option<usize>,
    raster: Option<Arc<dyn RasterSource>>,
    resolved_geometry: Option<GridGeometry>,
}

impl CoverageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn invalidate_geometry(&mut self) {
        self.resolved_geometry = None;
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_crs(&mut self, crs: CrsDefinition) -> &mut Self {
        self.crs = Some(crs);
        self.invalidate_geometry();
        self
    }

    pub fn set_envelope(&mut self, envelope: Envelope) -> &mut Self {
        self.envelope = Some(envelope);
        self.invalidate_geometry();
        self
    }

    pub fn set_extent(&mut self, extent: GridExtent) -> &mut Self {
        self.extent = Some(extent);
        self.invalidate_geometry();
        self
    }

    pub fn set_anchor(&mut self, anchor: PixelAnchor) -> &mut Self {
        self.anchor = anchor;
        self.invalidate_geometry();
        self
    }

    pub fn set_grid_to_world(&mut self, grid_to_world: Arc<dyn CoordinateOperation>) -> &mut Self {
        self.grid_to_world = Some(grid_to_world);
        self.invalidate_geometry();
        self
    }

    pub fn add_sample_dimension(&mut self, sample_dimension: SampleDimension) -> &mut Self {
        self.sample_dimensions.push(sample_dimension);
        self
    }

    pub fn set_band_count(&mut self, band_count: usize) -> &mut Self {
        self.band_count = Some(band_count);
        self
    }

    pub fn set_raster(&mut self, raster: Arc<dyn RasterSource>) -> &mut Self {
        self.raster = Some(raster);
        self.invalidate_geometry();
        self
    }

    /// The resolved band count: explicitly set, else the declared sample
    /// dimensions, else the raster's native band count, else 1.
    pub fn band_count(&self) -> usize {
        if let Some(band_count) = self.band_count {
            return band_count;
        }
        if !self.sample_dimensions.is_empty() {
            return self.sample_dimensions.len();
        }
        if let Some(raster) = &self.raster {
            return raster.band_count();
        }
        1
    }

    /// Resolves (and caches) the grid geometry from the configured inputs.
    ///
    /// # Errors
    ///
    /// Fails if neither an extent nor a raster nor enough inputs to derive an
    /// extent are configured, or if the configured inputs are inconsistent.
    pub fn grid_geometry(&mut self) -> Result<&GridGeometry> {
        let geometry = match self.resolved_geometry.take() {
            Some(geometry) => geometry,
            None => self.resolve_geometry()?,
        };
        Ok(self.resolved_geometry.insert(geometry))
    }

    fn resolve_geometry(&self) -> Result<GridGeometry> {
        let extent = match (&self.extent, &self.raster) {
            (Some(extent), _) => Some(extent.clone()),
            (None, Some(raster)) => {
                let [shape_y, shape_x] = raster.grid_shape();
                Some(GridExtent::from_shape(&[shape_x, shape_y]))
            }
            (None, None) => None,
        };

        if let Some(grid_to_world) = &self.grid_to_world {
            if let Some(extent) = extent {
                if self.envelope.is_some() {
                    tracing::debug!(
                        "Both an extent and an envelope are set; the transform and extent win"
                    );
                }
                return GridGeometry::new(
                    extent,
                    self.anchor,
                    grid_to_world.clone(),
                    self.crs.clone(),
                );
            }
            if let Some(envelope) = &self.envelope {
                let geometry = GridGeometry::from_envelope(
                    self.anchor,
                    grid_to_world.clone(),
                    envelope.clone(),
                )?;
                return match &self.crs {
                    Some(crs) => geometry.with_crs(crs.clone()),
                    None => Ok(geometry),
                };
            }
            return Err(error::Error::UnspecifiedGridExtent);
        }

        let Some(extent) = extent else {
            return Err(error::Error::UnspecifiedGridExtent);
        };

        if let Some(envelope) = &self.envelope {
            return match &self.crs {
                Some(crs) => GridGeometry::from_extent_and_envelope_with_crs(
                    extent,
                    envelope.clone(),
                    crs.clone(),
                ),
                None => GridGeometry::from_extent_and_envelope(extent, envelope.clone()),
            };
        }

        // no transform and no envelope: grid coordinates are world coordinates
        let identity: Arc<dyn CoordinateOperation> =
            Arc::new(AffineTransform::identity(extent.dimension()));
        GridGeometry::new(extent, self.anchor, identity, self.crs.clone())
    }

    fn resolve_sample_dimensions(&self, bands: usize) -> Result<Vec<SampleDimension>> {
        ensure!(
            self.sample_dimensions.len() <= bands,
            error::SampleDimensionCountMismatchSnafu {
                declared: self.sample_dimensions.len(),
                bands,
            }
        );

        let default_data_type = self
            .raster
            .as_ref()
            .map_or(RasterDataType::F64, |raster| raster.data_type());

        let mut sample_dimensions = self.sample_dimensions.clone();
        for index in sample_dimensions.len()..bands {
            sample_dimensions.push(SampleDimension::band(index, default_data_type));
        }
        Ok(sample_dimensions)
    }

    /// Builds the coverage, validating the raster against the resolved
    /// geometry and band count.
    pub fn build(&mut self) -> Result<GridCoverage> {
        let raster = self
            .raster
            .clone()
            .ok_or(error::Error::UnspecifiedRasterData)?;

        let grid_geometry = self.grid_geometry()?.clone();
        let extent = grid_geometry.extent()?;
        ensure!(
            extent.dimension() >= 2,
            error::DimensionMismatchSnafu {
                argument: "extent",
                expected: 2_usize,
                found: extent.dimension(),
            }
        );

        let spans = extent.spans();
        let [shape_y, shape_x] = raster.grid_shape();
        ensure!(
            spans[0] == shape_x && spans[1] == shape_y,
            error::RasterGeometryMismatchSnafu {
                raster_shape: vec![shape_y, shape_x],
                extent_spans: spans,
            }
        );

        let bands = self.band_count();
        ensure!(
            bands == raster.band_count(),
            error::SampleDimensionCountMismatchSnafu {
                declared: bands,
                bands: raster.band_count(),
            }
        );
        let sample_dimensions = self.resolve_sample_dimensions(bands)?;

        Ok(GridCoverage {
            name: self.name.clone().unwrap_or_else(|| "coverage".to_string()),
            grid_geometry,
            sample_dimensions,
            raster,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Grid;
    use crate::spatial_reference::SpatialReferenceOption;

    fn demo_raster() -> Arc<dyn RasterSource> {
        Arc::new(Grid::new_filled([400, 600], 1, 0.0_f64))
    }

    fn demo_envelope() -> Envelope {
        Envelope::new(
            vec![-60.0, -40.0],
            vec![60.0, 40.0],
            SpatialReferenceOption::Unreferenced,
        )
        .unwrap()
    }

    #[test]
    fn extent_is_inferred_from_the_raster() {
        let mut builder = CoverageBuilder::new();
        builder.set_raster(demo_raster());

        let geometry = builder.grid_geometry().unwrap();
        assert_eq!(geometry.extent().unwrap(), &GridExtent::from_shape(&[600, 400]));

        // grid coordinates fall through to world coordinates by default
        let transform = geometry
            .affine_grid_to_world(PixelAnchor::CellCenter)
            .unwrap();
        assert_eq!(transform, AffineTransform::identity(2));
    }

    #[test]
    fn explicit_extent_wins_over_the_raster() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_raster(demo_raster())
            .set_extent(GridExtent::from_shape(&[10, 10]));

        let geometry = builder.grid_geometry().unwrap();
        assert_eq!(geometry.extent().unwrap(), &GridExtent::from_shape(&[10, 10]));
    }

    #[test]
    fn envelope_and_extent_synthesize_a_transform() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_raster(demo_raster())
            .set_envelope(demo_envelope());

        let geometry = builder.grid_geometry().unwrap();
        let resolution = geometry.resolution().unwrap().to_vec();
        crate::assert_approx_eq!(&resolution, &[0.2, 0.2]);
    }

    #[test]
    fn geometry_affecting_setters_drop_the_cache() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_raster(demo_raster())
            .set_envelope(demo_envelope());

        let before = builder.grid_geometry().unwrap().envelope().unwrap();

        let shifted = Envelope::new(
            vec![0.0, 0.0],
            vec![120.0, 80.0],
            SpatialReferenceOption::Unreferenced,
        )
        .unwrap();
        builder.set_envelope(shifted.clone());

        let after = builder.grid_geometry().unwrap().envelope().unwrap();
        assert_ne!(before, after);
        assert_eq!(after, shifted);
    }

    #[test]
    fn band_count_precedence() {
        let mut builder = CoverageBuilder::new();
        assert_eq!(builder.band_count(), 1);

        builder.set_raster(Arc::new(Grid::new_filled([4, 4], 3, 0_u8)));
        assert_eq!(builder.band_count(), 3);

        builder
            .add_sample_dimension(SampleDimension::new("red", RasterDataType::U8))
            .add_sample_dimension(SampleDimension::new("nir", RasterDataType::U8));
        assert_eq!(builder.band_count(), 2);

        builder.set_band_count(4);
        assert_eq!(builder.band_count(), 4);
    }

    #[test]
    fn build_fills_default_sample_dimensions() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_name("elevation")
            .set_raster(demo_raster())
            .set_envelope(demo_envelope());

        let coverage = builder.build().unwrap();

        assert_eq!(coverage.name(), "elevation");
        assert_eq!(coverage.sample_dimensions().len(), 1);
        assert_eq!(coverage.sample_dimensions()[0].name(), "band_0");
        assert_eq!(
            coverage.sample_dimensions()[0].data_type(),
            RasterDataType::F64
        );
        assert_eq!(coverage.raster().band_count(), 1);
    }

    #[test]
    fn build_requires_a_raster() {
        let mut builder = CoverageBuilder::new();
        builder.set_extent(GridExtent::from_shape(&[10, 10]));

        assert!(matches!(
            builder.build(),
            Err(crate::error::Error::UnspecifiedRasterData)
        ));
    }

    #[test]
    fn build_rejects_mismatched_raster_shapes() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_raster(demo_raster())
            .set_extent(GridExtent::from_shape(&[10, 10]));

        assert!(matches!(
            builder.build(),
            Err(crate::error::Error::RasterGeometryMismatch { .. })
        ));
    }

    #[test]
    fn build_rejects_excess_sample_dimensions() {
        let mut builder = CoverageBuilder::new();
        builder
            .set_raster(demo_raster())
            .add_sample_dimension(SampleDimension::new("a", RasterDataType::F64))
            .add_sample_dimension(SampleDimension::new("b", RasterDataType::F64));

        assert!(matches!(
            builder.build(),
            Err(crate::error::Error::SampleDimensionCountMismatch { .. })
        ));
    }

    #[test]
    fn resolving_without_inputs_fails() {
        let mut builder = CoverageBuilder::new();

        assert!(matches!(
            builder.grid_geometry(),
            Err(crate::error::Error::UnspecifiedGridExtent)
        ));
    }
}
