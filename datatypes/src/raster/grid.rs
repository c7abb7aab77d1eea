use crate::error;
use crate::raster::{Pixel, RasterDataType};
use crate::util::Result;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt::Debug;

/// Read-only view of raster pixel storage. The geometry layer only consults
/// it to infer default extents and band counts; it never touches pixel
/// values.
pub trait RasterSource: Debug + Send + Sync {
    /// Shape of a single band in `[y, x]` order.
    fn grid_shape(&self) -> [usize; 2];

    fn band_count(&self) -> usize;

    fn data_type(&self) -> RasterDataType;
}

/// A dense in-memory raster: a `[y, x]` shape, a band count and one flat,
/// row-major data buffer with bands stored consecutively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid<T> {
    shape: [usize; 2],
    bands: usize,
    data: Vec<T>,
}

impl<T: Pixel> Grid<T> {
    /// Creates a new grid
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcover_datatypes::raster::Grid;
    ///
    /// let grid = Grid::new([2, 3], 1, vec![1_u8, 2, 3, 4, 5, 6]).unwrap();
    ///
    /// assert_eq!(grid.value_at(0, 1, 2).unwrap(), 6);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the data length does not match `shape[0] * shape[1] * bands`.
    ///
    pub fn new(shape: [usize; 2], bands: usize, data: Vec<T>) -> Result<Self> {
        ensure!(
            data.len() == shape[0] * shape[1] * bands,
            error::DimensionCapacityDoesNotMatchDataCapacitySnafu {
                dimension_cap: shape[0] * shape[1] * bands,
                data_cap: data.len(),
            }
        );
        Ok(Self { shape, bands, data })
    }

    pub fn new_filled(shape: [usize; 2], bands: usize, value: T) -> Self {
        Self {
            shape,
            bands,
            data: vec![value; shape[0] * shape[1] * bands],
        }
    }

    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The value of the given band at `(y, x)`.
    ///
    /// # Errors
    ///
    /// Fails if the band or position is out of bounds.
    pub fn value_at(&self, band: usize, y: usize, x: usize) -> Result<T> {
        ensure!(
            band < self.bands && y < self.shape[0] && x < self.shape[1],
            error::GridIndexOutOfBoundsSnafu {
                index: vec![band as isize, y as isize, x as isize],
                min_index: vec![0, 0, 0],
                max_index: vec![
                    self.bands as isize - 1,
                    self.shape[0] as isize - 1,
                    self.shape[1] as isize - 1,
                ],
            }
        );
        Ok(self.data[(band * self.shape[0] + y) * self.shape[1] + x])
    }
}

impl<T: Pixel> RasterSource for Grid<T> {
    fn grid_shape(&self) -> [usize; 2] {
        self.shape
    }

    fn band_count(&self) -> usize {
        self.bands
    }

    fn data_type(&self) -> RasterDataType {
        T::TYPE
    }
}
