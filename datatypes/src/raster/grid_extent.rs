use crate::error;
use crate::util::Result;
use crate::util::ranges::value_in_range_inclusive;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// An axis-aligned, integer-indexed range over grid cells.
///
/// The upper bounds are stored exclusively but exposed inclusively, matching
/// the ISO 19123 grid envelope convention. Grid axis 0 is the column axis,
/// axis 1 the row axis.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridExtent {
    low: Vec<isize>,
    high: Vec<isize>, // exclusive
}

impl GridExtent {
    /// Creates an extent from inclusive per-axis bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcover_datatypes::raster::GridExtent;
    ///
    /// let extent = GridExtent::from_inclusive_bounds(vec![0, 0], vec![599, 399]).unwrap();
    ///
    /// assert_eq!(extent.high(0).unwrap(), 599);
    /// assert_eq!(extent.span(0).unwrap(), 600);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the bounds disagree on dimensionality or `low[i] > high[i]`
    /// on some axis.
    ///
    pub fn from_inclusive_bounds(low: Vec<isize>, high: Vec<isize>) -> Result<Self> {
        Self::validate_bounds(&low, &high)?;
        let exclusive_high = high.iter().map(|&h| h + 1).collect();
        Ok(Self {
            low,
            high: exclusive_high,
        })
    }

    /// Creates an extent from exclusive per-axis upper bounds. Zero spans are
    /// allowed here, for degenerate slice dimensions.
    pub fn from_exclusive_bounds(low: Vec<isize>, high: Vec<isize>) -> Result<Self> {
        ensure!(
            low.len() == high.len(),
            error::DimensionMismatchSnafu {
                argument: "high",
                expected: low.len(),
                found: high.len(),
            }
        );
        ensure!(
            low.iter().zip(&high).all(|(&lo, &hi)| lo <= hi),
            error::InvalidGridBoundsSnafu {
                low: low.clone(),
                high: high.clone(),
            }
        );
        Ok(Self { low, high })
    }

    /// Creates a zero-based extent from a raster-like shape given in axis
    /// order (x, y, ...).
    pub fn from_shape(shape: &[usize]) -> Self {
        Self {
            low: vec![0; shape.len()],
            high: shape.iter().map(|&s| s as isize).collect(),
        }
    }

    fn validate_bounds(low: &[isize], high: &[isize]) -> Result<()> {
        ensure!(
            low.len() == high.len(),
            error::DimensionMismatchSnafu {
                argument: "high",
                expected: low.len(),
                found: high.len(),
            }
        );
        ensure!(
            low.iter().zip(high).all(|(&lo, &hi)| lo <= hi),
            error::InvalidGridBoundsSnafu {
                low: low.to_vec(),
                high: high.to_vec(),
            }
        );
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.low.len()
    }

    /// The inclusive lower bound of the given axis.
    pub fn low(&self, axis: usize) -> Result<isize> {
        self.low.get(axis).copied().ok_or_else(|| {
            error::Error::GridDimensionOutOfBounds {
                index: axis,
                dimension: self.dimension(),
            }
        })
    }

    /// The inclusive upper bound of the given axis.
    pub fn high(&self, axis: usize) -> Result<isize> {
        self.high.get(axis).map(|&h| h - 1).ok_or_else(|| {
            error::Error::GridDimensionOutOfBounds {
                index: axis,
                dimension: self.dimension(),
            }
        })
    }

    /// The number of cells along the given axis.
    pub fn span(&self, axis: usize) -> Result<usize> {
        Ok((self.high.get(axis).ok_or_else(|| {
            error::Error::GridDimensionOutOfBounds {
                index: axis,
                dimension: self.dimension(),
            }
        })? - self.low[axis]) as usize)
    }

    pub fn lows(&self) -> &[isize] {
        &self.low
    }

    pub fn highs(&self) -> Vec<isize> {
        self.high.iter().map(|&h| h - 1).collect()
    }

    pub fn spans(&self) -> Vec<usize> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(&lo, &hi)| (hi - lo) as usize)
            .collect()
    }

    pub fn number_of_elements(&self) -> usize {
        self.spans().iter().product()
    }

    pub fn contains(&self, index: &[isize]) -> bool {
        index.len() == self.dimension()
            && self
                .low
                .iter()
                .zip(&self.high)
                .zip(index)
                .all(|((&lo, &hi), &idx)| value_in_range_inclusive(idx, lo, hi - 1))
    }

    /// The cell-wise intersection. Returns `None` if the extents differ in
    /// dimension or share no cell.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if self.dimension() != other.dimension() {
            return None;
        }

        let mut low = Vec::with_capacity(self.dimension());
        let mut high = Vec::with_capacity(self.dimension());
        for axis in 0..self.dimension() {
            let lo = self.low[axis].max(other.low[axis]);
            let hi = self.high[axis].min(other.high[axis]);
            if lo >= hi {
                return None;
            }
            low.push(lo);
            high.push(hi);
        }

        Some(Self { low, high })
    }

    /// The sub-extent over the axis range `[lower_dim, upper_dim)`.
    ///
    /// # Errors
    ///
    /// Fails if the range is outside `[0, dimension]` or reversed.
    pub fn sub_extent(&self, lower_dim: usize, upper_dim: usize) -> Result<Self> {
        ensure!(
            upper_dim <= self.dimension(),
            error::GridDimensionOutOfBoundsSnafu {
                index: upper_dim,
                dimension: self.dimension(),
            }
        );
        ensure!(
            lower_dim <= upper_dim,
            error::GridDimensionOutOfBoundsSnafu {
                index: lower_dim,
                dimension: upper_dim,
            }
        );

        Ok(Self {
            low: self.low[lower_dim..upper_dim].to_vec(),
            high: self.high[lower_dim..upper_dim].to_vec(),
        })
    }
}
