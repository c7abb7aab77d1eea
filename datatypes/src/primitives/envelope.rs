use crate::error;
use crate::spatial_reference::SpatialReferenceOption;
use crate::util::Result;
use crate::util::helpers::snap_to_integer;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// An axis-aligned bounding box in world coordinates, tagged with the
/// spatial reference it is expressed in.
///
/// Note: may degenerate to a point, and single axes may be undefined (NaN).
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    min: Vec<f64>,
    max: Vec<f64>,
    spatial_reference: SpatialReferenceOption,
}

impl Envelope {
    /// Creates a new envelope
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcover_datatypes::primitives::Envelope;
    /// use gridcover_datatypes::spatial_reference::SpatialReferenceOption;
    ///
    /// let envelope = Envelope::new(
    ///     vec![-60.0, -40.0],
    ///     vec![60.0, 40.0],
    ///     SpatialReferenceOption::Unreferenced,
    /// ).unwrap();
    ///
    /// assert_eq!(envelope.dimension(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// This constructor fails if `min` and `max` disagree on dimensionality or
    /// if `min[i] > max[i]` on some axis. NaN bounds are allowed and mark the
    /// axis as undefined.
    ///
    pub fn new(
        min: Vec<f64>,
        max: Vec<f64>,
        spatial_reference: SpatialReferenceOption,
    ) -> Result<Self> {
        ensure!(
            min.len() == max.len(),
            error::DimensionMismatchSnafu {
                argument: "max",
                expected: min.len(),
                found: max.len(),
            }
        );
        ensure!(
            min.iter().zip(&max).all(|(&lo, &hi)| !(lo > hi)),
            error::InvalidEnvelopeSnafu {
                min: min.clone(),
                max: max.clone(),
            }
        );

        Ok(Self {
            min,
            max,
            spatial_reference,
        })
    }

    pub fn new_unchecked(
        min: Vec<f64>,
        max: Vec<f64>,
        spatial_reference: SpatialReferenceOption,
    ) -> Self {
        Self {
            min,
            max,
            spatial_reference,
        }
    }

    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self, axis: usize) -> Result<f64> {
        self.min.get(axis).copied().ok_or_else(|| {
            error::Error::GridDimensionOutOfBounds {
                index: axis,
                dimension: self.dimension(),
            }
        })
    }

    pub fn max(&self, axis: usize) -> Result<f64> {
        self.max.get(axis).copied().ok_or_else(|| {
            error::Error::GridDimensionOutOfBounds {
                index: axis,
                dimension: self.dimension(),
            }
        })
    }

    pub fn mins(&self) -> &[f64] {
        &self.min
    }

    pub fn maxs(&self) -> &[f64] {
        &self.max
    }

    pub fn span(&self, axis: usize) -> Result<f64> {
        Ok(self.max(axis)? - self.min(axis)?)
    }

    pub fn center(&self, axis: usize) -> Result<f64> {
        Ok(0.5 * (self.max(axis)? + self.min(axis)?))
    }

    pub fn spatial_reference(&self) -> SpatialReferenceOption {
        self.spatial_reference
    }

    #[must_use]
    pub fn with_spatial_reference(mut self, spatial_reference: SpatialReferenceOption) -> Self {
        self.spatial_reference = spatial_reference;
        self
    }

    /// True if every axis is undefined, i.e. NaN on its lower or upper bound.
    pub fn is_undefined(&self) -> bool {
        self.min
            .iter()
            .zip(&self.max)
            .all(|(lo, hi)| lo.is_nan() || hi.is_nan())
    }

    pub fn contains_point(&self, point: &[f64]) -> bool {
        point.len() == self.dimension()
            && self
                .min
                .iter()
                .zip(&self.max)
                .zip(point)
                .all(|((&lo, &hi), &p)| p >= lo && p <= hi)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.dimension() == other.dimension()
            && self
                .min
                .iter()
                .zip(&self.max)
                .zip(other.min.iter().zip(&other.max))
                .all(|((&lo, &hi), (&other_lo, &other_hi))| lo <= other_hi && other_lo <= hi)
    }

    /// Snaps bounds that sit within `max_ulps` of an integer to that integer.
    /// Applied to derived envelopes only, to suppress floating-point noise
    /// from transform round trips.
    #[must_use]
    pub(crate) fn snapped_to_integers(mut self, max_ulps: i64) -> Self {
        for bound in self.min.iter_mut().chain(self.max.iter_mut()) {
            *bound = snap_to_integer(*bound, max_ulps);
        }
        self
    }
}
