use crate::error;
use crate::util::Result;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt::Debug;
use std::sync::Arc;

/// A mapping between two coordinate spaces, e.g. from grid index space into a
/// projected coordinate reference system.
///
/// The grid geometry only composes, inverts and re-anchors operations; the
/// actual projection math always lives behind this trait.
pub trait CoordinateOperation: Debug + Send + Sync {
    fn source_dimension(&self) -> usize;

    fn target_dimension(&self) -> usize;

    /// Maps `source` into `target`.
    ///
    /// # Errors
    ///
    /// Fails if the slice lengths do not match the operation's dimensions.
    fn apply(&self, source: &[f64], target: &mut [f64]) -> Result<()>;

    fn inverse(&self) -> Result<Arc<dyn CoordinateOperation>>;

    /// The affine view of this operation, if it is linear.
    fn as_affine(&self) -> Option<&AffineTransform> {
        None
    }
}

/// An affine mapping stored as a row-major matrix of `target_dimension` rows
/// and `source_dimension + 1` columns; the last column is the translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    source_dimension: usize,
    target_dimension: usize,
    coefficients: Vec<f64>,
}

impl AffineTransform {
    /// Creates a new affine transform from its matrix coefficients
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcover_datatypes::operations::AffineTransform;
    ///
    /// // x' = 0.2 * x - 60, y' = -0.2 * y + 40
    /// let transform = AffineTransform::new(2, 2, vec![
    ///     0.2, 0.0, -60.0,
    ///     0.0, -0.2, 40.0,
    /// ]).unwrap();
    ///
    /// assert_eq!(transform.apply_affine(&[0.0, 0.0]), vec![-60.0, 40.0]);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the coefficient count is not
    /// `target_dimension * (source_dimension + 1)`.
    ///
    pub fn new(
        source_dimension: usize,
        target_dimension: usize,
        coefficients: Vec<f64>,
    ) -> Result<Self> {
        ensure!(
            coefficients.len() == target_dimension * (source_dimension + 1),
            error::DimensionMismatchSnafu {
                argument: "coefficients",
                expected: target_dimension * (source_dimension + 1),
                found: coefficients.len(),
            }
        );

        Ok(Self {
            source_dimension,
            target_dimension,
            coefficients,
        })
    }

    pub fn identity(dimension: usize) -> Self {
        let mut coefficients = vec![0.0; dimension * (dimension + 1)];
        for axis in 0..dimension {
            coefficients[axis * (dimension + 1) + axis] = 1.0;
        }
        Self {
            source_dimension: dimension,
            target_dimension: dimension,
            coefficients,
        }
    }

    /// A diagonal transform: `x'[i] = scales[i] * x[i] + translations[i]`.
    pub fn from_scale_and_translation(scales: &[f64], translations: &[f64]) -> Result<Self> {
        ensure!(
            scales.len() == translations.len(),
            error::DimensionMismatchSnafu {
                argument: "translations",
                expected: scales.len(),
                found: translations.len(),
            }
        );

        let dimension = scales.len();
        let mut coefficients = vec![0.0; dimension * (dimension + 1)];
        for axis in 0..dimension {
            coefficients[axis * (dimension + 1) + axis] = scales[axis];
            coefficients[axis * (dimension + 1) + dimension] = translations[axis];
        }

        Ok(Self {
            source_dimension: dimension,
            target_dimension: dimension,
            coefficients,
        })
    }

    pub fn translation(offsets: &[f64]) -> Self {
        let dimension = offsets.len();
        let mut transform = Self::identity(dimension);
        for axis in 0..dimension {
            transform.coefficients[axis * (dimension + 1) + dimension] = offsets[axis];
        }
        transform
    }

    fn row_stride(&self) -> usize {
        self.source_dimension + 1
    }

    pub fn coefficient(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.target_dimension || column > self.source_dimension {
            return None;
        }
        Some(self.coefficients[row * self.row_stride() + column])
    }

    /// Applies the transform without dimension checks on the output buffer.
    pub fn apply_affine(&self, source: &[f64]) -> Vec<f64> {
        let stride = self.row_stride();
        (0..self.target_dimension)
            .map(|row| {
                let coefficients = &self.coefficients[row * stride..(row + 1) * stride];
                let linear: f64 = coefficients[..self.source_dimension]
                    .iter()
                    .zip(source)
                    .map(|(&c, &s)| c * s)
                    .sum();
                linear + coefficients[self.source_dimension]
            })
            .collect()
    }

    /// Composes `self` with `next`, applying `self` first.
    pub fn then(&self, next: &AffineTransform) -> Result<AffineTransform> {
        ensure!(
            next.source_dimension == self.target_dimension,
            error::DimensionMismatchSnafu {
                argument: "next",
                expected: self.target_dimension,
                found: next.source_dimension,
            }
        );

        let stride = self.row_stride();
        let mut coefficients = Vec::with_capacity(next.target_dimension * stride);
        for row in 0..next.target_dimension {
            for column in 0..=self.source_dimension {
                let mut sum: f64 = (0..self.target_dimension)
                    .map(|k| {
                        next.coefficients[row * next.row_stride() + k]
                            * self.coefficients[k * stride + column]
                    })
                    .sum();
                if column == self.source_dimension {
                    sum += next.coefficients[row * next.row_stride() + next.source_dimension];
                }
                coefficients.push(sum);
            }
        }

        Ok(AffineTransform {
            source_dimension: self.source_dimension,
            target_dimension: next.target_dimension,
            coefficients,
        })
    }

    /// Composes a constant grid-space offset into the transform:
    /// the result maps `g` to `self(g + offsets)`.
    pub fn pre_translated(&self, offsets: &[f64]) -> Result<AffineTransform> {
        ensure!(
            offsets.len() == self.source_dimension,
            error::DimensionMismatchSnafu {
                argument: "offsets",
                expected: self.source_dimension,
                found: offsets.len(),
            }
        );

        let stride = self.row_stride();
        let mut result = self.clone();
        for row in 0..self.target_dimension {
            let shift: f64 = (0..self.source_dimension)
                .map(|k| self.coefficients[row * stride + k] * offsets[k])
                .sum();
            result.coefficients[row * stride + self.source_dimension] += shift;
        }
        Ok(result)
    }

    /// Inverts the transform via Gauss-Jordan elimination with partial
    /// pivoting.
    ///
    /// # Errors
    ///
    /// Fails with `NonInvertibleTransform` if the transform is not square or
    /// its linear part is singular.
    pub fn inverted(&self) -> Result<AffineTransform> {
        ensure!(
            self.source_dimension == self.target_dimension,
            error::NonInvertibleTransformSnafu
        );

        let n = self.source_dimension;
        let stride = self.row_stride();

        // augmented [A | I] over the linear part
        let mut a = vec![0.0; n * n];
        let mut inv = vec![0.0; n * n];
        for row in 0..n {
            for column in 0..n {
                a[row * n + column] = self.coefficients[row * stride + column];
            }
            inv[row * n + row] = 1.0;
        }

        for pivot in 0..n {
            let mut pivot_row = pivot;
            let mut pivot_value = a[pivot * n + pivot].abs();
            for row in pivot + 1..n {
                let candidate = a[row * n + pivot].abs();
                if candidate > pivot_value {
                    pivot_row = row;
                    pivot_value = candidate;
                }
            }
            ensure!(pivot_value > 0.0, error::NonInvertibleTransformSnafu);

            if pivot_row != pivot {
                for column in 0..n {
                    a.swap(pivot * n + column, pivot_row * n + column);
                    inv.swap(pivot * n + column, pivot_row * n + column);
                }
            }

            let divisor = a[pivot * n + pivot];
            for column in 0..n {
                a[pivot * n + column] /= divisor;
                inv[pivot * n + column] /= divisor;
            }

            for row in 0..n {
                if row == pivot {
                    continue;
                }
                let factor = a[row * n + pivot];
                if factor == 0.0 {
                    continue;
                }
                for column in 0..n {
                    a[row * n + column] -= factor * a[pivot * n + column];
                    inv[row * n + column] -= factor * inv[pivot * n + column];
                }
            }
        }

        // x = A⁻¹ (y - t)  ⇒  translation is -A⁻¹ t
        let mut coefficients = vec![0.0; n * (n + 1)];
        for row in 0..n {
            for column in 0..n {
                coefficients[row * (n + 1) + column] = inv[row * n + column];
            }
            let translation: f64 = (0..n)
                .map(|k| inv[row * n + k] * self.coefficients[k * stride + n])
                .sum();
            coefficients[row * (n + 1) + n] = -translation;
        }

        Ok(AffineTransform {
            source_dimension: n,
            target_dimension: n,
            coefficients,
        })
    }

    /// The Euclidean norm of each source-axis column of the linear part.
    /// For a grid-to-world transform this is the cell size along each grid
    /// axis.
    pub fn column_magnitudes(&self) -> Vec<f64> {
        let stride = self.row_stride();
        (0..self.source_dimension)
            .map(|column| {
                (0..self.target_dimension)
                    .map(|row| {
                        let c = self.coefficients[row * stride + column];
                        c * c
                    })
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}

impl CoordinateOperation for AffineTransform {
    fn source_dimension(&self) -> usize {
        self.source_dimension
    }

    fn target_dimension(&self) -> usize {
        self.target_dimension
    }

    fn apply(&self, source: &[f64], target: &mut [f64]) -> Result<()> {
        ensure!(
            source.len() == self.source_dimension,
            error::DimensionMismatchSnafu {
                argument: "source",
                expected: self.source_dimension,
                found: source.len(),
            }
        );
        ensure!(
            target.len() == self.target_dimension,
            error::DimensionMismatchSnafu {
                argument: "target",
                expected: self.target_dimension,
                found: target.len(),
            }
        );

        target.copy_from_slice(&self.apply_affine(source));
        Ok(())
    }

    fn inverse(&self) -> Result<Arc<dyn CoordinateOperation>> {
        Ok(Arc::new(self.inverted()?))
    }

    fn as_affine(&self) -> Option<&AffineTransform> {
        Some(self)
    }
}

/// Two operations applied in sequence.
#[derive(Debug, Clone)]
pub struct ConcatenatedOperation {
    first: Arc<dyn CoordinateOperation>,
    second: Arc<dyn CoordinateOperation>,
}

impl ConcatenatedOperation {
    pub fn new(
        first: Arc<dyn CoordinateOperation>,
        second: Arc<dyn CoordinateOperation>,
    ) -> Result<Self> {
        ensure!(
            second.source_dimension() == first.target_dimension(),
            error::DimensionMismatchSnafu {
                argument: "second",
                expected: first.target_dimension(),
                found: second.source_dimension(),
            }
        );
        Ok(Self { first, second })
    }
}

impl CoordinateOperation for ConcatenatedOperation {
    fn source_dimension(&self) -> usize {
        self.first.source_dimension()
    }

    fn target_dimension(&self) -> usize {
        self.second.target_dimension()
    }

    fn apply(&self, source: &[f64], target: &mut [f64]) -> Result<()> {
        let mut intermediate = vec![0.0; self.first.target_dimension()];
        self.first.apply(source, &mut intermediate)?;
        self.second.apply(&intermediate, target)
    }

    fn inverse(&self) -> Result<Arc<dyn CoordinateOperation>> {
        Ok(Arc::new(ConcatenatedOperation {
            first: self.second.inverse()?,
            second: self.first.inverse()?,
        }))
    }
}

/// Concatenates two operations, collapsing affine pairs into a single matrix.
pub fn concatenate(
    first: Arc<dyn CoordinateOperation>,
    second: Arc<dyn CoordinateOperation>,
) -> Result<Arc<dyn CoordinateOperation>> {
    if let (Some(a), Some(b)) = (first.as_affine(), second.as_affine()) {
        return Ok(Arc::new(a.then(b)?));
    }
    Ok(Arc::new(ConcatenatedOperation::new(first, second)?))
}

/// Maps the corner points of an axis-aligned box through `operation` and
/// returns the per-axis min/max of the images.
///
/// Transforming all `2^n` corners keeps the result tight for rotating and
/// mildly curved operations, not only for diagonal ones.
pub fn transform_corners(
    operation: &dyn CoordinateOperation,
    min: &[f64],
    max: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let source_dimension = operation.source_dimension();
    ensure!(
        min.len() == source_dimension && max.len() == source_dimension,
        error::DimensionMismatchSnafu {
            argument: "min",
            expected: source_dimension,
            found: min.len(),
        }
    );

    let target_dimension = operation.target_dimension();
    let mut out_min = vec![f64::NAN; target_dimension];
    let mut out_max = vec![f64::NAN; target_dimension];
    let mut corner = vec![0.0; source_dimension];
    let mut image = vec![0.0; target_dimension];

    for combination in 0..(1_usize << source_dimension) {
        for (axis, c) in corner.iter_mut().enumerate() {
            *c = if combination & (1 << axis) == 0 {
                min[axis]
            } else {
                max[axis]
            };
        }
        operation.apply(&corner, &mut image)?;
        for axis in 0..target_dimension {
            // f64::min/max ignore NaN operands, which seeds the accumulators
            out_min[axis] = out_min[axis].min(image[axis]);
            out_max[axis] = out_max[axis].max(image[axis]);
        }
    }

    Ok((out_min, out_max))
}
