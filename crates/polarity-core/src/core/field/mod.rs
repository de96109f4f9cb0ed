//! Volumetric scalar fields sampled on regular (possibly skewed) grids.
//!
//! A [`ScalarField`] owns a flat array of samples laid out in row-major order with the
//! fastest-varying index along the third grid axis, exactly as Gaussian cube files store
//! them. Sampling at arbitrary world coordinates uses trilinear interpolation and reports
//! points outside the grid with `NaN` rather than an error.

use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

const SINGULAR_DETERMINANT: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Grid axis matrix is singular (determinant {determinant:e})")]
    SingularAxes { determinant: f64 },

    #[error("Grid of {dims:?} points is too large to address")]
    TooLarge { dims: [usize; 3] },

    #[error("Grid of {dims:?} points needs {expected} values, got {actual}")]
    DataLength {
        dims: [usize; 3],
        expected: usize,
        actual: usize,
    },
}

/// Total number of points in a grid, or `None` if the product overflows `usize`.
pub fn grid_len(dims: [usize; 3]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    origin: Point3<f64>,
    /// Columns are the three grid step vectors.
    axes: Matrix3<f64>,
    inverse_axes: Matrix3<f64>,
    dims: [usize; 3],
    values: Vec<f64>,
}

impl ScalarField {
    /// Creates a field from grid geometry and samples.
    ///
    /// `axes[i]` is the world-space displacement of one step along grid axis `i`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TooLarge`] if the point count overflows `usize`,
    /// [`FieldError::DataLength`] if `values` does not hold exactly
    /// `dims[0] * dims[1] * dims[2]` samples and [`FieldError::SingularAxes`] if the axis
    /// vectors are (numerically) linearly dependent.
    pub fn new(
        origin: Point3<f64>,
        axes: [Vector3<f64>; 3],
        dims: [usize; 3],
        values: Vec<f64>,
    ) -> Result<Self, FieldError> {
        let expected = grid_len(dims).ok_or(FieldError::TooLarge { dims })?;
        if values.len() != expected {
            return Err(FieldError::DataLength {
                dims,
                expected,
                actual: values.len(),
            });
        }

        let axes = Matrix3::from_columns(&axes);
        let determinant = axes.determinant();
        if determinant.abs() < SINGULAR_DETERMINANT {
            return Err(FieldError::SingularAxes { determinant });
        }
        let inverse_axes = axes
            .try_inverse()
            .ok_or(FieldError::SingularAxes { determinant })?;

        Ok(Self {
            origin,
            axes,
            inverse_axes,
            dims,
            values,
        })
    }

    #[inline]
    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// The step vector of grid axis `axis` (0, 1 or 2).
    pub fn axis(&self, axis: usize) -> Vector3<f64> {
        self.axes.column(axis).into_owned()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    fn flat_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.dims[1] + iy) * self.dims[2] + iz
    }

    /// The stored sample at an integer grid index, if it exists.
    pub fn value_at(&self, ix: usize, iy: usize, iz: usize) -> Option<f64> {
        if ix >= self.dims[0] || iy >= self.dims[1] || iz >= self.dims[2] {
            return None;
        }
        Some(self.values[self.flat_index(ix, iy, iz)])
    }

    /// The world position of an integer grid index.
    pub fn grid_point(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        self.origin + self.axes * Vector3::new(ix as f64, iy as f64, iz as f64)
    }

    /// Maps a world position to fractional grid coordinates.
    pub fn fractional_coordinates(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.inverse_axes * (point - self.origin)
    }

    /// Samples the field at a world position by trilinear interpolation.
    ///
    /// Returns `NaN` when the enclosing cell is not fully inside the grid, i.e. when the
    /// floored fractional coordinate on any axis falls outside `[0, dim - 2]`. Callers must
    /// check for `NaN`.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.sample_at(&Point3::new(x, y, z))
    }

    /// Same as [`ScalarField::sample`], taking a point.
    pub fn sample_at(&self, point: &Point3<f64>) -> f64 {
        let frac = self.fractional_coordinates(point);

        let mut cell = [0usize; 3];
        let mut t = [0.0f64; 3];
        for axis in 0..3 {
            let f = frac[axis];
            if !f.is_finite() {
                return f64::NAN;
            }
            let floored = f.floor();
            let last_cell = self.dims[axis] as f64 - 2.0;
            if floored < 0.0 || floored > last_cell {
                return f64::NAN;
            }
            cell[axis] = floored as usize;
            t[axis] = f - floored;
        }

        let [ix, iy, iz] = cell;
        let [tx, ty, tz] = t;
        let v = |dx: usize, dy: usize, dz: usize| self.values[self.flat_index(ix + dx, iy + dy, iz + dz)];

        let corners = [
            v(0, 0, 0),
            v(1, 0, 0),
            v(0, 1, 0),
            v(1, 1, 0),
            v(0, 0, 1),
            v(1, 0, 1),
            v(0, 1, 1),
            v(1, 1, 1),
        ];

        let c00 = lerp(corners[0], corners[1], tx);
        let c10 = lerp(corners[2], corners[3], tx);
        let c01 = lerp(corners[4], corners[5], tx);
        let c11 = lerp(corners[6], corners[7], tx);

        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);

        lerp(c0, c1, tz)
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
