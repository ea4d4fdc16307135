use serde::{Serialize, Deserialize};

use crate::error::{NervError, Result, Shape};
use crate::math::vector::Vector;

/// Owned row-major 2-D float buffer. Element (x, y) — column x, row y —
/// lives at `data[y * cols + x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Builds a matrix from an explicit row-major list of values.
    /// `values.len()` must be `rows * cols`.
    pub fn from_values(rows: usize, cols: usize, values: &[f32]) -> Matrix {
        assert_eq!(values.len(), rows * cols, "row-major value count must be rows*cols");
        Matrix { rows, cols, data: values.to_vec() }
    }

    /// Builds a matrix with every entry set to `val`.
    pub fn uniform(rows: usize, cols: usize, val: f32) -> Matrix {
        Matrix { rows, cols, data: vec![val; rows * cols] }
    }

    /// n×n matrix with 1.0 on the diagonal.
    pub fn identity(n: usize) -> Matrix {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// The 0×0 matrix; stands in for "no weights" on a model's last layer.
    pub fn empty() -> Matrix {
        Matrix { rows: 0, cols: 0, data: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }

    pub fn shape(&self) -> Shape {
        Shape::Matrix(self.rows, self.cols)
    }

    /// Element at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.cols + x]
    }

    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut f32 {
        &mut self.data[y * self.cols + x]
    }

    /// Returns a fresh `cols × rows` transpose.
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for y in 0..self.rows {
            for x in 0..self.cols {
                t.data[x * self.rows + y] = self.data[y * self.cols + x];
            }
        }
        t
    }

    /// Returns a fresh copy with every entry multiplied by `k`.
    pub fn scaled(&self, k: f32) -> Matrix {
        self.map(|x| x * k)
    }

    /// Returns a fresh matrix with `f` applied to every entry.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f32) -> f32,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Standard triple-loop product; requires `self.cols == b.rows`.
    pub fn matmul(&self, b: &Matrix) -> Result<Matrix> {
        if self.cols != b.rows {
            return Err(NervError::ShapeMismatch {
                op: "matrix multiply",
                lhs: self.shape(),
                rhs: b.shape(),
            });
        }
        let mut out = Matrix::zeros(self.rows, b.cols);
        for y in 0..out.rows {
            for x in 0..out.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[y * self.cols + k] * b.data[k * b.cols + x];
                }
                out.data[y * out.cols + x] = sum;
            }
        }
        Ok(out)
    }

    /// Entry-wise product of two same-shape matrices.
    pub fn hadamard(&self, b: &Matrix) -> Result<Matrix> {
        if self.rows != b.rows || self.cols != b.cols {
            return Err(NervError::ShapeMismatch {
                op: "matrix hadamard",
                lhs: self.shape(),
                rhs: b.shape(),
            });
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&b.data).map(|(a, b)| a * b).collect(),
        })
    }

    /// `result[y] = Σ_x self[x,y] * v[x]`; requires `v.size == self.cols`.
    pub fn mul_vec(&self, v: &Vector) -> Result<Vector> {
        let mut out = Vector::zeros(self.rows);
        self.mul_vec_into(v, &mut out)?;
        Ok(out)
    }

    /// Like [`mul_vec`](Matrix::mul_vec) but writes into a caller-owned
    /// buffer of size `self.rows`, avoiding an allocation on the hot path.
    pub fn mul_vec_into(&self, v: &Vector, out: &mut Vector) -> Result<()> {
        if v.size() != self.cols {
            return Err(NervError::ShapeMismatch {
                op: "vector by matrix",
                lhs: self.shape(),
                rhs: Shape::Vector(v.size()),
            });
        }
        if out.size() != self.rows {
            return Err(NervError::ShapeMismatch {
                op: "vector by matrix",
                lhs: self.shape(),
                rhs: Shape::Vector(out.size()),
            });
        }
        for y in 0..self.rows {
            let row = &self.data[y * self.cols..(y + 1) * self.cols];
            let mut sum = 0.0;
            for (m, n) in row.iter().zip(&v.data) {
                sum += m * n;
            }
            out[y] = sum;
        }
        Ok(())
    }

    /// Product against the logical transpose of `self`, without
    /// materializing it: `result[x] = Σ_y self[x,y] * v[y]`.
    /// Requires `v.size == self.rows`.
    pub fn mul_vec_transposed(&self, v: &Vector) -> Result<Vector> {
        let mut out = Vector::zeros(self.cols);
        self.mul_vec_transposed_into(v, &mut out)?;
        Ok(out)
    }

    pub fn mul_vec_transposed_into(&self, v: &Vector, out: &mut Vector) -> Result<()> {
        if v.size() != self.rows {
            return Err(NervError::ShapeMismatch {
                op: "vector by matrix transposed",
                lhs: Shape::Matrix(self.cols, self.rows),
                rhs: Shape::Vector(v.size()),
            });
        }
        if out.size() != self.cols {
            return Err(NervError::ShapeMismatch {
                op: "vector by matrix transposed",
                lhs: Shape::Matrix(self.cols, self.rows),
                rhs: Shape::Vector(out.size()),
            });
        }
        for x in 0..self.cols {
            let mut sum = 0.0;
            for y in 0..self.rows {
                sum += self.data[y * self.cols + x] * v[y];
            }
            out[x] = sum;
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::empty()
    }
}
