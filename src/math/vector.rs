use serde::{Serialize, Deserialize};
use std::ops::{Index, IndexMut};

use crate::error::{NervError, Result, Shape};

/// Owned 1-D float buffer. Size is always `data.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub data: Vec<f32>,
}

impl Vector {
    pub fn zeros(size: usize) -> Vector {
        Vector { data: vec![0.0; size] }
    }

    /// Builds a vector from an explicit list of values.
    pub fn from_values(values: &[f32]) -> Vector {
        Vector { data: values.to_vec() }
    }

    /// Builds a vector with every component set to `val`.
    pub fn uniform(size: usize, val: f32) -> Vector {
        Vector { data: vec![val; size] }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Multiplies every component by `k` in place.
    pub fn scale(&mut self, k: f32) {
        for x in &mut self.data {
            *x *= k;
        }
    }

    /// `self += src`, component-wise.
    pub fn add(&mut self, src: &Vector) -> Result<()> {
        self.check_same_size("vector add", src)?;
        for (d, s) in self.data.iter_mut().zip(&src.data) {
            *d += s;
        }
        Ok(())
    }

    /// `self -= src`, component-wise.
    pub fn sub(&mut self, src: &Vector) -> Result<()> {
        self.check_same_size("vector sub", src)?;
        for (d, s) in self.data.iter_mut().zip(&src.data) {
            *d -= s;
        }
        Ok(())
    }

    /// `self *= src`, component-wise (Hadamard product).
    pub fn hadamard(&mut self, src: &Vector) -> Result<()> {
        self.check_same_size("vector hadamard", src)?;
        for (d, s) in self.data.iter_mut().zip(&src.data) {
            *d *= s;
        }
        Ok(())
    }

    /// Returns a fresh vector with `f` applied to every component.
    pub fn map<F>(&self, f: F) -> Vector
    where
        F: Fn(f32) -> f32,
    {
        Vector { data: self.data.iter().map(|&x| f(x)).collect() }
    }

    /// Fills `self` with `f` applied to every component of `src`.
    /// Reuses the existing buffer; sizes must agree.
    pub fn map_from<F>(&mut self, src: &Vector, f: F) -> Result<()>
    where
        F: Fn(f32) -> f32,
    {
        self.check_same_size("vector map_from", src)?;
        for (d, &s) in self.data.iter_mut().zip(&src.data) {
            *d = f(s);
        }
        Ok(())
    }

    pub fn fill(&mut self, val: f32) {
        for x in &mut self.data {
            *x = val;
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.data.iter()
    }

    fn check_same_size(&self, op: &'static str, other: &Vector) -> Result<()> {
        if self.size() != other.size() {
            return Err(NervError::ShapeMismatch {
                op,
                lhs: Shape::Vector(self.size()),
                rhs: Shape::Vector(other.size()),
            });
        }
        Ok(())
    }
}

impl Index<usize> for Vector {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.data[i]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.data[i]
    }
}
