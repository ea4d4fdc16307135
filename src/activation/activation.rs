use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::math::vector::Vector;

/// Pointwise nonlinearities and their derivatives.
///
/// The network's forward/backward passes are hard-wired to `Sigmoid`; the
/// other variants are part of the public math library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    LeakyReLU { slope: f32 },
}

impl ActivationFunction {
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::LeakyReLU { slope } => {
                if x >= 0.0 { x } else { slope * x }
            }
        }
    }

    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU { slope } => {
                if x >= 0.0 { 1.0 } else { *slope }
            }
        }
    }

    /// Fresh vector with the activation applied to every component.
    pub fn map(&self, v: &Vector) -> Vector {
        v.map(|x| self.function(x))
    }

    /// Fresh vector with the derivative applied to every component.
    pub fn map_derivative(&self, v: &Vector) -> Vector {
        v.map(|x| self.derivative(x))
    }

    /// In-place variants used on the training fast path.
    pub fn map_into(&self, src: &Vector, dst: &mut Vector) -> Result<()> {
        dst.map_from(src, |x| self.function(x))
    }

    pub fn map_derivative_into(&self, src: &Vector, dst: &mut Vector) -> Result<()> {
        dst.map_from(src, |x| self.derivative(x))
    }
}

/// Sigmoid derivative expressed in terms of an already-activated value:
/// `sigderiv(sigmoid(x)) == sigmoid'(x)`.
pub fn sigderiv(s: f32) -> f32 {
    s * (1.0 - s)
}

/// Sum-normalization of a vector, kept byte-for-byte compatible with the
/// original engine: each component is divided by the plain sum of all
/// components, with no exponentiation. A standard softmax is
/// [`softmax_exp`]; this one is only a valid distribution for positive
/// inputs and is preserved under its historical name.
pub fn softmax(v: &Vector) -> Vector {
    let total: f32 = v.iter().sum();
    v.map(|x| x / total)
}

/// Standard softmax: exponentiates (shifted by the max for stability)
/// before normalizing.
pub fn softmax_exp(v: &Vector) -> Vector {
    let max = v.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp = v.map(|x| (x - max).exp());
    let total: f32 = exp.iter().sum();
    exp.map(|x| x / total)
}
