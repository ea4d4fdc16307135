use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;
use crate::math::vector::Vector;

/// One fully-connected layer's state.
///
/// `w` maps this layer's activation into the *next* layer's pre-activation,
/// so its shape is `next_size × size`. The last layer of a model has no
/// outgoing weights and carries [`Matrix::empty`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Outgoing weights, `next_size × size`; empty on the output layer.
    pub w: Matrix,
    /// Bias added to this layer's pre-activation.
    pub b: Vector,
    /// Pre-activation `z = w_prev · a_prev + b`, kept for backprop.
    pub z: Vector,
    /// Activation `a = sigmoid(z)`; on the input layer, set by the caller.
    pub a: Vector,
    /// Error delta `∂cost/∂z`, overwritten by every backward pass.
    pub d: Vector,
}

impl Layer {
    /// Zero-filled layer of `size` neurons feeding `next_size` neurons.
    /// `next_size == 0` marks the output layer.
    pub fn new(size: usize, next_size: usize) -> Layer {
        Layer {
            w: if next_size > 0 { Matrix::zeros(next_size, size) } else { Matrix::empty() },
            b: Vector::zeros(size),
            z: Vector::zeros(size),
            a: Vector::zeros(size),
            d: Vector::zeros(size),
        }
    }

    /// Neuron count.
    pub fn size(&self) -> usize {
        self.a.size()
    }

    /// Whether this layer owns an outgoing weight matrix.
    pub fn has_weights(&self) -> bool {
        !self.w.is_empty()
    }
}
