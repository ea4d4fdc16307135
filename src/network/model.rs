use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NervError, Result, Shape};
use crate::layers::dense::Layer;
use crate::math::vector::Vector;
use crate::rng::prng::Prng;

/// A dense feedforward network: layers in network order, input first.
///
/// Layer 0's activation is written by the caller before [`forward`]
/// (its bias, pre-activation and delta are allocated but unused); the last
/// layer carries no outgoing weights.
///
/// [`forward`]: Model::forward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub layers: Vec<Layer>,
}

impl Model {
    /// Builds a zero-filled model from per-layer neuron counts.
    /// Layer `i`'s weight shape is `counts[i+1] × counts[i]`.
    ///
    /// # Panics
    /// Panics if `counts` is empty.
    pub fn new(counts: &[usize]) -> Model {
        assert!(!counts.is_empty(), "a model needs at least one layer");
        let layers = counts
            .iter()
            .enumerate()
            .map(|(i, &size)| Layer::new(size, counts.get(i + 1).copied().unwrap_or(0)))
            .collect();
        Model { layers }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::size).collect()
    }

    /// Input layer's activation, for the caller to fill before `forward`.
    pub fn input_mut(&mut self) -> &mut Vector {
        &mut self.layers[0].a
    }

    /// Output layer's activation, valid after `forward`.
    pub fn output(&self) -> &Vector {
        &self.layers[self.layers.len() - 1].a
    }

    /// Copies `values` into the input layer's activation.
    pub fn set_input(&mut self, values: &[f32]) -> Result<()> {
        let input = &mut self.layers[0].a;
        if values.len() != input.size() {
            return Err(NervError::ShapeMismatch {
                op: "model set_input",
                lhs: Shape::Vector(input.size()),
                rhs: Shape::Vector(values.len()),
            });
        }
        input.data.copy_from_slice(values);
        Ok(())
    }

    /// Fills every weight matrix with Gaussian draws scaled by the inverse
    /// of the layer's own neuron count (its fan-in). Biases stay zero.
    pub fn init(&mut self, rng: &mut Prng) {
        for layer in &mut self.layers {
            if !layer.has_weights() {
                continue;
            }
            let fan_in = layer.size() as f32;
            for w in &mut layer.w.data {
                *w = rng.gaussian() / fan_in;
            }
        }
    }

    /// Forward propagation: for every boundary i → i+1,
    /// `z_{i+1} = w_i · a_i + b_{i+1}` and `a_{i+1} = sigmoid(z_{i+1})`,
    /// overwriting each layer's own `z`/`a` buffers.
    pub fn forward(&mut self) -> Result<()> {
        for i in 0..self.layers.len().saturating_sub(1) {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let layer = &head[i];
            let next = &mut tail[0];

            layer.w.mul_vec_into(&layer.a, &mut next.z)?;
            next.z.add(&next.b)?;
            ActivationFunction::Sigmoid.map_into(&next.z, &mut next.a)?;
        }
        Ok(())
    }

    /// Backpropagation of error against `desired_output`.
    ///
    /// Output layer: `d = sigmoid'(z) ⊙ 2(a − y)`. Every earlier layer i:
    /// `d_i = sigmoid'(z_i) ⊙ (w_iᵗ · d_{i+1})`. Deltas are fully
    /// overwritten each call; nothing accumulates across calls.
    pub fn backward(&mut self, desired_output: &Vector) -> Result<()> {
        let last = self.layers.len() - 1;

        let out = &mut self.layers[last];
        let mut c = out.a.clone();
        c.sub(desired_output)?;
        c.scale(2.0);
        ActivationFunction::Sigmoid.map_derivative_into(&out.z, &mut out.d)?;
        out.d.hadamard(&c)?;

        for i in (0..last).rev() {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let layer = &mut head[i];
            let next = &tail[0];

            let c = layer.w.mul_vec_transposed(&next.d)?;
            ActivationFunction::Sigmoid.map_derivative_into(&layer.z, &mut layer.d)?;
            layer.d.hadamard(&c)?;
        }
        Ok(())
    }

    /// Raw sum of squared differences between the output activation and
    /// `desired_output`. Deliberately not averaged.
    pub fn cost(&self, desired_output: &Vector) -> Result<f32> {
        let out = &self.layers[self.layers.len() - 1].a;
        if out.size() != desired_output.size() {
            return Err(NervError::ShapeMismatch {
                op: "model cost",
                lhs: Shape::Vector(out.size()),
                rhs: Shape::Vector(desired_output.size()),
            });
        }
        Ok(out
            .iter()
            .zip(desired_output.iter())
            .map(|(a, y)| (a - y) * (a - y))
            .sum())
    }

    /// Gradient-descent step with learning rate `alpha`: per boundary
    /// i → i+1, `b_{i+1} -= alpha·d_{i+1}` and
    /// `w_i[x,y] -= a_i[x] · alpha·d_{i+1}[y]` (outer-product gradient).
    ///
    /// The scaled step is computed on the fly; the stored deltas are left
    /// untouched, so repeated calls never compound the learning rate.
    pub fn update(&mut self, alpha: f32) -> Result<()> {
        for i in 0..self.layers.len().saturating_sub(1) {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let layer = &mut head[i];
            let next = &mut tail[0];

            let w = &mut layer.w;
            if layer.a.size() != w.cols || next.d.size() != w.rows {
                return Err(NervError::ShapeMismatch {
                    op: "model update",
                    lhs: Shape::Matrix(w.rows, w.cols),
                    rhs: Shape::Vector(next.d.size()),
                });
            }
            for y in 0..w.rows {
                let step = alpha * next.d[y];
                next.b[y] -= step;
                for x in 0..w.cols {
                    w.data[y * w.cols + x] -= layer.a[x] * step;
                }
            }
        }
        Ok(())
    }

    /// Serializes the whole model (every buffer) to pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> Result<Model> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    /// [2,2,1] model with fixed parameters, per-neuron values chosen so the
    /// whole pipeline can be checked by hand.
    fn fixed_model() -> Model {
        let mut model = Model::new(&[2, 2, 1]);
        model.layers[0].w = Matrix::from_values(2, 2, &[0.5, -0.25, 1.0, 0.75]);
        model.layers[1].b = Vector::from_values(&[0.1, -0.1]);
        model.layers[1].w = Matrix::from_values(1, 2, &[0.8, -0.5]);
        model.layers[2].b = Vector::from_values(&[0.2]);
        model.set_input(&[1.0, 0.0]).unwrap();
        model
    }

    #[test]
    fn new_derives_weight_shapes_from_consecutive_counts() {
        let model = Model::new(&[3, 4, 2]);
        assert_eq!(model.layer_sizes(), vec![3, 4, 2]);
        assert_eq!(model.layers[0].w.rows, 4);
        assert_eq!(model.layers[0].w.cols, 3);
        assert_eq!(model.layers[1].w.rows, 2);
        assert_eq!(model.layers[1].w.cols, 4);
        assert!(!model.layers[2].has_weights());
    }

    #[test]
    fn init_fills_weights_scaled_by_fan_in_and_is_reproducible() {
        let mut a = Model::new(&[3, 4, 2]);
        let mut b = Model::new(&[3, 4, 2]);
        a.init(&mut Prng::seed(11));
        b.init(&mut Prng::seed(11));
        assert_eq!(a, b);

        assert!(a.layers[0].w.data.iter().any(|&w| w != 0.0));
        assert!(a.layers[1].w.data.iter().any(|&w| w != 0.0));
        // Biases are not initialized.
        assert!(a.layers[1].b.iter().all(|&x| x == 0.0));

        // Draws mirror the generator stream divided by each fan-in.
        let mut rng = Prng::seed(11);
        for layer in &a.layers {
            if !layer.has_weights() {
                continue;
            }
            let fan_in = layer.size() as f32;
            for &w in &layer.w.data {
                assert_eq!(w, rng.gaussian() / fan_in);
            }
        }
    }

    #[test]
    fn forward_computes_hand_checked_values() {
        let mut model = fixed_model();
        model.forward().unwrap();

        // z1 = w0·a0 + b1 = [0.5, 1.0] + [0.1, -0.1]
        assert!((model.layers[1].z[0] - 0.6).abs() < 1e-6);
        assert!((model.layers[1].z[1] - 0.9).abs() < 1e-6);
        assert!((model.layers[1].a[0] - sigmoid(0.6)).abs() < 1e-6);
        assert!((model.layers[1].a[1] - sigmoid(0.9)).abs() < 1e-6);

        // z2 = 0.8·σ(0.6) − 0.5·σ(0.9) + 0.2
        let z2 = 0.8 * sigmoid(0.6) - 0.5 * sigmoid(0.9) + 0.2;
        assert!((model.layers[2].z[0] - z2).abs() < 1e-6);
        assert!((model.output()[0] - 0.589288).abs() < 1e-5);
    }

    #[test]
    fn forward_leaves_input_layer_untouched() {
        let mut model = fixed_model();
        model.forward().unwrap();
        assert_eq!(model.layers[0].a.data, vec![1.0, 0.0]);
        assert!(model.layers[0].z.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn backward_output_delta_follows_chain_rule() {
        let mut model = fixed_model();
        model.forward().unwrap();
        let desired = Vector::from_values(&[1.0]);
        model.backward(&desired).unwrap();

        let a2 = model.output()[0];
        let expected = 2.0 * (a2 - 1.0) * a2 * (1.0 - a2);
        assert!((model.layers[2].d[0] - expected).abs() < 1e-6);
        assert!((model.layers[2].d[0] + 0.198808).abs() < 1e-4);
    }

    #[test]
    fn backward_propagates_delta_through_transposed_weights() {
        let mut model = fixed_model();
        model.forward().unwrap();
        model.backward(&Vector::from_values(&[1.0])).unwrap();

        let d2 = model.layers[2].d[0];
        let z1 = &model.layers[1].z;
        // d1 = σ'(z1) ⊙ (w1ᵗ · d2), with w1 = [0.8, -0.5]
        let s0 = sigmoid(z1[0]);
        let s1 = sigmoid(z1[1]);
        assert!((model.layers[1].d[0] - s0 * (1.0 - s0) * 0.8 * d2).abs() < 1e-6);
        assert!((model.layers[1].d[1] - s1 * (1.0 - s1) * -0.5 * d2).abs() < 1e-6);
    }

    #[test]
    fn backward_overwrites_deltas_instead_of_accumulating() {
        let mut model = fixed_model();
        model.forward().unwrap();
        let desired = Vector::from_values(&[1.0]);
        model.backward(&desired).unwrap();
        let first = model.layers[1].d.clone();
        model.backward(&desired).unwrap();
        assert_eq!(model.layers[1].d, first);
    }

    #[test]
    fn backward_rejects_wrong_desired_size() {
        let mut model = fixed_model();
        model.forward().unwrap();
        assert!(model.backward(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn update_decreases_cost_for_a_small_learning_rate() {
        let mut model = fixed_model();
        let desired = Vector::from_values(&[1.0]);

        model.forward().unwrap();
        let before = model.cost(&desired).unwrap();
        model.backward(&desired).unwrap();
        model.update(0.1).unwrap();

        model.forward().unwrap();
        let after = model.cost(&desired).unwrap();
        assert!(after < before, "cost went {before} -> {after}");
    }

    #[test]
    fn update_does_not_mutate_the_stored_deltas() {
        let mut model = fixed_model();
        let desired = Vector::from_values(&[1.0]);
        model.forward().unwrap();
        model.backward(&desired).unwrap();

        let deltas: Vec<Vector> = model.layers.iter().map(|l| l.d.clone()).collect();
        model.update(0.1).unwrap();
        for (layer, d) in model.layers.iter().zip(&deltas) {
            assert_eq!(&layer.d, d);
        }
    }

    #[test]
    fn update_applies_the_outer_product_gradient() {
        let mut model = fixed_model();
        let desired = Vector::from_values(&[1.0]);
        model.forward().unwrap();
        model.backward(&desired).unwrap();

        let w_before = model.layers[1].w.clone();
        let b_before = model.layers[2].b.clone();
        let a1 = model.layers[1].a.clone();
        let d2 = model.layers[2].d[0];

        let alpha = 0.1;
        model.update(alpha).unwrap();

        assert!((model.layers[2].b[0] - (b_before[0] - alpha * d2)).abs() < 1e-6);
        for x in 0..2 {
            let expected = w_before.at(x, 0) - a1[x] * alpha * d2;
            assert!((model.layers[1].w.at(x, 0) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn cost_is_nonnegative_and_zero_only_on_exact_match() {
        let mut model = fixed_model();
        model.forward().unwrap();

        let desired = Vector::from_values(&[0.3]);
        assert!(model.cost(&desired).unwrap() > 0.0);

        let exact = model.output().clone();
        assert_eq!(model.cost(&exact).unwrap(), 0.0);
    }

    #[test]
    fn cost_is_a_raw_sum_not_a_mean() {
        let mut model = Model::new(&[1, 2]);
        model.layers[1].a = Vector::from_values(&[1.0, 3.0]);
        let desired = Vector::from_values(&[0.0, 0.0]);
        // 1² + 3², not (1² + 3²)/2
        assert_eq!(model.cost(&desired).unwrap(), 10.0);
    }

    #[test]
    fn training_drives_xor_pair_apart() {
        // A few hundred cycles on two opposing samples must separate the
        // outputs; this exercises the full forward/backward/update loop.
        let mut model = Model::new(&[2, 3, 1]);
        model.init(&mut Prng::seed(3));

        let samples = [([0.0f32, 1.0], 1.0f32), ([1.0f32, 1.0], 0.0f32)];
        for _ in 0..2000 {
            for (input, target) in &samples {
                model.set_input(input).unwrap();
                model.forward().unwrap();
                model.backward(&Vector::from_values(&[*target])).unwrap();
                model.update(0.5).unwrap();
            }
        }

        model.set_input(&[0.0, 1.0]).unwrap();
        model.forward().unwrap();
        let high = model.output()[0];
        model.set_input(&[1.0, 1.0]).unwrap();
        model.forward().unwrap();
        let low = model.output()[0];
        assert!(high > low + 0.3, "outputs failed to separate: {high} vs {low}");
    }
}
