pub mod activation;

pub use activation::{ActivationFunction, sigderiv, softmax, softmax_exp};
