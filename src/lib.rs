pub mod activation;
pub mod error;
pub mod io;
pub mod layers;
pub mod math;
pub mod network;
pub mod rng;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use error::{NervError, Result};
pub use layers::dense::Layer;
pub use math::matrix::Matrix;
pub use math::vector::Vector;
pub use network::model::Model;
pub use rng::prng::Prng;
