use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Explicit pseudo-random generator state. Passed by `&mut` into every
/// consumer (notably `Model::init`) so runs are reproducible from a seed.
#[derive(Debug)]
pub struct Prng {
    rng: StdRng,
}

impl Prng {
    /// Generator with a fixed seed; identical seeds yield identical draws.
    pub fn seed(seed: u64) -> Prng {
        Prng { rng: StdRng::seed_from_u64(seed) }
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Prng {
        Prng { rng: StdRng::from_entropy() }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Standard normal draw via the Box-Muller transform.
    pub fn gaussian(&mut self) -> f32 {
        // Both uniforms must land in (0, 1] to keep ln() finite.
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = 1.0 - self.rng.gen::<f64>();
        ((-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()) as f32
    }

    /// Normal draw with the given mean and standard deviation.
    pub fn normal(&mut self, mean: f32, std_dev: f32) -> f32 {
        self.gaussian() * std_dev + mean
    }
}
