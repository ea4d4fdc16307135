pub mod console;
pub mod serialize;

pub use console::{scan_matrix, scan_model, scan_vector, ModelStructure};
pub use serialize::{load, save};
