pub mod id_generator;
pub mod math;

pub use id_generator::*;
pub use math::*;
