pub mod collaborators;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;
pub mod prelude;

pub use collaborators::{Converter, FixedRateConverter, InMemoryStorage, Storage};
pub use error::{BridgeError, ErrorKind, Result};
pub use types::*;
