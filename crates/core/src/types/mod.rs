pub mod order;
pub mod venue;
pub mod withdrawal;

pub use order::*;
pub use venue::*;
pub use withdrawal::*;
