pub mod binary_search;
pub mod pool;
mod types;

pub use types::*;
