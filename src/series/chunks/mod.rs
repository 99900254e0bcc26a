mod chunk;
mod partition;
mod uncompressed;

pub use chunk::*;
pub use partition::*;
pub use uncompressed::*;
