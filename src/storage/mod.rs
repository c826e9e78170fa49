mod memory;
mod traits;

pub use memory::*;
pub use traits::*;
