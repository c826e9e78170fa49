mod aggregate;
mod factory;
pub(crate) mod sync;

pub use aggregate::Dak;
pub use factory::{DakFactory, DakOrigin};
