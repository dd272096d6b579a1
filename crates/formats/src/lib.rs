pub mod metadata;
pub mod topology;

pub use metadata::*;
pub use topology::*;
