// Domain value objects
pub mod discount;
pub mod identifiers;
pub mod runtime_config;
pub mod status;

pub use discount::*;
pub use identifiers::*;
pub use runtime_config::*;
pub use status::*;
