mod default;
mod target_registry;

pub use default::*;
pub use target_registry::*;
