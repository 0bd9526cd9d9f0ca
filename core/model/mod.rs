mod external_repo;
mod label;
mod source_globs;
mod source_set;
mod target;
mod target_id;
mod visibility;

pub use external_repo::*;
pub use label::*;
pub use source_globs::*;
pub use source_set::*;
pub use target::*;
pub use target_id::*;
pub use visibility::*;
