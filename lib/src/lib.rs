mod delete;
mod fs;
mod path;
mod scanner;
pub mod target;
pub mod utils;

pub use delete::*;
pub use fs::{
    compute_size,
    estimate_size,
    SizeStrategy,
};
pub(crate) use fs::DirWalker;
pub use path::*;
pub use scanner::*;
pub use target::{
    ArtifactKind,
    DirectoryEntry,
    ScanResult,
};
