pub mod config;
pub mod error;
pub mod hash;
pub mod path;
pub mod progress;
pub mod tree;

pub use error::{Result, TreeError};
pub use hash::HashInfo;
pub use path::{RemotePath, Scheme};
pub use tree::{DEFAULT_URL_EXPIRY, TransferOptions, Tree, WalkMode};
