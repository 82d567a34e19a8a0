// Public modules
pub mod build;
pub mod error;
pub mod install;
pub mod local_files;
pub mod refactor;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
