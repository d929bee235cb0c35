//! Root-scoped filesystem abstraction for lockcheck.
//!
//! Lock files and manifests are always read relative to a project directory.
//! The [`FileSystem`] trait keeps every read inside that directory, on disk
//! ([`NativeFileSystem`]) or from pre-loaded contents ([`MemoryFileSystem`]).
//!
//! # Example
//!
//! ```no_run
//! use lockcheck_fs::{FileSystem, NativeFileSystem};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = NativeFileSystem::new(".")?;
//! let lock = fs.read_to_string(Path::new("package-lock.json")).await?;
//! println!("{} bytes", lock.len());
//! # Ok(())
//! # }
//! ```

mod file_system;
pub use file_system::FileSystem;

mod paths;

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::NativeFileSystem;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "memory")]
pub use memory::MemoryFileSystem;
