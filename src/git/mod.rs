//! git
//!
//! Single interface for Git access.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. No other module imports
//! `git2`. The crate needs one read-only query, `git describe --tags`,
//! used by [`crate::version`] to derive a release version.
//!
//! # Example
//!
//! ```no_run
//! use argconf::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new(".")).unwrap();
//! println!("{}", git.describe(7).unwrap());
//! ```

mod interface;

pub use interface::{Git, GitError};
