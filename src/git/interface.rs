//! git::interface
//!
//! Repository discovery and `describe` over libgit2.
//!
//! # Errors
//!
//! - [`GitError::NotARepo`]: discovery found no repository above the path
//! - [`GitError::NothingToDescribe`]: no tag is reachable from HEAD, or
//!   HEAD is unborn
//! - [`GitError::Internal`]: anything else libgit2 reports

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from repository access.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {path}")]
    NotARepo {
        /// Where discovery started.
        path: PathBuf,
    },

    /// `describe` found no tag to describe HEAD with.
    #[error("cannot describe HEAD: {message}")]
    NothingToDescribe { message: String },

    #[error("git error: {message}")]
    Internal { message: String },
}

impl GitError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                GitError::NothingToDescribe {
                    message: err.message().to_string(),
                }
            }
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

/// Handle to a discovered repository.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("git_dir", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// Searches upward from `path` like `git` does.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Working directory, absent for bare repositories.
    pub fn work_dir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Describe HEAD by its nearest tag, like `git describe --tags
    /// --abbrev=<abbrev>`.
    ///
    /// An exact tag is returned as is. Commits past the tag add a
    /// `-<count>-g<hash>` suffix with `abbrev` hash digits.
    pub fn describe(&self, abbrev: u32) -> Result<String, GitError> {
        let mut opts = git2::DescribeOptions::new();
        opts.describe_tags();
        let description = self
            .repo
            .describe(&opts)
            .map_err(|e| GitError::from_git2(e, "describe"))?;

        let mut format = git2::DescribeFormatOptions::new();
        format.abbreviated_size(abbrev);
        let described = description
            .format(Some(&format))
            .map_err(|e| GitError::from_git2(e, "describe format"))?;
        tracing::debug!(abbrev, described = %described, "git describe");
        Ok(described)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A repository with one commit per message, tagging the first.
    fn repo_with_commits(tag: Option<&str>, messages: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();

        let mut parent: Option<git2::Oid> = None;
        for (i, message) in messages.iter().enumerate() {
            std::fs::write(dir.path().join("file.txt"), message).unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("file.txt")).unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let parents: Vec<git2::Commit> = parent
                .map(|oid| repo.find_commit(oid).unwrap())
                .into_iter()
                .collect();
            let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
            let oid = repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
                .unwrap();
            if i == 0 {
                if let Some(tag) = tag {
                    let commit = repo.find_object(oid, None).unwrap();
                    repo.tag(tag, &commit, &sig, "release", false).unwrap();
                }
            }
            parent = Some(oid);
        }
        dir
    }

    mod open {
        use super::*;

        #[test]
        fn discovers_from_subdirectory() {
            let dir = repo_with_commits(None, &["initial"]);
            let sub = dir.path().join("nested");
            std::fs::create_dir(&sub).unwrap();
            let git = Git::open(&sub).unwrap();
            assert!(git.work_dir().is_some());
        }

        #[test]
        fn non_repository_fails() {
            let dir = TempDir::new().unwrap();
            // TempDir may itself live inside a checkout; only check the
            // error shape when discovery really fails.
            if let Err(err) = Git::open(dir.path()) {
                assert!(matches!(err, GitError::NotARepo { .. }));
            }
        }
    }

    mod describe {
        use super::*;

        #[test]
        fn exact_tag() {
            let dir = repo_with_commits(Some("v1.2.3"), &["initial"]);
            let git = Git::open(dir.path()).unwrap();
            assert_eq!(git.describe(7).unwrap(), "v1.2.3");
        }

        #[test]
        fn commits_past_tag() {
            let dir = repo_with_commits(Some("v1.2.3"), &["initial", "second", "third"]);
            let git = Git::open(dir.path()).unwrap();

            let long = git.describe(7).unwrap();
            assert!(long.starts_with("v1.2.3-2-g"), "{}", long);
            assert_eq!(long.len(), "v1.2.3-2-g".len() + 7);

            assert!(git.describe(0).unwrap().starts_with("v1.2.3"));
        }

        #[test]
        fn untagged_history() {
            let dir = repo_with_commits(None, &["initial"]);
            let git = Git::open(dir.path()).unwrap();
            assert!(matches!(
                git.describe(7),
                Err(GitError::NothingToDescribe { .. })
            ));
        }
    }
}
