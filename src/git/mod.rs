//! Version control abstraction layer
//!
//! The versioning core only needs a narrow view of the repository: HEAD
//! information, tag and branch names, and a few mutations used when bumping
//! the base version or creating debian branches.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! ```rust
//! # use devflow::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> devflow::Result<()> {
//! let info = repo.vcs_info()?;
//! println!("{} at {} ({} commits)", info.branch, info.revid, info.revno);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::VcsInfo;
use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// Repository operations needed by devflow.
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// backend failures to [crate::error::DevflowError] variants, using
/// `NoRepositoryAccess` when the repository itself cannot be read.
pub trait Repository {
    /// Information about the current HEAD commit and branch.
    ///
    /// # Errors
    /// * HEAD is detached or unborn
    /// * HEAD is a merge with more than two parents
    /// * `user.name`/`user.email` are not configured
    fn vcs_info(&self) -> Result<VcsInfo>;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Names of local branches
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Whether a local branch exists
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Names of remote-tracking branches of `remote`, without the remote prefix
    fn list_remote_branches(&self, remote: &str) -> Result<Vec<String>>;

    /// Create a local branch `name` pointing at `start_point`
    ///
    /// `start_point` may be any revision, e.g. `debian-develop` or
    /// `origin/debian-develop`.
    fn create_branch(&self, name: &str, start_point: &str) -> Result<()>;

    /// Stage the given paths (relative to the working directory) and commit
    /// them on the current branch. Returns the short id of the new commit.
    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String>;

    /// Tag names as a set, for membership probes
    fn tag_set(&self) -> Result<HashSet<String>> {
        Ok(self.list_tags()?.into_iter().collect())
    }
}
