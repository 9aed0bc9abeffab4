use crate::error::{DevflowError, Result};
use std::path::PathBuf;

/// Length of abbreviated commit ids
pub const SHORT_ID_LEN: usize = 7;

/// Snapshot of the repository HEAD, taken once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsInfo {
    /// Current branch name
    pub branch: String,
    /// Short commit id, or both parents' ids joined by `_` for debian merges
    pub revid: String,
    /// Number of commits reachable from HEAD
    pub revno: usize,
    /// Repository working directory
    pub toplevel: PathBuf,
    /// Committer name from the git configuration
    pub name: String,
    /// Committer email from the git configuration
    pub email: String,
}

/// Abbreviate a hex commit id
pub fn short_id(hex: &str) -> &str {
    hex.get(..SHORT_ID_LEN).unwrap_or(hex)
}

/// Revision id of a commit as used in snapshot versions.
///
/// A merge commit on a debian branch is identified by both of its parents,
/// so packaging merges of the same upstream commit stay distinguishable.
pub fn commit_id(commit: &str, parents: &[String], branch: &str) -> Result<String> {
    match parents.len() {
        0 | 1 => Ok(short_id(commit).to_string()),
        2 if branch == "debian" || branch.starts_with("debian-") => Ok(format!(
            "{}_{}",
            short_id(&parents[0]),
            short_id(&parents[1])
        )),
        2 => Ok(short_id(commit).to_string()),
        _ => Err(DevflowError::TooManyParents {
            commit: commit.to_string(),
        }),
    }
}
