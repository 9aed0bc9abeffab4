use crate::domain::VcsInfo;
use crate::error::{DevflowError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A commit recorded by [MockRepository::commit_paths]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommit {
    pub paths: Vec<PathBuf>,
    pub message: String,
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    info: Option<VcsInfo>,
    tags: BTreeSet<String>,
    branches: RefCell<BTreeSet<String>>,
    remote_branches: HashMap<String, BTreeSet<String>>,
    created: RefCell<Vec<(String, String)>>,
    commits: RefCell<Vec<RecordedCommit>>,
    tags_unreadable: bool,
    commits_rejected: bool,
}

impl MockRepository {
    /// Create a new empty mock repository with no HEAD
    pub fn new() -> Self {
        MockRepository {
            info: None,
            tags: BTreeSet::new(),
            branches: RefCell::new(BTreeSet::new()),
            remote_branches: HashMap::new(),
            created: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
            tags_unreadable: false,
            commits_rejected: false,
        }
    }

    /// Create a mock whose HEAD is on `info.branch`
    pub fn with_head(info: VcsInfo) -> Self {
        let mut repo = MockRepository::new();
        repo.add_branch(info.branch.clone());
        repo.info = Some(info);
        repo
    }

    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into());
    }

    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.branches.get_mut().insert(name.into());
    }

    pub fn add_remote_branch(&mut self, remote: impl Into<String>, name: impl Into<String>) {
        self.remote_branches
            .entry(remote.into())
            .or_default()
            .insert(name.into());
    }

    /// Make tag listing fail as if the repository could not be read
    pub fn make_tags_unreadable(&mut self) {
        self.tags_unreadable = true;
    }

    /// Make every commit attempt fail
    pub fn reject_commits(&mut self) {
        self.commits_rejected = true;
    }

    /// Branches created through the trait, as `(name, start_point)`
    pub fn created_branches(&self) -> Vec<(String, String)> {
        self.created.borrow().clone()
    }

    /// Commits made through the trait, oldest first
    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn vcs_info(&self) -> Result<VcsInfo> {
        self.info
            .clone()
            .ok_or_else(|| DevflowError::no_repository("mock repository has no HEAD"))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        if self.tags_unreadable {
            return Err(DevflowError::no_repository("Cannot list tags: mock refused"));
        }
        Ok(self.tags.iter().cloned().collect())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.borrow().iter().cloned().collect())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches.borrow().contains(name))
    }

    fn list_remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        Ok(self
            .remote_branches
            .get(remote)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        let known = match start_point.split_once('/') {
            Some((remote, branch)) => self
                .remote_branches
                .get(remote)
                .is_some_and(|names| names.contains(branch)),
            None => self.branch_exists(start_point)?,
        };
        if !known {
            return Err(DevflowError::no_repository(format!(
                "revision '{}' not found",
                start_point
            )));
        }

        self.branches.borrow_mut().insert(name.to_string());
        self.created
            .borrow_mut()
            .push((name.to_string(), start_point.to_string()));
        Ok(())
    }

    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String> {
        if self.commits_rejected {
            return Err(DevflowError::no_repository("Cannot commit: mock refused"));
        }
        let mut commits = self.commits.borrow_mut();
        commits.push(RecordedCommit {
            paths: paths.iter().map(|p| p.to_path_buf()).collect(),
            message: message.to_string(),
        });
        Ok(format!("{:07x}", commits.len()))
    }
}
