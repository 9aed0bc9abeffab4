use crate::domain::vcs_info::{commit_id, short_id, VcsInfo};
use crate::error::{DevflowError, Result};
use git2::{BranchType, ErrorCode, Repository as Git2Repo};
use log::debug;
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            DevflowError::no_repository(format!(
                "Directory '{}' is not a git repository: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Opened repository at {}", repo.path().display());

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// The working directory of the repository
    pub fn toplevel(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| DevflowError::no_repository("bare repositories have no working directory"))
    }

    fn user_config(&self, key: &str) -> Result<String> {
        let config = self.repo.config()?;
        config.get_string(key).map_err(|e| {
            DevflowError::config(format!("Can not read '{}' from git configuration: {}", key, e))
        })
    }

    fn has_branch(&self, name: &str, kind: BranchType) -> Result<bool> {
        match self.repo.find_branch(name, kind) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl super::Repository for Git2Repository {
    fn vcs_info(&self) -> Result<VcsInfo> {
        let head = self
            .repo
            .head()
            .map_err(|e| DevflowError::no_repository(format!("Cannot read HEAD: {}", e)))?;

        if !head.is_branch() {
            return Err(DevflowError::no_repository("HEAD is not on a branch"));
        }
        let branch = head
            .shorthand()
            .ok_or_else(|| DevflowError::no_repository("Branch name is not valid UTF-8"))?
            .to_string();

        let commit = head.peel_to_commit()?;
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();
        let revid = commit_id(&commit.id().to_string(), &parents, &branch)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(commit.id())?;
        let mut revno = 0;
        for oid in revwalk {
            oid?;
            revno += 1;
        }

        debug!(
            "HEAD is {} on '{}' ({} commits)",
            short_id(&commit.id().to_string()),
            branch,
            revno
        );

        Ok(VcsInfo {
            branch,
            revid,
            revno,
            toplevel: self.toplevel()?,
            name: self.user_config("user.name")?,
            email: self.user_config("user.email")?,
        })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self
            .repo
            .tag_names(None)
            .map_err(|e| DevflowError::no_repository(format!("Cannot list tags: {}", e)))?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        self.has_branch(name, BranchType::Local)
    }

    fn list_remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", remote);
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()?.and_then(|n| n.strip_prefix(&prefix)) {
                if name != "HEAD" {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        let commit = self.repo.revparse_single(start_point)?.peel_to_commit()?;
        self.repo.branch(name, &commit, false)?;
        debug!("Created branch '{}' at '{}'", name, start_point);
        Ok(())
    }

    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(path)?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        Ok(short_id(&oid.to_string()).to_string())
    }
}
