//! Command workflows behind the CLI.
//!
//! Each workflow takes an already opened repository and a [Session], so the
//! commands can be driven programmatically (and tested against
//! [MockRepository](crate::git::MockRepository)) without going through clap.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::distribution::distribution_codename;
use crate::domain::{
    classify, next_develop, next_hotfix, next_release, BranchClassification, BuildMode,
};
use crate::git::Repository;
use crate::notice::Notice;
use crate::versioning::{
    self, ensure_debian_branch, read_base_version, BumpOutcome, DebianBranch, DebianVersion,
    VersionContext,
};

/// Global options shared by every command
///
/// Mirrors the CLI arguments in a form that does not depend on clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Build mode requested on the command line or through the environment
    pub mode: Option<BuildMode>,

    /// Distribution codename requested on the command line
    pub codename: Option<String>,
}

/// Settings resolved once per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub config: Config,
    /// Explicit build mode, if any; branch defaults apply otherwise
    pub mode: Option<BuildMode>,
    pub codename: String,
    /// Conditions met while setting up the session
    pub notices: Vec<Notice>,
}

impl Session {
    /// Load configuration and resolve mode and codename.
    ///
    /// Mode precedence: `options.mode`, then `[build].mode`. Codename
    /// precedence: `options.codename`, then `[build].codename`, then the host
    /// distribution.
    pub fn open(options: &GlobalOptions, toplevel: Option<&Path>) -> Result<Self> {
        let mut notices = Vec::new();
        let config_file = config::find_config(options.config_path.as_deref(), toplevel);
        let config = match &config_file {
            Some(path) => config::load_config_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => {
                notices.push(Notice::NoConfigFile);
                Config::default()
            }
        };

        let mode = options.mode.or(config.build.mode);
        let configured = options.codename.as_deref().or(config.build.codename.as_deref());
        let codename = distribution_codename(configured);
        debug!(
            "Session: config {:?}, mode {:?}, codename {}",
            config_file, mode, codename
        );

        Ok(Session {
            config,
            mode,
            codename,
            notices,
        })
    }

    /// Session over an in-memory configuration
    pub fn with_config(config: Config, mode: Option<BuildMode>, codename: &str) -> Self {
        Session {
            config,
            mode,
            codename: codename.to_string(),
            notices: Vec::new(),
        }
    }

    fn context<R: Repository>(&self, repo: &R) -> Result<VersionContext> {
        Ok(VersionContext::load(repo, self.mode, &self.codename)?)
    }
}

/// Python version of HEAD
pub fn python_version<R: Repository>(repo: &R, session: &Session) -> Result<String> {
    Ok(session.context(repo)?.python_version()?)
}

/// Debian version of HEAD
pub fn debian_version<R: Repository>(repo: &R, session: &Session) -> Result<DebianVersion> {
    let ctx = session.context(repo)?;
    Ok(ctx.debian_version(repo)?)
}

/// Regenerate all configured version files
pub fn update_version_files<R: Repository>(repo: &R, session: &Session) -> Result<Vec<Notice>> {
    let ctx = session.context(repo)?;
    Ok(versioning::update_version_files(repo, &ctx, &session.config)?)
}

/// A proposed base version change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub current: String,
    pub proposed: String,
}

/// The branch a proposed version is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalKind {
    Release,
    Develop,
    Hotfix,
}

/// Propose the base version of the next release, develop or hotfix line
pub fn propose_version<R: Repository>(repo: &R, kind: ProposalKind) -> Result<Proposal> {
    let vcs = repo.vcs_info()?;
    let current = read_base_version(&vcs.toplevel)?;
    let proposed = match kind {
        ProposalKind::Release => next_release(&current)?,
        ProposalKind::Develop => next_develop(&current)?,
        ProposalKind::Hotfix => next_hotfix(&current)?,
    };
    Ok(Proposal { current, proposed })
}

/// Set and commit a new base version
pub fn bump_version<R: Repository>(
    repo: &R,
    session: &Session,
    version: &str,
) -> Result<BumpOutcome> {
    versioning::bump_version(repo, version, &session.codename)
        .with_context(|| format!("Failed to bump version to {}", version))
}

/// Base version currently stored in the repository
pub fn current_version<R: Repository>(repo: &R) -> Result<String> {
    let vcs = repo.vcs_info()?;
    Ok(read_base_version(&vcs.toplevel)?)
}

/// Classify `branch`, or the branch of HEAD
pub fn classify_branch<R: Repository>(
    repo: &R,
    session: &Session,
    branch: Option<&str>,
) -> Result<BranchClassification> {
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => repo.vcs_info()?.branch,
    };
    Ok(classify(&branch, &session.codename)?)
}

/// Debian branch of `branch` (or of HEAD), created when missing
pub fn debian_branch<R: Repository>(
    repo: &R,
    session: &Session,
    branch: Option<&str>,
) -> Result<DebianBranch> {
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => repo.vcs_info()?.branch,
    };
    ensure_debian_branch(repo, &branch, &session.codename)
        .with_context(|| format!("Failed to resolve debian branch of '{}'", branch))
}
