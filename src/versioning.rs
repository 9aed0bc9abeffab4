//! Versioning of the checked out commit.
//!
//! Joins the repository collaborator with the pure rules in [crate::domain]:
//! reads the base version file, derives python and debian versions for HEAD,
//! regenerates version files, bumps the base version and makes sure the
//! debian branch of an upstream branch exists.

use crate::config::Config;
use crate::domain::{
    debian_revision, debianize, derive_version, format_debian_version, resolve_debian_branch,
    validate_version, BuildMode, DebianBranchPlan, PyVersion, VcsInfo,
};
use crate::error::{DevflowError, Result};
use crate::git::Repository;
use crate::notice::Notice;
use crate::template::{render, TemplateValues, DEFAULT_VERSION_TEMPLATE};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Name of the base version file at the repository top-level
pub const BASE_VERSION_FILE: &str = "version";

/// Remote whose branches may seed a missing debian branch
pub const UPSTREAM_REMOTE: &str = "origin";

fn is_content_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with('#')
}

/// Extract the base version from the content of a base version file.
///
/// Blank lines and `#` comments are ignored; exactly one line must remain
/// and it must be a valid version.
pub fn parse_base_version(path: &Path, content: &str) -> Result<String> {
    let malformed = |reason: String| DevflowError::MalformedBaseVersionFile {
        path: path.display().to_string(),
        reason,
    };

    let lines: Vec<&str> = content
        .lines()
        .filter(|l| is_content_line(l))
        .map(str::trim)
        .collect();

    let version = match lines.as_slice() {
        [version] => *version,
        [] => return Err(malformed("no version line found".to_string())),
        many => {
            return Err(malformed(format!(
                "expected one version line, found {}",
                many.len()
            )))
        }
    };

    PyVersion::parse(version).map_err(|e| malformed(e.to_string()))?;
    Ok(version.to_string())
}

/// Read the base version file below `toplevel`
pub fn read_base_version(toplevel: &Path) -> Result<String> {
    let path = toplevel.join(BASE_VERSION_FILE);
    let content = fs::read_to_string(&path).map_err(|e| DevflowError::MalformedBaseVersionFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_base_version(&path, &content)
}

/// Debian version of HEAD together with the chosen debian revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianVersion {
    pub version: String,
    pub revision: u32,
}

impl DebianVersion {
    /// Reported when earlier revisions of the same version are tagged
    pub fn notice(&self) -> Option<Notice> {
        (self.revision > 1).then(|| Notice::DebianRevisionTaken {
            version: self.version.clone(),
            revision: self.revision,
        })
    }
}

/// Everything needed to version the checked out commit
#[derive(Debug, Clone)]
pub struct VersionContext {
    pub vcs: VcsInfo,
    pub base_version: String,
    pub mode: BuildMode,
    pub codename: String,
}

impl VersionContext {
    /// Read HEAD and the base version file.
    ///
    /// `mode` is the explicitly requested build mode; without one the branch
    /// type's default applies.
    pub fn load<R: Repository>(repo: &R, mode: Option<BuildMode>, codename: &str) -> Result<Self> {
        let vcs = repo.vcs_info()?;
        let base_version = read_base_version(&vcs.toplevel)?;
        let classification = validate_version(&base_version, &vcs.branch, codename)?;
        let mode = mode.unwrap_or_else(|| BuildMode::default_for(&classification));

        debug!(
            "Base version {} on {} branch '{}', {} build",
            base_version, classification.branch_type, vcs.branch, mode
        );

        Ok(VersionContext {
            vcs,
            base_version,
            mode,
            codename: codename.to_string(),
        })
    }

    /// Python version of HEAD
    pub fn python_version(&self) -> Result<String> {
        derive_version(&self.base_version, &self.vcs, self.mode, &self.codename)
    }

    /// Debian version of HEAD; the revision is the first one not yet tagged.
    pub fn debian_version<R: Repository>(&self, repo: &R) -> Result<DebianVersion> {
        let upstream = debianize(&self.python_version()?);
        let tags = repo.tag_set()?;
        Ok(self.debian_version_with_tags(&upstream, &tags))
    }

    fn debian_version_with_tags(&self, upstream: &str, tags: &HashSet<String>) -> DebianVersion {
        let revision = debian_revision(upstream, &self.codename, tags);
        DebianVersion {
            version: format_debian_version(upstream, revision, &self.codename),
            revision,
        }
    }
}

/// Regenerate the version files of every configured package.
///
/// Files are written below the repository top-level; templates are read
/// from there as well.
pub fn update_version_files<R: Repository>(
    repo: &R,
    ctx: &VersionContext,
    config: &Config,
) -> Result<Vec<Notice>> {
    let mut notices = Vec::new();
    let version = ctx.python_version()?;
    let debian = ctx.debian_version(repo)?;
    notices.extend(debian.notice());

    let values = TemplateValues::new(version, debian.version, &ctx.vcs);
    let toplevel = &ctx.vcs.toplevel;

    for (package, package_config) in &config.packages {
        let files = package_config.version_files(package)?;
        if files.is_empty() {
            notices.push(Notice::PackageWithoutVersionFile {
                package: package.clone(),
            });
            continue;
        }

        for (file, template) in files {
            let template = match template {
                Some(template) => read_template(&toplevel.join(template))?,
                None => DEFAULT_VERSION_TEMPLATE.to_string(),
            };
            let path = toplevel.join(&file);
            write_file(&path, &render(&template, &values))?;
            info!("Wrote version {} to {}", values.version, path.display());
            notices.push(Notice::VersionFileWritten { path });
        }
    }

    Ok(notices)
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        DevflowError::template(format!("Cannot read template '{}': {}", path.display(), e))
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Result of a base version bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOutcome {
    pub old: String,
    pub new: String,
    /// Short id of the bump commit
    pub commit: String,
}

/// Commit message of a base version bump
pub fn bump_message(version: &str) -> String {
    format!("Bump version to {}", version)
}

/// Replace the version line of a base version file, keeping comments
pub fn replace_base_version(content: &str, new_version: &str) -> String {
    let mut replaced = String::with_capacity(content.len());
    for line in content.lines() {
        if is_content_line(line) {
            replaced.push_str(new_version);
        } else {
            replaced.push_str(line);
        }
        replaced.push('\n');
    }
    replaced
}

/// Set a new base version on the current branch and commit it.
pub fn bump_version<R: Repository>(
    repo: &R,
    new_version: &str,
    codename: &str,
) -> Result<BumpOutcome> {
    let vcs = repo.vcs_info()?;
    PyVersion::parse(new_version)?;
    validate_version(new_version, &vcs.branch, codename)?;

    let path = vcs.toplevel.join(BASE_VERSION_FILE);
    let content = fs::read_to_string(&path)?;
    let old = parse_base_version(&path, &content)?;

    fs::write(&path, replace_base_version(&content, new_version))?;
    let commit =
        match repo.commit_paths(&[Path::new(BASE_VERSION_FILE)], &bump_message(new_version)) {
            Ok(commit) => commit,
            Err(e) => {
                warn!("Commit of version {} failed, restoring {}", new_version, old);
                fs::write(&path, &content)?;
                return Err(e);
            }
        };
    info!("Bumped base version from {} to {} ({})", old, new_version, commit);

    Ok(BumpOutcome {
        old,
        new: new_version.to_string(),
        commit,
    })
}

/// Debian branch of an upstream branch, after creating it if needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianBranch {
    pub name: String,
    pub notices: Vec<Notice>,
}

/// Resolve the debian branch of `branch` and create it locally when it is
/// only known from its source or from the upstream remote.
pub fn ensure_debian_branch<R: Repository>(
    repo: &R,
    branch: &str,
    codename: &str,
) -> Result<DebianBranch> {
    let local: HashSet<String> = repo.list_branches()?.into_iter().collect();
    let remote: HashSet<String> = repo.list_remote_branches(UPSTREAM_REMOTE)?.into_iter().collect();

    let DebianBranchPlan { name, create_from } =
        resolve_debian_branch(branch, codename, |n| local.contains(n) || remote.contains(n))?;

    let source = match create_from {
        Some(source) => Some(source),
        None if !local.contains(&name) && remote.contains(&name) => Some(name.clone()),
        None => None,
    };

    let mut notices = Vec::new();
    if let Some(source) = source {
        let start_point = if local.contains(&source) {
            source
        } else {
            format!("{}/{}", UPSTREAM_REMOTE, source)
        };
        repo.create_branch(&name, &start_point)?;
        info!("Created debian branch '{}' from '{}'", name, start_point);
        notices.push(Notice::DebianBranchCreated {
            branch: name.clone(),
            from: start_point,
        });
    }

    Ok(DebianBranch { name, notices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PackageConfig, PathList};
    use crate::git::MockRepository;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn vcs(branch: &str, toplevel: &Path) -> VcsInfo {
        VcsInfo {
            branch: branch.to_string(),
            revid: "abc1234".to_string(),
            revno: 249,
            toplevel: toplevel.to_path_buf(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }
    }

    fn repo_with_version(branch: &str, content: &str) -> (TempDir, MockRepository) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(BASE_VERSION_FILE), content).unwrap();
        let repo = MockRepository::with_head(vcs(branch, dir.path()));
        (dir, repo)
    }

    #[test]
    fn test_parse_base_version_skips_comments() {
        let content = "# base version of the project\n\n0.14next\n";
        assert_eq!(
            parse_base_version(Path::new("version"), content).unwrap(),
            "0.14next"
        );
    }

    #[test]
    fn test_parse_base_version_rejects_two_lines() {
        let err = parse_base_version(Path::new("version"), "0.14\n0.15\n").unwrap_err();
        assert!(matches!(err, DevflowError::MalformedBaseVersionFile { .. }));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_parse_base_version_rejects_garbage() {
        assert!(parse_base_version(Path::new("version"), "# only\n").is_err());
        assert!(parse_base_version(Path::new("version"), "fourteen\n").is_err());
    }

    #[test]
    fn test_missing_base_version_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_base_version(dir.path()),
            Err(DevflowError::MalformedBaseVersionFile { .. })
        ));
    }

    #[test]
    fn test_context_uses_branch_default_mode() {
        let (_dir, repo) = repo_with_version("release-0.14", "0.14rc2\n");
        let ctx = VersionContext::load(&repo, None, "bionic").unwrap();
        assert_eq!(ctx.mode, BuildMode::Snapshot);
        assert_eq!(ctx.python_version().unwrap(), "0.14rc2_249_abc1234");

        let ctx = VersionContext::load(&repo, Some(BuildMode::Release), "bionic").unwrap();
        assert_eq!(ctx.python_version().unwrap(), "0.14rc2");
    }

    #[test]
    fn test_context_rejects_release_on_develop() {
        let (_dir, repo) = repo_with_version("develop", "0.14next\n");
        let ctx = VersionContext::load(&repo, Some(BuildMode::Release), "bionic").unwrap();
        assert!(matches!(
            ctx.python_version(),
            Err(DevflowError::IllegalModeForBranch { .. })
        ));
    }

    #[test]
    fn test_debian_version_probes_tags() {
        let (_dir, mut repo) = repo_with_version("master", "0.14\n");
        repo.add_tag("debian/0.14-1bionic");
        let ctx = VersionContext::load(&repo, Some(BuildMode::Release), "bionic").unwrap();

        let debian = ctx.debian_version(&repo).unwrap();
        assert_eq!(debian.version, "0.14-2~bionic");
        assert_eq!(
            debian.notice(),
            Some(Notice::DebianRevisionTaken {
                version: "0.14-2~bionic".to_string(),
                revision: 2
            })
        );
    }

    #[test]
    fn test_update_writes_default_template() {
        let (dir, repo) = repo_with_version("develop", "0.14next\n");
        let mut config = Config::default();
        config.packages.insert(
            "pkg".to_string(),
            PackageConfig {
                version_file: Some(PathList::One("pkg/_version.py".to_string())),
                version_template: None,
            },
        );
        config
            .packages
            .insert("docs".to_string(), PackageConfig::default());

        let ctx = VersionContext::load(&repo, None, "bionic").unwrap();
        let notices = update_version_files(&repo, &ctx, &config).unwrap();

        let written = fs::read_to_string(dir.path().join("pkg/_version.py")).unwrap();
        assert!(written.contains("__version__ = \"0.14next_249_abc1234\""));
        assert!(written.contains("'revno': 249}"));
        assert!(notices.contains(&Notice::PackageWithoutVersionFile {
            package: "docs".to_string()
        }));
    }

    #[test]
    fn test_update_uses_custom_template() {
        let (dir, repo) = repo_with_version("master", "0.14\n");
        fs::write(
            dir.path().join("version.tmpl"),
            "{DEVFLOW_VERSION} {DEVFLOW_DEBIAN_VERSION}\n",
        )
        .unwrap();
        let mut config = Config::default();
        config.packages.insert(
            "pkg".to_string(),
            PackageConfig {
                version_file: Some(PathList::One("VERSION".to_string())),
                version_template: Some(PathList::One("version.tmpl".to_string())),
            },
        );

        let ctx = VersionContext::load(&repo, Some(BuildMode::Release), "bionic").unwrap();
        update_version_files(&repo, &ctx, &config).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("VERSION")).unwrap(),
            "0.14 0.14-1~bionic\n"
        );
    }

    #[test]
    fn test_update_missing_template() {
        let (_dir, repo) = repo_with_version("master", "0.14\n");
        let mut config = Config::default();
        config.packages.insert(
            "pkg".to_string(),
            PackageConfig {
                version_file: Some(PathList::One("VERSION".to_string())),
                version_template: Some(PathList::One("missing.tmpl".to_string())),
            },
        );

        let ctx = VersionContext::load(&repo, None, "bionic").unwrap();
        let err = update_version_files(&repo, &ctx, &config).unwrap_err();
        assert!(matches!(err, DevflowError::Template(_)));
        assert!(err.to_string().contains("missing.tmpl"));
    }

    #[test]
    fn test_bump_rewrites_and_commits() {
        let (dir, repo) = repo_with_version("develop", "# comment\n0.14next\n");
        let outcome = bump_version(&repo, "0.15next", "bionic").unwrap();

        assert_eq!(outcome.old, "0.14next");
        assert_eq!(outcome.new, "0.15next");
        assert_eq!(
            fs::read_to_string(dir.path().join(BASE_VERSION_FILE)).unwrap(),
            "# comment\n0.15next\n"
        );
        let commits = repo.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "Bump version to 0.15next");
        assert_eq!(commits[0].paths, vec![PathBuf::from(BASE_VERSION_FILE)]);
    }

    #[test]
    fn test_bump_restores_file_when_commit_fails() {
        let (dir, mut repo) = repo_with_version("develop", "# comment\n0.14next\n");
        repo.reject_commits();

        assert!(matches!(
            bump_version(&repo, "0.15next", "bionic"),
            Err(DevflowError::NoRepositoryAccess(_))
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join(BASE_VERSION_FILE)).unwrap(),
            "# comment\n0.14next\n"
        );
    }

    #[test]
    fn test_debian_version_without_tag_access() {
        let (_dir, mut repo) = repo_with_version("master", "0.14\n");
        repo.make_tags_unreadable();
        let ctx = VersionContext::load(&repo, Some(BuildMode::Release), "bionic").unwrap();

        assert!(matches!(
            ctx.debian_version(&repo),
            Err(DevflowError::NoRepositoryAccess(_))
        ));
    }

    #[test]
    fn test_bump_rejects_version_foreign_to_branch() {
        let (dir, repo) = repo_with_version("release-0.14", "0.14rc1\n");
        assert!(bump_version(&repo, "0.15rc1", "bionic").is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join(BASE_VERSION_FILE)).unwrap(),
            "0.14rc1\n"
        );
        assert!(repo.commits().is_empty());
    }

    #[test]
    fn test_ensure_existing_debian_branch() {
        let (_dir, mut repo) = repo_with_version("develop", "0.14next\n");
        repo.add_branch("debian-develop");
        let branch = ensure_debian_branch(&repo, "develop", "bionic").unwrap();
        assert_eq!(branch.name, "debian-develop");
        assert!(branch.notices.is_empty());
        assert!(repo.created_branches().is_empty());
    }

    #[test]
    fn test_ensure_creates_from_default_counterpart() {
        let (_dir, mut repo) = repo_with_version("release-0.15", "0.15rc1\n");
        repo.add_branch("debian-develop");
        let branch = ensure_debian_branch(&repo, "release-0.15", "bionic").unwrap();
        assert_eq!(branch.name, "debian-release-0.15");
        assert_eq!(
            repo.created_branches(),
            vec![(
                "debian-release-0.15".to_string(),
                "debian-develop".to_string()
            )]
        );
    }

    #[test]
    fn test_ensure_tracks_remote_branch() {
        let (_dir, mut repo) = repo_with_version("develop", "0.14next\n");
        repo.add_remote_branch(UPSTREAM_REMOTE, "debian-develop");
        let branch = ensure_debian_branch(&repo, "develop", "bionic").unwrap();
        assert_eq!(branch.name, "debian-develop");
        assert_eq!(
            branch.notices,
            vec![Notice::DebianBranchCreated {
                branch: "debian-develop".to_string(),
                from: "origin/debian-develop".to_string()
            }]
        );
    }
}
