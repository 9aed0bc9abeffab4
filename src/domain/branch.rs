//! Branch name classification for the git flow branching model.
//!
//! Every branch name maps to exactly one [`BranchType`] (after stripping any
//! debian packaging prefix) or is rejected.

use crate::error::{DevflowError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A dot separated numeric version with at least two components.
pub const VERSION_RE: &str = r"[0-9]+\.[0-9]+(?:\.[0-9]+)*";

/// A release candidate suffix.
pub const RC_RE: &str = r"rc[1-9][0-9]*";

const EMBEDDED_VERSION_GROUP: &str = "bverstr";

/// The closed set of branch kinds in the git flow model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    Feature,
    Develop,
    Release,
    Master,
    Hotfix,
}

impl BranchType {
    pub const ALL: [BranchType; 5] = [
        BranchType::Feature,
        BranchType::Develop,
        BranchType::Release,
        BranchType::Master,
        BranchType::Hotfix,
    ];

    /// The tag used as branch name prefix
    pub fn name(&self) -> &'static str {
        match self {
            BranchType::Feature => "feature",
            BranchType::Develop => "develop",
            BranchType::Release => "release",
            BranchType::Master => "master",
            BranchType::Hotfix => "hotfix",
        }
    }

    /// Static rules for this branch type
    pub fn descriptor(&self) -> &'static BranchTypeDescriptor {
        let table = descriptors();
        match self {
            BranchType::Feature => &table[0],
            BranchType::Develop => &table[1],
            BranchType::Release => &table[2],
            BranchType::Master => &table[3],
            BranchType::Hotfix => &table[4],
        }
    }

    fn allowed_names() -> String {
        BranchType::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for BranchType {
    type Err = DevflowError;

    fn from_str(s: &str) -> Result<Self> {
        BranchType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| DevflowError::UnknownBranchType {
                branch: s.to_string(),
                allowed: BranchType::allowed_names(),
            })
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rules attached to a branch type.
///
/// `allowed_version` constrains the repository base version while on a branch
/// of this type. For versioned branch types it carries a named capture holding
/// the part of the base version that must agree with the branch name.
#[derive(Debug)]
pub struct BranchTypeDescriptor {
    pub builds_snapshot: bool,
    pub builds_release: bool,
    pub versioned: bool,
    pub allowed_version: Regex,
    pub debian_branch: &'static str,
}

/// Result of matching a base version against a descriptor's pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseVersionMatch {
    /// The version the branch name must carry, for versioned branch types
    pub embedded: Option<String>,
}

impl BranchTypeDescriptor {
    /// Match a base version against the allowed pattern.
    ///
    /// Returns `None` when the base version is not allowed on this branch type.
    pub fn match_base_version(&self, base_version: &str) -> Option<BaseVersionMatch> {
        let captures = self.allowed_version.captures(base_version)?;
        Some(BaseVersionMatch {
            embedded: captures
                .name(EMBEDDED_VERSION_GROUP)
                .map(|m| m.as_str().to_string()),
        })
    }
}

fn descriptors() -> &'static [BranchTypeDescriptor; 5] {
    static TABLE: OnceLock<[BranchTypeDescriptor; 5]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let develop_re = format!(r"^{VERSION_RE}(?:next|\.?dev[0-9]*)$");
        let release_re = format!(r"^(?P<{EMBEDDED_VERSION_GROUP}>{VERSION_RE})(?:{RC_RE})+$");
        let master_re = format!(r"^{VERSION_RE}$");
        let hotfix_re =
            format!(r"^(?P<{EMBEDDED_VERSION_GROUP}>{VERSION_RE}\.[1-9][0-9]*)(?:{RC_RE})*$");

        [
            BranchTypeDescriptor {
                builds_snapshot: true,
                builds_release: false,
                versioned: false,
                allowed_version: compile(&develop_re),
                debian_branch: "debian-develop",
            },
            BranchTypeDescriptor {
                builds_snapshot: true,
                builds_release: false,
                versioned: false,
                allowed_version: compile(&develop_re),
                debian_branch: "debian-develop",
            },
            BranchTypeDescriptor {
                builds_snapshot: true,
                builds_release: true,
                versioned: true,
                allowed_version: compile(&release_re),
                debian_branch: "debian-develop",
            },
            BranchTypeDescriptor {
                builds_snapshot: true,
                builds_release: true,
                versioned: false,
                allowed_version: compile(&master_re),
                debian_branch: "debian",
            },
            BranchTypeDescriptor {
                builds_snapshot: true,
                builds_release: true,
                versioned: true,
                allowed_version: compile(&hotfix_re),
                debian_branch: "debian",
            },
        ]
    })
}

// Patterns are assembled from the constants above and always compile.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("branch type pattern must compile")
}

/// Strip debian packaging decorations from a branch name.
///
/// `debian`, `<codename>` and `debian-<codename>` all stand for `master`.
/// `debian-<codename>-<name>`, `debian-<name>` and `debian-<name>-<codename>`
/// stand for `<name>`.
pub fn normalize_branch_name(branch: &str, codename: &str) -> String {
    if branch == "debian" || (!codename.is_empty() && branch == codename) {
        return "master".to_string();
    }

    if codename.is_empty() {
        return branch
            .strip_prefix("debian-")
            .unwrap_or(branch)
            .to_string();
    }

    if branch == format!("debian-{}", codename) {
        return "master".to_string();
    }

    let stripped = if let Some(rest) = branch.strip_prefix(&format!("debian-{}-", codename)) {
        rest
    } else if let Some(rest) = branch.strip_prefix("debian-") {
        rest.strip_suffix(&format!("-{}", codename)).unwrap_or(rest)
    } else {
        return branch.to_string();
    };

    stripped.to_string()
}

/// A branch name resolved to its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchClassification {
    /// The branch name as given
    pub name: String,
    /// The upstream equivalent name
    pub normalized: String,
    pub branch_type: BranchType,
    /// Everything after the first `-`, present for versioned branch types
    pub embedded_version: Option<String>,
}

impl BranchClassification {
    pub fn descriptor(&self) -> &'static BranchTypeDescriptor {
        self.branch_type.descriptor()
    }

    /// The numeric version carried by the branch name, if any.
    ///
    /// Only the leading `X.Y(.Z)*` part of the embedded text counts, so
    /// `release-0.14rc2` carries `0.14`.
    pub fn embedded_base_version(&self) -> Result<Option<String>> {
        let Some(embedded) = self.embedded_version.as_deref() else {
            return Ok(None);
        };

        static LEADING: OnceLock<Regex> = OnceLock::new();
        let leading = LEADING.get_or_init(|| compile(&format!("^{}", VERSION_RE)));

        leading
            .find(embedded)
            .map(|m| Some(m.as_str().to_string()))
            .ok_or_else(|| DevflowError::MalformedBranchVersion {
                version: embedded.to_string(),
                branch: self.name.clone(),
            })
    }
}

/// Classify a branch name into its branch type.
///
/// # Errors
/// * `UnknownBranchType` - the prefix before the first `-` is not a known type
/// * `MissingVersionInBranchName` - a versioned branch type carries no version
pub fn classify(branch: &str, codename: &str) -> Result<BranchClassification> {
    let normalized = normalize_branch_name(branch, codename);

    let (type_tag, remainder) = match normalized.split_once('-') {
        Some((tag, rest)) => (tag, Some(rest)),
        None => (normalized.as_str(), None),
    };

    let branch_type: BranchType = type_tag.parse().map_err(|_| DevflowError::UnknownBranchType {
        branch: branch.to_string(),
        allowed: BranchType::allowed_names(),
    })?;

    let embedded_version = if branch_type.descriptor().versioned {
        match remainder {
            Some(rest) if !rest.is_empty() => Some(rest.to_string()),
            _ => return Err(DevflowError::MissingVersionInBranchName(branch.to_string())),
        }
    } else {
        None
    };

    Ok(BranchClassification {
        name: branch.to_string(),
        normalized,
        branch_type,
        embedded_version,
    })
}

/// Where the debian counterpart of an upstream branch lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianBranchPlan {
    pub name: String,
    /// Existing branch to create `name` from, when `name` does not exist yet
    pub create_from: Option<String>,
}

/// Decide which debian branch packages an upstream branch.
///
/// Candidates are tried in order: the codename specific branch, the same
/// without codename, then a new branch forked from the branch type's default
/// debian counterpart. `debian` is the last resort.
pub fn resolve_debian_branch<F>(branch: &str, codename: &str, exists: F) -> Result<DebianBranchPlan>
where
    F: Fn(&str) -> bool,
{
    let with_codename = if branch == "master" {
        format!("debian-{}", codename)
    } else {
        format!("debian-{}-{}", branch, codename)
    };
    if exists(&with_codename) {
        return Ok(DebianBranchPlan {
            name: with_codename,
            create_from: None,
        });
    }

    let plain = with_codename
        .strip_suffix(&format!("-{}", codename))
        .unwrap_or(&with_codename)
        .to_string();
    if exists(&plain) {
        return Ok(DebianBranchPlan {
            name: plain,
            create_from: None,
        });
    }

    let default_branch = classify(branch, codename)?.descriptor().debian_branch;
    for source in [format!("{}-{}", default_branch, codename), default_branch.to_string()] {
        if exists(&source) {
            return Ok(DebianBranchPlan {
                name: plain,
                create_from: Some(source),
            });
        }
    }

    Ok(DebianBranchPlan {
        name: "debian".to_string(),
        create_from: None,
    })
}
