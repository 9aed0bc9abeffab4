//! Version strings, their total order and the per-branch derivation rules.
//!
//! A version is `X.Y(.Z)*` optionally followed by one stage suffix (`rcN`,
//! `rcN.devM`, `next`, `dev`, `devN`, `.devN`) and optionally by a snapshot
//! suffix `_<revno>[_<revid>]`. For the same numbers the order is
//!
//! ```text
//! X.Ydev < X.YrcN_* < X.YrcN < X.Y_* < X.Y < X.Ynext_* < X.Ynext < X.Y.1_* < X.Y.1
//! ```

use crate::domain::branch::{classify, BranchClassification};
use crate::domain::debian::{debianize, dpkg_compare};
use crate::domain::vcs_info::VcsInfo;
use crate::error::{DevflowError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Which kind of build a version is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Snapshot,
    Release,
}

impl BuildMode {
    /// The mode used when nothing is configured: snapshots wherever the
    /// branch type allows them.
    pub fn default_for(classification: &BranchClassification) -> Self {
        if classification.descriptor().builds_snapshot {
            BuildMode::Snapshot
        } else {
            BuildMode::Release
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuildMode::Snapshot => "snapshot",
            BuildMode::Release => "release",
        }
    }
}

impl FromStr for BuildMode {
    type Err = DevflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snapshot" => Ok(BuildMode::Snapshot),
            "release" => Ok(BuildMode::Release),
            other => Err(DevflowError::config(format!(
                "Specified mode '{}' should be one of 'snapshot' or 'release'",
                other
            ))),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a version relative to its numeric release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Dev(u64),
    ReleaseCandidate { number: u64, dev: Option<u64> },
    Final,
    Next,
}

impl Stage {
    fn rank(&self) -> (u8, u64, u8, u64) {
        match self {
            Stage::Dev(n) => (0, *n, 0, 0),
            Stage::ReleaseCandidate {
                number,
                dev: Some(d),
            } => (1, *number, 0, *d),
            Stage::ReleaseCandidate { number, dev: None } => (1, *number, 1, 0),
            Stage::Final => (2, 0, 0, 0),
            Stage::Next => (3, 0, 0, 0),
        }
    }
}

impl Ord for Stage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Stage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Revision metadata of a snapshot build.
///
/// Snapshots order by revno, then by revid compared the way dpkg compares
/// the debian form, so a snapshot with a revid sorts below one without.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revno: u64,
    pub revid: Option<String>,
}

impl Snapshot {
    fn debian_revid(&self) -> String {
        self.revid
            .as_deref()
            .map(|revid| debianize(&format!("_{}", revid)))
            .unwrap_or_default()
    }
}

impl Ord for Snapshot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.revno
            .cmp(&other.revno)
            .then_with(|| dpkg_compare(&self.debian_revid(), &other.debian_revid()))
    }
}

impl PartialOrd for Snapshot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Snapshot {}

/// A parsed version with the total order described in the module docs.
///
/// Equality follows the order, so `0.14` and `0.14.0` are equal.
#[derive(Debug, Clone)]
pub struct PyVersion {
    raw: String,
    pub release: Vec<u64>,
    pub stage: Stage,
    pub snapshot: Option<Snapshot>,
}

fn version_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(
            r"^(?P<release>[0-9]+(?:\.[0-9]+)+)(?:(?P<next>next)|rc(?P<rc>[0-9]+)(?:\.dev(?P<rcdev>[0-9]*))?|\.?dev(?P<dev>[0-9]*))?(?:_(?P<revno>[0-9]+)(?:_(?P<revid>.+))?)?$",
        )
        .expect("version grammar must compile")
    })
}

fn parse_number(text: &str, version: &str) -> Result<u64> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<u64>()
        .map_err(|_| DevflowError::malformed_version(version, format!("'{}' is out of range", text)))
}

impl PyVersion {
    pub fn parse(version: &str) -> Result<Self> {
        let caps = version_grammar().captures(version).ok_or_else(|| {
            DevflowError::malformed_version(
                version,
                "expected X.Y[.Z...] with optional rcN, next or dev suffix",
            )
        })?;

        let release = caps["release"]
            .split('.')
            .map(|part| parse_number(part, version))
            .collect::<Result<Vec<_>>>()?;

        let stage = if caps.name("next").is_some() {
            Stage::Next
        } else if let Some(rc) = caps.name("rc") {
            Stage::ReleaseCandidate {
                number: parse_number(rc.as_str(), version)?,
                dev: caps
                    .name("rcdev")
                    .map(|d| parse_number(d.as_str(), version))
                    .transpose()?,
            }
        } else if let Some(dev) = caps.name("dev") {
            Stage::Dev(parse_number(dev.as_str(), version)?)
        } else {
            Stage::Final
        };

        let snapshot = caps
            .name("revno")
            .map(|revno| -> Result<Snapshot> {
                Ok(Snapshot {
                    revno: parse_number(revno.as_str(), version)?,
                    revid: caps.name("revid").map(|r| r.as_str().to_string()),
                })
            })
            .transpose()?;

        Ok(PyVersion {
            raw: version.to_string(),
            release,
            stage,
            snapshot,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

impl Ord for PyVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_release(&self.release, &other.release)
            .then_with(|| self.stage.cmp(&other.stage))
            .then_with(|| match (&self.snapshot, &other.snapshot) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for PyVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PyVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PyVersion {}

impl FromStr for PyVersion {
    type Err = DevflowError;

    fn from_str(s: &str) -> Result<Self> {
        PyVersion::parse(s)
    }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check that a base version is allowed on a branch.
///
/// The base version must match the branch type's pattern and, for versioned
/// branch types, agree with the version in the branch name.
pub fn validate_version(
    base_version: &str,
    branch: &str,
    codename: &str,
) -> Result<BranchClassification> {
    let classification = classify(branch, codename)?;
    let descriptor = classification.descriptor();
    let branch_version = classification.embedded_base_version()?;

    let matched = descriptor
        .match_base_version(base_version)
        .ok_or_else(|| DevflowError::BaseVersionMismatch {
            version: base_version.to_string(),
            branch: branch.to_string(),
            reason: format!(
                "does not match '{}' required on {} branches",
                descriptor.allowed_version.as_str(),
                classification.branch_type
            ),
        })?;

    if descriptor.versioned && matched.embedded != branch_version {
        return Err(DevflowError::BaseVersionMismatch {
            version: base_version.to_string(),
            branch: branch.to_string(),
            reason: format!(
                "base version names '{}' but branch names '{}'",
                matched.embedded.unwrap_or_default(),
                branch_version.unwrap_or_default()
            ),
        });
    }

    Ok(classification)
}

/// Compute the python version of a commit.
///
/// | branch  | snapshot        | release   |
/// |---------|-----------------|-----------|
/// | feature | `0.14next_150_x`| N/A       |
/// | develop | `0.14next_151_x`| N/A       |
/// | release | `0.14rc2_249_x` | `0.14rc2` |
/// | master  | `0.14_260_x`    | `0.14`    |
/// | hotfix  | `0.14.1rc6_121_x` | `0.14.1rc6`, `0.14.1` |
pub fn derive_version(
    base_version: &str,
    vcs: &VcsInfo,
    mode: BuildMode,
    codename: &str,
) -> Result<String> {
    let classification = validate_version(base_version, &vcs.branch, codename)?;
    let descriptor = classification.descriptor();

    let allowed = match mode {
        BuildMode::Snapshot => descriptor.builds_snapshot,
        BuildMode::Release => descriptor.builds_release,
    };
    if !allowed {
        return Err(DevflowError::IllegalModeForBranch {
            mode: mode.to_string(),
            branch_type: classification.branch_type.to_string(),
        });
    }

    Ok(match mode {
        BuildMode::Release => base_version.to_string(),
        BuildMode::Snapshot => format!("{}_{}_{}", base_version, vcs.revno, vcs.revid),
    })
}

/// Leading numeric components of a version; at least major and minor.
fn numeric_components(version: &str) -> Result<Vec<u64>> {
    static LEADING: OnceLock<Regex> = OnceLock::new();
    let leading = LEADING.get_or_init(|| {
        Regex::new(r"^[0-9]+(?:\.[0-9]+)+").expect("numeric prefix pattern must compile")
    });

    let numbers = leading.find(version).ok_or_else(|| {
        DevflowError::malformed_version(version, "expected at least two numeric components")
    })?;

    numbers
        .as_str()
        .split('.')
        .map(|part| parse_number(part, version))
        .collect()
}

/// Propose the release version that follows a develop version.
///
/// `0.14next` (legacy scheme) becomes `0.15`; `0.15.dev` and `0.15dev3` become
/// `0.15`.
pub fn next_release(develop_version: &str) -> Result<String> {
    let parts = numeric_components(develop_version)?;
    let (major, minor) = (parts[0], parts[1]);

    let is_dev = {
        static DEV: OnceLock<Regex> = OnceLock::new();
        DEV.get_or_init(|| Regex::new(r"\.?dev[0-9]*$").expect("dev suffix pattern must compile"))
            .is_match(develop_version)
    };

    if is_dev {
        Ok(format!("{}.{}", major, minor))
    } else {
        Ok(format!("{}.{}", major, minor + 1))
    }
}

/// Propose the develop version that follows a release: `0.14` becomes `0.15next`.
pub fn next_develop(release_version: &str) -> Result<String> {
    let parts = numeric_components(release_version)?;
    Ok(format!("{}.{}next", parts[0], parts[1] + 1))
}

/// Propose the next hotfix version: `0.14` becomes `0.14.1`, `0.14.3` becomes `0.14.4`.
pub fn next_hotfix(version: &str) -> Result<String> {
    let parts = numeric_components(version)?;
    let patch = parts.get(2).copied().unwrap_or(0);
    Ok(format!("{}.{}.{}", parts[0], parts[1], patch + 1))
}
