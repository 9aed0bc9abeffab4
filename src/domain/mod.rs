//! Domain logic - pure versioning rules independent of git operations

pub mod branch;
pub mod debian;
pub mod tag;
pub mod vcs_info;
pub mod version;

pub use branch::{
    classify, normalize_branch_name, resolve_debian_branch, BranchClassification, BranchType,
    BranchTypeDescriptor, DebianBranchPlan,
};
pub use debian::{debian_revision, debianize, format_debian_version, to_debian, version_to_tag};
pub use tag::DebianTag;
pub use vcs_info::{commit_id, short_id, VcsInfo};
pub use version::{
    derive_version, next_develop, next_hotfix, next_release, validate_version, BuildMode,
    PyVersion, Stage,
};
